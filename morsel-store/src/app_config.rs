use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_peak_multiplier")]
    pub peak_multiplier: f64,
    #[serde(default = "default_lunch_start")]
    pub lunch_start_hour: u32,
    #[serde(default = "default_lunch_end")]
    pub lunch_end_hour: u32,
    #[serde(default = "default_dinner_start")]
    pub dinner_start_hour: u32,
    #[serde(default = "default_dinner_end")]
    pub dinner_end_hour: u32,
    #[serde(default = "default_euros_per_point")]
    pub loyalty_euros_per_point: f64,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            peak_multiplier: default_peak_multiplier(),
            lunch_start_hour: default_lunch_start(),
            lunch_end_hour: default_lunch_end(),
            dinner_start_hour: default_dinner_start(),
            dinner_end_hour: default_dinner_end(),
            loyalty_euros_per_point: default_euros_per_point(),
        }
    }
}

fn default_peak_multiplier() -> f64 {
    1.5
}
fn default_lunch_start() -> u32 {
    12
}
fn default_lunch_end() -> u32 {
    14
}
fn default_dinner_start() -> u32 {
    18
}
fn default_dinner_end() -> u32 {
    21
}
fn default_euros_per_point() -> f64 {
    10.0
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `MORSEL__SERVER__PORT=8080` overrides server.port
            .add_source(config::Environment::with_prefix("MORSEL").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

impl From<&BusinessRules> for morsel_catalog::PricingConfig {
    fn from(rules: &BusinessRules) -> Self {
        Self {
            peak_multiplier: rules.peak_multiplier,
            lunch_start_hour: rules.lunch_start_hour,
            lunch_end_hour: rules.lunch_end_hour,
            dinner_start_hour: rules.dinner_start_hour,
            dinner_end_hour: rules.dinner_end_hour,
        }
    }
}
