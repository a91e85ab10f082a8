use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Peak-hour pricing configuration. Hours are local wall-clock hours,
/// half-open: a window `(12, 14)` covers 12:00:00 through 13:59:59.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub peak_multiplier: f64,
    pub lunch_start_hour: u32,
    pub lunch_end_hour: u32,
    pub dinner_start_hour: u32,
    pub dinner_end_hour: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            peak_multiplier: 1.5,
            lunch_start_hour: 12,
            lunch_end_hour: 14,
            dinner_start_hour: 18,
            dinner_end_hour: 21,
        }
    }
}

/// Time-of-day dynamic pricing engine
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Final price for a base sum at the current local time.
    pub fn price_now(&self, base_sum: f64) -> f64 {
        self.price_at(base_sum, Local::now().naive_local())
    }

    /// Final price for a base sum at a given local reference time.
    /// Pure: same inputs always yield the same output.
    pub fn price_at(&self, base_sum: f64, reference: NaiveDateTime) -> f64 {
        if self.is_peak_hour(reference) {
            base_sum * self.config.peak_multiplier
        } else {
            base_sum
        }
    }

    pub fn is_peak_hour(&self, reference: NaiveDateTime) -> bool {
        let hour = reference.hour();
        (hour >= self.config.lunch_start_hour && hour < self.config.lunch_end_hour)
            || (hour >= self.config.dinner_start_hour && hour < self.config.dinner_end_hour)
    }
}
