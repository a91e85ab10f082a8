/// Derives loyalty points from a finalized order price.
#[derive(Debug, Clone)]
pub struct LoyaltyCalculator {
    /// Euros spent per point earned.
    euros_per_point: f64,
}

impl Default for LoyaltyCalculator {
    fn default() -> Self {
        Self {
            euros_per_point: 10.0,
        }
    }
}

impl LoyaltyCalculator {
    pub fn new(euros_per_point: f64) -> Self {
        Self { euros_per_point }
    }

    /// Points for a final order price: floor(price / rate), never below
    /// zero. Pure function, no side effects.
    pub fn points_for(&self, final_price: f64) -> i64 {
        if final_price <= 0.0 {
            return 0;
        }
        (final_price / self.euros_per_point).floor() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_point_per_ten_euros() {
        let calc = LoyaltyCalculator::default();
        assert_eq!(calc.points_for(100.0), 10);
        assert_eq!(calc.points_for(10.0), 1);
        assert_eq!(calc.points_for(9.99), 0);
        assert_eq!(calc.points_for(25.0), 2);
    }

    #[test]
    fn test_never_negative() {
        let calc = LoyaltyCalculator::default();
        assert_eq!(calc.points_for(0.0), 0);
        assert_eq!(calc.points_for(-50.0), 0);
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let calc = LoyaltyCalculator::default();
        let mut last = 0;
        for cents in (0..20_000).step_by(7) {
            let price = cents as f64 / 100.0;
            let points = calc.points_for(price);
            assert!(points >= last, "points dropped at price {price}");
            last = points;
        }
    }

    #[test]
    fn test_custom_rate() {
        let calc = LoyaltyCalculator::new(5.0);
        assert_eq!(calc.points_for(27.0), 5);
    }
}
