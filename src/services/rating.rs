// src/services/rating.rs
use rust_decimal::Decimal;

/// Flat per-second rate applied to every call.
///
/// Pure arithmetic only; the rate comes from configuration so call logic
/// never hard-codes a price.
#[derive(Debug, Clone, Copy)]
pub struct RatePlan {
    rate_per_second: Decimal,
}

impl RatePlan {
    pub fn new(rate_per_second: Decimal) -> Self {
        Self { rate_per_second }
    }

    pub fn rate_per_second(&self) -> Decimal {
        self.rate_per_second
    }

    /// Cost of `seconds` of talk time. Non-positive durations cost nothing.
    pub fn cost(&self, seconds: i64) -> Decimal {
        if seconds <= 0 {
            return Decimal::ZERO;
        }
        Decimal::from(seconds) * self.rate_per_second
    }
}
