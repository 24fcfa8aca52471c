//! Price resolution for ticket tiers.
//!
//! Pricing is a pure function of the tier's configuration and the clock:
//! a tier sells at its early-bird price until the configured cutoff,
//! then at its base price. Both prices are integer cents.

use crate::error::CoreError;
use crate::types::{Cents, Timestamp};

/// Resolve the unit price for a tier at a point in time.
///
/// Returns the early-bird price when one is configured and `now` is at or
/// before the cutoff. A configured early-bird price without a cutoff (or
/// vice versa) is treated as not configured.
pub fn effective_price(
    base_price: Cents,
    early_bird_price: Option<Cents>,
    early_bird_end: Option<Timestamp>,
    now: Timestamp,
) -> Cents {
    match (early_bird_price, early_bird_end) {
        (Some(price), Some(end)) if now <= end => price,
        _ => base_price,
    }
}

/// Compute a line total (`unit_price × quantity`) with overflow checking.
pub fn line_total(unit_price: Cents, quantity: i32) -> Result<Cents, CoreError> {
    unit_price
        .checked_mul(quantity as i64)
        .ok_or_else(|| CoreError::Internal("line total overflow".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn base_price_when_no_early_bird_configured() {
        let now = Utc::now();
        assert_eq!(effective_price(5000, None, None, now), 5000);
    }

    #[test]
    fn early_bird_price_before_cutoff() {
        let now = Utc::now();
        let end = now + Duration::days(7);
        assert_eq!(effective_price(5000, Some(3500), Some(end), now), 3500);
    }

    #[test]
    fn early_bird_price_exactly_at_cutoff() {
        let now = Utc::now();
        assert_eq!(effective_price(5000, Some(3500), Some(now), now), 3500);
    }

    #[test]
    fn base_price_after_cutoff() {
        let now = Utc::now();
        let end = now - Duration::seconds(1);
        assert_eq!(effective_price(5000, Some(3500), Some(end), now), 5000);
    }

    #[test]
    fn incomplete_early_bird_config_falls_back_to_base() {
        let now = Utc::now();
        assert_eq!(effective_price(5000, Some(3500), None, now), 5000);
        assert_eq!(effective_price(5000, None, Some(now), now), 5000);
    }

    #[test]
    fn line_total_multiplies() {
        assert_eq!(line_total(2500, 4).unwrap(), 10_000);
    }

    #[test]
    fn line_total_overflow_is_an_error() {
        assert!(line_total(i64::MAX, 2).is_err());
    }
}
