//! Derived power metrics - what the CSMS under test is expected to do.
//!
//! Pure functions over the power configuration. They are recomputed on
//! every read (preview render, serialization) and hold no cached state,
//! so the displayed expectation and the exported expectation can never
//! drift apart.

use serde::{Deserialize, Serialize};

/// Predicted CSMS behavior for a given fleet and site capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerExpectation {
    /// Aggregate amperage the fleet will request
    pub total_demand: u64,

    /// Demand exceeds the site capacity
    pub is_over_capacity: bool,

    /// Amperage the CSMS should allocate to each charger
    pub expected_per_charger: u32,

    /// CSMS should reduce chargers via SetChargingProfile
    pub should_send_set_charging_profile: bool,

    /// CSMS should reject new StartTransaction requests
    pub should_reject_new_sessions: bool,
}

/// Computes the expected CSMS power allocation.
///
/// Deterministic and total: no side effects, no error conditions. With
/// zero chargers the per-charger division is never evaluated and the
/// site is trivially within capacity.
pub fn power_expectation(
    charger_count: u32,
    charger_max_amperage: u32,
    site_max_amperage: u32,
) -> PowerExpectation {
    if charger_count == 0 {
        return PowerExpectation {
            total_demand: 0,
            is_over_capacity: false,
            expected_per_charger: 0,
            should_send_set_charging_profile: false,
            should_reject_new_sessions: site_max_amperage == 0,
        };
    }

    let total_demand = charger_count as u64 * charger_max_amperage as u64;
    let is_over_capacity = total_demand > site_max_amperage as u64;
    let expected_per_charger = charger_max_amperage.min(site_max_amperage / charger_count);
    let allocated = charger_count as u64 * expected_per_charger as u64;

    PowerExpectation {
        total_demand,
        is_over_capacity,
        expected_per_charger,
        should_send_set_charging_profile: is_over_capacity,
        should_reject_new_sessions: allocated >= site_max_amperage as u64,
    }
}

/// Percentage by which total demand must be reduced to fit the site
/// capacity. Zero when demand already fits.
pub fn expected_reduction_percent(
    charger_count: u32,
    charger_max_amperage: u32,
    site_max_amperage: u32,
) -> f64 {
    let total_demand = charger_count as u64 * charger_max_amperage as u64;
    if total_demand <= site_max_amperage as u64 || total_demand == 0 {
        return 0.0;
    }
    (total_demand - site_max_amperage as u64) as f64 / total_demand as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_over_capacity_scenario() {
        // 20 chargers x 32A against a 400A site
        let expectation = power_expectation(20, 32, 400);
        assert_eq!(expectation.total_demand, 640);
        assert!(expectation.is_over_capacity);
        assert_eq!(expectation.expected_per_charger, 20);
        assert!(expectation.should_send_set_charging_profile);
        assert!(expectation.should_reject_new_sessions);
    }

    #[test]
    fn test_within_capacity_scenario() {
        // 10 chargers x 32A against a 400A site
        let expectation = power_expectation(10, 32, 400);
        assert_eq!(expectation.total_demand, 320);
        assert!(!expectation.is_over_capacity);
        assert_eq!(expectation.expected_per_charger, 32);
        assert!(!expectation.should_send_set_charging_profile);
        assert!(!expectation.should_reject_new_sessions);
    }

    #[test]
    fn test_zero_chargers_never_divides() {
        let expectation = power_expectation(0, 32, 400);
        assert_eq!(expectation.total_demand, 0);
        assert!(!expectation.is_over_capacity);
        assert_eq!(expectation.expected_per_charger, 0);
        assert!(!expectation.should_send_set_charging_profile);
    }

    #[test]
    fn test_reduction_percent() {
        // 640A demand vs 400A site: 37.5% must be shed
        let reduction = expected_reduction_percent(20, 32, 400);
        assert!((reduction - 37.5).abs() < 1e-9);
        assert_eq!(expected_reduction_percent(10, 32, 400), 0.0);
        assert_eq!(expected_reduction_percent(0, 32, 400), 0.0);
    }

    proptest! {
        #[test]
        fn prop_expected_never_exceeds_request(
            count in 1u32..2000,
            per_charger in 0u32..200,
            site in 0u32..10_000,
        ) {
            let expectation = power_expectation(count, per_charger, site);
            prop_assert!(expectation.expected_per_charger <= per_charger);
            prop_assert_eq!(
                expectation.expected_per_charger,
                per_charger.min(site / count)
            );
            // The capped allocation never exceeds the site limit
            prop_assert!(
                count as u64 * expectation.expected_per_charger as u64 <= site as u64
            );
        }

        #[test]
        fn prop_deterministic(count in 0u32..2000, per in 0u32..200, site in 0u32..10_000) {
            prop_assert_eq!(
                power_expectation(count, per, site),
                power_expectation(count, per, site)
            );
        }
    }
}
