//! Export validator - the gate in front of serialization.
//!
//! Violations are data, not exceptions: the validator returns an ordered
//! list, the operator sees it, and export is blocked while it is
//! non-empty. The renderer and calculator stay usable on an invalid
//! draft for live preview.

use serde::Serialize;
use thiserror::Error;

use crate::draft::ScenarioDraft;

/// A blocking validation violation. Display strings are part of the
/// builder's operator-facing contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    #[error("Scenario name is required")]
    NameRequired,

    #[error("Charger count must be greater than 0")]
    ChargerCountRequired,

    #[error("Duration must be greater than 0")]
    DurationRequired,

    #[error("CSMS endpoint is required")]
    EndpointRequired,
}

/// Runs the minimum-required-field gate over the full draft.
///
/// Checks run in a fixed order: name, charger count, duration, endpoint.
/// An empty result permits export. This is not a cross-section
/// consistency check; see [`advisories`] for the warnings surface.
pub fn validate(draft: &ScenarioDraft) -> Vec<Violation> {
    let mut violations = Vec::new();

    if draft.identity.name.trim().is_empty() {
        violations.push(Violation::NameRequired);
    }
    if draft.load.charger_count == 0 {
        violations.push(Violation::ChargerCountRequired);
    }
    if draft.identity.duration == 0 {
        violations.push(Violation::DurationRequired);
    }
    if draft.load.csms_endpoint.trim().is_empty() {
        violations.push(Violation::EndpointRequired);
    }

    violations
}

/// An advisory warning. Never blocks export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    #[error("Load profile duration ({profile}s) doesn't match total scenario duration ({scenario}s)")]
    LoadProfileDurationMismatch { profile: u32, scenario: u32 },
}

/// Collects advisory warnings over the draft.
///
/// The load-profile phase sum is compared against the total duration as
/// a mismatch warning only. Chaos strategy windows are deliberately not
/// checked against the total duration.
pub fn advisories(draft: &ScenarioDraft) -> Vec<Advisory> {
    let mut warnings = Vec::new();

    if draft.load.use_load_profile {
        let profile = draft.load.load_profile_duration();
        if profile != draft.identity.duration {
            warnings.push(Advisory::LoadProfileDurationMismatch {
                profile,
                scenario: draft.identity.duration,
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ChaosKind, ChaosSection};

    #[test]
    fn test_default_draft_has_one_violation() {
        // Only the name is missing from the built-in defaults
        let draft = ScenarioDraft::default();
        assert_eq!(validate(&draft), vec![Violation::NameRequired]);
    }

    #[test]
    fn test_empty_name_and_zero_duration() {
        let mut draft = ScenarioDraft::default();
        draft.identity.name = String::new();
        draft.identity.duration = 0;

        let violations = validate(&draft);
        assert_eq!(
            violations,
            vec![Violation::NameRequired, Violation::DurationRequired]
        );
        assert_eq!(
            violations[0].to_string(),
            "Scenario name is required"
        );
        assert_eq!(
            violations[1].to_string(),
            "Duration must be greater than 0"
        );
    }

    #[test]
    fn test_violation_order_is_fixed() {
        let mut draft = ScenarioDraft::default();
        draft.identity.name = String::new();
        draft.identity.duration = 0;
        draft.load.charger_count = 0;
        draft.load.csms_endpoint = "  ".to_string();

        assert_eq!(
            validate(&draft),
            vec![
                Violation::NameRequired,
                Violation::ChargerCountRequired,
                Violation::DurationRequired,
                Violation::EndpointRequired,
            ]
        );
    }

    #[test]
    fn test_validate_is_pure() {
        let mut draft = ScenarioDraft::default();
        draft.identity.name = "Valid".to_string();
        assert_eq!(validate(&draft), validate(&draft));
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_load_profile_mismatch_is_advisory_only() {
        let mut draft = ScenarioDraft::default();
        draft.identity.name = "Mismatch".to_string();
        draft.identity.duration = 1000; // phases sum to 570

        assert!(validate(&draft).is_empty());
        assert_eq!(
            advisories(&draft),
            vec![Advisory::LoadProfileDurationMismatch {
                profile: 570,
                scenario: 1000
            }]
        );

        draft.load.use_load_profile = false;
        assert!(advisories(&draft).is_empty());
    }

    #[test]
    fn test_advisories_stay_total_on_huge_phase_durations() {
        // A hand-edited draft file can carry arbitrary phase durations;
        // the mismatch check must not overflow
        let mut draft = ScenarioDraft::default();
        draft.identity.name = "Huge".to_string();
        draft.load.ramp_up_duration = u32::MAX;

        assert_eq!(
            advisories(&draft),
            vec![Advisory::LoadProfileDurationMismatch {
                profile: u32::MAX,
                scenario: 600
            }]
        );
    }

    #[test]
    fn test_chaos_windows_are_never_checked() {
        let mut draft = ScenarioDraft::default();
        draft.identity.name = "Chaos".to_string();
        draft.identity.duration = 60;
        draft.chaos = ChaosSection::default().with_strategy(ChaosKind::NetworkLoss);
        draft.chaos.enabled = true;
        // Strategy window (120..180) lies entirely past the 60s duration
        assert!(validate(&draft).is_empty());
        assert!(advisories(&draft)
            .iter()
            .all(|a| matches!(a, Advisory::LoadProfileDurationMismatch { .. })));
    }
}
