//! Export gate - validate, then render.
//!
//! The serializer itself is total and runs freely for live preview;
//! this module is the one place that refuses to hand out an artifact
//! while the draft still has blocking violations.

use ocppforge_core::{render, validate, ScenarioDraft, Violation};
use thiserror::Error;

/// A rendered scenario ready to be written or copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name, slugged from the scenario name
    pub file_name: String,

    /// The YAML scenario document
    pub yaml: String,
}

/// Export refused: the draft has blocking validation violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scenario failed validation with {} issue(s)", .violations.len())]
pub struct ExportBlocked {
    pub violations: Vec<Violation>,
}

/// Validates the draft and renders the artifact if the gate is clean.
pub fn export(draft: &ScenarioDraft) -> Result<ExportArtifact, ExportBlocked> {
    let violations = validate(draft);
    if !violations.is_empty() {
        return Err(ExportBlocked { violations });
    }
    Ok(ExportArtifact {
        file_name: format!("{}.yaml", file_slug(&draft.identity.name)),
        yaml: render(draft),
    })
}

/// Slugs a scenario name for use as a file name: lowercase, runs of
/// non-alphanumeric characters collapse to a single dash.
pub fn file_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut dash_pending = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if dash_pending && !slug.is_empty() {
                slug.push('-');
            }
            dash_pending = false;
            slug.push(c);
        } else {
            dash_pending = true;
        }
    }
    if slug.is_empty() {
        "scenario".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_blocked_lists_violations_in_order() {
        let mut draft = ScenarioDraft::default();
        draft.identity.duration = 0;

        let blocked = export(&draft).unwrap_err();
        assert_eq!(
            blocked.violations,
            vec![Violation::NameRequired, Violation::DurationRequired]
        );
        assert_eq!(
            blocked.to_string(),
            "scenario failed validation with 2 issue(s)"
        );
    }

    #[test]
    fn test_export_clean_draft() {
        let mut draft = ScenarioDraft::default();
        draft.identity.name = "High Load CSMS Test".to_string();

        let artifact = export(&draft).unwrap();
        assert_eq!(artifact.file_name, "high-load-csms-test.yaml");
        assert_eq!(artifact.yaml, render(&draft));
    }

    #[test]
    fn test_file_slug() {
        assert_eq!(file_slug("CSMS Over-Capacity Test"), "csms-over-capacity-test");
        assert_eq!(file_slug("  !!  "), "scenario");
        assert_eq!(file_slug("Chaos (v2)"), "chaos-v2");
    }
}
