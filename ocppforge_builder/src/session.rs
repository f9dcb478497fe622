//! Builder session - the six-step wizard over a scenario draft.
//!
//! The wizard is a finite-state machine: a fixed ordered step list and
//! an integer cursor. `next`/`previous` clamp at the ends, `jump_to` is
//! unconditional - any step is directly selectable, including skipping
//! ahead, because no transition performs validation. The export
//! validator is the only gate, and it runs at export time only.

use ocppforge_core::{ChaosKind, ChaosStrategy, LoadBalancingStrategy, ScenarioDraft};
use tracing::debug;

/// Wizard step identifiers, in wizard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Scenario details
    Basic,

    /// Charger configuration
    Load,

    /// Load balancing & scheduling
    Power,

    /// Message flows
    Timeline,

    /// Failure scenarios
    Chaos,

    /// Review scenario
    Preview,
}

impl Step {
    /// Returns all steps, in wizard order.
    pub fn all() -> Vec<Step> {
        vec![
            Step::Basic,
            Step::Load,
            Step::Power,
            Step::Timeline,
            Step::Chaos,
            Step::Preview,
        ]
    }

    /// Returns the step's index, 0..=5.
    pub fn index(&self) -> usize {
        match self {
            Step::Basic => 0,
            Step::Load => 1,
            Step::Power => 2,
            Step::Timeline => 3,
            Step::Chaos => 4,
            Step::Preview => 5,
        }
    }

    /// Looks up a step by index.
    pub fn from_index(index: usize) -> Option<Step> {
        Step::all().get(index).copied()
    }

    /// Returns the step title shown in the wizard sidebar.
    pub fn title(&self) -> &'static str {
        match self {
            Step::Basic => "Basic Info",
            Step::Load => "Load Testing",
            Step::Power => "Power Management",
            Step::Timeline => "Timeline",
            Step::Chaos => "Chaos Testing",
            Step::Preview => "Preview & Export",
        }
    }

    /// Returns the step description.
    pub fn description(&self) -> &'static str {
        match self {
            Step::Basic => "Scenario details",
            Step::Load => "Charger configuration",
            Step::Power => "Load balancing & scheduling",
            Step::Timeline => "Message flows",
            Step::Chaos => "Failure scenarios",
            Step::Preview => "Review scenario",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// An open builder session: the current step plus the draft under
/// construction. The draft is owned exclusively by the session and is
/// discarded with it; nothing persists unless exported.
#[derive(Debug, Clone)]
pub struct BuilderSession {
    step: Step,
    draft: ScenarioDraft,
}

impl BuilderSession {
    /// Opens a session at the first step with a default-populated draft.
    pub fn new() -> Self {
        Self {
            step: Step::Basic,
            draft: ScenarioDraft::default(),
        }
    }

    /// Opens a session over an existing draft (e.g. loaded from disk).
    pub fn with_draft(draft: ScenarioDraft) -> Self {
        Self {
            step: Step::Basic,
            draft,
        }
    }

    /// The current step.
    pub fn step(&self) -> Step {
        self.step
    }

    /// The current draft snapshot.
    pub fn draft(&self) -> &ScenarioDraft {
        &self.draft
    }

    /// Wizard progress as a percentage, matching the header bar.
    pub fn progress_percent(&self) -> f64 {
        (self.step.index() + 1) as f64 / Step::all().len() as f64 * 100.0
    }

    /// Advances one step, clamped at the preview step.
    pub fn next(&mut self) {
        if let Some(step) = Step::from_index(self.step.index() + 1) {
            self.step = step;
        }
        debug!(step = %self.step, "builder step");
    }

    /// Goes back one step, clamped at the first step.
    pub fn previous(&mut self) {
        if let Some(step) = Step::from_index(self.step.index().wrapping_sub(1)) {
            self.step = step;
        }
        debug!(step = %self.step, "builder step");
    }

    /// Jumps directly to a step. Unconditional: no validation gates
    /// navigation, and reaching the preview step does not freeze the
    /// draft.
    pub fn jump_to(&mut self, step: Step) {
        self.step = step;
        debug!(step = %self.step, "builder step");
    }

    /// Jumps to a step by index. Out-of-range indices are a no-op.
    pub fn jump_to_index(&mut self, index: usize) {
        if let Some(step) = Step::from_index(index) {
            self.jump_to(step);
        }
    }

    /// Replaces the draft with a new value. All edits flow through here;
    /// there is no in-place field mutation.
    pub fn replace(&mut self, draft: ScenarioDraft) {
        self.draft = draft;
    }

    /// Replaces the draft with the result of `f` applied to a snapshot.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(ScenarioDraft) -> ScenarioDraft,
    {
        self.draft = f(self.draft.clone());
    }

    /// Applies a quick template and jumps to the step it configures.
    /// Only the fields the template names are overwritten.
    pub fn apply_quick_template(&mut self, template: QuickTemplate) {
        let (draft, step) = template.apply(&self.draft);
        debug!(template = template.name(), step = %step, "quick template applied");
        self.draft = draft;
        self.jump_to(step);
    }
}

impl Default for BuilderSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Quick templates offered in the wizard sidebar. Each overwrites only
/// the fields it names and leaves the rest of the draft alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickTemplate {
    /// Tests CSMS performance under heavy concurrent load
    HighLoad,

    /// Tests CSMS handling of rapid connection spikes
    ConnectionSpike,

    /// Tests CSMS SetChargingProfile responses when demand exceeds capacity
    OverCapacity,

    /// Validates CSMS OCPP 1.6J compliance and response timing
    ResponseValidation,

    /// Tests CSMS resilience under network failures
    ChaosResilience,
}

impl QuickTemplate {
    /// Returns all quick templates, in sidebar order.
    pub fn all() -> Vec<QuickTemplate> {
        vec![
            QuickTemplate::HighLoad,
            QuickTemplate::ConnectionSpike,
            QuickTemplate::OverCapacity,
            QuickTemplate::ResponseValidation,
            QuickTemplate::ChaosResilience,
        ]
    }

    /// Returns the template name.
    pub fn name(&self) -> &'static str {
        match self {
            QuickTemplate::HighLoad => "high-load",
            QuickTemplate::ConnectionSpike => "connection-spike",
            QuickTemplate::OverCapacity => "over-capacity",
            QuickTemplate::ResponseValidation => "response-validation",
            QuickTemplate::ChaosResilience => "chaos-resilience",
        }
    }

    /// Returns the scenario name the template writes into the draft.
    pub fn display_name(&self) -> &'static str {
        match self {
            QuickTemplate::HighLoad => "High Load CSMS Test",
            QuickTemplate::ConnectionSpike => "Connection Spike Test",
            QuickTemplate::OverCapacity => "CSMS Over-Capacity Test",
            QuickTemplate::ResponseValidation => "CSMS Response Validation",
            QuickTemplate::ChaosResilience => "Chaos Resilience Test",
        }
    }

    /// Applies the template to a draft, returning the new draft and the
    /// step the wizard jumps to.
    pub fn apply(&self, draft: &ScenarioDraft) -> (ScenarioDraft, Step) {
        let mut next = draft.clone();
        match self {
            QuickTemplate::HighLoad => {
                next.identity.name = self.display_name().to_string();
                next.identity.description =
                    "Tests CSMS performance under heavy concurrent load".to_string();
                next.identity.duration = 900;
                next.load.charger_count = 500;
                next.load.use_load_profile = true;
                next.chaos.enabled = true;
                (next, Step::Load)
            }
            QuickTemplate::ConnectionSpike => {
                next.identity.name = self.display_name().to_string();
                next.identity.description =
                    "Tests CSMS handling of rapid connection spikes".to_string();
                next.load.charger_count = 1000;
                next.load.ramp_up_rate = 50;
                next.load.ramp_up_duration = 20;
                next.chaos.enabled = true;
                (next, Step::Load)
            }
            QuickTemplate::OverCapacity => {
                next.identity.name = self.display_name().to_string();
                next.identity.description =
                    "Test CSMS SetChargingProfile responses when demand exceeds capacity"
                        .to_string();
                next.load.charger_count = 20;
                next.power.enabled = true;
                next.power.site_max_amperage = 400;
                next.power.charger_max_amperage = 32;
                next.power.load_balancing_strategy = LoadBalancingStrategy::Proportional;
                (next, Step::Power)
            }
            QuickTemplate::ResponseValidation => {
                next.identity.name = self.display_name().to_string();
                next.identity.description =
                    "Validate CSMS OCPP 1.6J compliance and response timing".to_string();
                next.load.charger_count = 15;
                next.power.enabled = true;
                next.power.site_max_amperage = 300;
                next.power.charger_max_amperage = 32;
                next.power.load_balancing_strategy = LoadBalancingStrategy::Priority;
                (next, Step::Power)
            }
            QuickTemplate::ChaosResilience => {
                next.identity.name = self.display_name().to_string();
                next.identity.description =
                    "Tests CSMS resilience under network failures".to_string();
                next.chaos.enabled = true;
                next.chaos.strategies = vec![ChaosStrategy::new(ChaosKind::NetworkLoss)];
                (next, Step::Chaos)
            }
        }
    }
}

impl std::fmt::Display for QuickTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for QuickTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high-load" | "high_load" => Ok(QuickTemplate::HighLoad),
            "connection-spike" | "connection_spike" => Ok(QuickTemplate::ConnectionSpike),
            "over-capacity" | "over_capacity" => Ok(QuickTemplate::OverCapacity),
            "response-validation" | "response_validation" => Ok(QuickTemplate::ResponseValidation),
            "chaos-resilience" | "chaos_resilience" => Ok(QuickTemplate::ChaosResilience),
            _ => Err(format!("Unknown quick template: {}", s)),
        }
    }
}

/// Pre-configured power test presets from the power management step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerPreset {
    /// Test CSMS when total demand exceeds site capacity
    OverCapacityLoadBalancing,

    /// Test CSMS priority handling with SetChargingProfile
    PriorityAllocation,

    /// Test CSMS reallocation when chargers disconnect
    DynamicRebalancing,
}

impl PowerPreset {
    /// Returns all presets, in catalog order.
    pub fn all() -> Vec<PowerPreset> {
        vec![
            PowerPreset::OverCapacityLoadBalancing,
            PowerPreset::PriorityAllocation,
            PowerPreset::DynamicRebalancing,
        ]
    }

    /// Returns the preset display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PowerPreset::OverCapacityLoadBalancing => "Over-Capacity Load Balancing",
            PowerPreset::PriorityAllocation => "Priority-Based Power Allocation",
            PowerPreset::DynamicRebalancing => "Dynamic Power Rebalancing",
        }
    }

    /// Returns (charger count, site capacity A, requested power A).
    pub fn figures(&self) -> (u32, u32, u32) {
        match self {
            PowerPreset::OverCapacityLoadBalancing => (20, 400, 32),
            PowerPreset::PriorityAllocation => (15, 300, 32),
            PowerPreset::DynamicRebalancing => (10, 200, 32),
        }
    }

    /// Applies the preset: enables power validation and overwrites the
    /// fleet size, capacities, name and description.
    pub fn apply(&self, draft: &ScenarioDraft) -> ScenarioDraft {
        let (chargers, site, requested) = self.figures();
        let mut next = draft.clone();
        next.power.enabled = true;
        next.load.charger_count = chargers;
        next.power.site_max_amperage = site;
        next.power.charger_max_amperage = requested;
        next.identity.name = self.display_name().to_string();
        next.identity.description = match self {
            PowerPreset::OverCapacityLoadBalancing => {
                "Test CSMS when total demand exceeds site capacity"
            }
            PowerPreset::PriorityAllocation => {
                "Test CSMS priority handling with SetChargingProfile"
            }
            PowerPreset::DynamicRebalancing => {
                "Test CSMS reallocation when chargers disconnect"
            }
        }
        .to_string();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocppforge_core::validate;

    #[test]
    fn test_session_opens_at_first_step_with_defaults() {
        let session = BuilderSession::new();
        assert_eq!(session.step(), Step::Basic);
        assert_eq!(session.draft(), &ScenarioDraft::default());
    }

    #[test]
    fn test_next_clamps_at_preview() {
        let mut session = BuilderSession::new();
        for _ in 0..10 {
            session.next();
        }
        assert_eq!(session.step(), Step::Preview);
        // Preview is not terminal: navigation stays free
        session.previous();
        assert_eq!(session.step(), Step::Chaos);
    }

    #[test]
    fn test_previous_clamps_at_basic() {
        let mut session = BuilderSession::new();
        session.previous();
        session.previous();
        assert_eq!(session.step(), Step::Basic);
    }

    #[test]
    fn test_jump_is_unconditional_even_on_invalid_draft() {
        let mut session = BuilderSession::new();
        // Draft has no name, so it would fail validation - navigation
        // must not care
        assert!(!validate(session.draft()).is_empty());
        session.jump_to(Step::Preview);
        assert_eq!(session.step(), Step::Preview);
        session.jump_to_index(2);
        assert_eq!(session.step(), Step::Power);
        session.jump_to_index(99); // no-op
        assert_eq!(session.step(), Step::Power);
    }

    #[test]
    fn test_update_replaces_whole_draft() {
        let mut session = BuilderSession::new();
        let before = session.draft().clone();
        session.update(|mut draft| {
            draft.identity.name = "Edited".to_string();
            draft
        });
        assert_eq!(session.draft().identity.name, "Edited");
        // Untouched sections carried over
        assert_eq!(session.draft().load, before.load);
    }

    #[test]
    fn test_quick_template_overwrites_only_named_fields() {
        let mut session = BuilderSession::new();
        session.update(|mut draft| {
            draft.identity.description = String::new();
            draft.load.charger_vendor = "AcmeEV".to_string();
            draft
        });

        session.apply_quick_template(QuickTemplate::OverCapacity);
        let draft = session.draft();
        assert_eq!(session.step(), Step::Power);
        assert_eq!(draft.identity.name, "CSMS Over-Capacity Test");
        assert_eq!(draft.load.charger_count, 20);
        assert!(draft.power.enabled);
        assert_eq!(draft.power.site_max_amperage, 400);
        // Field the template does not name survives
        assert_eq!(draft.load.charger_vendor, "AcmeEV");
    }

    #[test]
    fn test_chaos_resilience_seeds_a_network_loss_strategy() {
        let mut session = BuilderSession::new();
        session.apply_quick_template(QuickTemplate::ChaosResilience);
        let draft = session.draft();
        assert_eq!(session.step(), Step::Chaos);
        assert!(draft.chaos.enabled);
        assert_eq!(draft.chaos.strategies.len(), 1);
        assert_eq!(draft.chaos.strategies[0].kind(), ChaosKind::NetworkLoss);
        assert_eq!(draft.chaos.strategies[0].start_time, 120);
    }

    #[test]
    fn test_power_preset_figures() {
        let draft = PowerPreset::PriorityAllocation.apply(&ScenarioDraft::default());
        assert!(draft.power.enabled);
        assert_eq!(draft.load.charger_count, 15);
        assert_eq!(draft.power.site_max_amperage, 300);
        assert_eq!(draft.power.charger_max_amperage, 32);
    }
}
