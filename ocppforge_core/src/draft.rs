//! The scenario draft - the scenario-under-construction.
//!
//! A [`ScenarioDraft`] is a single immutable value. Edits never mutate a
//! draft in place; every step of the builder produces a *new* draft that
//! replaces the old one wholesale. That makes aliased or concurrent edits
//! impossible and keeps derived values (metrics, rendered artifact) in
//! lockstep with the latest committed state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::catalog::ChaosSection;
use crate::timeline::TimelineSection;
use uuid::Uuid;

/// Load balancing strategy the CSMS under test is expected to implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancingStrategy {
    /// Equal reduction across all chargers
    Proportional,

    /// Reduce low priority chargers first
    Priority,

    /// Cycle through chargers
    RoundRobin,

    /// First connected gets priority
    FirstComeFirstServed,
}

impl LoadBalancingStrategy {
    /// Returns all strategies, in the order the builder offers them.
    pub fn all() -> Vec<LoadBalancingStrategy> {
        vec![
            LoadBalancingStrategy::Proportional,
            LoadBalancingStrategy::Priority,
            LoadBalancingStrategy::RoundRobin,
            LoadBalancingStrategy::FirstComeFirstServed,
        ]
    }

    /// Returns the wire name used in the scenario artifact.
    pub fn name(&self) -> &'static str {
        match self {
            LoadBalancingStrategy::Proportional => "proportional",
            LoadBalancingStrategy::Priority => "priority",
            LoadBalancingStrategy::RoundRobin => "round_robin",
            LoadBalancingStrategy::FirstComeFirstServed => "first_come_first_served",
        }
    }
}

impl std::fmt::Display for LoadBalancingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for LoadBalancingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "proportional" => Ok(LoadBalancingStrategy::Proportional),
            "priority" => Ok(LoadBalancingStrategy::Priority),
            "round_robin" | "roundrobin" => Ok(LoadBalancingStrategy::RoundRobin),
            "first_come_first_served" | "fcfs" => Ok(LoadBalancingStrategy::FirstComeFirstServed),
            _ => Err(format!("Unknown load balancing strategy: {}", s)),
        }
    }
}

/// Which chargers a timeline event or chaos strategy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelector {
    All,
    #[serde(rename = "random_10_percent")]
    Random10Percent,
    #[serde(rename = "random_20_percent")]
    Random20Percent,
    #[serde(rename = "random_25_percent")]
    Random25Percent,
    #[serde(rename = "random_50_percent")]
    Random50Percent,
    FirstHalf,
    SecondHalf,
    FirstQuarter,
    LastQuarter,
}

impl TargetSelector {
    /// Returns the wire name used in the scenario artifact.
    pub fn name(&self) -> &'static str {
        match self {
            TargetSelector::All => "all",
            TargetSelector::Random10Percent => "random_10_percent",
            TargetSelector::Random20Percent => "random_20_percent",
            TargetSelector::Random25Percent => "random_25_percent",
            TargetSelector::Random50Percent => "random_50_percent",
            TargetSelector::FirstHalf => "first_half",
            TargetSelector::SecondHalf => "second_half",
            TargetSelector::FirstQuarter => "first_quarter",
            TargetSelector::LastQuarter => "last_quarter",
        }
    }
}

impl std::fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Weekday tag for charging priority time windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

/// Scenario identity: name, versioning, tags, total duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    /// Scenario name (required non-empty at export)
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Scenario version string
    pub version: String,

    /// Ordered set of unique tags
    pub tags: Vec<String>,

    /// Total scenario duration in seconds
    pub duration: u32,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            version: "1.0".to_string(),
            tags: vec!["load-test".to_string(), "csms".to_string()],
            duration: 600,
        }
    }
}

impl Identity {
    /// Adds a tag, preserving insertion order. Empty or duplicate tags
    /// are ignored.
    pub fn with_tag(&self, tag: &str) -> Identity {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return self.clone();
        }
        let mut next = self.clone();
        next.tags.push(tag.to_string());
        next
    }

    /// Removes a tag by value.
    pub fn without_tag(&self, tag: &str) -> Identity {
        let mut next = self.clone();
        next.tags.retain(|t| t != tag);
        next
    }
}

/// Virtual charger fleet and connection schedule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSection {
    /// Number of virtual chargers to connect
    pub charger_count: u32,

    /// Connectors per charger (1 or 2)
    pub connectors: u8,

    /// Charge point model reported in BootNotification
    pub charger_model: String,

    /// Charge point vendor reported in BootNotification
    pub charger_vendor: String,

    /// OCPP protocol version tag ("1.6" or "2.0")
    pub ocpp_version: String,

    /// CSMS websocket endpoint (required non-empty at export)
    pub csms_endpoint: String,

    /// Use the three-phase gradual load profile
    pub use_load_profile: bool,

    /// Ramp-up connections per second
    pub ramp_up_rate: u32,

    /// Ramp-up phase duration in seconds
    pub ramp_up_duration: u32,

    /// Steady-state phase duration in seconds
    pub steady_state_duration: u32,

    /// Ramp-down disconnections per second
    pub ramp_down_rate: u32,

    /// Ramp-down phase duration in seconds
    pub ramp_down_duration: u32,
}

impl Default for LoadSection {
    fn default() -> Self {
        Self {
            charger_count: 100,
            connectors: 2,
            charger_model: "FastCharger".to_string(),
            charger_vendor: "TestCorp".to_string(),
            ocpp_version: "1.6".to_string(),
            csms_endpoint: "ws://localhost:8080/ocpp".to_string(),
            use_load_profile: true,
            ramp_up_rate: 10,
            ramp_up_duration: 60,
            steady_state_duration: 480,
            ramp_down_rate: 20,
            ramp_down_duration: 30,
        }
    }
}

impl LoadSection {
    /// Total connector count across the fleet. Saturates rather than
    /// overflowing on absurd fleet sizes from a hand-edited draft file.
    pub fn total_connectors(&self) -> u32 {
        self.charger_count.saturating_mul(self.connectors as u32)
    }

    /// Sum of the three load profile phase durations in seconds.
    /// Saturates rather than overflowing, so advisory checks stay total
    /// on drafts loaded from external JSON.
    pub fn load_profile_duration(&self) -> u32 {
        self.ramp_up_duration
            .saturating_add(self.steady_state_duration)
            .saturating_add(self.ramp_down_duration)
    }
}

/// A priority tier for power allocation, with optional time windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingPriority {
    /// Unique id within the priority list
    pub id: Uuid,

    /// Human-readable tier name
    pub name: String,

    /// Priority rank; lower ranks are shed first. Ranks need not be unique.
    pub priority: i32,

    /// Amperage ceiling for chargers in this tier
    pub max_amperage: u32,

    /// Time windows during which this tier applies (empty = always)
    pub time_windows: Vec<TimeWindow>,

    /// Tier participates in allocation
    pub enabled: bool,
}

impl ChargingPriority {
    /// Creates a new enabled tier with a fresh id and no time windows.
    pub fn new(name: &str, priority: i32, max_amperage: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            priority,
            max_amperage,
            time_windows: Vec::new(),
            enabled: true,
        }
    }
}

/// A time-of-day window with weekday tags and an optional amperage override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start, "HH:MM"
    pub start: String,

    /// Window end, "HH:MM"
    pub end: String,

    /// Weekdays the window applies to
    pub days: Vec<Weekday>,

    /// Overrides the tier's max amperage inside this window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amperage: Option<u32>,
}

/// Power constraints the CSMS under test must respect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSection {
    /// Enable CSMS load balancing validation
    pub enabled: bool,

    /// Aggregate site capacity in amps
    pub site_max_amperage: u32,

    /// Amperage each charger requests from the CSMS
    pub charger_max_amperage: u32,

    /// Enable smart scheduling around peak hours
    pub smart_scheduling: bool,

    /// Peak hours start, "HH:MM"
    pub peak_hours_start: String,

    /// Peak hours end, "HH:MM"
    pub peak_hours_end: String,

    /// Load balancing algorithm the CSMS is expected to run
    pub load_balancing_strategy: LoadBalancingStrategy,

    /// Enable session queue management when over capacity
    pub queue_management: bool,

    /// Ordered priority tiers for allocation
    pub priorities: Vec<ChargingPriority>,
}

impl Default for PowerSection {
    fn default() -> Self {
        Self {
            enabled: false,
            site_max_amperage: 400,
            charger_max_amperage: 32,
            smart_scheduling: false,
            peak_hours_start: "17:00".to_string(),
            peak_hours_end: "21:00".to_string(),
            load_balancing_strategy: LoadBalancingStrategy::Proportional,
            queue_management: false,
            priorities: Vec::new(),
        }
    }
}

/// The scenario under construction.
///
/// Created with built-in defaults when the builder opens, replaced on
/// every edit, discarded when the builder closes. Nothing persists across
/// sessions unless explicitly exported.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioDraft {
    pub identity: Identity,
    pub load: LoadSection,
    pub power: PowerSection,
    pub timeline: TimelineSection,
    pub chaos: ChaosSection,
}

impl ScenarioDraft {
    /// Normalizes a draft loaded from an external JSON file.
    ///
    /// In-app edits keep tags unique ([`Identity::with_tag`]) and ids
    /// fresh (`Uuid::new_v4` at construction), but a hand-edited draft
    /// file can carry duplicates. Repeated tags are dropped keeping the
    /// first occurrence; repeated event and strategy ids get a fresh id.
    /// Returns the normalized draft and whether anything was repaired.
    pub fn normalized(&self) -> (ScenarioDraft, bool) {
        let mut next = self.clone();
        let mut changed = false;

        let mut seen: Vec<String> = Vec::new();
        next.identity.tags.retain(|tag| {
            if seen.iter().any(|s| s == tag) {
                changed = true;
                false
            } else {
                seen.push(tag.clone());
                true
            }
        });

        let mut ids = HashSet::new();
        for event in &mut next.timeline.events {
            if !ids.insert(event.id) {
                event.id = Uuid::new_v4();
                changed = true;
            }
        }

        let mut ids = HashSet::new();
        for strategy in &mut next.chaos.strategies {
            if !ids.insert(strategy.id) {
                strategy.id = Uuid::new_v4();
                changed = true;
            }
        }

        (next, changed)
    }
}

/// Coerces free-form numeric input to a non-negative integer.
///
/// Non-numeric text becomes 0, matching the builder's input fields.
/// Never errors.
pub fn coerce_numeric(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_draft_constants() {
        let draft = ScenarioDraft::default();
        assert_eq!(draft.identity.duration, 600);
        assert_eq!(draft.identity.tags, vec!["load-test", "csms"]);
        assert_eq!(draft.load.charger_count, 100);
        assert_eq!(draft.load.connectors, 2);
        assert_eq!(draft.load.csms_endpoint, "ws://localhost:8080/ocpp");
        assert!(!draft.power.enabled);
        assert_eq!(draft.power.site_max_amperage, 400);
        assert_eq!(draft.power.charger_max_amperage, 32);
        assert!(draft.timeline.events.is_empty());
        assert!(!draft.chaos.enabled);
    }

    #[test]
    fn test_tags_stay_unique_and_ordered() {
        let identity = Identity::default()
            .with_tag("chaos")
            .with_tag("csms") // duplicate
            .with_tag("  ") // blank
            .with_tag("performance");
        assert_eq!(identity.tags, vec!["load-test", "csms", "chaos", "performance"]);

        let identity = identity.without_tag("csms");
        assert_eq!(identity.tags, vec!["load-test", "chaos", "performance"]);
    }

    #[test]
    fn test_load_profile_duration_sum() {
        let load = LoadSection::default();
        assert_eq!(load.load_profile_duration(), 60 + 480 + 30);
        assert_eq!(load.total_connectors(), 200);
    }

    #[test]
    fn test_phase_sums_saturate_on_huge_inputs() {
        let mut load = LoadSection::default();
        load.ramp_up_duration = u32::MAX;
        assert_eq!(load.load_profile_duration(), u32::MAX);

        load.charger_count = u32::MAX;
        assert_eq!(load.total_connectors(), u32::MAX);
    }

    #[test]
    fn test_normalized_repairs_duplicates_from_external_json() {
        use crate::catalog::{ChaosKind, ChaosStrategy};
        use crate::timeline::TimelineEvent;

        let mut draft = ScenarioDraft::default();
        draft.identity.tags = vec![
            "load-test".to_string(),
            "csms".to_string(),
            "load-test".to_string(),
        ];
        let event = TimelineEvent::blank();
        let first_event_id = event.id;
        draft.timeline = draft.timeline.with_event(event.clone()).with_event(event);
        let strategy = ChaosStrategy::new(ChaosKind::NetworkLoss);
        let first_strategy_id = strategy.id;
        draft.chaos.strategies = vec![strategy.clone(), strategy];

        let (repaired, changed) = draft.normalized();
        assert!(changed);
        assert_eq!(repaired.identity.tags, vec!["load-test", "csms"]);
        // First occurrences keep their ids, duplicates get fresh ones
        assert_eq!(repaired.timeline.events[0].id, first_event_id);
        assert_ne!(repaired.timeline.events[1].id, first_event_id);
        assert_eq!(repaired.chaos.strategies[0].id, first_strategy_id);
        assert_ne!(repaired.chaos.strategies[1].id, first_strategy_id);

        // A clean draft passes through untouched
        let (same, changed) = repaired.normalized();
        assert!(!changed);
        assert_eq!(same, repaired);
    }

    #[test]
    fn test_coerce_numeric_never_errors() {
        assert_eq!(coerce_numeric("42"), 42);
        assert_eq!(coerce_numeric(" 7 "), 7);
        assert_eq!(coerce_numeric("abc"), 0);
        assert_eq!(coerce_numeric(""), 0);
        assert_eq!(coerce_numeric("-3"), 0);
    }

    #[test]
    fn test_partial_draft_json_fills_defaults() {
        let draft: ScenarioDraft =
            serde_json::from_str(r#"{"identity": {"name": "Smoke", "duration": 120}}"#).unwrap();
        assert_eq!(draft.identity.name, "Smoke");
        assert_eq!(draft.identity.duration, 120);
        // Untouched sections carry the builder defaults
        assert_eq!(draft.load.charger_count, 100);
        assert_eq!(draft.power.load_balancing_strategy, LoadBalancingStrategy::Proportional);
    }

    #[test]
    fn test_strategy_round_trip_names() {
        for strategy in LoadBalancingStrategy::all() {
            let parsed: LoadBalancingStrategy = strategy.name().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
        assert!("quantum".parse::<LoadBalancingStrategy>().is_err());
    }
}
