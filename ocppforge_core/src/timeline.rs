//! Timeline events and templates.
//!
//! The timeline is stored in insertion order; consumers that display or
//! serialize it sort by time offset first, stable on ties.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{ActionKind, ActionParams};
use crate::draft::TargetSelector;

/// A single scheduled action in the scenario timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Unique id within the timeline
    pub id: Uuid,

    /// Time offset in seconds from scenario start
    pub at: u32,

    /// Human description, rendered as a comment in the artifact
    pub description: String,

    /// Chargers the action applies to
    pub targets: TargetSelector,

    /// Kind-specific payload (the variant is the action kind)
    #[serde(flatten)]
    pub params: ActionParams,
}

impl TimelineEvent {
    /// Creates an event with a fresh id.
    pub fn new(at: u32, targets: TargetSelector, description: &str, params: ActionParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            at,
            description: description.to_string(),
            targets,
            params,
        }
    }

    /// The builder's blank custom event: a `start_flow` at t=0 on all
    /// chargers with its flow still unselected.
    pub fn blank() -> Self {
        Self::new(
            0,
            TargetSelector::All,
            "",
            ActionKind::StartFlow.default_params(),
        )
    }

    /// Returns the action kind.
    pub fn action(&self) -> ActionKind {
        self.params.kind()
    }
}

/// Timeline template identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineTemplate {
    /// Standard charger boot notification flow
    BootSequence,

    /// Complete charging transaction flow
    ChargingCycle,

    /// High-frequency heartbeat testing
    HeartbeatFlood,
}

impl TimelineTemplate {
    /// Returns all templates, in catalog order.
    pub fn all() -> Vec<TimelineTemplate> {
        vec![
            TimelineTemplate::BootSequence,
            TimelineTemplate::ChargingCycle,
            TimelineTemplate::HeartbeatFlood,
        ]
    }

    /// Returns the template name.
    pub fn name(&self) -> &'static str {
        match self {
            TimelineTemplate::BootSequence => "boot-sequence",
            TimelineTemplate::ChargingCycle => "charging-cycle",
            TimelineTemplate::HeartbeatFlood => "heartbeat-flood",
        }
    }

    /// Returns the catalog display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            TimelineTemplate::BootSequence => "Boot Sequence",
            TimelineTemplate::ChargingCycle => "Charging Cycle",
            TimelineTemplate::HeartbeatFlood => "Heartbeat Flood",
        }
    }

    /// Returns a description of the template.
    pub fn description(&self) -> &'static str {
        match self {
            TimelineTemplate::BootSequence => "Standard charger boot notification flow",
            TimelineTemplate::ChargingCycle => "Complete charging transaction flow",
            TimelineTemplate::HeartbeatFlood => "High-frequency heartbeat testing",
        }
    }

    /// Instantiates the template's events with fresh ids. Template
    /// definitions carry no ids; every application yields new ones.
    pub fn instantiate(&self) -> Vec<TimelineEvent> {
        match self {
            TimelineTemplate::BootSequence => vec![
                TimelineEvent::new(
                    0,
                    TargetSelector::All,
                    "Create virtual chargers",
                    ActionParams::CreateChargers {
                        prefix: "LOAD".to_string(),
                    },
                ),
                TimelineEvent::new(
                    5,
                    TargetSelector::All,
                    "Boot notification sequence",
                    ActionParams::StartFlow {
                        flow: "boot_notification".to_string(),
                        interval: None,
                    },
                ),
            ],
            TimelineTemplate::ChargingCycle => vec![TimelineEvent::new(
                30,
                TargetSelector::All,
                "Start charging transactions",
                ActionParams::StartFlow {
                    flow: "charging_session".to_string(),
                    interval: None,
                },
            )],
            TimelineTemplate::HeartbeatFlood => vec![TimelineEvent::new(
                60,
                TargetSelector::All,
                "Rapid heartbeat messages",
                ActionParams::StartFlow {
                    flow: "rapid_heartbeat".to_string(),
                    interval: Some(1),
                },
            )],
        }
    }
}

impl std::fmt::Display for TimelineTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for TimelineTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boot-sequence" | "boot_sequence" => Ok(TimelineTemplate::BootSequence),
            "charging-cycle" | "charging_cycle" => Ok(TimelineTemplate::ChargingCycle),
            "heartbeat-flood" | "heartbeat_flood" => Ok(TimelineTemplate::HeartbeatFlood),
            _ => Err(format!("Unknown timeline template: {}", s)),
        }
    }
}

/// The draft's timeline section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSection {
    /// Events in insertion order
    pub events: Vec<TimelineEvent>,
}

impl TimelineSection {
    /// Returns a new section with the event appended.
    pub fn with_event(&self, event: TimelineEvent) -> TimelineSection {
        let mut next = self.clone();
        next.events.push(event);
        next
    }

    /// Returns a new section without the event carrying `id`.
    pub fn without_event(&self, id: Uuid) -> TimelineSection {
        let mut next = self.clone();
        next.events.retain(|e| e.id != id);
        next
    }

    /// Applies a template additively: fresh-id instances of the template
    /// events are appended, existing events are preserved.
    pub fn with_template(&self, template: TimelineTemplate) -> TimelineSection {
        let mut next = self.clone();
        next.events.extend(template.instantiate());
        next
    }

    /// Events sorted by time offset ascending, insertion order preserved
    /// on equal offsets.
    pub fn sorted(&self) -> Vec<&TimelineEvent> {
        let mut events: Vec<&TimelineEvent> = self.events.iter().collect();
        events.sort_by_key(|e| e.at);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_application_is_additive() {
        let section = TimelineSection::default().with_event(TimelineEvent::new(
            90,
            TargetSelector::FirstHalf,
            "custom",
            ActionParams::StopFlow {
                extra: Default::default(),
            },
        ));

        let next = section.with_template(TimelineTemplate::BootSequence);
        assert_eq!(next.events.len(), section.events.len() + 2);
        // Pre-existing event survives, in place
        assert_eq!(next.events[0], section.events[0]);
    }

    #[test]
    fn test_template_instances_get_fresh_ids() {
        let first = TimelineTemplate::BootSequence.instantiate();
        let second = TimelineTemplate::BootSequence.instantiate();
        assert_ne!(first[0].id, second[0].id);
        assert_ne!(first[0].id, first[1].id);
    }

    #[test]
    fn test_sorted_is_stable_on_ties() {
        let a = TimelineEvent::new(10, TargetSelector::All, "a", ActionKind::StartFlow.default_params());
        let b = TimelineEvent::new(5, TargetSelector::All, "b", ActionKind::StartFlow.default_params());
        let c = TimelineEvent::new(10, TargetSelector::All, "c", ActionKind::StartFlow.default_params());

        let section = TimelineSection::default()
            .with_event(a.clone())
            .with_event(b.clone())
            .with_event(c.clone());

        let sorted = section.sorted();
        assert_eq!(sorted[0].id, b.id);
        assert_eq!(sorted[1].id, a.id); // inserted before c, same offset
        assert_eq!(sorted[2].id, c.id);
        // Storage order untouched
        assert_eq!(section.events[0].id, a.id);
    }

    #[test]
    fn test_blank_event_is_an_unselected_start_flow() {
        let event = TimelineEvent::blank();
        assert_eq!(event.at, 0);
        assert_eq!(event.targets, TargetSelector::All);
        assert_eq!(
            event.params,
            ActionParams::StartFlow {
                flow: String::new(),
                interval: None
            }
        );
    }

    #[test]
    fn test_boot_sequence_offsets() {
        let events = TimelineTemplate::BootSequence.instantiate();
        assert_eq!(events[0].at, 0);
        assert_eq!(events[0].action(), ActionKind::CreateChargers);
        assert_eq!(events[1].at, 5);
        assert_eq!(events[1].action(), ActionKind::StartFlow);
    }
}
