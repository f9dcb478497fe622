//! Chaos strategy and timeline action catalogs.
//!
//! Two static registries: one per chaos-strategy kind, one per
//! timeline-action kind. Each kind carries a display name, a description,
//! the parameter keys it accepts, and a factory producing a fully-typed
//! default parameter payload. A new kind therefore cannot yield a
//! partially-initialized instance.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::draft::TargetSelector;

/// A scalar or list value inside an open-ended parameter map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
}

/// Chaos strategy identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChaosKind {
    /// Simulate connection drops and reconnections
    NetworkLoss,

    /// Send malformed OCPP messages
    MessageCorruption,

    /// Rapid connection/disconnection cycles
    ConnectionFlooding,

    /// Simulate slow CSMS responses
    ResponseDelay,
}

impl ChaosKind {
    /// Returns all chaos kinds, in catalog order.
    pub fn all() -> Vec<ChaosKind> {
        vec![
            ChaosKind::NetworkLoss,
            ChaosKind::MessageCorruption,
            ChaosKind::ConnectionFlooding,
            ChaosKind::ResponseDelay,
        ]
    }

    /// Returns the wire name used in the scenario artifact.
    pub fn name(&self) -> &'static str {
        match self {
            ChaosKind::NetworkLoss => "network_loss",
            ChaosKind::MessageCorruption => "message_corruption",
            ChaosKind::ConnectionFlooding => "connection_flooding",
            ChaosKind::ResponseDelay => "response_delay",
        }
    }

    /// Returns the catalog display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ChaosKind::NetworkLoss => "Network Loss",
            ChaosKind::MessageCorruption => "Message Corruption",
            ChaosKind::ConnectionFlooding => "Connection Flooding",
            ChaosKind::ResponseDelay => "Response Delay",
        }
    }

    /// Returns a description of the failure mode.
    pub fn description(&self) -> &'static str {
        match self {
            ChaosKind::NetworkLoss => "Simulate connection drops and reconnections",
            ChaosKind::MessageCorruption => "Send malformed OCPP messages",
            ChaosKind::ConnectionFlooding => "Rapid connection/disconnection cycles",
            ChaosKind::ResponseDelay => "Simulate slow CSMS responses",
        }
    }

    /// Parameter keys carried by this kind's payload. The artifact
    /// prepends the injection window `duration` for every kind that does
    /// not carry its own.
    pub fn required_param_keys(&self) -> &'static [&'static str] {
        match self {
            ChaosKind::NetworkLoss => &["duration", "reconnect_delay", "auto_reconnect"],
            ChaosKind::MessageCorruption => &["corruption_rate", "message_types"],
            ChaosKind::ConnectionFlooding => &["rate", "burst_duration"],
            ChaosKind::ResponseDelay => &["min_delay", "max_delay"],
        }
    }

    /// Builds the default parameter payload for this kind.
    pub fn default_params(&self) -> ChaosParams {
        match self {
            ChaosKind::NetworkLoss => ChaosParams::NetworkLoss {
                duration: 30,
                reconnect_delay: 5,
                auto_reconnect: true,
            },
            ChaosKind::MessageCorruption => ChaosParams::MessageCorruption {
                corruption_rate: 0.1,
                message_types: vec!["all".to_string()],
            },
            ChaosKind::ConnectionFlooding => ChaosParams::ConnectionFlooding {
                rate: 10,
                burst_duration: 30,
            },
            ChaosKind::ResponseDelay => ChaosParams::ResponseDelay {
                min_delay: 1000,
                max_delay: 5000,
            },
        }
    }

    /// Looks up a kind by wire name. Unknown names yield `None`; adding a
    /// strategy for an unknown kind is a no-op, never an error.
    pub fn from_name(s: &str) -> Option<ChaosKind> {
        match s.to_lowercase().as_str() {
            "network_loss" => Some(ChaosKind::NetworkLoss),
            "message_corruption" => Some(ChaosKind::MessageCorruption),
            "connection_flooding" => Some(ChaosKind::ConnectionFlooding),
            "response_delay" => Some(ChaosKind::ResponseDelay),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChaosKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ChaosKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChaosKind::from_name(s).ok_or_else(|| format!("Unknown chaos strategy: {}", s))
    }
}

/// Kind-specific chaos parameters. The variant *is* the kind, so a
/// strategy can never carry a payload that disagrees with its kind.
///
/// The injection window duration lives on [`ChaosStrategy`]. A
/// `network_loss` payload additionally carries its own outage length,
/// which takes the `duration` slot in the rendered params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChaosParams {
    NetworkLoss {
        /// Outage length in seconds
        duration: u32,
        /// Seconds before a dropped charger reconnects
        reconnect_delay: u32,
        /// Reconnect automatically after the outage
        auto_reconnect: bool,
    },
    MessageCorruption {
        /// Fraction of messages to corrupt, 0..=1
        corruption_rate: f64,
        /// Message classes to corrupt ("all", "transactions", ...)
        message_types: Vec<String>,
    },
    ConnectionFlooding {
        /// Connect/disconnect cycles per second
        rate: u32,
        /// Burst length in seconds
        burst_duration: u32,
    },
    ResponseDelay {
        /// Minimum injected delay in milliseconds
        min_delay: u32,
        /// Maximum injected delay in milliseconds
        max_delay: u32,
    },
}

impl ChaosParams {
    /// Returns the kind this payload belongs to.
    pub fn kind(&self) -> ChaosKind {
        match self {
            ChaosParams::NetworkLoss { .. } => ChaosKind::NetworkLoss,
            ChaosParams::MessageCorruption { .. } => ChaosKind::MessageCorruption,
            ChaosParams::ConnectionFlooding { .. } => ChaosKind::ConnectionFlooding,
            ChaosParams::ResponseDelay { .. } => ChaosKind::ResponseDelay,
        }
    }
}

/// A scheduled fault-injection instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaosStrategy {
    /// Unique id within the strategy list
    pub id: Uuid,

    /// Strategy participates in the run
    pub enabled: bool,

    /// Injection start, seconds from scenario start
    pub start_time: u32,

    /// Injection window length in seconds
    pub duration: u32,

    /// Chargers the fault applies to
    pub target: TargetSelector,

    /// Kind-specific payload (the variant is the kind)
    pub params: ChaosParams,
}

impl ChaosStrategy {
    /// Instantiates a strategy of the given kind with catalog defaults:
    /// start at 120 s, run for 60 s, hit a random 20% of chargers.
    pub fn new(kind: ChaosKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            enabled: true,
            start_time: 120,
            duration: 60,
            target: TargetSelector::Random20Percent,
            params: kind.default_params(),
        }
    }

    /// Returns the strategy kind.
    pub fn kind(&self) -> ChaosKind {
        self.params.kind()
    }
}

/// The draft's chaos section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosSection {
    /// Master switch for fault injection
    pub enabled: bool,

    /// Ordered strategy list
    pub strategies: Vec<ChaosStrategy>,
}

impl ChaosSection {
    /// Returns a new section with a default-populated strategy of the
    /// given kind appended. An unknown kind name resolves to `None`
    /// upstream and never reaches this point.
    pub fn with_strategy(&self, kind: ChaosKind) -> ChaosSection {
        let mut next = self.clone();
        next.strategies.push(ChaosStrategy::new(kind));
        next
    }

    /// Returns a new section without the strategy carrying `id`.
    pub fn without_strategy(&self, id: Uuid) -> ChaosSection {
        let mut next = self.clone();
        next.strategies.retain(|s| s.id != id);
        next
    }

    /// Strategies that will actually run.
    pub fn enabled_strategies(&self) -> impl Iterator<Item = &ChaosStrategy> {
        self.strategies.iter().filter(|s| s.enabled)
    }
}

/// Timeline action identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Spawn virtual chargers
    CreateChargers,

    /// Start an OCPP message flow on the targets
    StartFlow,

    /// Inject a chaos fault
    InjectChaos,

    /// Begin metric collection
    StartMonitoring,

    /// Stop a running flow
    StopFlow,
}

impl ActionKind {
    /// Returns all action kinds, in catalog order.
    pub fn all() -> Vec<ActionKind> {
        vec![
            ActionKind::CreateChargers,
            ActionKind::StartFlow,
            ActionKind::InjectChaos,
            ActionKind::StartMonitoring,
            ActionKind::StopFlow,
        ]
    }

    /// Returns the wire name used in the scenario artifact.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::CreateChargers => "create_chargers",
            ActionKind::StartFlow => "start_flow",
            ActionKind::InjectChaos => "inject_chaos",
            ActionKind::StartMonitoring => "start_monitoring",
            ActionKind::StopFlow => "stop_flow",
        }
    }

    /// Returns the catalog display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ActionKind::CreateChargers => "Create Chargers",
            ActionKind::StartFlow => "Start Flow",
            ActionKind::InjectChaos => "Inject Chaos",
            ActionKind::StartMonitoring => "Start Monitoring",
            ActionKind::StopFlow => "Stop Flow",
        }
    }

    /// Parameter keys this action accepts. The open-ended kinds accept
    /// any key through their `extra` map.
    pub fn accepted_param_keys(&self) -> &'static [&'static str] {
        match self {
            ActionKind::CreateChargers => &["prefix"],
            ActionKind::StartFlow => &["flow", "interval"],
            ActionKind::InjectChaos | ActionKind::StartMonitoring | ActionKind::StopFlow => &[],
        }
    }

    /// Builds the default parameter payload for this kind.
    pub fn default_params(&self) -> ActionParams {
        match self {
            ActionKind::CreateChargers => ActionParams::CreateChargers {
                prefix: "LOAD".to_string(),
            },
            ActionKind::StartFlow => ActionParams::StartFlow {
                flow: String::new(),
                interval: None,
            },
            ActionKind::InjectChaos => ActionParams::InjectChaos {
                extra: BTreeMap::new(),
            },
            ActionKind::StartMonitoring => ActionParams::StartMonitoring {
                extra: BTreeMap::new(),
            },
            ActionKind::StopFlow => ActionParams::StopFlow {
                extra: BTreeMap::new(),
            },
        }
    }

    /// Looks up a kind by wire name; unknown names yield `None`.
    pub fn from_name(s: &str) -> Option<ActionKind> {
        match s.to_lowercase().as_str() {
            "create_chargers" => Some(ActionKind::CreateChargers),
            "start_flow" => Some(ActionKind::StartFlow),
            "inject_chaos" => Some(ActionKind::InjectChaos),
            "start_monitoring" => Some(ActionKind::StartMonitoring),
            "stop_flow" => Some(ActionKind::StopFlow),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind-specific timeline action parameters.
///
/// The known kinds carry only their own typed fields; `inject_chaos`,
/// `start_monitoring` and `stop_flow` are open-ended in the artifact
/// format and keep an explicit ordered `extra` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionParams {
    CreateChargers {
        /// Charger id prefix ("LOAD" -> LOAD-0001, ...)
        prefix: String,
    },
    StartFlow {
        /// Flow name (boot_notification, charging_session, ...)
        flow: String,
        /// Repeat interval in seconds, for periodic flows
        #[serde(skip_serializing_if = "Option::is_none")]
        interval: Option<u32>,
    },
    InjectChaos {
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extra: BTreeMap<String, ParamValue>,
    },
    StartMonitoring {
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extra: BTreeMap<String, ParamValue>,
    },
    StopFlow {
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        extra: BTreeMap<String, ParamValue>,
    },
}

impl ActionParams {
    /// Returns the kind this payload belongs to.
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionParams::CreateChargers { .. } => ActionKind::CreateChargers,
            ActionParams::StartFlow { .. } => ActionKind::StartFlow,
            ActionParams::InjectChaos { .. } => ActionKind::InjectChaos,
            ActionParams::StartMonitoring { .. } => ActionKind::StartMonitoring,
            ActionParams::StopFlow { .. } => ActionKind::StopFlow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chaos_default_params_match_catalog() {
        assert_eq!(
            ChaosKind::NetworkLoss.default_params(),
            ChaosParams::NetworkLoss {
                duration: 30,
                reconnect_delay: 5,
                auto_reconnect: true
            }
        );
        assert_eq!(
            ChaosKind::ResponseDelay.default_params(),
            ChaosParams::ResponseDelay {
                min_delay: 1000,
                max_delay: 5000
            }
        );
        for kind in ChaosKind::all() {
            assert_eq!(kind.default_params().kind(), kind);
        }
    }

    #[test]
    fn test_new_strategy_instance_defaults() {
        let strategy = ChaosStrategy::new(ChaosKind::ConnectionFlooding);
        assert!(strategy.enabled);
        assert_eq!(strategy.start_time, 120);
        assert_eq!(strategy.duration, 60);
        assert_eq!(strategy.target, TargetSelector::Random20Percent);
        assert_eq!(strategy.kind(), ChaosKind::ConnectionFlooding);

        let other = ChaosStrategy::new(ChaosKind::ConnectionFlooding);
        assert_ne!(strategy.id, other.id);
    }

    #[test]
    fn test_unknown_kind_yields_none() {
        assert_eq!(ChaosKind::from_name("cosmic_rays"), None);
        assert_eq!(ActionKind::from_name("teleport"), None);

        // Adding via an unknown name is a no-op at the call site
        let section = ChaosSection::default();
        let next = match ChaosKind::from_name("cosmic_rays") {
            Some(kind) => section.with_strategy(kind),
            None => section.clone(),
        };
        assert_eq!(next, section);
    }

    #[test]
    fn test_with_without_strategy() {
        let section = ChaosSection::default()
            .with_strategy(ChaosKind::NetworkLoss)
            .with_strategy(ChaosKind::ResponseDelay);
        assert_eq!(section.strategies.len(), 2);

        let id = section.strategies[0].id;
        let next = section.without_strategy(id);
        assert_eq!(next.strategies.len(), 1);
        assert_eq!(next.strategies[0].kind(), ChaosKind::ResponseDelay);
        // The original value is untouched
        assert_eq!(section.strategies.len(), 2);
    }

    #[test]
    fn test_action_params_round_trip_tag() {
        let params = ActionParams::StartFlow {
            flow: "charging_session".to_string(),
            interval: Some(5),
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"action\":\"start_flow\""));
        let back: ActionParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
