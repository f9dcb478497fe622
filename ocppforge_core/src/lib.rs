//! OcppForge scenario engine
//!
//! The scenario definition and validation engine behind the OcppForge
//! builder: compose a load/chaos test scenario for a CSMS (charging
//! station management system), predict the backend behavior it should
//! exhibit under power constraints, and serialize the result into a
//! portable YAML artifact for the execution engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    ScenarioDraft                        │
//! │   identity │ load │ power │ timeline │ chaos            │
//! │   (immutable value, replaced wholesale on every edit)   │
//! └──────┬──────────────┬──────────────────┬────────────────┘
//!        │              │                  │
//!   ┌────▼────┐    ┌────▼─────┐      ┌─────▼─────┐
//!   │ metrics │    │ validate │      │  render   │
//!   │ (pure)  │    │ (data,   │      │ (total,   │
//!   │         │    │  ordered)│      │  determ.) │
//!   └─────────┘    └──────────┘      └───────────┘
//! ```
//!
//! Every operation is a pure, immediately-returning function over a
//! draft snapshot. Derived metrics and the rendered artifact are
//! recomputed from scratch on each call, so there is no staleness
//! window between what the operator sees and what gets exported.
//!
//! # Usage
//!
//! ```
//! use ocppforge_core::{render, validate, ScenarioDraft};
//!
//! let mut draft = ScenarioDraft::default();
//! draft.identity.name = "High Load CSMS Test".to_string();
//!
//! assert!(validate(&draft).is_empty());
//! let yaml = render(&draft);
//! assert!(yaml.starts_with("# Generated OCPP Chaos Simulator Scenario"));
//! ```

pub mod catalog;
pub mod draft;
pub mod metrics;
pub mod render;
pub mod timeline;
pub mod validate;

pub use catalog::{
    ActionKind, ActionParams, ChaosKind, ChaosParams, ChaosSection, ChaosStrategy, ParamValue,
};
pub use draft::{
    coerce_numeric, ChargingPriority, Identity, LoadBalancingStrategy, LoadSection, PowerSection,
    ScenarioDraft, TargetSelector, TimeWindow, Weekday,
};
pub use metrics::{expected_reduction_percent, power_expectation, PowerExpectation};
pub use render::render;
pub use timeline::{TimelineEvent, TimelineSection, TimelineTemplate};
pub use validate::{advisories, validate, Advisory, Violation};
