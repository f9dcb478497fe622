//! OcppForge builder
//!
//! The wizard session over an [`ocppforge_core::ScenarioDraft`]: step
//! navigation, quick templates, power presets, and the export gate that
//! turns a validated draft into a YAML scenario artifact.

pub mod export;
pub mod session;

pub use export::{export, file_slug, ExportArtifact, ExportBlocked};
pub use session::{BuilderSession, PowerPreset, QuickTemplate, Step};
