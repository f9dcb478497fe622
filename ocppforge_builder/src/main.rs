//! OcppForge CLI
//!
//! Compose, validate and export CSMS load/chaos test scenarios.

use clap::Parser;
use ocppforge_builder::{export, BuilderSession, QuickTemplate};
use ocppforge_core::{advisories, power_expectation, validate, ScenarioDraft, TimelineTemplate};
use std::path::PathBuf;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// OcppForge scenario builder CLI
#[derive(Parser, Debug)]
#[command(name = "ocppforge")]
#[command(about = "Compose and export OCPP CSMS load/chaos test scenarios", long_about = None)]
struct Args {
    /// Draft JSON file to start from (defaults to the built-in draft)
    #[arg(short, long)]
    draft: Option<PathBuf>,

    /// Scenario name override
    #[arg(short, long)]
    name: Option<String>,

    /// Quick template to apply (high-load, connection-spike, over-capacity,
    /// response-validation, chaos-resilience)
    #[arg(short = 'T', long)]
    template: Option<String>,

    /// Timeline template(s) to append (boot-sequence, charging-cycle,
    /// heartbeat-flood); repeatable
    #[arg(long = "timeline")]
    timelines: Vec<String>,

    /// Validate only; exit 1 when violations exist
    #[arg(long)]
    check: bool,

    /// Output path ("-" writes the artifact to stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// JSON summary for CI parsing
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Assemble the session: stored draft or built-in defaults
    let mut session = match &args.draft {
        Some(path) => match load_draft(path) {
            Ok(draft) => BuilderSession::with_draft(draft),
            Err(e) => {
                error!("Failed to load draft {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => BuilderSession::new(),
    };

    if let Some(name) = &args.template {
        let template: QuickTemplate = name.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!(
                "Available quick templates: {}",
                QuickTemplate::all()
                    .iter()
                    .map(|t| t.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            std::process::exit(1);
        });
        session.apply_quick_template(template);
        info!("Applied quick template: {}", template.display_name());
    }

    for name in &args.timelines {
        let template: TimelineTemplate = name.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!(
                "Available timeline templates: {}",
                TimelineTemplate::all()
                    .iter()
                    .map(|t| t.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            std::process::exit(1);
        });
        session.update(|mut draft| {
            draft.timeline = draft.timeline.with_template(template);
            draft
        });
        info!("Appended timeline template: {}", template.display_name());
    }

    if let Some(name) = &args.name {
        let name = name.clone();
        session.update(move |mut draft| {
            draft.identity.name = name;
            draft
        });
    }

    let draft = session.draft();

    // Advisory warnings never block export
    for advisory in advisories(draft) {
        warn!("{}", advisory);
    }
    if draft.power.enabled {
        let expectation = power_expectation(
            draft.load.charger_count,
            draft.power.charger_max_amperage,
            draft.power.site_max_amperage,
        );
        info!(
            "Power expectation: demand {}A vs site {}A, {} per charger{}",
            expectation.total_demand,
            draft.power.site_max_amperage,
            expectation.expected_per_charger,
            if expectation.is_over_capacity {
                " (over capacity)"
            } else {
                ""
            }
        );
    }

    if args.check {
        run_check(draft, args.json);
        return;
    }

    let artifact = match export(draft) {
        Ok(artifact) => artifact,
        Err(blocked) => {
            error!("Export blocked: {}", blocked);
            for violation in &blocked.violations {
                error!("  - {}", violation);
            }
            std::process::exit(1);
        }
    };

    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| artifact.file_name.clone());

    if destination == "-" {
        print!("{}", artifact.yaml);
    } else if let Err(e) = std::fs::write(&destination, &artifact.yaml) {
        error!("Failed to write {}: {}", destination, e);
        std::process::exit(1);
    } else {
        info!(
            "Exported scenario '{}' to {}",
            draft.identity.name, destination
        );
    }

    if args.json {
        let summary = serde_json::json!({
            "name": draft.identity.name,
            "file": destination,
            "duration": draft.identity.duration,
            "chargers": draft.load.charger_count,
            "timeline_events": draft.timeline.events.len(),
            "chaos_enabled": draft.chaos.enabled,
            "advisories": advisories(draft),
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());
    }
}

fn run_check(draft: &ScenarioDraft, json: bool) {
    let violations = validate(draft);

    if json {
        let summary = serde_json::json!({
            "valid": violations.is_empty(),
            "violations": violations.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
            "advisories": advisories(draft).iter().map(|a| a.to_string()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());
    } else if violations.is_empty() {
        info!("Scenario '{}' is valid", draft.identity.name);
    } else {
        error!("Scenario has {} validation issue(s):", violations.len());
        for violation in &violations {
            error!("  - {}", violation);
        }
    }

    if !violations.is_empty() {
        std::process::exit(1);
    }
}

fn load_draft(path: &PathBuf) -> Result<ScenarioDraft, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let draft: ScenarioDraft = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    let (draft, repaired) = draft.normalized();
    if repaired {
        warn!(
            "Draft {} carried duplicate tags or ids; repaired",
            path.display()
        );
    }
    Ok(draft)
}
