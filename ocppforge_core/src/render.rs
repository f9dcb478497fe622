//! Scenario artifact serializer.
//!
//! `render` turns a draft into the YAML scenario document consumed by
//! the execution engine. It is a deterministic pure function and it is
//! total: it never fails, even on a draft that would not pass the export
//! validator, because the preview pane renders continuously while the
//! operator is still filling fields in.
//!
//! Key order, comment headers, and scalar quoting are part of the
//! artifact contract, so the document is written line by line rather
//! than through a generic YAML emitter.

use crate::catalog::{ActionParams, ChaosParams, ChaosStrategy, ParamValue};
use crate::draft::ScenarioDraft;
use crate::metrics::power_expectation;
use crate::timeline::TimelineEvent;

/// Renders the complete scenario artifact.
pub fn render(draft: &ScenarioDraft) -> String {
    let mut out = String::with_capacity(2048);

    render_identity(&mut out, draft);
    render_chargers(&mut out, draft);
    render_csms(&mut out, draft);
    if draft.power.enabled {
        render_csms_validation(&mut out, draft);
    }
    if draft.load.use_load_profile {
        render_load_profile(&mut out, draft);
    }
    render_timeline(&mut out, draft);
    if draft.chaos.enabled && draft.chaos.enabled_strategies().next().is_some() {
        render_chaos(&mut out, draft);
    }
    render_expectations(&mut out, draft);
    render_results(&mut out, draft);

    out
}

fn render_identity(out: &mut String, draft: &ScenarioDraft) {
    out.push_str("# Generated OCPP Chaos Simulator Scenario\n");
    line(out, 0, &format!("name: {}", quoted(&draft.identity.name)));
    line(out, 0, &format!("description: {}", quoted(&draft.identity.description)));
    line(out, 0, &format!("version: {}", quoted(&draft.identity.version)));
    line(out, 0, &format!("duration: {}", draft.identity.duration));
    line(out, 0, &format!("tags: {}", quoted_list(&draft.identity.tags)));
}

fn render_chargers(out: &mut String, draft: &ScenarioDraft) {
    out.push('\n');
    line(out, 0, "chargers:");
    line(out, 1, &format!("count: {}", draft.load.charger_count));
    line(out, 1, "template:");
    line(out, 2, &format!("model: {}", quoted(&draft.load.charger_model)));
    line(out, 2, &format!("vendor: {}", quoted(&draft.load.charger_vendor)));
    line(out, 2, &format!("connectors: {}", draft.load.connectors));
    line(out, 2, &format!("ocpp_version: {}", quoted(&draft.load.ocpp_version)));
}

fn render_csms(out: &mut String, draft: &ScenarioDraft) {
    out.push('\n');
    line(out, 0, "csms:");
    line(out, 1, &format!("endpoint: {}", quoted(&draft.load.csms_endpoint)));
    line(
        out,
        1,
        &format!("protocol: {}", quoted(&format!("ocpp{}", draft.load.ocpp_version))),
    );
}

fn render_csms_validation(out: &mut String, draft: &ScenarioDraft) {
    let power = &draft.power;
    let expectation = power_expectation(
        draft.load.charger_count,
        power.charger_max_amperage,
        power.site_max_amperage,
    );

    out.push('\n');
    out.push_str("# CSMS Load Balancing Validation\n");
    line(out, 0, "csms_validation:");
    line(out, 1, "test_type: \"load_balancing_compliance\"");
    line(out, 1, &format!("site_max_amperage: {}", power.site_max_amperage));
    line(
        out,
        1,
        &format!("expected_csms_strategy: {}", quoted(power.load_balancing_strategy.name())),
    );

    out.push('\n');
    line(out, 1, "# Power Request Scenario");
    line(out, 1, "power_requests:");
    line(out, 2, &format!("per_charger_request: {}", power.charger_max_amperage));
    line(out, 2, &format!("total_demand: {}", expectation.total_demand));
    line(out, 2, &format!("expected_over_capacity: {}", expectation.is_over_capacity));

    out.push('\n');
    line(out, 1, "# Expected CSMS Responses");
    line(out, 1, "expected_csms_behavior:");
    line(
        out,
        2,
        &format!(
            "should_send_set_charging_profile: {}",
            expectation.should_send_set_charging_profile
        ),
    );
    line(
        out,
        2,
        &format!(
            "should_reject_start_transaction: {}",
            expectation.should_reject_new_sessions
        ),
    );
    line(
        out,
        2,
        &format!("expected_amperage_per_charger: {}", expectation.expected_per_charger),
    );
    line(
        out,
        2,
        &format!("load_balancing_required: {}", expectation.is_over_capacity),
    );

    out.push('\n');
    line(out, 1, "# OCPP Message Validation Rules");
    line(out, 1, "validation_rules:");
    line(out, 2, "- message_type: \"SetChargingProfile\"");
    line(
        out,
        3,
        "validate: \"chargingSchedule.chargingSchedulePeriod[0].limit <= expected_amperage_per_charger\"",
    );
    line(out, 3, "required_when: \"total_demand > site_max_amperage\"");
    out.push('\n');
    line(out, 2, "- message_type: \"StartTransactionResponse\"");
    line(out, 3, "validate: \"idTagInfo.status === 'Blocked' when no_power_available\"");
    line(out, 3, "required_when: \"all_chargers_at_capacity\"");
    out.push('\n');
    line(out, 2, "- message_type: \"ChangeAvailabilityResponse\"");
    line(out, 3, "validate: \"status === 'Accepted' for load_shedding\"");
    line(out, 3, "required_when: \"emergency_load_reduction\"");
}

fn render_load_profile(out: &mut String, draft: &ScenarioDraft) {
    let load = &draft.load;
    out.push('\n');
    line(out, 0, "load_profile:");
    line(out, 1, "ramp_up:");
    line(out, 2, &format!("chargers_per_second: {}", load.ramp_up_rate));
    line(out, 2, &format!("total_duration: {}", load.ramp_up_duration));
    line(out, 1, "steady_state:");
    line(out, 2, &format!("duration: {}", load.steady_state_duration));
    line(out, 1, "ramp_down:");
    line(out, 2, &format!("chargers_per_second: {}", load.ramp_down_rate));
    line(out, 2, &format!("total_duration: {}", load.ramp_down_duration));
}

fn render_timeline(out: &mut String, draft: &ScenarioDraft) {
    out.push('\n');
    line(out, 0, "timeline:");
    if draft.timeline.events.is_empty() {
        render_bootstrap_timeline(out, draft);
        return;
    }
    for event in draft.timeline.sorted() {
        render_event(out, event);
    }
}

/// The default two-step boot sequence synthesized for an empty timeline:
/// create the fleet at t=0, run the BootNotification flow at t=5.
fn render_bootstrap_timeline(out: &mut String, draft: &ScenarioDraft) {
    line(out, 1, "- at: 0");
    line(out, 2, "action: \"create_chargers\"");
    line(out, 2, "params:");
    line(out, 3, &format!("count: {}", draft.load.charger_count));
    line(out, 3, "prefix: \"LOAD\"");
    out.push('\n');
    line(out, 1, "- at: 5");
    line(out, 2, "action: \"start_flow\"");
    line(out, 2, "targets: \"all\"");
    line(out, 2, "flow:");
    line(out, 3, "- send: \"BootNotification\"");
    line(out, 4, "params:");
    line(out, 5, &format!("charge_point_model: {}", quoted(&draft.load.charger_model)));
    line(out, 5, &format!("charge_point_vendor: {}", quoted(&draft.load.charger_vendor)));
    line(out, 4, "wait_for: \"BootNotificationResponse\"");
}

fn render_event(out: &mut String, event: &TimelineEvent) {
    line(out, 1, &format!("- at: {}", event.at));
    line(out, 2, &format!("action: {}", quoted(event.action().name())));
    line(out, 2, &format!("targets: {}", quoted(event.targets.name())));
    if !event.description.is_empty() {
        line(out, 2, &format!("# {}", event.description));
    }

    let params = event_param_lines(&event.params);
    if !params.is_empty() {
        line(out, 2, "params:");
        for param in params {
            line(out, 3, &param);
        }
    }
}

/// Parameter lines for a timeline action. Exhaustive over the kinds, so
/// a new action variant cannot be silently dropped from the artifact.
fn event_param_lines(params: &ActionParams) -> Vec<String> {
    match params {
        ActionParams::CreateChargers { prefix } => {
            vec![format!("prefix: {}", quoted(prefix))]
        }
        ActionParams::StartFlow { flow, interval } => {
            let mut lines = Vec::new();
            if !flow.is_empty() {
                lines.push(format!("flow: {}", quoted(flow)));
            }
            if let Some(interval) = interval {
                lines.push(format!("interval: {}", interval));
            }
            lines
        }
        ActionParams::InjectChaos { extra }
        | ActionParams::StartMonitoring { extra }
        | ActionParams::StopFlow { extra } => extra
            .iter()
            .map(|(key, value)| format!("{}: {}", key, yaml_value(value)))
            .collect(),
    }
}

fn render_chaos(out: &mut String, draft: &ScenarioDraft) {
    out.push('\n');
    out.push_str("# Chaos Engineering Strategies\n");
    for strategy in draft.chaos.enabled_strategies() {
        render_strategy(out, strategy);
    }
}

fn render_strategy(out: &mut String, strategy: &ChaosStrategy) {
    line(out, 1, &format!("- at: {}", strategy.start_time));
    line(out, 2, "action: \"inject_chaos\"");
    line(out, 2, &format!("strategy: {}", quoted(strategy.kind().name())));
    line(out, 2, &format!("targets: {}", quoted(strategy.target.name())));
    line(out, 2, "params:");
    match &strategy.params {
        // network_loss carries its own outage length; it takes the
        // duration slot in place of the injection window
        ChaosParams::NetworkLoss {
            duration,
            reconnect_delay,
            auto_reconnect,
        } => {
            line(out, 3, &format!("duration: {}", duration));
            line(out, 3, &format!("reconnect_delay: {}", reconnect_delay));
            line(out, 3, &format!("auto_reconnect: {}", auto_reconnect));
        }
        ChaosParams::MessageCorruption {
            corruption_rate,
            message_types,
        } => {
            line(out, 3, &format!("duration: {}", strategy.duration));
            line(out, 3, &format!("corruption_rate: {}", float(*corruption_rate)));
            line(out, 3, &format!("message_types: {}", quoted_list(message_types)));
        }
        ChaosParams::ConnectionFlooding {
            rate,
            burst_duration,
        } => {
            line(out, 3, &format!("duration: {}", strategy.duration));
            line(out, 3, &format!("rate: {}", rate));
            line(out, 3, &format!("burst_duration: {}", burst_duration));
        }
        ChaosParams::ResponseDelay {
            min_delay,
            max_delay,
        } => {
            line(out, 3, &format!("duration: {}", strategy.duration));
            line(out, 3, &format!("min_delay: {}", min_delay));
            line(out, 3, &format!("max_delay: {}", max_delay));
        }
    }
}

fn render_expectations(out: &mut String, draft: &ScenarioDraft) {
    out.push('\n');
    line(out, 0, "expectations:");
    line(out, 1, "csms_should:");
    line(out, 2, "- respond_within_timeout: 30");
    if draft.power.enabled {
        line(out, 2, "- send_set_charging_profile_when_over_capacity: true");
        line(out, 2, "- respect_site_amperage_limits: true");
        line(out, 2, "- implement_load_balancing_algorithm: true");
    }
    if draft.chaos.enabled {
        line(out, 2, "- handle_chaos_gracefully: true");
    }
    line(out, 2, "- maintain_ocpp_1_6j_compliance: true");

    if draft.power.enabled {
        let expectation = power_expectation(
            draft.load.charger_count,
            draft.power.charger_max_amperage,
            draft.power.site_max_amperage,
        );
        out.push('\n');
        line(out, 1, "load_balancing_compliance:");
        line(out, 2, &format!("max_total_amperage: {}", draft.power.site_max_amperage));
        line(
            out,
            2,
            &format!("expected_per_charger_limit: {}", expectation.expected_per_charger),
        );
        line(
            out,
            2,
            &format!("set_charging_profile_required: {}", expectation.is_over_capacity),
        );
        line(
            out,
            2,
            &format!(
                "load_balancing_strategy: {}",
                quoted(draft.power.load_balancing_strategy.name())
            ),
        );
    }

    out.push('\n');
    line(out, 1, "performance:");
    line(out, 2, "max_response_time: 5000");
    line(out, 2, "max_memory_usage: \"4GB\"");
    line(
        out,
        2,
        &format!(
            "min_success_rate: {}",
            if draft.chaos.enabled { "95.0" } else { "99.5" }
        ),
    );
    line(
        out,
        2,
        &format!("max_concurrent_connections: {}", draft.load.charger_count),
    );
}

fn render_results(out: &mut String, draft: &ScenarioDraft) {
    out.push('\n');
    line(out, 0, "results:");
    line(out, 1, "format: [\"json\", \"csv\", \"performance_report\"]");
    line(out, 1, "include:");
    line(out, 2, "- connection_timeline");
    line(out, 2, "- message_throughput");
    line(out, 2, "- error_breakdown");
    line(out, 2, "- load_balancer_stats");
    if draft.chaos.enabled {
        line(out, 2, "- chaos_injection_results");
    }
}

fn line(out: &mut String, indent: usize, content: &str) {
    for _ in 0..indent {
        out.push_str("  ");
    }
    out.push_str(content);
    out.push('\n');
}

/// Quotes a string scalar, escaping quotes, backslashes and newlines.
fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| quoted(s)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Renders a float with at least one fractional digit, so it reads as a
/// float in the artifact (95.0, not 95).
fn float(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

fn yaml_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Bool(b) => b.to_string(),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::Float(f) => float(*f),
        ParamValue::Str(s) => quoted(s),
        ParamValue::List(items) => {
            let rendered: Vec<String> = items.iter().map(yaml_value).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}
