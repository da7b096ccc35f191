//! Output formatting utilities for CLI.

use isocity::game::Aggregates;
use isocity::replay::{ReplayEngine, ReplayEvent};
use isocity::TickReport;
use serde::Serialize;

/// JSON-serializable run result.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunResult<'a> {
    /// Script name, if any.
    pub(super) name: Option<&'a str>,
    /// Days simulated.
    pub(super) days: u32,
    /// Final credit balance.
    pub(super) credits: u64,
    /// Final stability.
    pub(super) stability: f64,
    /// Final city totals.
    pub(super) totals: Aggregates,
    /// Intents accepted.
    pub(super) accepted: usize,
    /// Intents rejected.
    pub(super) rejected: usize,
    /// Every intent outcome in order.
    pub(super) events: &'a [ReplayEvent],
}

impl<'a> JsonRunResult<'a> {
    /// Create from a finished engine.
    pub(super) fn from_engine(engine: &'a ReplayEngine) -> Self {
        let state = engine.state();
        let accepted = engine.events().iter().filter(|e| e.accepted()).count();
        Self {
            name: engine.script().name.as_deref(),
            days: engine.day(),
            credits: state.credits(),
            stability: state.stability(),
            totals: *state.totals(),
            accepted,
            rejected: engine.events().len() - accepted,
            events: engine.events(),
        }
    }
}

/// One line per tick for progress output.
pub(super) fn format_tick(report: &TickReport) -> String {
    format!(
        "Day {:>4}  credits {:>7} (+{})  pop {:>4}  power {}/{}  pollution {:>4}  stability {:>5.1}",
        report.day,
        report.credits,
        report.income,
        report.totals.population,
        report.totals.power,
        report.totals.max_power,
        report.totals.pollution,
        report.stability_after,
    )
}

/// Format the final result of a run as human-readable text.
pub(super) fn format_text(engine: &ReplayEngine) -> String {
    let state = engine.state();
    let totals = state.totals();
    let mut output = String::new();

    let name = engine.script().name.as_deref().unwrap_or("unnamed script");
    output.push_str(&format!("Run Result ({name})\n"));
    output.push_str(&format!("  Days: {}\n", engine.day()));
    output.push_str(&format!("  Credits: {}\n", state.credits()));
    output.push_str(&format!(
        "  Population: {}/{}  Jobs: {}\n",
        totals.population, totals.max_population, totals.job_capacity
    ));
    output.push_str(&format!("  Power: {}/{}\n", totals.power, totals.max_power));
    output.push_str(&format!("  Pollution: {}\n", totals.pollution));
    output.push_str(&format!("  Stability: {:.1}\n", state.stability()));
    output.push_str(&format!("  Daily income: {}\n\n", totals.daily_income));

    for event in engine.events().iter().filter(|e| !e.accepted()) {
        let reason = event.error.as_deref().unwrap_or("rejected");
        output.push_str(&format!(
            "  Day {}: {} rejected: {reason}\n",
            event.day, event.intent
        ));
    }

    output
}
