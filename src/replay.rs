//! Script replay and viewing.
//!
//! The simulation is deterministic, so a replay needs only:
//! - the configuration and catalog
//! - a [`Script`] of intents, each scheduled on a day
//!
//! No state deltas are stored. To view day N, re-run the script from day 0.
//!
//! # Time Travel
//!
//! - **Forward**: apply the current day's intents, then tick
//! - **Backward**: re-run from day 0 to (`current_day` - 1)
//! - **Jump to day N**: re-run from day 0 to N

mod render;
mod text;

pub use render::{render_ascii, render_map, tile_symbol};
pub use text::render_summary;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, SimConfig};
use crate::game::{
    apply_intent, check_invariants, Catalog, Intent, IntentOutcome, SimulationState, TickReport,
    TileChange,
};

/// An intent scheduled for a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedIntent {
    /// Day on which the intent is applied, before that day's tick.
    pub day: u32,
    /// The request.
    pub intent: Intent,
}

/// A named list of scheduled intents.
///
/// ```json
/// { "name": "starter", "intents": [ { "day": 0, "intent": { "action": "wait" } } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Optional label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Scheduled intents. Intents sharing a day run in list order.
    pub intents: Vec<TimedIntent>,
}

impl Script {
    /// Create an unnamed script.
    #[must_use]
    pub fn new(intents: Vec<TimedIntent>) -> Self {
        Self {
            name: None,
            intents,
        }
    }

    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a script.
    pub fn from_json(text: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Intents scheduled for `day`, in list order.
    pub fn intents_for(&self, day: u32) -> impl Iterator<Item = &Intent> {
        self.intents
            .iter()
            .filter(move |timed| timed.day == day)
            .map(|timed| &timed.intent)
    }

    /// Last day holding an intent, `None` for an empty script.
    #[must_use]
    pub fn last_day(&self) -> Option<u32> {
        self.intents.iter().map(|timed| timed.day).max()
    }
}

/// Error type for replay operations.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The script file could not be read.
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    /// The script is not valid JSON.
    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Day number out of bounds.
    #[error("day {requested} out of bounds (max: {max_day})")]
    DayOutOfBounds {
        /// Requested day.
        requested: u32,
        /// Last reachable day.
        max_day: u32,
    },
    /// The day limit has been reached.
    #[error("replay already reached its final day")]
    Finished,
}

/// What happened to one scripted intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEvent {
    /// Day the intent ran on.
    pub day: u32,
    /// The request.
    pub intent: Intent,
    /// Outcome when accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<IntentOutcome>,
    /// Rejection reason when refused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplayEvent {
    /// Whether the intent was accepted.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Replay engine - steps through a script deterministically.
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    script: Script,
    config: SimConfig,
    catalog: Arc<Catalog>,
    max_days: u32,
    state: SimulationState,
    events: Vec<ReplayEvent>,
    last_report: Option<TickReport>,
    last_changes: Vec<TileChange>,
}

impl ReplayEngine {
    /// Create a replay engine at day 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        script: Script,
        config: SimConfig,
        catalog: Arc<Catalog>,
        max_days: u32,
    ) -> Result<Self, ReplayError> {
        Self::new_at_day(script, config, catalog, max_days, 0)
    }

    /// Create a replay engine and run it to `target_day`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the day is beyond
    /// `max_days`.
    pub fn new_at_day(
        script: Script,
        config: SimConfig,
        catalog: Arc<Catalog>,
        max_days: u32,
        target_day: u32,
    ) -> Result<Self, ReplayError> {
        if target_day > max_days {
            return Err(ReplayError::DayOutOfBounds {
                requested: target_day,
                max_day: max_days,
            });
        }

        let state = SimulationState::with_catalog(config, Arc::clone(&catalog))?;
        let mut engine = Self {
            script,
            config,
            catalog,
            max_days,
            state,
            events: Vec::new(),
            last_report: None,
            last_changes: Vec::new(),
        };

        while engine.day() < target_day {
            engine.advance();
        }

        Ok(engine)
    }

    /// The script being replayed.
    #[must_use]
    pub const fn script(&self) -> &Script {
        &self.script
    }

    /// Current day.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.state.day()
    }

    /// Day limit.
    #[must_use]
    pub const fn max_days(&self) -> u32 {
        self.max_days
    }

    /// Current simulation state.
    #[must_use]
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Every intent outcome so far, in order.
    #[must_use]
    pub fn events(&self) -> &[ReplayEvent] {
        &self.events
    }

    /// Report of the most recent tick.
    #[must_use]
    pub const fn last_report(&self) -> Option<&TickReport> {
        self.last_report.as_ref()
    }

    /// Tile changes committed during the most recent step.
    #[must_use]
    pub fn last_changes(&self) -> &[TileChange] {
        &self.last_changes
    }

    /// Whether the day limit has been reached.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.state.day() >= self.max_days
    }

    /// Step forward one day.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Finished`] at the day limit.
    pub fn step_forward(&mut self) -> Result<TickReport, ReplayError> {
        if self.is_finished() {
            return Err(ReplayError::Finished);
        }
        Ok(self.advance())
    }

    /// Step backward one day.
    ///
    /// This replays from day 0 to (`current_day` - 1).
    ///
    /// # Errors
    ///
    /// Returns an error if already at day 0.
    pub fn step_backward(&mut self) -> Result<(), ReplayError> {
        if self.day() == 0 {
            return Err(ReplayError::DayOutOfBounds {
                requested: 0,
                max_day: self.max_days,
            });
        }

        let target = self.day() - 1;
        self.goto_day(target)
    }

    /// Jump to a specific day by replaying from day 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the day is beyond the day limit.
    pub fn goto_day(&mut self, target_day: u32) -> Result<(), ReplayError> {
        *self = Self::new_at_day(
            self.script.clone(),
            self.config,
            Arc::clone(&self.catalog),
            self.max_days,
            target_day,
        )?;
        Ok(())
    }

    /// Run until the day limit.
    pub fn run_to_end(&mut self) {
        while !self.is_finished() {
            self.advance();
        }
    }

    /// Render current state to ASCII.
    #[must_use]
    pub fn render_ascii(&self) -> String {
        render_ascii(&self.state, self.max_days)
    }

    /// Render current state as a structured summary.
    #[must_use]
    pub fn render_summary(&self) -> String {
        render_summary(&self.state)
    }

    fn advance(&mut self) -> TickReport {
        let day = self.state.day();
        for intent in self.script.intents_for(day) {
            let event = match apply_intent(&mut self.state, intent) {
                Ok(outcome) => ReplayEvent {
                    day,
                    intent: intent.clone(),
                    outcome: Some(outcome),
                    error: None,
                },
                Err(err) => ReplayEvent {
                    day,
                    intent: intent.clone(),
                    outcome: None,
                    error: Some(err.to_string()),
                },
            };
            self.events.push(event);
        }

        let report = self.state.tick();
        self.last_changes = self.state.drain_changes();
        info!(
            day = report.day,
            credits = report.credits,
            income = report.income,
            population = report.totals.population,
            stability = report.stability_after,
            "tick"
        );
        for violation in check_invariants(&self.state) {
            warn!(day = report.day, %violation, "invariant violated");
        }

        self.last_report = Some(report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ROAD;

    fn starter_script() -> Script {
        Script::new(vec![
            TimedIntent {
                day: 0,
                intent: Intent::build(ROAD, 8, 8),
            },
            TimedIntent {
                day: 0,
                intent: Intent::build("house", 8, 9),
            },
            TimedIntent {
                day: 2,
                intent: Intent::build("shop", 9, 8),
            },
            TimedIntent {
                day: 3,
                intent: Intent::build("castle", 1, 1),
            },
        ])
    }

    fn engine(max_days: u32) -> ReplayEngine {
        ReplayEngine::new(
            starter_script(),
            SimConfig::default(),
            Arc::new(Catalog::standard()),
            max_days,
        )
        .unwrap()
    }

    #[test]
    fn test_script_json() {
        let json = r#"{"name":"demo","intents":[
            {"day":0,"intent":{"action":"build","type":"road","x":8,"y":8}},
            {"day":1,"intent":{"action":"wait"}}
        ]}"#;
        let script = Script::from_json(json).unwrap();
        assert_eq!(script.name.as_deref(), Some("demo"));
        assert_eq!(script.last_day(), Some(1));
        assert_eq!(script.intents_for(0).count(), 1);
        assert_eq!(script.intents_for(5).count(), 0);
    }

    #[test]
    fn test_step_forward_applies_then_ticks() {
        let mut engine = engine(10);
        let report = engine.step_forward().unwrap();
        assert_eq!(report.day, 1);
        assert_eq!(engine.events().len(), 2);
        assert!(engine.events().iter().all(ReplayEvent::accepted));
        assert_eq!(engine.state().population(), 30);
        assert_eq!(engine.last_changes().len(), 2);
    }

    #[test]
    fn test_rejected_intent_is_recorded() {
        let mut engine = engine(10);
        engine.goto_day(4).unwrap();
        let last = engine.events().last().unwrap();
        assert_eq!(last.day, 3);
        assert!(!last.accepted());
        assert!(last.error.as_deref().unwrap().contains("castle"));
    }

    #[test]
    fn test_step_backward_matches_fresh_run() {
        let mut engine = engine(10);
        engine.goto_day(5).unwrap();
        engine.step_backward().unwrap();
        let fresh = ReplayEngine::new_at_day(
            starter_script(),
            SimConfig::default(),
            Arc::new(Catalog::standard()),
            10,
            4,
        )
        .unwrap();
        assert_eq!(engine.day(), 4);
        assert_eq!(engine.state().credits(), fresh.state().credits());
        assert_eq!(engine.state().grid(), fresh.state().grid());
    }

    #[test]
    fn test_bounds() {
        let mut engine = engine(3);
        assert!(matches!(
            engine.step_backward(),
            Err(ReplayError::DayOutOfBounds { requested: 0, .. })
        ));
        assert!(engine.goto_day(4).is_err());
        engine.run_to_end();
        assert!(engine.is_finished());
        assert!(matches!(engine.step_forward(), Err(ReplayError::Finished)));
    }

    #[test]
    fn test_replay_is_deterministic() {
        let mut a = engine(30);
        let mut b = engine(30);
        a.run_to_end();
        b.run_to_end();
        assert_eq!(a.state().credits(), b.state().credits());
        assert_eq!(a.state().totals(), b.state().totals());
        assert_eq!(a.events(), b.events());
    }
}
