//! Run command implementation.

use super::output::{format_text, format_tick, JsonRunResult};
use super::{load_catalog, load_config, CliError, OutputFormat};
use isocity::replay::{ReplayEngine, Script};
use isocity::Snapshot;
use std::path::Path;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if a file cannot be loaded or the snapshot cannot be saved.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    script_path: &Path,
    days: Option<u32>,
    config: Option<&Path>,
    catalog: Option<&Path>,
    format: OutputFormat,
    save: Option<&Path>,
    quiet: bool,
) -> Result<(), CliError> {
    let script = Script::load(script_path).map_err(|e| {
        CliError::new(format!("Failed to load script {}: {e}", script_path.display()))
    })?;
    let config = load_config(config)?;
    let catalog = load_catalog(catalog)?;

    // Run at least through the last scripted day
    let days = days.unwrap_or_else(|| script.last_day().map_or(1, |last| last.saturating_add(1)));

    if !quiet && format == OutputFormat::Text {
        let name = script.name.as_deref().unwrap_or("unnamed script");
        println!("Running {name} for {days} days...");
        println!();
    }

    let mut engine = ReplayEngine::new(script, config, catalog, days)?;
    while !engine.is_finished() {
        let report = engine.step_forward()?;
        if !quiet && format == OutputFormat::Text {
            println!("{}", format_tick(&report));
        }
    }

    if let Some(save_path) = save {
        Snapshot::capture(engine.state())
            .save(save_path)
            .map_err(|e| CliError::new(format!("Failed to save snapshot: {e}")))?;
        if !quiet {
            eprintln!("Snapshot saved to: {}", save_path.display());
        }
    }

    match format {
        OutputFormat::Text => {
            if !quiet {
                println!();
            }
            print!("{}", format_text(&engine));
        }
        OutputFormat::Json => {
            let json_result = JsonRunResult::from_engine(&engine);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Summary => {
            print!("{}", engine.render_summary());
        }
    }

    Ok(())
}
