//! Validate command implementation.

use super::{load_catalog, load_config, CliError};
use isocity::game::{Catalog, ROAD};
use isocity::replay::Script;
use isocity::{Intent, SimConfig};
use std::path::Path;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error on the first file that fails validation.
pub(crate) fn execute(
    config_path: Option<&Path>,
    catalog_path: Option<&Path>,
    script_path: Option<&Path>,
) -> Result<(), CliError> {
    println!("Configuration: {}", describe(config_path, "defaults"));
    let config = load_config(config_path);
    print_check("config parses and validates", config.is_ok());
    let config = config?;
    println!(
        "    grid {}x{}, {} starting credits, road {} credits, refund {}%",
        config.grid_width,
        config.grid_height,
        config.starting_credits,
        config.road_flat_cost,
        config.demolish_refund_percent
    );
    println!();

    println!("Catalog: {}", describe(catalog_path, "standard"));
    let catalog = load_catalog(catalog_path);
    print_check("catalog parses and validates", catalog.is_ok());
    let catalog = catalog?;
    print_check("road kind present", catalog.contains(ROAD));
    println!(
        "    {} kinds, {} visible in the build menu",
        catalog.len(),
        catalog.visible_kinds().count()
    );
    println!();

    if let Some(path) = script_path {
        println!("Script: {}", path.display());
        let script = Script::load(path);
        print_check("script parses", script.is_ok());
        let script = script?;
        let problems = script_problems(&script, &config, &catalog);
        print_check("intents reference known kinds and tiles", problems.is_empty());
        for problem in &problems {
            println!("    {problem}");
        }
        if !problems.is_empty() {
            return Err(CliError::new(format!(
                "{} invalid intents in {}",
                problems.len(),
                path.display()
            )));
        }
        println!(
            "    {} intents through day {}",
            script.intents.len(),
            script.last_day().unwrap_or(0)
        );
        println!();
    }

    println!("Validation successful!");
    Ok(())
}

/// Static checks that do not depend on the evolving city.
fn script_problems(script: &Script, config: &SimConfig, catalog: &Catalog) -> Vec<String> {
    let in_grid = |x: i64, y: i64| {
        u16::try_from(x).is_ok_and(|x| x < config.grid_width)
            && u16::try_from(y).is_ok_and(|y| y < config.grid_height)
    };

    let mut problems = Vec::new();
    for timed in &script.intents {
        let (x, y) = match &timed.intent {
            Intent::Build { kind, x, y } => {
                if !catalog.contains(kind) {
                    problems.push(format!("day {}: unknown building kind {kind}", timed.day));
                }
                (*x, *y)
            }
            Intent::Upgrade { x, y } | Intent::Demolish { x, y } => (*x, *y),
            Intent::Wait => continue,
        };
        if !in_grid(x, y) {
            problems.push(format!("day {}: ({x}, {y}) is outside the grid", timed.day));
        }
    }
    problems
}

fn describe(path: Option<&Path>, fallback: &str) -> String {
    path.map_or_else(|| fallback.to_string(), |p| p.display().to_string())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
