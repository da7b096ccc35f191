//! Replay command implementation.

use super::{load_catalog, load_config, CliError, SnapshotFormat};
use isocity::replay::{render_ascii, render_summary};
use isocity::Snapshot;
use std::path::Path;

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if a file cannot be loaded or the snapshot does not fit
/// the catalog.
pub(crate) fn execute(
    snapshot_path: &Path,
    format: SnapshotFormat,
    config: Option<&Path>,
    catalog: Option<&Path>,
) -> Result<(), CliError> {
    let snapshot = Snapshot::load(snapshot_path).map_err(|e| {
        CliError::new(format!("Failed to load snapshot {}: {e}", snapshot_path.display()))
    })?;
    let config = load_config(config)?;
    let catalog = load_catalog(catalog)?;

    // Restoring validates every tile and recomputes the totals
    let state = snapshot.restore(config, catalog)?;

    match format {
        SnapshotFormat::Ascii => print!("{}", render_ascii(&state, state.day())),
        SnapshotFormat::Summary => print!("{}", render_summary(&state)),
        SnapshotFormat::Json => println!("{}", Snapshot::capture(&state).to_json()?),
    }

    Ok(())
}
