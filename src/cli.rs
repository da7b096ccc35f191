//! CLI command implementations for isocity.

pub(crate) mod replay;
pub(crate) mod run;
pub(crate) mod validate;
pub(crate) mod watch;

mod output;

use clap::ValueEnum;
use isocity::game::{Catalog, CatalogError};
use isocity::replay::ReplayError;
use isocity::{ConfigError, SimConfig, SimError, SnapshotError};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// Structured summary for agent consumption.
    Summary,
}

/// Output format for the `replay` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SnapshotFormat {
    /// Bordered ASCII map with stats.
    Ascii,
    /// Structured summary for agent consumption.
    Summary,
    /// The snapshot re-serialized after validation.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ReplayError> for CliError {
    fn from(e: ReplayError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SnapshotError> for CliError {
    fn from(e: SnapshotError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        Self::new(e.to_string())
    }
}

/// Load the configuration, falling back to defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<SimConfig, CliError> {
    match path {
        Some(path) => SimConfig::load(path).map_err(|e| {
            CliError::new(format!("Failed to load config {}: {e}", path.display()))
        }),
        None => Ok(SimConfig::default()),
    }
}

/// Load a catalog file, falling back to the standard catalog.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<Arc<Catalog>, CliError> {
    let Some(path) = path else {
        return Ok(Arc::new(Catalog::standard()));
    };
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;
    let catalog = Catalog::from_json(&text)
        .map_err(|e| CliError::new(format!("Invalid catalog {}: {e}", path.display())))?;
    Ok(Arc::new(catalog))
}
