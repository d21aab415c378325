//! Catalog source backed by the `openclaw` CLI.
//!
//! Runs `openclaw models list --all --json` and parses its stdout. The call
//! blocks until the program exits; there is no way to cancel it.

use std::io;
use std::path::PathBuf;
use std::process::Command;

use clawset_core::catalog::{ModelSource, ModelsListing};
use clawset_core::error::{ClawsetError, Result};
use clawset_core::settings::Settings;

const LIST_ARGS: &[&str] = &["models", "list", "--all", "--json"];

/// Lists models by shelling out to the OpenClaw CLI.
#[derive(Debug, Clone)]
pub struct OpenclawCli {
    program: PathBuf,
}

impl OpenclawCli {
    /// `program` is a path, or a bare name looked up on `PATH` at spawn time.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.openclaw_bin)
    }
}

impl ModelSource for OpenclawCli {
    fn list_models(&self) -> Result<ModelsListing> {
        tracing::debug!("Running {} {}", self.program.display(), LIST_ARGS.join(" "));
        let output = Command::new(&self.program)
            .args(LIST_ARGS)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    ClawsetError::Fetch(format!("{} not found in PATH", self.program.display()))
                }
                _ => ClawsetError::Fetch(format!("{}: {}", self.program.display(), e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ClawsetError::Fetch(if stderr.is_empty() {
                "Failed to fetch models".to_string()
            } else {
                stderr
            }));
        }

        let listing: ModelsListing = serde_json::from_slice(&output.stdout)
            .map_err(|e| ClawsetError::Fetch(format!("Unreadable model list: {}", e)))?;
        tracing::debug!("Fetched {} models", listing.models.len());
        Ok(listing)
    }
}
