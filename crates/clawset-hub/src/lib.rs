//! # clawset Hub
//!
//! Integrations with the outside world: the `openclaw` CLI as a model
//! catalog source.

pub mod sources;

/// Tests that spawn programs or change `PATH` run one at a time. A child
/// spawned mid-write can inherit an open handle to another test's script.
#[cfg(test)]
pub(crate) static SPAWN_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
