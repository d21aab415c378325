//! Terminal spinner used as the status indicator for slow steps.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::time::Duration;

use clawset_core::operation::StatusIndicator;

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Default)]
pub struct Spinner {
    bar: RefCell<Option<ProgressBar>>,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the running bar, returning the message it showed.
    fn finish(&self) -> Option<String> {
        let bar = self.bar.borrow_mut().take()?;
        let message = bar.message();
        bar.finish_and_clear();
        Some(message)
    }
}

impl StatusIndicator for Spinner {
    fn start(&self, message: &str) {
        self.finish();
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.bar.borrow_mut() = Some(bar);
    }

    fn succeed(&self, message: Option<&str>) {
        let shown = self.finish();
        if let Some(text) = message.map(str::to_string).or(shown) {
            eprintln!("{} {}", "✔".green(), text);
        }
    }

    fn fail(&self, message: &str) {
        self.finish();
        eprintln!("{} {}", "✖".red(), message);
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_then_finish() {
        let spinner = Spinner::new();
        spinner.start("Fetching models...");
        assert!(spinner.bar.borrow().is_some());
        spinner.succeed(None);
        assert!(spinner.bar.borrow().is_none());
    }

    #[test]
    fn test_restart_replaces_bar() {
        let spinner = Spinner::new();
        spinner.start("first");
        spinner.start("second");
        assert_eq!(spinner.finish().as_deref(), Some("second"));
        spinner.fail("nothing running");
    }
}
