//! Progress display for workspace analysis
//!
//! Provides visual feedback on stderr while manifests are analyzed, driven
//! by the orchestrator's change notifications.

use crate::events::{AnalysisEvents, SubscriptionId};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for the analysis workflow
pub struct Progress {
    /// Whether progress display is enabled (disabled in quiet and JSON modes)
    enabled: bool,
    /// Current spinner or bar
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a new progress reporter
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Create a disabled progress reporter
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Show a spinner for an analysis of unknown length
    pub fn spinner(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg} ({pos} files)")
                .expect("Invalid template"),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Start a progress bar for a known number of files
    pub fn start(&mut self, total: u64, message: &str) {
        if !self.enabled {
            return;
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                .expect("Invalid template")
                .progress_chars("█▓▒░"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    /// Advance once per published result until detached
    ///
    /// Returns `None` when there is nothing to drive.
    pub fn attach(&self, events: &AnalysisEvents) -> Option<SubscriptionId> {
        let bar = self.bar.clone()?;
        Some(events.subscribe(move |result| {
            if let Some(name) = result.file.file_name() {
                bar.set_message(name.to_string_lossy().into_owned());
            }
            bar.inc(1);
        }))
    }

    /// Stop advancing on published results
    pub fn detach(&self, events: &AnalysisEvents, id: Option<SubscriptionId>) {
        if let Some(id) = id {
            events.unsubscribe(id);
        }
    }

    /// Finish and clear the current progress display
    pub fn finish_and_clear(&mut self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
        self.bar = None;
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisResult, ManifestKind};

    fn position(progress: &Progress) -> u64 {
        progress.bar.as_ref().map_or(0, ProgressBar::position)
    }

    fn result() -> AnalysisResult {
        AnalysisResult::empty("/w/package.json", ManifestKind::PackageJson)
    }

    #[test]
    fn test_progress_disabled() {
        let events = AnalysisEvents::new();
        let mut progress = Progress::disabled();
        progress.spinner("test");
        progress.start(10, "test");
        assert!(progress.attach(&events).is_none());
        assert_eq!(events.subscriber_count(), 0);
        assert_eq!(position(&progress), 0);
        progress.finish_and_clear();
    }

    #[test]
    fn test_progress_follows_events() {
        let events = AnalysisEvents::new();
        let mut progress = Progress::new(true);
        progress.start(3, "Analyzing");

        let id = progress.attach(&events);
        assert!(id.is_some());
        events.publish(&result());
        events.publish(&result());
        assert_eq!(position(&progress), 2);

        progress.detach(&events, id);
        events.publish(&result());
        assert_eq!(position(&progress), 2);
        assert_eq!(events.subscriber_count(), 0);
        progress.finish_and_clear();
    }
}
