//! Console progress reporting for `--verbose`

use crate::config::Verbosity;
use covmerge::{MergeEvent, MergeObserver, MergeSummary};
use console::{style, Term};

/// Prints progress and merge decisions to stdout
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Verbosity; only `Verbose` prints anything
    pub verbosity: Verbosity,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(false, Verbosity::Normal)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, verbosity: Verbosity) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            verbosity,
        }
    }

    fn write(&self, line: &str) {
        if self.verbosity.is_verbose() {
            let _ = self.term.write_line(line);
        }
    }

    /// Print a `label: value` progress line
    pub fn field(&self, label: &str, value: &str) {
        let label = if self.use_color {
            style(label).bold().to_string()
        } else {
            label.to_string()
        };
        self.write(&format!("{label}: {value}"));
    }

    /// Print a plain progress line
    pub fn info(&self, message: &str) {
        self.write(message);
    }

    /// Print one merge decision
    pub fn event(&self, event: &MergeEvent) {
        self.write(&self.render_event(event));
    }

    /// Print the final counters
    pub fn summary(&self, summary: &MergeSummary) {
        let text = format!("Merged {summary}");
        if self.use_color {
            self.write(&style(text).green().bold().to_string());
        } else {
            self.write(&text);
        }
    }

    fn render_event(&self, event: &MergeEvent) -> String {
        if !self.use_color {
            return event.to_string();
        }
        match event {
            MergeEvent::PackageSkipped { .. } | MergeEvent::ClassSkipped { .. } => {
                style(event).dim().to_string()
            }
            MergeEvent::ClassAdded { .. } => style(event).green().to_string(),
            MergeEvent::PackageSeeded { .. } | MergeEvent::PackageAdmitted { .. } => {
                style(event).cyan().to_string()
            }
        }
    }
}

impl MergeObserver for ProgressReporter {
    fn on_event(&mut self, event: &MergeEvent) {
        self.event(event);
    }
}
