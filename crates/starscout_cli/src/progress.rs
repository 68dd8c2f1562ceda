//! Progress reporting for the fetch and websites commands.
//!
//! This module provides two modes of progress reporting:
//! - Interactive mode (TTY): progress bars using indicatif
//! - Logging mode (non-TTY): structured logging using tracing

mod interactive;
mod logging;

use std::sync::Arc;

use console::Term;
use starscout::{Progress, ProgressCallback};

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    /// Create a logging reporter (for testing or forcing non-TTY mode).
    #[cfg(test)]
    pub fn logging() -> Self {
        Self::Logging(LoggingReporter::new())
    }

    /// Handle a progress event.
    pub fn handle(&self, event: Progress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Convert to a ProgressCallback for the library.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| {
            reporter.handle(event);
        })
    }

    /// Finish all progress bars (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Show a warning on stderr when interactive, as a log line otherwise.
///
/// The tracing subscriber is only installed without a TTY.
pub fn warn_user(message: &str) {
    warn_to(Term::stdout().is_term(), message);
}

fn warn_to(is_tty: bool, message: &str) {
    if is_tty {
        eprintln!("{} {message}", console::style("⚠").yellow());
    } else {
        tracing::warn!("{}", message);
    }
}
