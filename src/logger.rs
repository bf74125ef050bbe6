//! User-facing logging that coexists with the progress bar
//!
//! Library modules log through `tracing`; this logger handles the batch
//! progress bar and the user-visible run messages, routing them through the
//! bar's println so output never tears the fixed bar line.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum VerbosityLevel {
    /// High-level progress (default)
    Summary = 0,
    /// Per-row progress messages
    Detailed = 1,
    /// Everything, including degraded-fallback details
    Debug = 2,
}

impl VerbosityLevel {
    pub fn from_verbose_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Summary,
            1 => VerbosityLevel::Detailed,
            2.. => VerbosityLevel::Debug,
        }
    }

    /// Filter directive for the tracing subscriber
    pub fn env_filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Summary => "sirenrich=warn",
            VerbosityLevel::Detailed => "sirenrich=info",
            VerbosityLevel::Debug => "sirenrich=debug",
        }
    }
}

#[derive(Clone)]
pub struct EnrichLogger {
    verbosity: VerbosityLevel,
    progress_bar: Arc<Mutex<Option<ProgressBar>>>,
}

impl EnrichLogger {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            progress_bar: Arc::new(Mutex::new(None)),
        }
    }

    pub fn info(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Summary {
            self.print_line(message);
        }
    }

    pub fn detail(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Detailed {
            self.print_line(message);
        }
    }

    /// Errors are always shown regardless of verbosity
    pub fn error(&self, message: &str) {
        self.print_line(&format!("ERROR: {}", message));
    }

    fn print_line(&self, message: &str) {
        if let Ok(guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.println(message);
                return;
            }
        }
        eprintln!("{}", message);
    }

    /// Create the batch progress bar, one tick per completed input
    pub fn start_progress(&self, total: u64) {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        if let Ok(mut guard) = self.progress_bar.lock() {
            *guard = Some(pb);
        }
    }

    pub fn tick(&self, message: &str) {
        if let Ok(guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(message.to_string());
                pb.inc(1);
            }
        }
    }

    pub fn finish_progress(&self) {
        if let Ok(mut guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}
