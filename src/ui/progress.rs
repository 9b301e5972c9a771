use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Creates progress bars, or hidden ones when output is disabled
pub struct ProgressManager {
    show_progress: bool,
}

impl ProgressManager {
    /// Manager that draws to the terminal
    pub fn new() -> Self {
        Self {
            show_progress: true,
        }
    }

    /// Manager whose bars draw nothing, for tests and non-interactive runs
    pub fn hidden() -> Self {
        Self {
            show_progress: false,
        }
    }

    /// Spinner for a step without a known row count
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    /// Bar counting processed rows of a stage
    pub fn create_row_bar(&self, total: usize, message: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}
