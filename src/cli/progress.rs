//! CLI-specific progress handling for ratefetch
//!
//! Provides the progress bar shown on stderr while downloading.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use ratefetch::ProgressCallback;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {bytes_per_sec} ETA: {eta} {msg}";

const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bytes} {bytes_per_sec} {msg}";

/// Creates a progress bar for a download of known size
pub fn create_progress_bar(total_size: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Spinner style for responses without a Content-Length
fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Progress bar shared between the CLI and the download callback
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_size: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_size);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Callback feeding the bar from the copy loop
    ///
    /// A total of zero means the size is unknown and switches the bar to a
    /// spinner.
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        let spinner = AtomicBool::new(false);
        Arc::new(move |downloaded, total| {
            if total == 0 {
                if !spinner.swap(true, Ordering::Relaxed) {
                    pb.set_style(spinner_style());
                }
            } else if pb.length() != Some(total) {
                pb.set_length(total);
            }
            pb.set_position(downloaded);
        })
    }

    pub fn finish(&self, message: &'static str) {
        self.pb.finish_with_message(message);
    }
}
