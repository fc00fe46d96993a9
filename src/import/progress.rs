//! Progress display for hotel shards

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;

/// Progress bar for one hotel shard
pub struct ShardProgress {
    /// Progress bar (None if running in quiet mode)
    progress_bar: Option<ProgressBar>,
    start_time: Instant,
    transformed: u64,
}

impl ShardProgress {
    pub fn new(shard: &Path, total: u64, quiet: bool) -> Self {
        let progress_bar = if !quiet {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{prefix} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            let name = shard
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            pb.set_prefix(name);
            Some(pb)
        } else {
            None
        };

        Self {
            progress_bar,
            start_time: Instant::now(),
            transformed: 0,
        }
    }

    /// Advance after one hotel has been transformed
    pub fn hotel_transformed(&mut self, name: &str) {
        self.transformed += 1;

        if let Some(ref pb) = self.progress_bar {
            pb.set_position(self.transformed);

            // Truncate on char boundaries
            let display_name = if name.chars().count() > 30 {
                let truncated: String = name.chars().take(27).collect();
                format!("{}...", truncated)
            } else {
                name.to_string()
            };
            pb.set_message(format!("{:.1} hotels/s | {}", self.rate(), display_name));
        }
    }

    /// Hotels transformed so far
    pub fn transformed(&self) -> u64 {
        self.transformed
    }

    fn rate(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.transformed as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Finish the progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(format!("Done! {} hotels, {:.1} hotels/s", self.transformed, self.rate()));
        }
    }

    /// Abandon the bar when the shard fails
    pub fn abandon(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.abandon_with_message("Aborted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn counts_transformed_hotels_in_quiet_mode() {
        let mut progress = ShardProgress::new(&PathBuf::from("/tmp/Property_1.json"), 3, true);
        progress.hotel_transformed("Sea View");
        progress.hotel_transformed("A hotel with a rather long name that gets truncated");
        assert_eq!(progress.transformed(), 2);
        progress.finish();
    }
}
