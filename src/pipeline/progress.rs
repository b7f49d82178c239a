// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for record screening
// reference: uses indicatif for progress bars and tracks screening counts

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::cell::Cell;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub records_seen: usize,
    pub records_included: usize,
    pub records_excluded: usize,
    pub duration_ms: u128,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inclusion_rate(&self) -> f64 {
        let total = self.records_included + self.records_excluded;
        if total == 0 {
            return 0.0;
        }
        (self.records_included as f64 / total as f64) * 100.0
    }

    pub fn records_per_second(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.records_seen as f64 / (self.duration_ms as f64 / 1000.0)
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    records_included: Cell<usize>,
    records_excluded: Cell<usize>,
    start_time: Instant,
}

impl ProgressTracker {
    /// Tracker that counts but never draws.
    pub fn hidden(total_records: usize) -> Self {
        Self::build(total_records, false, ProgressDrawTarget::hidden())
    }

    pub fn with_color(total_records: usize, colored: bool) -> Self {
        Self::build(total_records, colored, ProgressDrawTarget::stderr())
    }

    fn build(total_records: usize, colored: bool, target: ProgressDrawTarget) -> Self {
        let multi_progress = MultiProgress::with_draw_target(target);

        let main_bar = create_progress_bar(&multi_progress, total_records as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            records_included: Cell::new(0),
            records_excluded: Cell::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn inc_included(&self) {
        self.records_included.set(self.records_included.get() + 1);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_excluded(&self) {
        self.records_excluded.set(self.records_excluded.get() + 1);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Screening complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> PipelineStats {
        let included = self.records_included.get();
        let excluded = self.records_excluded.get();

        PipelineStats {
            records_seen: included + excluded,
            records_included: included,
            records_excluded: excluded,
            duration_ms: self.start_time.elapsed().as_millis(),
        }
    }

    fn update_detail_bar(&self) {
        let included = self.records_included.get();
        let excluded = self.records_excluded.get();

        let message = format!("Included: {} | Excluded: {}", included, excluded);

        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}"
    } else {
        "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"
    };

    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        let chars = if colored { "█▓▒░" } else { "=>-" };
        bar.set_style(style.progress_chars(chars));
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    if let Ok(style) = ProgressStyle::default_bar().template("{msg}") {
        bar.set_style(style);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_stats_calculations() {
        let mut stats = PipelineStats::new();
        stats.records_seen = 110;
        stats.records_included = 100;
        stats.records_excluded = 10;
        stats.duration_ms = 11_000;

        assert_eq!(stats.records_per_second(), 10.0);
        assert!((stats.inclusion_rate() - 90.909).abs() < 0.01);
    }

    #[test]
    fn test_pipeline_stats_zero_duration() {
        let stats = PipelineStats::new();
        assert_eq!(stats.records_per_second(), 0.0);
        assert_eq!(stats.inclusion_rate(), 0.0);
    }

    #[test]
    fn test_progress_tracker_counts() {
        let tracker = ProgressTracker::hidden(3);

        tracker.inc_included();
        tracker.inc_excluded();
        tracker.inc_excluded();

        let stats = tracker.get_stats();
        assert_eq!(stats.records_seen, 3);
        assert_eq!(stats.records_included, 1);
        assert_eq!(stats.records_excluded, 2);
    }
}
