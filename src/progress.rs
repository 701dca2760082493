//! # Progress Tracking and Batch Report Module
//!
//! Questo modulo gestisce il feedback durante un batch e il report aggregato finale.
//!
//! ## Responsabilità:
//! - Progress bar visuale con `indicatif` per i batch da CLI
//! - `BatchReport`: contatori resized / skipped / errors + byte risparmiati
//! - Testo del riepilogo mostrato come notice alla fine del batch
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========================>---------------] 84/140 (60%) photo.png: 3840x2160 -> 1920x1080
//! ```
//!
//! ## Esempio:
//! ```ignore
//! let progress = ProgressManager::new(files.len() as u64);
//! let mut report = BatchReport::default();
//!
//! report.add_resized(original_size, new_size);
//! progress.update("photo.png: 3840x2160 -> 1920x1080");
//!
//! progress.finish(&report.format_summary("vault"));
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Progress bar for batch runs
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A progress manager that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Advance by one file and show a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Aggregate result of one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub resized_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    pub total_original_size: u64,
    pub total_bytes_saved: u64,
}

impl BatchReport {
    pub fn add_resized(&mut self, original_size: u64, new_size: u64) {
        self.resized_count += 1;
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    pub fn add_skipped(&mut self) {
        self.skipped_count += 1;
    }

    pub fn add_error(&mut self) {
        self.error_count += 1;
    }

    pub fn files_processed(&self) -> usize {
        self.resized_count + self.skipped_count + self.error_count
    }

    /// User-facing summary for a batch over `scope`
    pub fn format_summary(&self, scope: &str) -> String {
        let mut summary = format!(
            "Resized {} image{} in {}",
            self.resized_count,
            if self.resized_count == 1 { "" } else { "s" },
            scope
        );
        if self.skipped_count > 0 {
            summary.push_str(&format!(", {} already within limits", self.skipped_count));
        }
        if self.error_count > 0 {
            summary.push_str(&format!(", {} failed", self.error_count));
        }
        if self.total_bytes_saved > 0 {
            summary.push_str(&format!(" ({} saved)", format_size(self.total_bytes_saved)));
        }
        summary
    }
}

/// Human-readable byte size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = BatchReport::default();
        report.add_resized(1000, 400);
        report.add_resized(500, 600);
        report.add_skipped();
        report.add_error();

        assert_eq!(report.resized_count, 2);
        assert_eq!(report.files_processed(), 4);
        assert_eq!(report.total_original_size, 1500);
        assert_eq!(report.total_bytes_saved, 600);
    }

    #[test]
    fn test_format_summary() {
        let mut report = BatchReport::default();
        report.add_resized(2048, 1024);
        assert_eq!(report.format_summary("vault"), "Resized 1 image in vault (1.0 KB saved)");

        report.add_skipped();
        report.add_error();
        report.add_resized(10, 10);
        assert_eq!(
            report.format_summary("attachments"),
            "Resized 2 images in attachments, 1 already within limits, 1 failed (1.0 KB saved)"
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
