//! Per-run outcome of a corpus collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which step of a page failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    Extract,
}

/// A page that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub page: u32,
    pub kind: FailureKind,
    pub reason: String,
}

/// Field-group counts that disagreed on one page.
///
/// Records beyond the shortest group are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMismatch {
    pub titles: usize,
    pub ratings: usize,
    pub summaries: usize,
    pub bodies: usize,
}

impl CountMismatch {
    /// Build from the four group counts, or `None` when they agree.
    pub fn check(titles: usize, ratings: usize, summaries: usize, bodies: usize) -> Option<Self> {
        if titles == ratings && ratings == summaries && summaries == bodies {
            None
        } else {
            Some(Self {
                titles,
                ratings,
                summaries,
                bodies,
            })
        }
    }

    /// Records kept after alignment.
    pub fn kept(&self) -> usize {
        self.titles
            .min(self.ratings)
            .min(self.summaries)
            .min(self.bodies)
    }

    /// Largest group count.
    pub fn largest(&self) -> usize {
        self.titles
            .max(self.ratings)
            .max(self.summaries)
            .max(self.bodies)
    }

    /// Elements that could not be paired.
    pub fn dropped(&self) -> usize {
        self.titles + self.ratings + self.summaries + self.bodies - 4 * self.kept()
    }
}

/// Count mismatch observed on a specific page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWarning {
    pub page: u32,
    pub mismatch: CountMismatch,
}

/// Summary of a collection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub pages_attempted: usize,
    pub pages_succeeded: usize,
    pub records_collected: usize,
    pub failures: Vec<PageFailure>,
    pub warnings: Vec<PageWarning>,
}

impl CollectionReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            pages_attempted: 0,
            pages_succeeded: 0,
            records_collected: 0,
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn record_success(&mut self, records: usize) {
        self.pages_attempted += 1;
        self.pages_succeeded += 1;
        self.records_collected += records;
    }

    pub(crate) fn record_failure(&mut self, page: u32, kind: FailureKind, reason: String) {
        self.pages_attempted += 1;
        self.failures.push(PageFailure { page, kind, reason });
    }

    pub(crate) fn record_warning(&mut self, page: u32, mismatch: CountMismatch) {
        self.warnings.push(PageWarning { page, mismatch });
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Pages that failed, in visiting order.
    pub fn failed_pages(&self) -> Vec<u32> {
        self.failures.iter().map(|f| f.page).collect()
    }

    /// True if every page was fetched and extracted.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Default for CollectionReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_mismatch_agreeing_counts() {
        assert_eq!(CountMismatch::check(3, 3, 3, 3), None);
    }

    #[test]
    fn test_count_mismatch_truncation() {
        let mismatch = CountMismatch::check(4, 3, 4, 2).unwrap();
        assert_eq!(mismatch.kept(), 2);
        assert_eq!(mismatch.largest(), 4);
        assert_eq!(mismatch.dropped(), 5);
    }

    #[test]
    fn test_report_tracks_pages() {
        let mut report = CollectionReport::new();
        report.record_success(3);
        report.record_failure(5, FailureKind::Fetch, "HTTP 500".into());
        report.finish();

        assert_eq!(report.pages_attempted, 2);
        assert_eq!(report.pages_succeeded, 1);
        assert_eq!(report.records_collected, 3);
        assert_eq!(report.failed_pages(), vec![5]);
        assert!(!report.is_success());
        assert!(report.finished_at.is_some());
    }
}
