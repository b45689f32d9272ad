//! Corpus collection pipeline - fetch, extract, accumulate, serialize.

use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::SerializationError;
use crate::pipeline::extract::RecordExtractor;
use crate::stores::CsvCorpusStore;
use crate::traits::fetcher::PageFetcher;
use crate::types::{
    config::{CollectionConfig, PageRange},
    record::Corpus,
    report::{CollectionReport, FailureKind},
};

/// Corpus plus the report of the run that produced it.
#[derive(Debug, Clone)]
pub struct Collection {
    pub corpus: Corpus,
    pub report: CollectionReport,
}

/// Drives a fetcher and an extractor across a page range.
///
/// Pages are visited strictly one at a time in ascending order. A page that
/// fails to fetch or extract is recorded and skipped; it never aborts the run.
///
/// # Example
///
/// ```rust,ignore
/// let builder = CorpusBuilder::new(HttpPageFetcher::new(fetch_config)?, extractor);
/// let config = CollectionConfig::new(PageRange::new(2, 11)?, "data/reviews.csv");
/// let collection = builder.build(&config).await?;
/// println!("{} rows, {} failed pages", collection.corpus.len(), collection.report.failure_count());
/// ```
pub struct CorpusBuilder<F: PageFetcher> {
    fetcher: F,
    extractor: RecordExtractor,
}

impl<F: PageFetcher> CorpusBuilder<F> {
    pub fn new(fetcher: F, extractor: RecordExtractor) -> Self {
        Self { fetcher, extractor }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Collect records from every page in `range` without writing anything.
    ///
    /// `delay` is slept between consecutive page requests.
    pub async fn collect(&self, range: PageRange, delay: std::time::Duration) -> Collection {
        let mut corpus = Corpus::new();
        let mut report = CollectionReport::new();

        let span = info_span!("collect", run_id = %report.run_id, pages = %range);
        async {
            info!(fetcher = self.fetcher.name(), "Collecting review corpus");

            for (i, page) in range.pages().enumerate() {
                if i > 0 && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }

                let markup = match self.fetcher.fetch(page).await {
                    Ok(markup) => markup,
                    Err(e) => {
                        warn!(page, error = %e, "Skipping page: fetch failed");
                        report.record_failure(page, FailureKind::Fetch, e.to_string());
                        continue;
                    }
                };

                let extraction = match self.extractor.extract(&markup) {
                    Ok(extraction) => extraction,
                    Err(e) => {
                        warn!(page, error = %e, "Skipping page: extraction failed");
                        report.record_failure(page, FailureKind::Extract, e.to_string());
                        continue;
                    }
                };

                if let Some(mismatch) = extraction.mismatch {
                    report.record_warning(page, mismatch);
                }

                debug!(page, records = extraction.records.len(), "Page collected");
                report.record_success(extraction.records.len());
                corpus.append(extraction.records);
            }

            report.finish();
            info!(
                pages_attempted = report.pages_attempted,
                pages_succeeded = report.pages_succeeded,
                pages_failed = report.failure_count(),
                records = corpus.len(),
                warnings = report.warnings.len(),
                "Collection complete"
            );
        }
        .instrument(span)
        .await;

        Collection { corpus, report }
    }

    /// Collect the configured range and write the corpus to `config.output_path`.
    ///
    /// Page failures are tolerated; a write failure aborts the build.
    pub async fn build(&self, config: &CollectionConfig) -> Result<Collection, SerializationError> {
        let collection = self
            .collect(config.page_range, config.delay_between_pages)
            .await;

        CsvCorpusStore::new(&config.output_path).write(&collection.corpus, &config.columns)?;

        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockPageFetcher;
    use crate::testing::ListingPage;
    use crate::types::config::ExtractorSelectors;
    use crate::types::record::{Column, ReviewRecord};
    use std::time::Duration;

    fn builder(fetcher: MockPageFetcher) -> CorpusBuilder<MockPageFetcher> {
        let extractor = RecordExtractor::new(&ExtractorSelectors::default()).unwrap();
        CorpusBuilder::new(fetcher, extractor)
    }

    #[tokio::test]
    async fn test_single_page_three_records() {
        let html = ListingPage::new()
            .review("A", "4.0", "sa", "ba")
            .review("B", "4.1", "sb", "bb")
            .review("C", "4.2", "sc", "bc")
            .render();
        let builder = builder(MockPageFetcher::new().with_page(2, html));

        let collection = builder
            .collect(PageRange::single(2), Duration::ZERO)
            .await;

        assert_eq!(collection.corpus.len(), 3);
        assert_eq!(
            collection.corpus.records()[1],
            ReviewRecord::new("B", "4.1", "sb", "bb")
        );
        assert!(collection.report.is_success());
        assert_eq!(collection.report.records_collected, 3);
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped() {
        let page3 = ListingPage::new().review("Only", "5", "s", "b").render();
        let fetcher = MockPageFetcher::new().with_status(2, 503).with_page(3, page3);
        let builder = builder(fetcher);

        let collection = builder
            .collect(PageRange::new(2, 3).unwrap(), Duration::ZERO)
            .await;

        assert_eq!(collection.corpus.len(), 1);
        assert_eq!(collection.report.failure_count(), 1);
        assert_eq!(collection.report.failed_pages(), vec![2]);
        assert_eq!(collection.report.failures[0].kind, FailureKind::Fetch);
        assert_eq!(builder.fetcher().calls(), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_extract_failure_is_recorded() {
        let fetcher = MockPageFetcher::new()
            .with_page(1, "plain text, no tags")
            .with_page(2, ListingPage::new().review("A", "1", "s", "b").render());
        let collection = builder(fetcher)
            .collect(PageRange::new(1, 2).unwrap(), Duration::ZERO)
            .await;

        assert_eq!(collection.corpus.len(), 1);
        assert_eq!(collection.report.failures[0].page, 1);
        assert_eq!(collection.report.failures[0].kind, FailureKind::Extract);
    }

    #[tokio::test]
    async fn test_preserves_page_then_record_order() {
        let fetcher = MockPageFetcher::new()
            .with_page(
                4,
                ListingPage::new()
                    .review("p4-a", "1", "s", "b")
                    .review("p4-b", "1", "s", "b")
                    .render(),
            )
            .with_page(5, ListingPage::new().review("p5-a", "1", "s", "b").render());
        let collection = builder(fetcher)
            .collect(PageRange::new(4, 5).unwrap(), Duration::ZERO)
            .await;

        let titles: Vec<_> = collection.corpus.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["p4-a", "p4-b", "p5-a"]);
    }

    #[tokio::test]
    async fn test_mismatch_recorded_as_warning() {
        let html = ListingPage::new()
            .review("A", "1", "s", "b")
            .title_only("B")
            .render();
        let collection = builder(MockPageFetcher::new().with_page(2, html))
            .collect(PageRange::single(2), Duration::ZERO)
            .await;

        assert_eq!(collection.corpus.len(), 1);
        assert!(collection.report.is_success());
        assert_eq!(collection.report.warnings.len(), 1);
        assert_eq!(collection.report.warnings[0].page, 2);
    }

    #[tokio::test]
    async fn test_build_writes_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("reviews.csv");
        let html = ListingPage::new().review("A", "4.3", "s", "b").render();

        let config = CollectionConfig::new(PageRange::single(2), &output)
            .with_columns(vec![Column::Title, Column::Rating]);
        builder(MockPageFetcher::new().with_page(2, html))
            .build(&config)
            .await
            .unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text, "title,rating\nA,4.3\n");
    }

    #[tokio::test]
    async fn test_build_fails_when_output_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let config = CollectionConfig::new(PageRange::single(2), blocker.join("out.csv"));
        let result = builder(MockPageFetcher::new()).build(&config).await;

        assert!(matches!(result, Err(SerializationError::Io { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_pages() {
        let fetcher = MockPageFetcher::new();
        let builder = builder(fetcher);

        let started = tokio::time::Instant::now();
        builder
            .collect(PageRange::new(1, 3).unwrap(), Duration::from_millis(500))
            .await;

        // two gaps between three pages
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1500));
    }
}
