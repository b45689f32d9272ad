//! Record extraction from listing-page markup.
//!
//! A listing page carries the four review fields in four separately
//! selectable element groups. Extraction collects each group inside the
//! results container, then aligns them explicitly:
//!
//! 1. record *i* pairs the *i*-th title, rating, summary, and body
//! 2. if the groups disagree in length, the page is truncated to the
//!    shortest group and a [`CountMismatch`] is reported
//!
//! Field text is taken verbatim. Nothing is trimmed or parsed.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::{ConfigError, ExtractError, ExtractResult};
use crate::types::config::ExtractorSelectors;
use crate::types::record::ReviewRecord;
use crate::types::report::CountMismatch;

/// Records pulled from one page, plus what alignment had to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageExtraction {
    pub records: Vec<ReviewRecord>,

    /// Number of elements matching the container selector
    pub containers_found: usize,

    /// Set when field groups disagreed in length
    pub mismatch: Option<CountMismatch>,
}

impl PageExtraction {
    fn empty(containers_found: usize) -> Self {
        Self {
            records: Vec::new(),
            containers_found,
            mismatch: None,
        }
    }
}

/// Parses listing pages into review records using fixed CSS selectors.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    container: Selector,
    title: Selector,
    rating: Selector,
    summary: Selector,
    body: Selector,
}

fn compile(name: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        name,
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn texts(container: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    container
        .select(selector)
        .map(|el| el.text().collect::<String>())
        .collect()
}

impl RecordExtractor {
    /// Compile the selectors. Any invalid selector is a configuration error.
    pub fn new(selectors: &ExtractorSelectors) -> Result<Self, ConfigError> {
        Ok(Self {
            container: compile("container", &selectors.container)?,
            title: compile("title", &selectors.title)?,
            rating: compile("rating", &selectors.rating)?,
            summary: compile("summary", &selectors.summary)?,
            body: compile("body", &selectors.body)?,
        })
    }

    /// Extract the aligned records of one page.
    ///
    /// A page without a results container yields no records. With several
    /// containers, only the first in document order is read.
    pub fn extract(&self, markup: &str) -> ExtractResult<PageExtraction> {
        if markup.trim().is_empty() {
            return Err(ExtractError::EmptyMarkup);
        }
        if !looks_like_markup(markup) {
            return Err(ExtractError::NotMarkup {
                length: markup.len(),
            });
        }

        let document = Html::parse_document(markup);
        let mut containers = document.select(&self.container);

        let Some(container) = containers.next() else {
            debug!("No results container on page");
            return Ok(PageExtraction::empty(0));
        };

        let containers_found = 1 + containers.count();
        if containers_found > 1 {
            warn!(
                containers = containers_found,
                "Multiple results containers matched, reading the first"
            );
        }

        let titles = texts(container, &self.title);
        let ratings = texts(container, &self.rating);
        let summaries = texts(container, &self.summary);
        let bodies = texts(container, &self.body);

        let mismatch = CountMismatch::check(
            titles.len(),
            ratings.len(),
            summaries.len(),
            bodies.len(),
        );

        if let Some(m) = &mismatch {
            warn!(
                titles = m.titles,
                ratings = m.ratings,
                summaries = m.summaries,
                bodies = m.bodies,
                kept = m.kept(),
                dropped = m.dropped(),
                "Field group counts disagree, truncating to shortest"
            );
        }

        // zip stops at the shortest group
        let records: Vec<ReviewRecord> = titles
            .into_iter()
            .zip(ratings)
            .zip(summaries)
            .zip(bodies)
            .map(|(((title, rating), summary), body)| ReviewRecord {
                title,
                rating,
                summary,
                body,
            })
            .collect();

        debug!(records = records.len(), "Page extracted");

        Ok(PageExtraction {
            records,
            containers_found,
            mismatch,
        })
    }
}

/// True if the text contains at least one tag-like `<x` sequence.
fn looks_like_markup(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'!' || w[1] == b'/'))
}
