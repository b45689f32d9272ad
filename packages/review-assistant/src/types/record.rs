//! Review records, the corpus they accumulate into, and its column schema.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// One scraped review entity.
///
/// Field text is kept exactly as it appeared in the page. `rating` in
/// particular is never coerced to a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub title: String,
    pub rating: String,
    pub summary: String,
    pub body: String,
}

impl ReviewRecord {
    pub fn new(
        title: impl Into<String>,
        rating: impl Into<String>,
        summary: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            rating: rating.into(),
            summary: summary.into(),
            body: body.into(),
        }
    }

    /// Value of `column` for this record at corpus position `index`.
    pub fn field(&self, column: Column, index: usize) -> Cow<'_, str> {
        match column {
            Column::Index => Cow::Owned(index.to_string()),
            Column::Title => Cow::Borrowed(&self.title),
            Column::Rating => Cow::Borrowed(&self.rating),
            Column::Summary => Cow::Borrowed(&self.summary),
            Column::Review => Cow::Borrowed(&self.body),
        }
    }

    /// Render the record as a retrieval snippet.
    pub fn to_snippet(&self) -> String {
        format!(
            "Product: {}\nRating: {}\nSummary: {}\nReview: {}",
            self.title.trim(),
            self.rating.trim(),
            self.summary.trim(),
            self.body.trim()
        )
    }
}

/// A column of the corpus artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Index,
    Title,
    Rating,
    Summary,
    Review,
}

impl Column {
    /// Default artifact layout: `index, title, rating, summary, review`.
    pub const DEFAULT_ORDER: [Column; 5] = [
        Column::Index,
        Column::Title,
        Column::Rating,
        Column::Summary,
        Column::Review,
    ];

    /// Header text for this column.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Title => "title",
            Self::Rating => "rating",
            Self::Summary => "summary",
            Self::Review => "review",
        }
    }

    /// Parse a comma-separated column list such as `"title,rating,review"`.
    pub fn parse_list(s: &str) -> Result<Vec<Column>, ConfigError> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Column::from_str)
            .collect()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Column {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "index" => Ok(Self::Index),
            "title" | "product_title" => Ok(Self::Title),
            "rating" => Ok(Self::Rating),
            "summary" => Ok(Self::Summary),
            "review" | "body" => Ok(Self::Review),
            _ => Err(ConfigError::UnknownColumn(s.to_string())),
        }
    }
}

/// Ordered, append-only collection of review records.
///
/// Records only ever get appended; there is no removal or in-place edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    records: Vec<ReviewRecord>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page's records, preserving their order.
    pub fn append(&mut self, records: impl IntoIterator<Item = ReviewRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReviewRecord> {
        self.records.iter()
    }
}

impl FromIterator<ReviewRecord> for Corpus {
    fn from_iter<I: IntoIterator<Item = ReviewRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a ReviewRecord;
    type IntoIter = std::slice::Iter<'a, ReviewRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
