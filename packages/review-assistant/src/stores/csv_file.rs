//! CSV persistence for the review corpus.
//!
//! The artifact is UTF-8, comma-delimited, with a header row. Rows are
//! written in corpus order; `index` is the zero-based row position.
//!
//! Writes go to a sibling temporary file that replaces the destination only
//! once every row is flushed, so a failed run never leaves a half-written
//! corpus behind.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::SerializationError;
use crate::types::record::{Column, Corpus, ReviewRecord};

/// A corpus CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvCorpusStore {
    path: PathBuf,
}

impl CsvCorpusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `corpus` with the given column order, replacing any existing file.
    pub fn write(&self, corpus: &Corpus, columns: &[Column]) -> Result<(), SerializationError> {
        if columns.is_empty() {
            return Err(SerializationError::NoColumns);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SerializationError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let staging = self.staging_path();
        let file = fs::File::create(&staging).map_err(|source| SerializationError::Io {
            path: staging.clone(),
            source,
        })?;

        let result = write_rows(file, corpus, columns).map_err(|source| SerializationError::Csv {
            path: staging.clone(),
            source,
        });
        if let Err(e) = result {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }

        fs::rename(&staging, &self.path).map_err(|source| {
            let _ = fs::remove_file(&staging);
            SerializationError::Io {
                path: self.path.clone(),
                source,
            }
        })?;

        info!(
            path = %self.path.display(),
            rows = corpus.len(),
            columns = columns.len(),
            "Corpus written"
        );
        Ok(())
    }

    /// Load a corpus written by [`CsvCorpusStore::write`].
    ///
    /// Columns are located by header name, so any column order is accepted.
    /// `title`, `rating`, `summary`, and `review` must all be present.
    pub fn read(&self) -> Result<Corpus, SerializationError> {
        let csv_error = |source: csv::Error| SerializationError::Csv {
            path: self.path.clone(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(csv_error)?;

        let headers = reader.headers().map_err(csv_error)?.clone();
        let position = |column: Column| {
            headers
                .iter()
                .position(|h| h.trim() == column.header())
                .ok_or_else(|| SerializationError::MissingColumn {
                    path: self.path.clone(),
                    column: column.header().to_string(),
                })
        };

        let title = position(Column::Title)?;
        let rating = position(Column::Rating)?;
        let summary = position(Column::Summary)?;
        let review = position(Column::Review)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(csv_error)?;
            let cell = |i: usize| row.get(i).unwrap_or_default().to_string();
            records.push(ReviewRecord {
                title: cell(title),
                rating: cell(rating),
                summary: cell(summary),
                body: cell(review),
            });
        }

        debug!(path = %self.path.display(), rows = records.len(), "Corpus loaded");
        Ok(records.into_iter().collect())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "corpus.csv".into());
        name.push(".partial");
        self.path.with_file_name(name)
    }
}

/// Serialize `corpus` into any writer.
pub fn write_rows<W: Write>(
    writer: W,
    corpus: &Corpus,
    columns: &[Column],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(columns.iter().map(Column::header))?;
    for (index, record) in corpus.iter().enumerate() {
        let row: Vec<Cow<'_, str>> = columns.iter().map(|c| record.field(*c, index)).collect();
        csv_writer.write_record(row.iter().map(|value| value.as_bytes()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Corpus {
        vec![
            ReviewRecord::new("Buds A", "4.1", "Good", "Nice, clear sound"),
            ReviewRecord::new("Buds B", "★★★", "Okay", "Bass is \"fine\""),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_write_rows_default_columns() {
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &sample(), &Column::DEFAULT_ORDER).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("index,title,rating,summary,review"));
        assert_eq!(lines.next(), Some("0,Buds A,4.1,Good,\"Nice, clear sound\""));
        assert_eq!(lines.next(), Some("1,Buds B,★★★,Okay,\"Bass is \"\"fine\"\"\""));
    }

    #[test]
    fn test_write_rows_custom_column_order() {
        let mut buffer = Vec::new();
        let columns = [Column::Rating, Column::Title];
        write_rows(&mut buffer, &sample(), &columns).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("rating,title\n4.1,Buds A\n"));
    }

    #[test]
    fn test_write_then_read_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvCorpusStore::new(dir.path().join("data").join("reviews.csv"));

        store.write(&sample(), &Column::DEFAULT_ORDER).unwrap();
        let loaded = store.read().unwrap();

        assert_eq!(loaded, sample());
        assert!(!dir.path().join("data").join("reviews.csv.partial").exists());
    }

    #[test]
    fn test_empty_corpus_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        CsvCorpusStore::new(&path)
            .write(&Corpus::new(), &Column::DEFAULT_ORDER)
            .unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "index,title,rating,summary,review\n");
    }

    #[test]
    fn test_unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let store = CsvCorpusStore::new(blocker.join("reviews.csv"));
        let err = store.write(&sample(), &Column::DEFAULT_ORDER).unwrap_err();
        assert!(matches!(err, SerializationError::Io { .. }));
    }

    #[test]
    fn test_empty_column_list_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvCorpusStore::new(dir.path().join("x.csv"));
        assert!(matches!(
            store.write(&sample(), &[]),
            Err(SerializationError::NoColumns)
        ));
    }

    #[test]
    fn test_read_requires_review_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        fs::write(&path, "index,title\n0,Buds\n").unwrap();

        let err = CsvCorpusStore::new(&path).read().unwrap_err();
        assert!(matches!(
            err,
            SerializationError::MissingColumn { ref column, .. } if column == "rating"
        ));
    }
}
