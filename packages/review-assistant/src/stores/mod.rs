//! Storage for the corpus artifact.
//!
//! Available backends:
//! - `CsvCorpusStore` - CSV file with a header row

pub mod csv_file;

pub use csv_file::{write_rows, CsvCorpusStore};
