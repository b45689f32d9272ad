//! Keyword retriever over an in-memory corpus.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CapabilityError, CapabilityResult, SerializationError};
use crate::stores::CsvCorpusStore;
use crate::traits::retriever::Retriever;
use crate::types::record::Corpus;

pub const DEFAULT_TOP_K: usize = 5;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "with", "this", "that", "what", "which",
    "who", "how", "why", "does", "have", "has", "from", "about", "any", "can", "should", "best",
];

struct Entry {
    snippet: String,
    terms: HashSet<String>,
}

/// Ranks corpus rows by how many distinct query terms they contain.
///
/// Matching is on lowercase alphanumeric words longer than two characters,
/// minus a short stopword list. Ties keep corpus order. Rows with no
/// overlap are never returned.
pub struct CorpusRetriever {
    entries: Vec<Entry>,
    top_k: usize,
}

impl CorpusRetriever {
    pub fn from_corpus(corpus: &Corpus, top_k: usize) -> Self {
        let entries = corpus
            .iter()
            .map(|record| {
                let snippet = record.to_snippet();
                Entry {
                    terms: terms(&snippet),
                    snippet,
                }
            })
            .collect();

        Self {
            entries,
            top_k: top_k.max(1),
        }
    }

    /// Load a corpus CSV written by the collection pipeline.
    pub fn from_path(path: impl AsRef<Path>, top_k: usize) -> Result<Self, SerializationError> {
        let corpus = CsvCorpusStore::new(path.as_ref()).read()?;
        debug!(path = %path.as_ref().display(), rows = corpus.len(), "Corpus loaded for retrieval");
        Ok(Self::from_corpus(&corpus, top_k))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    fn rank(&self, query: &str) -> Vec<String> {
        let query_terms = terms(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &Entry)> = self
            .entries
            .iter()
            .map(|entry| (query_terms.intersection(&entry.terms).count(), entry))
            .filter(|(score, _)| *score > 0)
            .collect();

        // stable: equal scores stay in corpus order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(self.top_k)
            .map(|(_, entry)| entry.snippet.clone())
            .collect()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
        .collect()
}

#[async_trait]
impl Retriever for CorpusRetriever {
    async fn retrieve(&self, query: &str) -> CapabilityResult<Vec<String>> {
        if self.entries.is_empty() {
            return Err(CapabilityError::Unavailable("corpus is empty".to_string()));
        }

        let snippets = self.rank(query);
        debug!(matches = snippets.len(), "Corpus retrieval");
        Ok(snippets)
    }

    fn name(&self) -> &str {
        "corpus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::ReviewRecord;

    fn corpus() -> Corpus {
        Corpus::from_iter([
            ReviewRecord::new("Boat Airdopes 141", "4.1", "Good", "Decent bass, battery lasts long"),
            ReviewRecord::new("Noise Buds VS102", "4.0", "Great", "Noise cancelling works on the metro"),
            ReviewRecord::new("Realme Buds T110", "4.3", "Wonderful", "Active noise cancelling and great battery"),
        ])
    }

    #[tokio::test]
    async fn test_most_overlapping_rows_first() {
        let retriever = CorpusRetriever::from_corpus(&corpus(), 5);

        let snippets = retriever
            .retrieve("earbuds with noise cancelling and good battery")
            .await
            .unwrap();

        assert_eq!(snippets.len(), 3);
        assert!(snippets[0].starts_with("Product: Realme Buds T110"));
        // two-term tie: corpus order decides
        assert!(snippets[1].starts_with("Product: Boat Airdopes 141"));
        assert!(snippets[2].starts_with("Product: Noise Buds VS102"));
    }

    #[tokio::test]
    async fn test_top_k_and_no_overlap() {
        let retriever = CorpusRetriever::from_corpus(&corpus(), 1);

        assert_eq!(retriever.retrieve("battery").await.unwrap().len(), 1);
        assert!(retriever.retrieve("waterproof speaker").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ties_keep_corpus_order() {
        let retriever = CorpusRetriever::from_corpus(&corpus(), 5);
        let snippets = retriever.retrieve("battery").await.unwrap();

        assert!(snippets[0].contains("Airdopes"));
        assert!(snippets[1].contains("T110"));
    }

    #[tokio::test]
    async fn test_empty_corpus_is_unavailable() {
        let retriever = CorpusRetriever::from_corpus(&Corpus::new(), 5);
        assert!(matches!(
            retriever.retrieve("anything").await,
            Err(CapabilityError::Unavailable(_))
        ));
    }

    #[test]
    fn test_terms() {
        let t = terms("What are the BEST noise-cancelling earbuds?");
        assert!(t.contains("noise"));
        assert!(t.contains("cancelling"));
        assert!(t.contains("earbuds"));
        assert!(!t.contains("the"));
        assert!(!t.contains("best"));
    }

    #[test]
    fn test_from_path_reads_written_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        CsvCorpusStore::new(&path)
            .write(&corpus(), &crate::types::record::Column::DEFAULT_ORDER)
            .unwrap();

        let retriever = CorpusRetriever::from_path(&path, 3).unwrap();
        assert_eq!(retriever.len(), 3);
    }
}
