//! Vector retrieval of profile documents

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::errors::Result;
use crate::models::ProfileDocument;
use crate::models::ProfileField;

/// Default number of documents returned per query
pub const DEFAULT_LIMIT: usize = 3;

/// Candidate pool examined by the approximate nearest-neighbor search
pub const DEFAULT_NUM_CANDIDATES: usize = 49;

/// Equality conditions applied to document metadata after the vector search
///
/// An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentFilter(Map<String, Value>);

impl DocumentFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` to equal `value`
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The filter as a JSON object, suitable for containment queries
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// A nearest-neighbor request handed to the document store
#[derive(Debug, Clone)]
pub struct VectorQuery {
    pub embedding: Vec<f32>,
    pub index_name: String,
    pub collection_field: String,
    pub num_candidates: usize,
    pub limit: usize,
    pub filter: DocumentFilter,
}

/// Storage that can answer vector-similarity queries over profile documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run the query, returning at most `limit` documents, most similar first
    ///
    /// # Errors
    /// - Store unreachable or query rejected
    async fn vector_search(&self, query: &VectorQuery) -> Result<Vec<ProfileDocument>>;
}

/// Retriever for profile documents
pub struct Retriever {
    store: Arc<dyn DocumentStore>,
    num_candidates: usize,
}

impl Retriever {
    /// Create a new retriever with the default candidate pool
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_candidates(store, DEFAULT_NUM_CANDIDATES)
    }

    pub fn with_candidates(store: Arc<dyn DocumentStore>, num_candidates: usize) -> Self {
        Self {
            store,
            num_candidates,
        }
    }

    /// Top `limit` documents for `embedding`, most similar first
    ///
    /// An empty embedding means no vector could be produced for the message;
    /// the store is not queried and the result is empty. A store with no
    /// matches also yields an empty result.
    ///
    /// # Errors
    /// - Document store failures
    pub async fn retrieve(
        &self,
        embedding: &[f32],
        index_name: &str,
        collection_field: &str,
        limit: usize,
        filter: &DocumentFilter,
    ) -> Result<Vec<ProfileDocument>> {
        if embedding.is_empty() {
            debug!("No query embedding available, skipping retrieval");
            return Ok(Vec::new());
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = VectorQuery {
            embedding: embedding.to_vec(),
            index_name: index_name.to_string(),
            collection_field: collection_field.to_string(),
            num_candidates: self.num_candidates.max(limit),
            limit,
            filter: filter.clone(),
        };

        let mut documents = self.store.vector_search(&query).await?;
        documents.sort_by(|a, b| b.score.total_cmp(&a.score));
        documents.truncate(limit);

        debug!(
            filtered = !filter.is_empty(),
            "Retrieved {} document(s) from {}",
            documents.len(),
            index_name
        );
        Ok(documents)
    }
}

/// Parse every present field of every document and re-serialize it
///
/// Documents stay in retrieval order and fields follow [`ProfileField::ALL`].
/// A field that is not valid JSON is logged and skipped; the remaining fields
/// are still extracted.
#[must_use]
pub fn extract_field_texts(documents: &[ProfileDocument]) -> Vec<String> {
    let mut texts = Vec::new();

    for (idx, document) in documents.iter().enumerate() {
        for field in ProfileField::ALL {
            let Some(raw) = document.field(field) else {
                continue;
            };
            let parsed = serde_json::from_str::<Value>(raw)
                .and_then(|value| serde_json::to_string_pretty(&value));
            match parsed {
                Ok(text) => texts.push(text),
                Err(e) => warn!(
                    "Skipping malformed {} in document {}: {}",
                    field.key(),
                    idx + 1,
                    e
                ),
            }
        }
    }

    texts
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Store that returns canned documents and remembers the last query
    struct CannedStore {
        documents: Vec<ProfileDocument>,
        last_query: Mutex<Option<VectorQuery>>,
    }

    #[async_trait]
    impl DocumentStore for CannedStore {
        async fn vector_search(&self, query: &VectorQuery) -> Result<Vec<ProfileDocument>> {
            *self.last_query.lock().unwrap() = Some(query.clone());
            Ok(self.documents.clone())
        }
    }

    fn doc(resume: Option<&str>, github: Option<&str>, score: f64) -> ProfileDocument {
        ProfileDocument {
            resume_data: resume.map(str::to_string),
            github_data: github.map(str::to_string),
            linkedin_data: None,
            score,
        }
    }

    fn canned(documents: Vec<ProfileDocument>) -> Arc<CannedStore> {
        Arc::new(CannedStore {
            documents,
            last_query: Mutex::new(None),
        })
    }

    #[tokio::test]
    async fn test_empty_embedding_skips_store() {
        let store = canned(vec![doc(Some("{}"), None, 0.9)]);
        let retriever = Retriever::new(store.clone());

        let result = retriever
            .retrieve(&[], "idx", "embedding", 3, &DocumentFilter::new())
            .await
            .unwrap();

        assert!(result.is_empty());
        assert!(store.last_query.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_results_limited_and_ordered() {
        let store = canned(vec![
            doc(Some("{\"a\":1}"), None, 0.2),
            doc(Some("{\"b\":2}"), None, 0.9),
            doc(Some("{\"c\":3}"), None, 0.5),
            doc(Some("{\"d\":4}"), None, 0.7),
        ]);
        let retriever = Retriever::new(store.clone());

        let result = retriever
            .retrieve(&[0.1, 0.2], "idx", "embedding", 3, &DocumentFilter::new())
            .await
            .unwrap();

        let scores: Vec<f64> = result.iter().map(|d| d.score).collect();
        assert_eq!(scores, vec![0.9, 0.7, 0.5]);

        let query = store.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(query.num_candidates, DEFAULT_NUM_CANDIDATES);
        assert_eq!(query.limit, 3);
        assert_eq!(query.index_name, "idx");
    }

    #[tokio::test]
    async fn test_no_matches_is_not_an_error() {
        let retriever = Retriever::new(canned(Vec::new()));
        let result = retriever
            .retrieve(&[1.0], "idx", "embedding", DEFAULT_LIMIT, &DocumentFilter::new())
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_extract_skips_only_the_malformed_field() {
        let documents = vec![
            doc(Some(r#"{"skills":["Python","Rust"]}"#), Some("{not json"), 0.9),
            doc(Some(r#"{"role":"Engineer"}"#), None, 0.8),
        ];

        let texts = extract_field_texts(&documents);

        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("\"Python\""));
        assert!(texts[1].contains("\"role\": \"Engineer\""));
        assert!(!texts.iter().any(|t| t.contains("not json")));
    }

    #[test]
    fn test_extract_keeps_field_order_and_key_order() {
        let documents = vec![ProfileDocument {
            resume_data: Some(r#"{"z":1,"a":2}"#.to_string()),
            github_data: Some(r#"[{"repo":"x"}]"#.to_string()),
            linkedin_data: Some(r#"{"headline":"Dev"}"#.to_string()),
            score: 1.0,
        }];

        let texts = extract_field_texts(&documents);

        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0], "{\n  \"z\": 1,\n  \"a\": 2\n}");
        assert!(texts[1].contains("repo"));
        assert!(texts[2].contains("headline"));
    }

    #[test]
    fn test_filter_as_containment_value() {
        let filter = DocumentFilter::new().with("owner", "naisarg").with("version", 2);
        assert!(!filter.is_empty());
        assert!(DocumentFilter::new().is_empty());
        assert_eq!(DocumentFilter::new().to_value(), json!({}));
        assert_eq!(filter.to_value(), json!({"owner": "naisarg", "version": 2}));
    }
}
