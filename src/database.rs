use async_trait::async_trait;
use once_cell::sync::Lazy;
use pgvector::Vector;
use regex::Regex;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use tracing::info;

use crate::errors::ProfileChatError;
use crate::errors::UpstreamService;
use crate::models::ProfileDocument;
use crate::rag::retriever::DocumentStore;
use crate::rag::retriever::VectorQuery;
use crate::Result;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Reject names that cannot be spliced into SQL as bare identifiers
pub(crate) fn checked_identifier<'a>(kind: &str, name: &'a str) -> Result<&'a str> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(ProfileChatError::ConfigError(format!(
            "invalid {kind} identifier: {name:?}"
        )))
    }
}

/// Database connection pool wrapper holding the profile document table
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
    table: String,
    index_name: String,
    collection_field: String,
    dimension: usize,
}

impl Database {
    /// Wrap an existing pool
    ///
    /// # Errors
    /// Returns `ConfigError` if the table, index or column name is not a
    /// plain SQL identifier.
    pub fn new(
        pool: PgPool,
        table: &str,
        index_name: &str,
        collection_field: &str,
        dimension: usize,
    ) -> Result<Self> {
        Ok(Self {
            pool,
            table: checked_identifier("table", table)?.to_string(),
            index_name: checked_identifier("index", index_name)?.to_string(),
            collection_field: checked_identifier("column", collection_field)?.to_string(),
            dimension,
        })
    }

    /// Create a new database instance from configuration
    ///
    /// # Errors
    /// - Invalid identifiers in `[retrieval]`
    /// - Connection failures
    pub async fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database.connection_timeout,
            ));

        let pool = pool_options.connect(config.database_url()).await?;
        Self::new(
            pool,
            &config.retrieval.table,
            &config.retrieval.index_name,
            &config.retrieval.collection_field,
            config.embedding_dimension(),
        )
    }

    /// Get a reference to the database pool for raw queries
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Initialize database schema
    ///
    /// Idempotent: every statement is `IF NOT EXISTS`.
    ///
    /// # Errors
    /// - Database errors, including a server without the `vector` extension
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS {table} (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                resume_data TEXT,
                github_data TEXT,
                linkedin_data TEXT,
                metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                {column} vector({dimension}) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
            table = self.table,
            column = self.collection_field,
            dimension = self.dimension,
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {index} ON {table} USING hnsw ({column} vector_cosine_ops)",
            index = self.index_name,
            table = self.table,
            column = self.collection_field,
        ))
        .execute(&self.pool)
        .await?;

        info!(
            "Schema ready: table {} with index {} on {}",
            self.table, self.index_name, self.collection_field
        );
        Ok(())
    }

    /// Store a profile document with its embedding
    ///
    /// # Errors
    /// - `InvalidRequest` if the embedding has the wrong dimension
    /// - Database errors
    pub async fn insert_document(
        &self,
        document: &ProfileDocument,
        metadata: &Value,
        embedding: Vec<f32>,
    ) -> Result<uuid::Uuid> {
        if embedding.len() != self.dimension {
            return Err(ProfileChatError::InvalidRequest(format!(
                "embedding has {} dimensions, table expects {}",
                embedding.len(),
                self.dimension
            )));
        }

        let id = sqlx::query_scalar::<_, uuid::Uuid>(&format!(
            r"
            INSERT INTO {table} (resume_data, github_data, linkedin_data, metadata, {column})
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
            table = self.table,
            column = self.collection_field,
        ))
        .bind(&document.resume_data)
        .bind(&document.github_data)
        .bind(&document.linkedin_data)
        .bind(Json(metadata))
        .bind(Vector::from(embedding))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}

#[async_trait]
impl DocumentStore for Database {
    async fn vector_search(&self, query: &VectorQuery) -> Result<Vec<ProfileDocument>> {
        // The index is resolved by the planner; the name only has to agree with ours.
        if query.index_name != self.index_name {
            debug!(
                "Query names index {} but table is indexed as {}",
                query.index_name, self.index_name
            );
        }
        let column = checked_identifier("column", &query.collection_field)?;

        let mut tx = self.pool.begin().await.map_err(store_unavailable)?;

        // SET does not take bind parameters; the value is a plain integer.
        sqlx::query(&format!(
            "SET LOCAL hnsw.ef_search = {}",
            query.num_candidates.max(query.limit)
        ))
        .execute(&mut *tx)
        .await
        .map_err(store_unavailable)?;

        let documents = sqlx::query_as::<_, ProfileDocument>(&format!(
            r"
            WITH nearest AS (
                SELECT resume_data, github_data, linkedin_data, metadata,
                       ({column} <=> $1) AS distance
                FROM {table}
                ORDER BY {column} <=> $1
                LIMIT $2
            )
            SELECT resume_data, github_data, linkedin_data,
                   (1 - distance)::float8 AS score
            FROM nearest
            WHERE metadata @> $3
            ORDER BY distance
            ",
            table = self.table,
        ))
        .bind(Vector::from(query.embedding.clone()))
        .bind(query.limit as i64)
        .bind(Json(query.filter.to_value()))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await.map_err(store_unavailable)?;

        debug!(
            "Vector search on {}.{} returned {} document(s)",
            self.table,
            column,
            documents.len()
        );
        Ok(documents)
    }
}

fn store_unavailable(e: sqlx::Error) -> ProfileChatError {
    ProfileChatError::upstream(UpstreamService::DocumentStore, e.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::AppConfig;
    use crate::rag::retriever::DocumentFilter;

    #[test]
    fn test_identifier_validation() {
        assert!(checked_identifier("table", "profile_documents").is_ok());
        assert!(checked_identifier("column", "_embedding2").is_ok());
        assert!(checked_identifier("table", "2fast").is_err());
        assert!(checked_identifier("table", "docs; DROP TABLE x").is_err());
        assert!(checked_identifier("index", "").is_err());
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL with pgvector at PROFILECHAT_DATABASE_URL"]
    async fn test_vector_search_round_trip() {
        let mut config = AppConfig::default();
        config.embeddings.dimension = 3;
        config.retrieval.table = "profile_documents_test".to_string();
        config.retrieval.index_name = "profile_documents_test_idx".to_string();
        if let Ok(url) = std::env::var(crate::config::ENV_DATABASE_URL) {
            config.database.url = url;
        }

        let db = Database::from_config(&config).await.unwrap();
        db.init_schema().await.unwrap();
        sqlx::query("TRUNCATE profile_documents_test")
            .execute(db.pool())
            .await
            .unwrap();

        let python = ProfileDocument {
            resume_data: Some(r#"{"skills":["Python"]}"#.to_string()),
            github_data: None,
            linkedin_data: None,
            score: 0.0,
        };
        let other = ProfileDocument {
            resume_data: Some(r#"{"skills":["Cooking"]}"#.to_string()),
            ..python.clone()
        };
        db.insert_document(&python, &json!({"owner": "naisarg"}), vec![1.0, 0.0, 0.0])
            .await
            .unwrap();
        db.insert_document(&other, &json!({"owner": "someone"}), vec![0.0, 1.0, 0.0])
            .await
            .unwrap();

        let query = VectorQuery {
            embedding: vec![1.0, 0.1, 0.0],
            index_name: config.retrieval.index_name.clone(),
            collection_field: config.retrieval.collection_field.clone(),
            num_candidates: 49,
            limit: 3,
            filter: DocumentFilter::new(),
        };
        let all = db.vector_search(&query).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].resume_data, python.resume_data);
        assert!(all[0].score > all[1].score);

        let filtered = VectorQuery {
            filter: DocumentFilter::new().with("owner", "someone"),
            ..query
        };
        let only = db.vector_search(&filtered).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].resume_data, other.resume_data);
    }
}
