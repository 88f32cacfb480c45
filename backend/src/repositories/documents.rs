//! Document store - the remote collection database behind the tracker
//!
//! Documents are JSON values addressed by collection path and id, e.g.
//! `users` / `{uid}` or `users/{uid}/meals` / `{meal id}`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;

/// Document store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Document could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

/// Collection database consumed by the repositories
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Every document of a collection
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Documents whose string `field` starts with `prefix`, ordered by that field
    async fn query_prefix(
        &self,
        collection: &str,
        field: &str,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError>;

    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for diagnostics
    fn kind(&self) -> &'static str;
}

// ============================================================================
// Postgres
// ============================================================================

/// JSONB-backed store on the `documents` table
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let data = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(data)
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM documents WHERE collection = $1 ORDER BY id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn query_prefix(
        &self,
        collection: &str,
        field: &str,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT data FROM documents
            WHERE collection = $1 AND starts_with(data->>$2, $3)
            ORDER BY data->>$2
            LIMIT $4
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(prefix)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "postgres"
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local store for tests and database-less runs
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<BTreeMap<String, BTreeMap<String, Value>>>,
    offline: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing the connection; every call fails while offline
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.check_online()?;
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check_online()?;
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.check_online()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn query_prefix(
        &self,
        collection: &str,
        field: &str,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<Value>, StoreError> {
        self.check_online()?;
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<(&str, &Value)> = docs
            .values()
            .filter_map(|doc| {
                let key = doc.get(field)?.as_str()?;
                key.starts_with(prefix).then_some((key, doc))
            })
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0));

        Ok(matches
            .into_iter()
            .take(limit)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }

    fn kind(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = InMemoryDocumentStore::new();
        store.set("users", "u1", json!({"fullname": "A"})).await.unwrap();

        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc["fullname"], "A");

        store.delete("users", "u1").await.unwrap();
        assert!(store.get("users", "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_prefix_sorted_and_limited() {
        let store = InMemoryDocumentStore::new();
        for name in ["chicken thigh", "chicken breast", "chickpeas", "rice"] {
            store.set("foods", name, json!({ "name": name })).await.unwrap();
        }

        let hits = store.query_prefix("foods", "name", "chick", 2).await.unwrap();
        let names: Vec<&str> = hits.iter().filter_map(|d| d["name"].as_str()).collect();
        assert_eq!(names, vec!["chicken breast", "chicken thigh"]);

        assert!(store
            .query_prefix("missing", "name", "a", 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let store = InMemoryDocumentStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.list("users/u1/meals").await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_ping_follows_offline_switch() {
        let store = InMemoryDocumentStore::new();
        assert_eq!(store.kind(), "in-memory");
        assert!(store.ping().await.is_ok());

        store.set_offline(true);
        assert!(store.ping().await.is_err());
    }
}
