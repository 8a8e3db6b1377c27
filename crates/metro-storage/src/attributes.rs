//! Durable per-user attribute stores.
//!
//! Each user identity maps to one JSON attribute document. Stores are read
//! once when a session starts and written once when it ends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use metro_core::error::MetroError;
use metro_core::types::Attributes;

use crate::db::Database;
use crate::migrations;

/// Load/save contract for persistent attributes keyed by user identity.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Attributes stored for `user_id`, or `None` if the user has none.
    async fn get_attributes(&self, user_id: &str) -> Result<Option<Attributes>, MetroError>;

    /// Replace the attributes stored for `user_id`.
    async fn save_attributes(&self, user_id: &str, attributes: &Attributes)
        -> Result<(), MetroError>;

    /// Remove everything stored for `user_id`.
    async fn delete_attributes(&self, user_id: &str) -> Result<(), MetroError>;
}

fn require_user_id(user_id: &str) -> Result<(), MetroError> {
    if user_id.trim().is_empty() {
        return Err(MetroError::InvalidInput("user id must not be empty".into()));
    }
    Ok(())
}

// =============================================================================
// SQLite
// =============================================================================

/// SQLite-backed attribute store.
pub struct SqliteAttributeStore {
    db: Arc<Database>,
    table: String,
}

impl SqliteAttributeStore {
    /// Bind to `table`, creating it if needed.
    ///
    /// The table name is interpolated into SQL and must be a plain identifier.
    pub fn new(db: Arc<Database>, table: &str) -> Result<Self, MetroError> {
        let valid = table
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(MetroError::InvalidInput(format!(
                "invalid attribute table name: {:?}",
                table
            )));
        }

        db.with_conn(|conn| migrations::run_migrations(conn, table))?;
        Ok(Self {
            db,
            table: table.to_string(),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T, MetroError>
    where
        F: FnOnce(&Connection, &str) -> Result<T, MetroError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let table = self.table.clone();
        tokio::task::spawn_blocking(move || db.with_conn(|conn| f(conn, &table)))
            .await
            .map_err(|e| MetroError::Storage(format!("Attribute store task panicked: {}", e)))?
    }
}

#[async_trait]
impl PersistenceAdapter for SqliteAttributeStore {
    async fn get_attributes(&self, user_id: &str) -> Result<Option<Attributes>, MetroError> {
        require_user_id(user_id)?;
        let key = user_id.to_string();
        let raw: Option<String> = self
            .blocking(move |conn, table| {
                conn.query_row(
                    &format!("SELECT attributes FROM {} WHERE user_id = ?1", table),
                    rusqlite::params![key],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| MetroError::Storage(format!("Failed to load attributes: {}", e)))
            })
            .await?;

        match raw {
            Some(json) => {
                let attributes: Attributes = serde_json::from_str(&json)?;
                debug!(user_id, keys = attributes.len(), "Loaded persistent attributes");
                Ok(Some(attributes))
            }
            None => Ok(None),
        }
    }

    async fn save_attributes(
        &self,
        user_id: &str,
        attributes: &Attributes,
    ) -> Result<(), MetroError> {
        require_user_id(user_id)?;
        let json = serde_json::to_string(attributes)?;
        let key = user_id.to_string();
        self.blocking(move |conn, table| {
            conn.execute(
                &format!(
                    "INSERT INTO {} (user_id, attributes, updated_at)
                     VALUES (?1, ?2, strftime('%s', 'now'))
                     ON CONFLICT(user_id) DO UPDATE SET
                       attributes = excluded.attributes,
                       updated_at = excluded.updated_at",
                    table
                ),
                rusqlite::params![key, json],
            )
            .map_err(|e| MetroError::Storage(format!("Failed to save attributes: {}", e)))?;
            Ok(())
        })
        .await?;
        debug!(user_id, keys = attributes.len(), "Saved persistent attributes");
        Ok(())
    }

    async fn delete_attributes(&self, user_id: &str) -> Result<(), MetroError> {
        require_user_id(user_id)?;
        let key = user_id.to_string();
        self.blocking(move |conn, table| {
            conn.execute(
                &format!("DELETE FROM {} WHERE user_id = ?1", table),
                rusqlite::params![key],
            )
            .map_err(|e| MetroError::Storage(format!("Failed to delete attributes: {}", e)))?;
            Ok(())
        })
        .await
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local attribute store. Contents are lost on exit.
#[derive(Default)]
pub struct InMemoryAttributeStore {
    entries: Mutex<HashMap<String, Attributes>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl InMemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `get_attributes` has been called.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// How many times `save_attributes` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Snapshot of what is stored for `user_id`.
    pub fn snapshot(&self, user_id: &str) -> Option<Attributes> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(user_id).cloned())
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Attributes>>, MetroError> {
        self.entries
            .lock()
            .map_err(|e| MetroError::Storage(format!("Attribute store lock poisoned: {}", e)))
    }
}

#[async_trait]
impl PersistenceAdapter for InMemoryAttributeStore {
    async fn get_attributes(&self, user_id: &str) -> Result<Option<Attributes>, MetroError> {
        require_user_id(user_id)?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.lock()?.get(user_id).cloned())
    }

    async fn save_attributes(
        &self,
        user_id: &str,
        attributes: &Attributes,
    ) -> Result<(), MetroError> {
        require_user_id(user_id)?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.lock()?
            .insert(user_id.to_string(), attributes.clone());
        Ok(())
    }

    async fn delete_attributes(&self, user_id: &str) -> Result<(), MetroError> {
        require_user_id(user_id)?;
        self.lock()?.remove(user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: serde_json::Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    fn stored_users(store: &SqliteAttributeStore) -> i64 {
        store
            .db
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM user_attributes", [], |row| row.get(0))
                    .map_err(|e| MetroError::Storage(e.to_string()))
            })
            .unwrap()
    }

    fn sqlite_store() -> SqliteAttributeStore {
        let db = Arc::new(Database::in_memory().unwrap());
        SqliteAttributeStore::new(db, "user_attributes").unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_get_missing_user() {
        let store = sqlite_store();
        assert!(store.get_attributes("amzn1.ask.account.X").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_save_then_get() {
        let store = sqlite_store();
        let saved = attrs(json!({"sessionCount": 3, "lastLine": "RD"}));
        store.save_attributes("user-1", &saved).await.unwrap();

        let loaded = store.get_attributes("user-1").await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(stored_users(&store), 1);
    }

    #[tokio::test]
    async fn test_sqlite_save_replaces_whole_document() {
        let store = sqlite_store();
        store
            .save_attributes("user-1", &attrs(json!({"a": 1, "b": 2})))
            .await
            .unwrap();
        store
            .save_attributes("user-1", &attrs(json!({"c": 3})))
            .await
            .unwrap();

        let loaded = store.get_attributes("user-1").await.unwrap().unwrap();
        assert_eq!(loaded, attrs(json!({"c": 3})));
        assert_eq!(stored_users(&store), 1);
    }

    #[tokio::test]
    async fn test_sqlite_users_are_isolated() {
        let store = sqlite_store();
        store
            .save_attributes("alice", &attrs(json!({"lastStation": "bethesda"})))
            .await
            .unwrap();
        assert!(store.get_attributes("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_delete() {
        let store = sqlite_store();
        store
            .save_attributes("user-1", &attrs(json!({"x": true})))
            .await
            .unwrap();
        store.delete_attributes("user-1").await.unwrap();
        assert!(store.get_attributes("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attributes.db");
        {
            let db = Arc::new(Database::new(&path).unwrap());
            let store = SqliteAttributeStore::new(db, "prefs").unwrap();
            store
                .save_attributes("user-1", &attrs(json!({"sessionCount": 1})))
                .await
                .unwrap();
        }
        let db = Arc::new(Database::new(&path).unwrap());
        let store = SqliteAttributeStore::new(db, "prefs").unwrap();
        let loaded = store.get_attributes("user-1").await.unwrap().unwrap();
        assert_eq!(loaded["sessionCount"], 1);
    }

    #[tokio::test]
    async fn test_sqlite_corrupt_document_is_serialization_error() {
        let store = sqlite_store();
        store
            .db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO user_attributes (user_id, attributes) VALUES ('u', 'not json')",
                    [],
                )
                .map_err(|e| MetroError::Storage(e.to_string()))?;
                Ok(())
            })
            .unwrap();
        let err = store.get_attributes("u").await.unwrap_err();
        assert!(matches!(err, MetroError::Serialization(_)));
    }

    #[test]
    fn test_sqlite_rejects_bad_table_name() {
        let db = Arc::new(Database::in_memory().unwrap());
        for bad in ["", "9lives", "x; DROP TABLE y", "a-b"] {
            assert!(SqliteAttributeStore::new(Arc::clone(&db), bad).is_err());
        }
    }

    #[tokio::test]
    async fn test_empty_user_id_rejected() {
        let store = sqlite_store();
        let err = store.get_attributes("  ").await.unwrap_err();
        assert!(matches!(err, MetroError::InvalidInput(_)));

        let memory = InMemoryAttributeStore::new();
        assert!(memory.save_attributes("", &Attributes::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_round_trip_and_counters() {
        let store = InMemoryAttributeStore::new();
        assert!(store.get_attributes("u").await.unwrap().is_none());

        let saved = attrs(json!({"sessionCount": 2}));
        store.save_attributes("u", &saved).await.unwrap();
        assert_eq!(store.get_attributes("u").await.unwrap(), Some(saved.clone()));
        assert_eq!(store.snapshot("u"), Some(saved));

        assert_eq!(store.load_count(), 2);
        assert_eq!(store.save_count(), 1);

        store.delete_attributes("u").await.unwrap();
        assert!(store.snapshot("u").is_none());
    }
}
