//! redb-backed local store
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `collections` | collection key (`productos`, `ventas`, ...) | JSON array of records |
//!
//! Every mutation is a single write transaction that reads the array,
//! changes it and writes it back. redb allows one writer at a time, so two
//! concurrent creates on the same collection are serialized instead of one
//! overwriting the other.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use thiserror::Error;

use super::{Entity, Patch, RepoError, RepoResult, Repository};

/// key = collection name, value = JSON-serialized `Vec<T>`
const COLLECTIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("collections");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for RepoError {
    fn from(err: StorageError) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Local store backed by a single redb file
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Database>,
}

impl LocalStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, demos)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(COLLECTIONS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Replace the raw bytes stored under a collection key, unchecked
    #[cfg(test)]
    pub(crate) fn write_raw(&self, collection: &str, bytes: &[u8]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(COLLECTIONS_TABLE)?;
            table.insert(collection, bytes)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn read_collection<T: Entity>(&self) -> RepoResult<Vec<T>> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table = read_txn
            .open_table(COLLECTIONS_TABLE)
            .map_err(StorageError::from)?;
        match table.get(T::COLLECTION).map_err(StorageError::from)? {
            Some(value) => decode::<T>(value.value()),
            None => Ok(Vec::new()),
        }
    }

    /// Read-modify-write one collection inside a single write transaction.
    /// Nothing is written when `f` fails.
    fn mutate<T, R, F>(&self, f: F) -> RepoResult<R>
    where
        T: Entity,
        F: FnOnce(&mut Vec<T>) -> RepoResult<R>,
    {
        let txn = self.db.begin_write().map_err(StorageError::from)?;
        let result = {
            let mut table = txn
                .open_table(COLLECTIONS_TABLE)
                .map_err(StorageError::from)?;
            let mut records: Vec<T> = match table.get(T::COLLECTION).map_err(StorageError::from)? {
                Some(value) => decode::<T>(value.value())?,
                None => Vec::new(),
            };
            let result = f(&mut records)?;
            let bytes = serde_json::to_vec(&records).map_err(StorageError::from)?;
            table
                .insert(T::COLLECTION, bytes.as_slice())
                .map_err(StorageError::from)?;
            result
        };
        txn.commit().map_err(StorageError::from)?;
        Ok(result)
    }

    /// Run a blocking redb call off the async runtime
    async fn blocking<R, F>(&self, f: F) -> RepoResult<R>
    where
        R: Send + 'static,
        F: FnOnce(LocalStore) -> RepoResult<R> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(store))
            .await
            .map_err(|e| RepoError::Database(format!("storage task failed: {e}")))?
    }
}

fn decode<T: Entity>(bytes: &[u8]) -> RepoResult<Vec<T>> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::error!(collection = T::COLLECTION, error = %e, "Malformed stored collection");
        RepoError::Corrupted {
            collection: T::COLLECTION.to_string(),
            message: e.to_string(),
        }
    })
}

#[async_trait]
impl<T: Entity> Repository<T> for LocalStore {
    async fn list(&self) -> RepoResult<Vec<T>> {
        self.blocking(|store| store.read_collection::<T>()).await
    }

    async fn get(&self, id: i64) -> RepoResult<Option<T>> {
        let records = Repository::<T>::list(self).await?;
        Ok(records.into_iter().find(|r| r.id() == id))
    }

    async fn create(&self, mut record: T) -> RepoResult<T> {
        if record.id() == 0 {
            record.set_id(shared::util::snowflake_id());
        }
        self.blocking(move |store| {
            store.mutate::<T, _, _>(move |records| {
                if records.iter().any(|r| r.id() == record.id()) {
                    return Err(RepoError::Duplicate(format!(
                        "{} {}",
                        T::LABEL,
                        record.id()
                    )));
                }
                records.push(record.clone());
                Ok(record)
            })
        })
        .await
    }

    async fn update(&self, id: i64, patch: T::Patch) -> RepoResult<T> {
        self.blocking(move |store| {
            store.mutate::<T, _, _>(move |records| {
                let record = records
                    .iter_mut()
                    .find(|r| r.id() == id)
                    .ok_or_else(|| RepoError::NotFound(format!("{} {}", T::LABEL, id)))?;
                patch.apply_to(record);
                Ok(record.clone())
            })
        })
        .await
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        self.blocking(move |store| {
            store.mutate::<T, _, _>(move |records| {
                let before = records.len();
                records.retain(|r| r.id() != id);
                Ok(records.len() != before)
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Category, CategoryUpdate, Sale};

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.into(),
            description: None,
            color: None,
            icon: None,
            is_active: true,
            sort_order: 0,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_lists() {
        let store = LocalStore::open_in_memory().unwrap();
        let created = Repository::<Category>::create(&store, category(0, "Bebidas"))
            .await
            .unwrap();
        assert!(created.id > 0);

        let all = Repository::<Category>::list(&store).await.unwrap();
        assert_eq!(all, vec![created.clone()]);

        let found = Repository::<Category>::get(&store, created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = LocalStore::open_in_memory().unwrap();
        Repository::<Category>::create(&store, category(5, "A")).await.unwrap();
        let err = Repository::<Category>::create(&store, category(5, "B"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
        let all = Repository::<Category>::list(&store).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = LocalStore::open_in_memory().unwrap();
        Repository::<Category>::create(&store, category(5, "A")).await.unwrap();

        let patch = CategoryUpdate {
            name: Some("Almacén".into()),
            ..Default::default()
        };
        let updated = Repository::<Category>::update(&store, 5, patch).await.unwrap();
        assert_eq!(updated.name, "Almacén");

        let missing = Repository::<Category>::update(&store, 99, CategoryUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, RepoError::NotFound(_)));

        assert!(Repository::<Category>::delete(&store, 5).await.unwrap());
        assert!(!Repository::<Category>::delete(&store, 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_collection_is_corrupted() {
        let store = LocalStore::open_in_memory().unwrap();
        store.write_raw("ventas", b"{not json").unwrap();
        let err = Repository::<Sale>::list(&store).await.unwrap_err();
        assert!(matches!(err, RepoError::Corrupted { ref collection, .. } if collection == "ventas"));
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_all_kept() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut handles = Vec::new();
        for i in 1..=20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                Repository::<Category>::create(&store, category(i, &format!("c{i}"))).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        let all = Repository::<Category>::list(&store).await.unwrap();
        assert_eq!(all.len(), 20);
    }

    #[test]
    fn test_reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mostrador.redb");
        let rt = tokio::runtime::Runtime::new().unwrap();
        {
            let store = LocalStore::open(&path).unwrap();
            rt.block_on(Repository::<Category>::create(&store, category(1, "A")))
                .unwrap();
        }
        let store = LocalStore::open(&path).unwrap();
        let all = rt.block_on(Repository::<Category>::list(&store)).unwrap();
        assert_eq!(all.len(), 1);
    }
}
