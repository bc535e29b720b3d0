//! Entity Store
//!
//! Abstract per-entity repository plus two backends:
//!
//! - [`LocalStore`]: embedded redb file, one JSON array per collection
//! - [`RemoteStore`]: PostgREST-style table API over HTTP
//!
//! Services and metrics only see [`EntityStore`], which is built once from a
//! backend and handed around explicitly.

mod entities;
pub mod local;
pub mod query;
pub mod remote;

pub use local::{LocalStore, StorageError};
pub use query::TableQuery;
pub use remote::RemoteStore;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{AppError, ErrorCode};
use shared::models::{BusinessProfile, Category, Client, Expense, Product, Sale};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A record type persisted as one collection
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection key (local store) and table name (remote store)
    const COLLECTION: &'static str;
    /// Human-readable name used in error messages
    const LABEL: &'static str;
    /// Timestamp field used for range queries, if any
    const DATE_FIELD: Option<&'static str> = None;

    type Patch: Patch<Self>;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);

    fn date_millis(&self) -> Option<i64> {
        None
    }
}

/// Partial update applied to an existing record
pub trait Patch<T>: Serialize + Send + Sync + 'static {
    fn apply_to(&self, target: &mut T);
}

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    /// Stored data exists but cannot be decoded
    #[error("Corrupted collection {collection}: {message}")]
    Corrupted { collection: String, message: String },

    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        let message = err.to_string();
        let code = match &err {
            RepoError::NotFound(_) => ErrorCode::NotFound,
            RepoError::Duplicate(_) => ErrorCode::AlreadyExists,
            RepoError::Database(_) => ErrorCode::DatabaseError,
            RepoError::Corrupted { .. } => ErrorCode::StorageCorrupted,
            RepoError::Remote { status, .. } if (400..500).contains(status) => {
                ErrorCode::InvalidRequest
            }
            RepoError::Remote { .. } => ErrorCode::DatabaseError,
            RepoError::Unavailable(_) => ErrorCode::StorageUnavailable,
            RepoError::Cancelled => ErrorCode::OperationCancelled,
        };
        AppError::with_message(code, message)
    }
}

/// CRUD over one entity collection
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<T>>;
    async fn get(&self, id: i64) -> RepoResult<Option<T>>;
    /// Persist a new record. An id of 0 is replaced by a fresh snowflake id.
    async fn create(&self, record: T) -> RepoResult<T>;
    async fn update(&self, id: i64, patch: T::Patch) -> RepoResult<T>;
    /// Returns false when no record had this id
    async fn delete(&self, id: i64) -> RepoResult<bool>;

    /// Records whose date falls in `[start_ms, end_ms)`. Undated entities
    /// yield nothing.
    async fn list_between(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<T>> {
        let records = self.list().await?;
        Ok(records
            .into_iter()
            .filter(|r| {
                r.date_millis()
                    .is_some_and(|ms| ms >= start_ms && ms < end_ms)
            })
            .collect())
    }
}

/// One repository per entity, shared by every service
#[derive(Clone)]
pub struct EntityStore {
    pub products: Arc<dyn Repository<Product>>,
    pub categories: Arc<dyn Repository<Category>>,
    pub clients: Arc<dyn Repository<Client>>,
    pub sales: Arc<dyn Repository<Sale>>,
    pub expenses: Arc<dyn Repository<Expense>>,
    pub settings: Arc<dyn Repository<BusinessProfile>>,
}

impl EntityStore {
    /// Use one backend for every collection
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: Repository<Product>
            + Repository<Category>
            + Repository<Client>
            + Repository<Sale>
            + Repository<Expense>
            + Repository<BusinessProfile>
            + Clone
            + 'static,
    {
        Self {
            products: Arc::new(backend.clone()),
            categories: Arc::new(backend.clone()),
            clients: Arc::new(backend.clone()),
            sales: Arc::new(backend.clone()),
            expenses: Arc::new(backend.clone()),
            settings: Arc::new(backend),
        }
    }
}

/// Race a store call against cancellation
pub async fn cancellable<F, R>(token: &CancellationToken, fut: F) -> RepoResult<R>
where
    F: Future<Output = RepoResult<R>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(RepoError::Cancelled),
        result = fut => result,
    }
}
