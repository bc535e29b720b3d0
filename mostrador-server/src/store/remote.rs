//! Remote table store (PostgREST-style HTTP API)
//!
//! Each collection maps to `{base_url}/rest/v1/{collection}`. Requests carry
//! the project key both as `apikey` and as a bearer token; writes ask for
//! the stored row back with `Prefer: return=representation`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::{Entity, RepoError, RepoResult, Repository, TableQuery};

#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> RepoResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepoError::Unavailable(format!("HTTP client init failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, table: &str, query: &TableQuery) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .query(query.params())
    }

    async fn send<R: DeserializeOwned>(&self, req: RequestBuilder, table: &str) -> RepoResult<R> {
        let response = req.send().await.map_err(|e| {
            tracing::warn!(table, error = %e, "Remote store request failed");
            RepoError::Unavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => RepoError::NotFound(format!("{table}: {text}")),
                StatusCode::CONFLICT => RepoError::Duplicate(format!("{table}: {text}")),
                _ => RepoError::Remote {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RepoError::Unavailable(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| RepoError::Corrupted {
            collection: table.to_string(),
            message: e.to_string(),
        })
    }

    /// Run a filtered select against one table
    pub async fn select<T: Entity>(&self, query: TableQuery) -> RepoResult<Vec<T>> {
        let req = self.request(Method::GET, T::COLLECTION, &query);
        self.send(req, T::COLLECTION).await
    }

    fn by_id(id: i64) -> TableQuery {
        TableQuery::new().eq("id", id)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for RemoteStore {
    async fn list(&self) -> RepoResult<Vec<T>> {
        self.select::<T>(TableQuery::new().select("*").order("id", true))
            .await
    }

    async fn get(&self, id: i64) -> RepoResult<Option<T>> {
        let rows = self
            .select::<T>(Self::by_id(id).select("*").limit(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn create(&self, mut record: T) -> RepoResult<T> {
        if record.id() == 0 {
            record.set_id(shared::util::snowflake_id());
        }
        let req = self
            .request(Method::POST, T::COLLECTION, &TableQuery::new())
            .header("Prefer", "return=representation")
            .json(&record);
        let rows: Vec<T> = self.send(req, T::COLLECTION).await?;
        Ok(rows.into_iter().next().unwrap_or(record))
    }

    async fn update(&self, id: i64, patch: T::Patch) -> RepoResult<T> {
        let req = self
            .request(Method::PATCH, T::COLLECTION, &Self::by_id(id))
            .header("Prefer", "return=representation")
            .json(&patch);
        let rows: Vec<T> = self.send(req, T::COLLECTION).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("{} {}", T::LABEL, id)))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let req = self
            .request(Method::DELETE, T::COLLECTION, &Self::by_id(id))
            .header("Prefer", "return=representation");
        let rows: Vec<serde_json::Value> = self.send(req, T::COLLECTION).await?;
        Ok(!rows.is_empty())
    }

    async fn list_between(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<T>> {
        let Some(field) = T::DATE_FIELD else {
            return Ok(Vec::new());
        };
        self.select::<T>(
            TableQuery::new()
                .select("*")
                .gte(field, start_ms)
                .lt(field, end_ms)
                .order(field, true),
        )
        .await
    }
}
