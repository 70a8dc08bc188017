//! HTTP client for the hosted record store.
//!
//! The store exposes each collection at `{base}/rest/v1/{collection}` and
//! understands the query dialect rendered by [`ListQuery`]. Writes ask for
//! `return=representation` so the stored row comes back in the response.
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::query::ListQuery;
use crate::{ListResult, RecordStore, StoreError, UpdateOutcome};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct StoreCredentials {
    pub url: String,
    pub key: String,
}

pub struct RestStore {
    credentials: Option<StoreCredentials>,
    client: reqwest::Client,
}

impl RestStore {
    /// Builds a client. Absent credentials are allowed; every operation then
    /// fails with [`StoreError::NotConfigured`] without touching the network.
    pub fn new(credentials: Option<StoreCredentials>) -> Self {
        if credentials.is_none() {
            warn!("Record store credentials not configured, operations will fail fast");
        }

        Self {
            credentials,
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap(),
        }
    }

    fn credentials(&self) -> Result<&StoreCredentials, StoreError> {
        self.credentials.as_ref().ok_or(StoreError::NotConfigured)
    }

    fn endpoint(credentials: &StoreCredentials, collection: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{collection}", credentials.url)
        } else {
            format!("{}/rest/v1/{collection}?{query}", credentials.url)
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        credentials: &StoreCredentials,
        url: &str,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &credentials.key)
            .header("Authorization", format!("Bearer {}", credentials.key))
            .header("Prefer", "return=representation")
    }

    /// Sends a request and returns the JSON body, or `None` for an empty 204
    /// response. Any non-success status becomes [`StoreError::Status`].
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Option<Value>, StoreError> {
        let response = request.send().await?;
        let status = response.status();

        if status.as_u16() == 204 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl RecordStore for RestStore {
    fn source(&self) -> &'static str {
        "supabase"
    }

    async fn list(&self, collection: &str, query: ListQuery) -> Result<ListResult, StoreError> {
        let credentials = self.credentials()?;
        let url = Self::endpoint(credentials, collection, &query.to_query_string());

        let body = self
            .send(self.request(reqwest::Method::GET, credentials, &url))
            .await?;
        let rows = match body {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        };

        // The store only returns the requested page, so this total is the
        // page size, not the full match count.
        let total = rows.len();
        Ok(ListResult {
            rows,
            total,
            real_count: None,
            demo_count: None,
        })
    }

    async fn insert(&self, collection: &str, record: Value) -> Result<Value, StoreError> {
        let credentials = self.credentials()?;
        let url = Self::endpoint(credentials, collection, "");

        let body = self
            .send(
                self.request(reqwest::Method::POST, credentials, &url)
                    .json(&record),
            )
            .await?;

        Ok(match body {
            Some(Value::Array(mut rows)) if !rows.is_empty() => rows.remove(0),
            Some(row @ Value::Object(_)) => row,
            // No representation returned; echo what was submitted.
            _ => record,
        })
    }

    async fn update(
        &self,
        collection: &str,
        filter: (&str, &str),
        patch: Value,
    ) -> Result<UpdateOutcome, StoreError> {
        let credentials = self.credentials()?;
        let url = Self::endpoint(
            credentials,
            collection,
            &format!("{}=eq.{}", filter.0, filter.1),
        );

        let body = self
            .send(
                self.request(reqwest::Method::PATCH, credentials, &url)
                    .json(&patch),
            )
            .await?;

        Ok(match body {
            Some(Value::Array(rows)) => UpdateOutcome::Rows(rows),
            Some(row) => UpdateOutcome::Rows(vec![row]),
            None => UpdateOutcome::NoContent,
        })
    }
}
