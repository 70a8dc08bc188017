//! # Record Store
//!
//! Shared data access for the visitor and analytics tables.
//!
//! Two collections live in the hosted record store: `visitors` (one row per
//! tracked investor link or anonymous session) and `analytics` (one row per
//! tracked interaction). Both are reached over the store's REST dialect, see
//! [`rest`].
//!
//! ## Requirements
//!
//! - Low write volume, one insert per tracked interaction
//! - Reads are paginated admin listings, newest first
//! - Deployments without store credentials must keep working, so every
//!   operation is also available against a process-lifetime in-memory store
//!
//! ## Implementation
//!
//! - [`RecordStore`] is the single interface handlers are written against
//! - [`rest::RestStore`] talks to the hosted store over HTTP
//! - [`memory::MemoryStore`] is the fallback, seeded with a fixed set of
//!   demonstration analytics events so an unconfigured deployment still has
//!   something to show
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod demo;
pub mod memory;
pub mod query;
pub mod records;
pub mod rest;

pub use memory::MemoryStore;
pub use query::ListQuery;
pub use rest::{RestStore, StoreCredentials};

pub const VISITORS: &str = "visitors";
pub const ANALYTICS: &str = "analytics";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record store not configured")]
    NotConfigured,

    #[error("record store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("record store request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Rows matched by a [`RecordStore::list`] call.
///
/// `total` is the pre-pagination match count where the backing store can
/// report one; the REST backend only sees the requested page and reports the
/// page size instead.
#[derive(Debug)]
pub struct ListResult {
    pub rows: Vec<Value>,
    pub total: usize,
    pub real_count: Option<usize>,
    pub demo_count: Option<usize>,
}

/// Result of a [`RecordStore::update`] call.
///
/// The REST dialect answers a patch either with the updated rows or with an
/// empty 204 body; the two are distinct outcomes, not an error.
#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    Rows(Vec<Value>),
    NoContent,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Label reported in list responses so callers can tell durable data from
    /// fallback data.
    fn source(&self) -> &'static str;

    async fn list(&self, collection: &str, query: ListQuery) -> Result<ListResult, StoreError>;

    /// Inserts one record and returns the stored representation.
    async fn insert(&self, collection: &str, record: Value) -> Result<Value, StoreError>;

    /// Patches every record where `filter.0 == filter.1`.
    async fn update(
        &self,
        collection: &str,
        filter: (&str, &str),
        patch: Value,
    ) -> Result<UpdateOutcome, StoreError>;
}
