//! Index store client abstraction.
//!
//! The migration orchestrator talks to the document store exclusively through
//! the [`IndexStore`] trait so that tests can substitute an in-memory double
//! ([`memory::MemoryIndexStore`]) for the real HTTP client
//! ([`http::HttpIndexStore`]).

pub mod http;
pub mod memory;

use crate::naming::{AliasName, IndexName};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

/// Error type for store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Network or connection error (includes timeouts)
    Network(String),
    /// 401 Unauthorized
    Unauthorized,
    /// 404 Not Found (includes server message if any)
    NotFound(String),
    /// 400 Bad Request (includes server error message)
    BadRequest(String),
    /// 5xx Server Error (includes server error message)
    ServerError(String),
    /// Response could not be parsed as expected
    InvalidResponse(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Network(msg) => write!(f, "network error: {msg}"),
            StoreError::Unauthorized => write!(f, "authentication failed (401)"),
            StoreError::NotFound(msg) => write!(f, "not found: {msg}"),
            StoreError::BadRequest(msg) => write!(f, "bad request: {msg}"),
            StoreError::ServerError(msg) => write!(f, "server error: {msg}"),
            StoreError::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Cluster health snapshot returned by the connectivity check.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterHealth {
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub status: String,
    /// The store's full response body, for verbose display.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

/// Statistics reported by a completed reindex-copy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReindexStats {
    /// Milliseconds the copy took, as reported by the store.
    #[serde(default)]
    pub took: u64,
    /// Total documents considered by the copy.
    #[serde(default)]
    pub total: u64,
    /// Documents created in the destination index.
    #[serde(default)]
    pub created: u64,
    /// Documents updated in the destination index.
    #[serde(default)]
    pub updated: u64,
    /// The store's full response body, for verbose display.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

/// Current alias bindings: index name -> set of alias names on that index.
///
/// Ordered maps keep cutover planning deterministic.
pub type AliasBindings = BTreeMap<String, BTreeSet<String>>;

/// A single action in an atomic alias-update batch.
///
/// Serializes to the store's wire shape:
/// `{"add": {"index": "...", "alias": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasAction {
    Add { index: String, alias: String },
    Remove { index: String, alias: String },
}

impl AliasAction {
    pub fn add(index: &IndexName, alias: &AliasName) -> Self {
        AliasAction::Add {
            index: index.as_str().to_string(),
            alias: alias.as_str().to_string(),
        }
    }

    pub fn remove(index: &str, alias: &AliasName) -> Self {
        AliasAction::Remove {
            index: index.to_string(),
            alias: alias.as_str().to_string(),
        }
    }
}

/// Client contract for the document-index store.
///
/// `update_aliases` must apply its whole action batch atomically: readers
/// never observe the alias resolving to zero indices or to both old and new.
#[async_trait]
pub trait IndexStore: fmt::Debug + Send + Sync {
    /// Cheap liveness probe with a bounded timeout.
    async fn health(&self, timeout: Duration) -> Result<ClusterHealth, StoreError>;

    /// Whether the index currently exists.
    async fn exists(&self, index: &IndexName) -> Result<bool, StoreError>;

    /// Create the index with the given mapping document as its schema body.
    /// Returns the store's acknowledgement body.
    async fn create(
        &self,
        index: &IndexName,
        mapping: &serde_json::Value,
    ) -> Result<serde_json::Value, StoreError>;

    /// Delete the index, returning the store's acknowledgement body.
    /// Failure must surface; a half-deleted index is an ambiguous state the
    /// caller needs to know about.
    async fn delete(&self, index: &IndexName) -> Result<serde_json::Value, StoreError>;

    /// Bulk-copy all documents from `source` into `dest`, blocking until the
    /// store reports completion and the results are refreshed for query.
    async fn reindex_copy(
        &self,
        source: &IndexName,
        dest: &IndexName,
    ) -> Result<ReindexStats, StoreError>;

    /// All current bindings of `alias`. An unbound alias yields an empty map.
    async fn alias_bindings(&self, alias: &AliasName) -> Result<AliasBindings, StoreError>;

    /// Apply an alias-action batch as a single atomic operation.
    async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), StoreError>;
}
