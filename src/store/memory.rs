//! In-memory index store implementation for testing
//!
//! Stores indices and alias bindings in memory using `Arc<RwLock>` for
//! interior mutability, making it thread-safe and suitable for multi-threaded
//! async runtimes. `update_aliases` applies its whole batch under a single
//! write lock, modeling the real store's atomic alias update.

use super::{AliasAction, AliasBindings, ClusterHealth, IndexStore, ReindexStats, StoreError};
use crate::naming::{AliasName, IndexName};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
struct IndexRecord {
    mapping: serde_json::Value,
    docs: u64,
    aliases: BTreeSet<String>,
}

/// In-memory index store for testing
#[derive(Clone, Default)]
pub struct MemoryIndexStore {
    indices: Arc<RwLock<BTreeMap<String, IndexRecord>>>,
    /// When set, the health probe reports the store as unreachable.
    unhealthy: Arc<AtomicBool>,
}

impl Debug for MemoryIndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let indices = self.indices.read();
        f.debug_struct("MemoryIndexStore")
            .field("index_count", &indices.len())
            .finish()
    }
}

impl MemoryIndexStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the health probe fail, simulating an unreachable cluster.
    pub fn set_unhealthy(&self) {
        self.unhealthy.store(true, Ordering::SeqCst);
    }

    /// Seed an index with a mapping and a document count.
    ///
    /// Convenience for tests to bootstrap a prior index version.
    pub fn seed_index(&self, index: &IndexName, mapping: serde_json::Value, docs: u64) {
        self.indices.write().insert(
            index.as_str().to_string(),
            IndexRecord {
                mapping,
                docs,
                aliases: BTreeSet::new(),
            },
        );
    }

    /// Bind an alias to an index directly, bypassing `update_aliases`.
    pub fn seed_alias(&self, index: &IndexName, alias: &AliasName) {
        if let Some(record) = self.indices.write().get_mut(index.as_str()) {
            record.aliases.insert(alias.as_str().to_string());
        }
    }

    /// The mapping the index was created with, if it exists.
    pub fn mapping_of(&self, index: &IndexName) -> Option<serde_json::Value> {
        self.indices
            .read()
            .get(index.as_str())
            .map(|r| r.mapping.clone())
    }

    /// Document count of an index, if it exists.
    pub fn doc_count(&self, index: &IndexName) -> Option<u64> {
        self.indices.read().get(index.as_str()).map(|r| r.docs)
    }

    /// Indices currently carrying `alias`, in name order.
    pub fn indices_bound_to(&self, alias: &AliasName) -> Vec<String> {
        self.indices
            .read()
            .iter()
            .filter(|(_, r)| r.aliases.contains(alias.as_str()))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn health(&self, _timeout: Duration) -> Result<ClusterHealth, StoreError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(StoreError::Network("connection refused".to_string()));
        }
        Ok(ClusterHealth {
            cluster_name: "memory".to_string(),
            status: "green".to_string(),
            raw: serde_json::json!({"cluster_name": "memory", "status": "green"}),
        })
    }

    async fn exists(&self, index: &IndexName) -> Result<bool, StoreError> {
        Ok(self.indices.read().contains_key(index.as_str()))
    }

    async fn create(
        &self,
        index: &IndexName,
        mapping: &serde_json::Value,
    ) -> Result<serde_json::Value, StoreError> {
        let mut indices = self.indices.write();
        if indices.contains_key(index.as_str()) {
            return Err(StoreError::BadRequest(format!(
                "resource_already_exists_exception: index [{index}] already exists"
            )));
        }
        indices.insert(
            index.as_str().to_string(),
            IndexRecord {
                mapping: mapping.clone(),
                docs: 0,
                aliases: BTreeSet::new(),
            },
        );
        Ok(serde_json::json!({"acknowledged": true, "index": index.as_str()}))
    }

    async fn delete(&self, index: &IndexName) -> Result<serde_json::Value, StoreError> {
        if self.indices.write().remove(index.as_str()).is_none() {
            return Err(StoreError::NotFound(format!(
                "index_not_found_exception: no such index [{index}]"
            )));
        }
        Ok(serde_json::json!({"acknowledged": true}))
    }

    async fn reindex_copy(
        &self,
        source: &IndexName,
        dest: &IndexName,
    ) -> Result<ReindexStats, StoreError> {
        let mut indices = self.indices.write();
        let docs = match indices.get(source.as_str()) {
            Some(record) => record.docs,
            None => {
                return Err(StoreError::NotFound(format!(
                    "index_not_found_exception: no such index [{source}]"
                )))
            }
        };
        match indices.get_mut(dest.as_str()) {
            Some(record) => record.docs += docs,
            None => {
                return Err(StoreError::NotFound(format!(
                    "index_not_found_exception: no such index [{dest}]"
                )))
            }
        }
        Ok(ReindexStats {
            took: 1,
            total: docs,
            created: docs,
            updated: 0,
            raw: serde_json::json!({"took": 1, "total": docs, "created": docs, "updated": 0}),
        })
    }

    async fn alias_bindings(&self, alias: &AliasName) -> Result<AliasBindings, StoreError> {
        let indices = self.indices.read();
        let mut bindings = AliasBindings::new();
        for (name, record) in indices.iter() {
            if record.aliases.contains(alias.as_str()) {
                bindings.insert(name.clone(), record.aliases.clone());
            }
        }
        Ok(bindings)
    }

    async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), StoreError> {
        // Whole batch under one write lock: validate first, then apply, so a
        // rejected batch leaves no partial state behind.
        let mut indices = self.indices.write();

        for action in actions {
            let (index, alias) = match action {
                AliasAction::Add { index, alias } | AliasAction::Remove { index, alias } => {
                    (index, alias)
                }
            };
            let record = indices.get(index).ok_or_else(|| {
                StoreError::NotFound(format!("index_not_found_exception: no such index [{index}]"))
            })?;
            if matches!(action, AliasAction::Remove { .. }) && !record.aliases.contains(alias) {
                return Err(StoreError::NotFound(format!(
                    "aliases_not_found_exception: alias [{alias}] missing on [{index}]"
                )));
            }
        }

        for action in actions {
            match action {
                AliasAction::Add { index, alias } => {
                    if let Some(record) = indices.get_mut(index) {
                        record.aliases.insert(alias.clone());
                    }
                }
                AliasAction::Remove { index, alias } => {
                    if let Some(record) = indices.get_mut(index) {
                        record.aliases.remove(alias);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(name: &str) -> IndexName {
        IndexName::raw(name)
    }

    #[tokio::test]
    async fn create_then_exists() {
        let store = MemoryIndexStore::new();
        let idx = index("app-users_v1");
        assert!(!store.exists(&idx).await.unwrap());
        store
            .create(&idx, &serde_json::json!({"mappings": {}}))
            .await
            .unwrap();
        assert!(store.exists(&idx).await.unwrap());
    }

    #[tokio::test]
    async fn create_twice_rejected() {
        let store = MemoryIndexStore::new();
        let idx = index("app-users_v1");
        let mapping = serde_json::json!({"mappings": {}});
        store.create(&idx, &mapping).await.unwrap();
        let err = store.create(&idx, &mapping).await.unwrap_err();
        match err {
            StoreError::BadRequest(msg) => assert!(msg.contains("already exists")),
            other => panic!("expected BadRequest, got: {other}"),
        }
    }

    #[tokio::test]
    async fn reindex_copies_doc_count() {
        let store = MemoryIndexStore::new();
        let src = index("app-users_v1");
        let dst = index("app-users_v2");
        store.seed_index(&src, serde_json::json!({"mappings": {}}), 9);
        store
            .create(&dst, &serde_json::json!({"mappings": {}}))
            .await
            .unwrap();

        let stats = store.reindex_copy(&src, &dst).await.unwrap();
        assert_eq!(stats.created, 9);
        assert_eq!(store.doc_count(&dst), Some(9));
    }

    #[tokio::test]
    async fn remove_of_unbound_alias_rejects_whole_batch() {
        let store = MemoryIndexStore::new();
        let idx = index("app-users_v1");
        let alias = AliasName::raw("app-users");
        store.seed_index(&idx, serde_json::json!({"mappings": {}}), 0);

        let actions = vec![
            AliasAction::remove("app-users_v1", &alias),
            AliasAction::add(&idx, &alias),
        ];
        assert!(store.update_aliases(&actions).await.is_err());
        // Atomicity: the add half must not have been applied.
        assert!(store.indices_bound_to(&alias).is_empty());
    }
}
