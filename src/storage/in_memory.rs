//! In-memory storage implementation.
//!
//! A thread-safe `StorageProvider` over nested hash maps guarded by a tokio
//! `RwLock`. It backs the smoke test and the test suite, and is the reference
//! for what a persistent backend has to provide.
//!
//! # Performance Characteristics
//!
//! * PUT/GET/DELETE: O(1) average case
//! * LIST: O(n log n) in the documents of the prefix (ids are sorted)
//! * FIND_BY_ATTRIBUTE: O(n) in the documents of the prefix
//!
//! # Example Usage
//!
//! ```rust
//! use dirprov::storage::{InMemoryStorage, StorageKey, StorageProvider};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//! let key = StorageKey::new("directory", "account", "a1");
//! storage
//!     .put(key, json!({"id": "a1", "attrs": {"mailAlias": ["x@d.test", "y@d.test"]}}))
//!     .await?;
//!
//! let prefix = StorageKey::prefix("directory", "account");
//! let found = storage.find_by_attribute(prefix, "attrs.mailAlias", "Y@D.TEST").await?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::storage::{StorageError, StorageKey, StoragePrefix, StorageProvider};
use log::trace;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type ScopeData = HashMap<String, HashMap<String, Value>>;

/// Thread-safe in-memory storage.
///
/// Layout: `scope` → `kind` → `id` → `document`.
#[derive(Clone)]
pub struct InMemoryStorage {
    data: Arc<RwLock<HashMap<String, ScopeData>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get storage statistics for debugging and tests.
    pub async fn stats(&self) -> InMemoryStorageStats {
        let data_guard = self.data.read().await;
        let mut kind_count = 0;
        let mut total_documents = 0;

        for scope_data in data_guard.values() {
            for kind_data in scope_data.values() {
                if !kind_data.is_empty() {
                    kind_count += 1;
                    total_documents += kind_data.len();
                }
            }
        }

        InMemoryStorageStats {
            scope_count: data_guard.len(),
            kind_count,
            total_documents,
        }
    }

    /// Drop every document.
    pub async fn clear(&self) {
        self.data.write().await.clear();
    }

    /// Values at a dot path; arrays at the end of the path yield every element.
    fn extract_attribute_values(data: &Value, attribute_path: &str) -> Vec<String> {
        let mut current = data;
        for part in attribute_path.split('.') {
            let next = match part.parse::<usize>() {
                Ok(index) => current.get(index),
                Err(_) => current.get(part),
            };
            match next {
                Some(value) => current = value,
                None => return Vec::new(),
            }
        }

        fn scalar(value: &Value) -> Option<String> {
            match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            }
        }

        match current {
            Value::Array(items) => items.iter().filter_map(scalar).collect(),
            other => scalar(other).into_iter().collect(),
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageProvider for InMemoryStorage {
    type Error = StorageError;

    async fn put(&self, key: StorageKey, data: Value) -> Result<Value, Self::Error> {
        trace!("put {}", key);
        let mut data_guard = self.data.write().await;
        data_guard
            .entry(key.scope().to_string())
            .or_default()
            .entry(key.kind().to_string())
            .or_default()
            .insert(key.id().to_string(), data.clone());
        Ok(data)
    }

    async fn get(&self, key: StorageKey) -> Result<Option<Value>, Self::Error> {
        let data_guard = self.data.read().await;
        Ok(data_guard
            .get(key.scope())
            .and_then(|scope_data| scope_data.get(key.kind()))
            .and_then(|kind_data| kind_data.get(key.id()))
            .cloned())
    }

    async fn delete(&self, key: StorageKey) -> Result<bool, Self::Error> {
        trace!("delete {}", key);
        let mut data_guard = self.data.write().await;
        let existed = match data_guard.get_mut(key.scope()) {
            Some(scope_data) => {
                let removed = scope_data
                    .get_mut(key.kind())
                    .map(|kind_data| kind_data.remove(key.id()).is_some())
                    .unwrap_or(false);
                scope_data.retain(|_, kind_data| !kind_data.is_empty());
                removed
            }
            None => false,
        };
        data_guard.retain(|_, scope_data| !scope_data.is_empty());
        Ok(existed)
    }

    async fn list(
        &self,
        prefix: StoragePrefix,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let data_guard = self.data.read().await;
        let Some(kind_data) = data_guard
            .get(prefix.scope())
            .and_then(|scope_data| scope_data.get(prefix.kind()))
        else {
            return Ok(Vec::new());
        };

        let mut ids: Vec<_> = kind_data.keys().collect();
        ids.sort();

        Ok(ids
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| kind_data.get(id).map(|data| (prefix.key(id.as_str()), data.clone())))
            .collect())
    }

    async fn find_by_attribute(
        &self,
        prefix: StoragePrefix,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        if attribute.is_empty() {
            return Err(StorageError::invalid_query("attribute path is empty"));
        }

        let data_guard = self.data.read().await;
        let Some(kind_data) = data_guard
            .get(prefix.scope())
            .and_then(|scope_data| scope_data.get(prefix.kind()))
        else {
            return Ok(Vec::new());
        };

        let mut results: Vec<(StorageKey, Value)> = kind_data
            .iter()
            .filter(|(_, data)| {
                Self::extract_attribute_values(data, attribute)
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(value))
            })
            .map(|(id, data)| (prefix.key(id.as_str()), data.clone()))
            .collect();

        results.sort_by(|a, b| a.0.id().cmp(b.0.id()));
        Ok(results)
    }

    async fn exists(&self, key: StorageKey) -> Result<bool, Self::Error> {
        let data_guard = self.data.read().await;
        Ok(data_guard
            .get(key.scope())
            .and_then(|scope_data| scope_data.get(key.kind()))
            .is_some_and(|kind_data| kind_data.contains_key(key.id())))
    }

    async fn count(&self, prefix: StoragePrefix) -> Result<usize, Self::Error> {
        let data_guard = self.data.read().await;
        Ok(data_guard
            .get(prefix.scope())
            .and_then(|scope_data| scope_data.get(prefix.kind()))
            .map(HashMap::len)
            .unwrap_or(0))
    }

    async fn list_scopes(&self) -> Result<Vec<String>, Self::Error> {
        let data_guard = self.data.read().await;
        let mut scopes: Vec<String> = data_guard.keys().cloned().collect();
        scopes.sort();
        Ok(scopes)
    }

    async fn clear_scope(&self, scope: &str) -> Result<usize, Self::Error> {
        let mut data_guard = self.data.write().await;
        Ok(data_guard
            .remove(scope)
            .map(|scope_data| scope_data.values().map(HashMap::len).sum())
            .unwrap_or(0))
    }
}

/// Statistics about the current state of in-memory storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStorageStats {
    /// Number of scopes with data
    pub scope_count: usize,
    /// Number of (scope, kind) buckets with data
    pub kind_count: usize,
    /// Total number of stored documents
    pub total_documents: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_and_get() {
        let storage = InMemoryStorage::new();
        let key = StorageKey::new("directory", "cos", "c1");
        let doc = json!({"id": "c1", "name": "default"});

        storage.put(key.clone(), doc.clone()).await.unwrap();
        assert_eq!(storage.get(key).await.unwrap(), Some(doc));
        assert!(
            storage
                .get(StorageKey::new("directory", "cos", "missing"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_prunes_empty_buckets() {
        let storage = InMemoryStorage::new();
        let key = StorageKey::new("acct-1", "identity", "i1");
        storage.put(key.clone(), json!({"id": "i1"})).await.unwrap();
        assert_eq!(storage.list_scopes().await.unwrap(), vec!["acct-1".to_string()]);

        assert!(storage.delete(key.clone()).await.unwrap());
        assert!(!storage.delete(key).await.unwrap());
        assert!(storage.list_scopes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_paged() {
        let storage = InMemoryStorage::new();
        for id in ["c", "a", "b"] {
            storage
                .put(StorageKey::new("directory", "domain", id), json!({"id": id}))
                .await
                .unwrap();
        }
        let prefix = StorageKey::prefix("directory", "domain");

        let all = storage.list(prefix.clone(), 0, usize::MAX).await.unwrap();
        let ids: Vec<_> = all.iter().map(|(k, _)| k.id().to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let page = storage.list(prefix.clone(), 1, 1).await.unwrap();
        assert_eq!(page[0].0.id(), "b");
        assert!(storage.list(prefix, 0, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_attribute_matches_array_elements() {
        let storage = InMemoryStorage::new();
        storage
            .put(
                StorageKey::new("directory", "account", "a1"),
                json!({"name": "one@d.test", "attrs": {"mailAlias": ["alias@d.test"]}}),
            )
            .await
            .unwrap();
        storage
            .put(
                StorageKey::new("directory", "account", "a2"),
                json!({"name": "two@d.test", "attrs": {}}),
            )
            .await
            .unwrap();
        let prefix = StorageKey::prefix("directory", "account");

        let by_alias = storage
            .find_by_attribute(prefix.clone(), "attrs.mailAlias", "ALIAS@d.test")
            .await
            .unwrap();
        assert_eq!(by_alias.len(), 1);
        assert_eq!(by_alias[0].0.id(), "a1");

        let by_name = storage
            .find_by_attribute(prefix.clone(), "name", "two@d.test")
            .await
            .unwrap();
        assert_eq!(by_name[0].0.id(), "a2");

        assert!(storage.find_by_attribute(prefix, "", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_scope_isolation() {
        let storage = InMemoryStorage::new();
        storage
            .put(StorageKey::new("directory", "account", "a"), json!({"id": "a"}))
            .await
            .unwrap();
        storage
            .put(StorageKey::new("admins", "account", "s"), json!({"id": "s"}))
            .await
            .unwrap();

        assert_eq!(storage.count(StorageKey::prefix("directory", "account")).await.unwrap(), 1);
        assert!(!storage.exists(StorageKey::new("directory", "account", "s")).await.unwrap());

        assert_eq!(storage.clear_scope("admins").await.unwrap(), 1);
        let stats = storage.stats().await;
        assert_eq!(stats.scope_count, 1);
        assert_eq!(stats.total_documents, 1);

        storage.clear().await;
        assert_eq!(storage.stats().await.total_documents, 0);
    }
}
