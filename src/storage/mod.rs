//! Storage abstraction layer for directory entries.
//!
//! The `StorageProvider` trait defines plain document operations on JSON values
//! keyed by scope, kind and id. It knows nothing about attribute schemas,
//! uniqueness of addresses or membership; those rules live in the provisioning
//! engine, which is the only writer.
//!
//! # Layout
//!
//! * `directory` scope: every top-level entry (accounts, domains, coses, ...)
//! * `admins` scope: system administrator accounts
//! * `<account id>` scope: entries owned by an account (data sources, identities)
//!
//! At the storage level create and update are the same `put`.
//!
//! # Example Usage
//!
//! ```rust
//! use dirprov::storage::{InMemoryStorage, StorageKey, StorageProvider};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//!
//! let key = StorageKey::new("directory", "account", "123");
//! let doc = json!({"id": "123", "name": "user@example.test", "kind": "account"});
//! storage.put(key.clone(), doc).await?;
//!
//! assert!(storage.get(key.clone()).await?.is_some());
//! assert!(storage.delete(key).await?);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;

pub use errors::StorageError;
pub use in_memory::{InMemoryStorage, InMemoryStorageStats};

use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Scope holding top-level directory entries.
pub const DIRECTORY_SCOPE: &str = "directory";
/// Scope holding system administrator accounts.
pub const ADMIN_SCOPE: &str = "admins";

/// A hierarchical key: `scope` → `kind` → `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    scope: String,
    kind: String,
    id: String,
}

impl StorageKey {
    pub fn new(scope: impl Into<String>, kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Create a prefix for listing documents of a kind within a scope.
    pub fn prefix(scope: impl Into<String>, kind: impl Into<String>) -> StoragePrefix {
        StoragePrefix {
            scope: scope.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.scope, self.kind, self.id)
    }
}

/// A prefix for querying documents by scope and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePrefix {
    scope: String,
    kind: String,
}

impl StoragePrefix {
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Key of the document `id` under this prefix.
    pub fn key(&self, id: impl Into<String>) -> StorageKey {
        StorageKey::new(self.scope.clone(), self.kind.clone(), id)
    }
}

impl fmt::Display for StoragePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.kind)
    }
}

/// Document store behind the provisioning engine.
///
/// `put` replaces whatever is stored at the key; `delete` reports whether
/// anything was there. Listing results are ordered by id.
pub trait StorageProvider: Send + Sync {
    /// The error type returned by storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store a document and return what was stored.
    fn put(
        &self,
        key: StorageKey,
        data: Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    fn get(
        &self,
        key: StorageKey,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    /// Delete a document; `true` if it existed.
    fn delete(&self, key: StorageKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// List documents under a prefix, ordered by id, skipping `offset` and
    /// returning at most `limit`.
    fn list(
        &self,
        prefix: StoragePrefix,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, Self::Error>> + Send;

    /// Find documents whose attribute at a dot path equals `value`.
    ///
    /// Matching ignores ASCII case. When the path ends on an array, any
    /// element may match (`attrs.mailAlias` matches every alias).
    fn find_by_attribute(
        &self,
        prefix: StoragePrefix,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, Self::Error>> + Send;

    fn exists(&self, key: StorageKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn count(
        &self,
        prefix: StoragePrefix,
    ) -> impl Future<Output = Result<usize, Self::Error>> + Send;

    /// Every scope that holds at least one document.
    fn list_scopes(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;

    /// Remove every document under a scope; returns how many were removed.
    fn clear_scope(&self, scope: &str)
    -> impl Future<Output = Result<usize, Self::Error>> + Send;
}
