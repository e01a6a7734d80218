//! Directory provisioning library for Rust.
//!
//! Provides an async provisioning API over a mail-system directory: classes
//! of service, domains, servers, accounts, calendar resources, distribution
//! lists, data sources, identities and more, with schema-validated attribute
//! changes, alias and membership bookkeeping, password and pre-auth
//! authentication, and global address list and directory search.
//!
//! # Core Components
//!
//! - [`Provisioning`] - The provisioning operations
//! - [`StandardProvisioning`] - Implementation over any storage backend
//! - [`StorageProvider`] - Trait for implementing storage backends
//! - [`AttributeRegistry`] - Attribute schema used to validate changes
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dirprov::{InMemoryStorage, Provisioning, ProvisioningConfig, StandardProvisioning};
//! use dirprov::entry::AttrChanges;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let prov = StandardProvisioning::new(InMemoryStorage::new(), ProvisioningConfig::default()).await?;
//! let domain = prov.create_domain("corp.example.test", AttrChanges::new()).await?;
//! let account = prov
//!     .create_account("user@corp.example.test", Some("test123"), AttrChanges::new())
//!     .await?;
//! assert_eq!(prov.get_all_accounts(&domain).await?.len(), 1);
//! # let _ = account;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod entry;
pub mod error;
pub mod filter;
pub mod harness;
pub mod provisioning;
pub mod schema;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::ProvisioningConfig;
pub use entry::{AttrChanges, Entry, EntryKind, NamedEntry, TypedEntry};
pub use error::{ErrorCode, ProvisioningError, ProvisioningResult};
pub use provisioning::{Provisioning, StandardProvisioning};
pub use schema::AttributeRegistry;
pub use storage::{InMemoryStorage, StorageProvider};
