//! Attribute schema and change validation.
//!
//! The schema declares every directory attribute: its value shape, whether it
//! is multi-valued or immutable, its bounds or enum values, its default, the
//! entry kinds that carry it and the callback run when it changes.
//!
//! # Key Types
//!
//! - [`AttributeRegistry`] - Registry of attribute definitions, with change validation
//! - [`AttributeDefinition`] - One attribute's declaration
//! - [`AttributeType`] - Value shapes
//!
//! # Examples
//!
//! ```rust
//! use dirprov::entry::{attrs, AttrChanges, EntryKind};
//! use dirprov::schema::AttributeRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = AttributeRegistry::new()?;
//!
//! let mut changes = AttrChanges::new();
//! changes.set(&attrs::PASSWORD_MIN_LENGTH, 8);
//! registry.validate_changes(EntryKind::Cos, &changes, true)?;
//!
//! let mut changes = AttrChanges::new();
//! changes.set_str("passwordMinLength", "eight");
//! assert!(registry.validate_changes(EntryKind::Cos, &changes, true).is_err());
//! # Ok(())
//! # }
//! ```

pub mod embedded;
pub mod registry;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;

pub use registry::AttributeRegistry;
pub use types::{AttributeDefinition, AttributeSchema, AttributeType};
pub use validation::is_valid_address;
