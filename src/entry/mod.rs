//! Directory entries and typed attribute access.
//!
//! An [`Entry`] is an id, a name, a kind and a string-keyed map of
//! multi-valued attributes. Reads fall back to the entry's resolved defaults
//! (class of service, global config, schema defaults) when the entry itself
//! holds no value.
//!
//! # Examples
//!
//! ```rust
//! use dirprov::entry::{attrs, AccountStatus, AttrChanges, Entry, EntryKind};
//!
//! let mut entry = Entry::new(EntryKind::Account, "a1", "user@example.test");
//! let mut changes = AttrChanges::new();
//! changes
//!     .set(&attrs::DISPLAY_NAME, "Phoebe Shao")
//!     .set(&attrs::ACCOUNT_STATUS, AccountStatus::Active);
//! entry.apply(&changes);
//!
//! assert_eq!(entry.get(&attrs::DISPLAY_NAME).as_deref(), Some("Phoebe Shao"));
//! assert_eq!(entry.get(&attrs::ACCOUNT_STATUS), Some(AccountStatus::Active));
//! assert_eq!(entry.get(&attrs::PASSWORD_MIN_LENGTH), -1);
//! ```

pub mod attrs;
mod changes;
mod enums;
mod kind;
mod typed;
pub mod value;
mod views;

pub use changes::{AttrChange, AttrChanges};
pub use enums::*;
pub use kind::EntryKind;
pub use typed::{Attr, AttrType, DeclaredAttr, EnumValues};
pub use views::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Attribute name to stored values.
pub type AttrMap = BTreeMap<String, Vec<String>>;

/// A directory entry of any kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    id: String,
    name: String,
    kind: EntryKind,
    /// Owning account id for account children (data sources, identities).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    #[serde(default)]
    attrs: AttrMap,
    #[serde(skip)]
    defaults: Arc<AttrMap>,
}

impl Entry {
    pub fn new(kind: EntryKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            parent: None,
            attrs: AttrMap::new(),
            defaults: Arc::default(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Attributes held by the entry itself, without defaults.
    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    pub fn defaults(&self) -> &AttrMap {
        &self.defaults
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_defaults(&mut self, defaults: Arc<AttrMap>) {
        self.defaults = defaults;
    }

    pub(crate) fn attrs_mut(&mut self) -> &mut AttrMap {
        &mut self.attrs
    }

    /// Stored values of `name`, falling back to the defaults chain.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.attrs
            .get(name)
            .filter(|v| !v.is_empty())
            .or_else(|| self.defaults.get(name).filter(|v| !v.is_empty()))
            .map(Vec::as_slice)
    }

    /// Whether the entry itself holds a value for `name`.
    pub fn has(&self, name: &str) -> bool {
        self.attrs.get(name).is_some_and(|v| !v.is_empty())
    }

    /// Typed read of an attribute.
    pub fn get<T: AttrType>(&self, attr: &Attr<T>) -> T::Read {
        T::read(self.values(attr.name()))
    }

    /// First raw value of an attribute.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn get_multi(&self, name: &str) -> Vec<String> {
        Vec::<String>::read(self.values(name))
    }

    pub fn get_bool(&self, name: &str) -> bool {
        bool::read(self.values(name))
    }

    pub fn get_int(&self, name: &str) -> i32 {
        i32::read(self.values(name))
    }

    pub fn get_long(&self, name: &str) -> i64 {
        i64::read(self.values(name))
    }

    /// Time interval in milliseconds, or `default_millis` when unset or unparseable.
    pub fn get_time_interval(&self, name: &str, default_millis: i64) -> i64 {
        self.get_str(name)
            .and_then(value::parse_time_interval)
            .unwrap_or(default_millis)
    }

    pub fn get_generalized_time(&self, name: &str) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::read(self.values(name))
    }

    /// Apply a change set to the entry's own attributes.
    pub fn apply(&mut self, changes: &AttrChanges) {
        changes.apply_to(&mut self.attrs);
    }

    /// Keep only the listed attributes (`id` always stays).
    pub fn retain_attrs(&mut self, keep: &[String]) {
        self.attrs.retain(|name, _| {
            name == "id" || keep.iter().any(|k| k.eq_ignore_ascii_case(name))
        });
        self.defaults = Arc::default();
    }
}

/// Anything with an id and a name.
pub trait NamedEntry {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl NamedEntry for Entry {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A view over an [`Entry`] restricted to some kinds.
pub trait TypedEntry: NamedEntry + Sized + Send + Sync {
    /// Whether entries of `kind` can be viewed as this type.
    fn accepts(kind: EntryKind) -> bool;

    /// Wrap an entry, or `None` when its kind is not accepted.
    fn from_entry(entry: Entry) -> Option<Self>;

    fn entry(&self) -> &Entry;

    fn entry_mut(&mut self) -> &mut Entry;

    fn into_entry(self) -> Entry;
}

impl TypedEntry for Entry {
    fn accepts(_kind: EntryKind) -> bool {
        true
    }

    fn from_entry(entry: Entry) -> Option<Self> {
        Some(entry)
    }

    fn entry(&self) -> &Entry {
        self
    }

    fn entry_mut(&mut self) -> &mut Entry {
        self
    }

    fn into_entry(self) -> Entry {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_chain_fallback() {
        let mut defaults = AttrMap::new();
        defaults.insert("passwordMinLength".into(), vec!["6".into()]);
        defaults.insert("authTokenLifetime".into(), vec!["2d".into()]);

        let mut entry = Entry::new(EntryKind::Account, "a", "a@d.test");
        entry.set_defaults(Arc::new(defaults));
        assert_eq!(entry.get(&attrs::PASSWORD_MIN_LENGTH), 6);
        assert!(!entry.has("passwordMinLength"));

        let mut changes = AttrChanges::new();
        changes.set(&attrs::PASSWORD_MIN_LENGTH, 10);
        entry.apply(&changes);
        assert_eq!(entry.get(&attrs::PASSWORD_MIN_LENGTH), 10);
        assert_eq!(entry.get_time_interval("authTokenLifetime", 0), 172_800_000);
        assert_eq!(entry.get_time_interval("adminAuthTokenLifetime", 42), 42);
    }

    #[test]
    fn test_enum_raw_and_typed() {
        let mut entry = Entry::new(EntryKind::Account, "a", "a@d.test");
        let mut changes = AttrChanges::new();
        changes.set_str("accountStatus", "archived");
        entry.apply(&changes);
        assert_eq!(entry.get(&attrs::ACCOUNT_STATUS), None);
        assert_eq!(entry.get_str("accountStatus"), Some("archived"));
    }

    #[test]
    fn test_serde_skips_defaults() {
        let mut entry = Entry::new(EntryKind::Cos, "c", "default").with_parent("p");
        let mut defaults = AttrMap::new();
        defaults.insert("cn".into(), vec!["x".into()]);
        entry.set_defaults(Arc::new(defaults));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "cos");
        assert!(json.get("defaults").is_none());

        let back: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(back.parent(), Some("p"));
        assert!(back.defaults().is_empty());
    }
}
