//! Attribute change sets.
//!
//! An [`AttrChanges`] collects modifications to be submitted in one
//! `modify_attrs` call. Changes keep their insertion order and are applied in
//! that order.

use super::typed::{Attr, AttrType};
use super::AttrMap;
use std::collections::BTreeMap;

/// One modification of one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrChange {
    /// Replace all values. Empty strings are dropped; nothing left removes the attribute.
    Replace(Vec<String>),
    /// Append a value to a multi-valued attribute.
    Add(String),
    /// Remove one value from a multi-valued attribute.
    Remove(String),
}

impl AttrChange {
    /// Whether this change clears the attribute.
    pub fn is_unset(&self) -> bool {
        matches!(self, AttrChange::Replace(values) if values.iter().all(|v| v.is_empty()))
    }

    /// Values carried by the change.
    pub fn values(&self) -> Vec<&str> {
        match self {
            AttrChange::Replace(values) => values
                .iter()
                .filter(|v| !v.is_empty())
                .map(String::as_str)
                .collect(),
            AttrChange::Add(value) | AttrChange::Remove(value) => vec![value.as_str()],
        }
    }
}

/// Ordered set of attribute changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrChanges {
    changes: Vec<(String, AttrChange)>,
}

impl AttrChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a typed attribute.
    pub fn set<T: AttrType>(&mut self, attr: &Attr<T>, value: impl Into<T>) -> &mut Self {
        let values = value.into().write();
        self.push(attr.name(), AttrChange::Replace(values))
    }

    /// Set a single raw value.
    pub fn set_str(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.push(name.as_ref(), AttrChange::Replace(vec![value.into()]))
    }

    /// Replace all values of a multi-valued attribute.
    pub fn set_multi<I, V>(&mut self, name: impl AsRef<str>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push(name.as_ref(), AttrChange::Replace(values))
    }

    /// Clear an attribute by writing the empty string.
    pub fn unset(&mut self, name: impl AsRef<str>) -> &mut Self {
        self.push(name.as_ref(), AttrChange::Replace(vec![String::new()]))
    }

    pub fn add_value(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.push(name.as_ref(), AttrChange::Add(value.into()))
    }

    pub fn remove_value(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.push(name.as_ref(), AttrChange::Remove(value.into()))
    }

    /// Build a change set from a raw map.
    ///
    /// A key prefixed with `+` adds its values, a key prefixed with `-` removes
    /// them, and a plain key replaces the attribute.
    pub fn from_raw<I, V>(raw: I) -> Self
    where
        I: IntoIterator<Item = (String, V)>,
        V: IntoIterator<Item = String>,
    {
        let mut changes = Self::new();
        for (key, values) in raw {
            if let Some(name) = key.strip_prefix('+') {
                for value in values {
                    changes.add_value(name, value);
                }
            } else if let Some(name) = key.strip_prefix('-') {
                for value in values {
                    changes.remove_value(name, value);
                }
            } else {
                changes.set_multi(&key, values);
            }
        }
        changes
    }

    fn push(&mut self, name: &str, change: AttrChange) -> &mut Self {
        self.changes.push((name.to_string(), change));
        self
    }

    pub(crate) fn push_change(&mut self, name: String, change: AttrChange) {
        self.changes.push((name, change));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrChange)> {
        self.changes.iter().map(|(name, change)| (name.as_str(), change))
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether any change touches `name` (case-insensitive).
    pub fn touches(&self, name: &str) -> bool {
        self.changes
            .iter()
            .any(|(changed, _)| changed.eq_ignore_ascii_case(name))
    }

    /// Append every change of `other`.
    pub fn extend(&mut self, other: AttrChanges) {
        self.changes.extend(other.changes);
    }

    /// Apply the changes in order to an attribute map.
    pub fn apply_to(&self, attrs: &mut AttrMap) {
        for (name, change) in &self.changes {
            match change {
                AttrChange::Replace(values) => {
                    let kept: Vec<String> =
                        values.iter().filter(|v| !v.is_empty()).cloned().collect();
                    if kept.is_empty() {
                        attrs.remove(name);
                    } else {
                        attrs.insert(name.clone(), kept);
                    }
                }
                AttrChange::Add(value) => {
                    if value.is_empty() {
                        continue;
                    }
                    let values = attrs.entry(name.clone()).or_default();
                    if !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
                        values.push(value.clone());
                    }
                }
                AttrChange::Remove(value) => {
                    if let Some(values) = attrs.get_mut(name) {
                        values.retain(|v| !v.eq_ignore_ascii_case(value));
                        if values.is_empty() {
                            attrs.remove(name);
                        }
                    }
                }
            }
        }
    }
}

impl From<BTreeMap<String, Vec<String>>> for AttrChanges {
    fn from(raw: BTreeMap<String, Vec<String>>) -> Self {
        Self::from_raw(raw)
    }
}
