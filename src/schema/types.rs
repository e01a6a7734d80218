//! Core attribute schema type definitions.
//!
//! An [`AttributeSchema`] is a named table of [`AttributeDefinition`]s. Each
//! definition states the value shape of one attribute, whether it holds many
//! values, whether it may change after creation, and which entry kinds carry it.

use crate::entry::EntryKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A table of attribute definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSchema {
    /// Schema identifier
    pub id: String,
    /// Human-readable schema name
    pub name: String,
    /// Schema description
    #[serde(default)]
    pub description: String,
    /// Attribute definitions
    pub attributes: Vec<AttributeDefinition>,
}

/// Definition of one directory attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    /// Attribute name
    pub name: String,
    /// Value shape of the attribute
    #[serde(rename = "type")]
    pub data_type: AttributeType,
    /// Whether this attribute can have multiple values
    #[serde(default)]
    pub multi_valued: bool,
    /// Whether the attribute is fixed once the entry exists
    #[serde(default)]
    pub immutable: bool,
    /// What the attribute means
    #[serde(default)]
    pub description: String,
    /// Allowed values for enum attributes
    #[serde(default)]
    pub enum_values: Vec<String>,
    /// Inclusive lower bound for numeric attributes
    #[serde(default)]
    pub min: Option<i64>,
    /// Inclusive upper bound for numeric attributes
    #[serde(default)]
    pub max: Option<i64>,
    /// Value reported when neither the entry nor its defaults chain holds one
    #[serde(default)]
    pub default_value: Vec<String>,
    /// Entry kinds that carry this attribute
    pub applies_to: Vec<EntryKind>,
    /// Name of the modification callback bound to this attribute
    #[serde(default)]
    pub callback: Option<String>,
}

impl Default for AttributeDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            data_type: AttributeType::String,
            multi_valued: false,
            immutable: false,
            description: String::new(),
            enum_values: Vec::new(),
            min: None,
            max: None,
            default_value: Vec::new(),
            applies_to: Vec::new(),
            callback: None,
        }
    }
}

impl AttributeDefinition {
    /// Whether entries of `kind` carry this attribute.
    pub fn applies_to(&self, kind: EntryKind) -> bool {
        self.applies_to.contains(&kind)
    }
}

/// Value shapes an attribute can take.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    /// Free text
    #[default]
    String,
    /// `TRUE` or `FALSE`
    Boolean,
    /// 32-bit integer
    Integer,
    /// 64-bit integer, optionally with a `kb`/`mb`/`gb` unit
    Long,
    /// Time interval such as `30m` or `100` (seconds)
    Duration,
    /// Generalized time such as `20240102030405Z`
    GeneralizedTime,
    /// One of the declared `enumValues`
    Enum,
    /// Email address (`local@domain`)
    Address,
    /// Entry identifier
    Id,
}

impl AttributeType {
    /// Whether values of this type are read back as plain strings.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            AttributeType::String | AttributeType::Address | AttributeType::Id
        )
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::String => "string",
            AttributeType::Boolean => "boolean",
            AttributeType::Integer => "integer",
            AttributeType::Long => "long",
            AttributeType::Duration => "duration",
            AttributeType::GeneralizedTime => "generalized time",
            AttributeType::Enum => "enum",
            AttributeType::Address => "email address",
            AttributeType::Id => "id",
        };
        f.write_str(name)
    }
}
