//! Attribute registry for loading and looking up attribute definitions.
//!
//! The [`AttributeRegistry`] holds every known attribute, keyed
//! case-insensitively, and answers which attributes apply to an entry kind and
//! what their schema defaults are.

use super::{embedded, types::{AttributeDefinition, AttributeSchema, AttributeType}};
use crate::entry::{AttrMap, EntryKind};

use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Registry of attribute definitions.
#[derive(Debug, Clone)]
pub struct AttributeRegistry {
    schema_id: String,
    definitions: HashMap<String, AttributeDefinition>,
}

impl AttributeRegistry {
    /// Create a registry from the embedded core schema.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_embedded_schema()
    }

    /// Create a registry from the schema embedded in the library.
    ///
    /// This needs no files on disk and is what the provisioning engine uses.
    pub fn with_embedded_schema() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_json_str(embedded::core_attribute_schema())
    }

    /// Load a registry from a JSON schema file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    /// Load a registry from a JSON schema string.
    pub fn from_json_str(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let schema: AttributeSchema = serde_json::from_str(content)?;
        let mut registry = Self {
            schema_id: schema.id,
            definitions: HashMap::with_capacity(schema.attributes.len()),
        };
        for definition in schema.attributes {
            registry.add_definition(definition)?;
        }
        debug!(
            "Loaded {} attribute definitions from {}",
            registry.definitions.len(),
            registry.schema_id
        );
        Ok(registry)
    }

    /// Add or replace a definition.
    pub fn add_definition(
        &mut self,
        definition: AttributeDefinition,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if definition.name.is_empty() {
            return Err("attribute definition without a name".into());
        }
        if definition.data_type == AttributeType::Enum && definition.enum_values.is_empty() {
            return Err(format!("enum attribute '{}' declares no values", definition.name).into());
        }
        if definition.applies_to.is_empty() {
            return Err(format!("attribute '{}' applies to no entry kind", definition.name).into());
        }
        self.definitions
            .insert(definition.name.to_ascii_lowercase(), definition);
        Ok(())
    }

    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// Look up a definition, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.definitions.get(&name.to_ascii_lowercase())
    }

    pub fn definitions(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.definitions.values()
    }

    /// Definitions that apply to `kind`, sorted by name.
    pub fn definitions_for(&self, kind: EntryKind) -> Vec<&AttributeDefinition> {
        let mut definitions: Vec<_> = self
            .definitions
            .values()
            .filter(|definition| definition.applies_to(kind))
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Schema default values of every attribute of `kind` that declares one.
    pub fn defaults_for(&self, kind: EntryKind) -> AttrMap {
        self.definitions
            .values()
            .filter(|definition| definition.applies_to(kind) && !definition.default_value.is_empty())
            .map(|definition| (definition.name.clone(), definition.default_value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
