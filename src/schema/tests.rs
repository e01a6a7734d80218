//! Tests for the attribute registry, change validation and the agreement
//! between typed keys and the schema table.

use super::registry::AttributeRegistry;
use super::types::AttributeType;
use crate::entry::{attrs, AttrChanges, EntryKind};
use crate::error::ValidationError;

fn registry() -> AttributeRegistry {
    AttributeRegistry::new().expect("Failed to create registry")
}

#[test]
fn test_registry_creation() {
    let registry = registry();
    assert!(registry.len() > 100);
    assert_eq!(registry.schema_id(), "urn:dirprov:schemas:core:1.0:Attributes");

    let definition = registry.get("DISPLAYNAME").expect("case-insensitive lookup");
    assert_eq!(definition.name, "displayName");
    assert_eq!(definition.data_type, AttributeType::String);
}

#[test]
fn test_every_kind_has_id() {
    let registry = registry();
    for kind in EntryKind::ALL {
        let names: Vec<_> = registry
            .definitions_for(kind)
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert!(names.contains(&"id".to_string()), "{} lacks id", kind);
    }
}

#[test]
fn test_typed_keys_agree_with_schema() {
    let registry = registry();
    let declared = attrs::declared();

    for key in &declared {
        let definition = registry
            .get(key.name)
            .unwrap_or_else(|| panic!("typed key {} is not in the schema", key.name));
        assert_eq!(definition.name, key.name, "case of {}", key.name);
        assert_eq!(
            definition.multi_valued, key.multi_valued,
            "multi-valued flag of {}",
            key.name
        );
        assert!(
            (key.accepts)(definition.data_type),
            "{} is declared as {} but its key reads another type",
            key.name,
            definition.data_type
        );
        if !key.enum_values.is_empty() {
            let expected: Vec<_> = key.enum_values.iter().map(|v| v.to_string()).collect();
            assert_eq!(definition.enum_values, expected, "enum values of {}", key.name);
        }
    }

    for definition in registry.definitions() {
        assert!(
            declared.iter().any(|key| key.name == definition.name),
            "schema attribute {} has no typed key",
            definition.name
        );
    }
}

#[test]
fn test_schema_defaults_are_valid_values() {
    let registry = registry();
    for definition in registry.definitions() {
        for value in &definition.default_value {
            registry
                .validate_value(definition, value)
                .unwrap_or_else(|e| panic!("default of {}: {}", definition.name, e));
        }
    }
}

#[test]
fn test_defaults_for_kind() {
    let registry = registry();
    let defaults = registry.defaults_for(EntryKind::Cos);
    assert_eq!(defaults["passwordMinLength"], vec!["6".to_string()]);
    assert_eq!(defaults["authTokenLifetime"], vec!["2d".to_string()]);
    assert!(!defaults.contains_key("galMaxResults"));
}

#[test]
fn test_unknown_and_not_applicable() {
    let registry = registry();

    let mut changes = AttrChanges::new();
    changes.set_str("noSuchThing", "x");
    assert!(matches!(
        registry.validate_changes(EntryKind::Account, &changes, true),
        Err(ValidationError::UnknownAttribute { .. })
    ));

    let mut changes = AttrChanges::new();
    changes.set(&attrs::ZIMLET_PRIORITY, 3);
    assert!(matches!(
        registry.validate_changes(EntryKind::Account, &changes, true),
        Err(ValidationError::NotApplicable { kind: EntryKind::Account, .. })
    ));
}

#[test]
fn test_immutable_only_with_check() {
    let registry = registry();
    let mut changes = AttrChanges::new();
    changes.set_str("dataSourceType", "imap");

    assert_eq!(
        registry.validate_changes(EntryKind::DataSource, &changes, true),
        Err(ValidationError::immutable("dataSourceType"))
    );
    assert!(
        registry
            .validate_changes(EntryKind::DataSource, &changes, false)
            .is_ok()
    );
}

#[test]
fn test_value_shapes() {
    let registry = registry();
    let check = |name: &str, value: &str| {
        let mut changes = AttrChanges::new();
        changes.set_str(name, value);
        registry.validate_changes(EntryKind::Account, &changes, false)
    };

    assert!(check("isAdminAccount", "TRUE").is_ok());
    assert!(check("isAdminAccount", "maybe").is_err());
    assert!(check("passwordMinLength", "12").is_ok());
    assert!(matches!(
        check("passwordMinLength", "-1"),
        Err(ValidationError::OutOfRange { value: -1, .. })
    ));
    assert!(check("mailQuota", "10mb").is_ok());
    assert!(check("authTokenLifetime", "1h").is_ok());
    assert!(check("authTokenLifetime", "soon").is_err());
    assert!(check("passwordModifiedTime", "20240102030405Z").is_ok());
    assert!(check("mail", "not-an-address").is_err());
    assert!(matches!(
        check("accountStatus", "archived"),
        Err(ValidationError::InvalidEnumValue { .. })
    ));
    assert!(check("accountStatus", "").is_ok());
}

#[test]
fn test_multi_value_rules() {
    let registry = registry();

    let mut changes = AttrChanges::new();
    changes.set_multi("displayName", ["a", "b"]);
    assert!(matches!(
        registry.validate_changes(EntryKind::Account, &changes, false),
        Err(ValidationError::SingleValued { count: 2, .. })
    ));

    let mut changes = AttrChanges::new();
    changes.add_value("displayName", "a");
    assert!(registry.validate_changes(EntryKind::Account, &changes, false).is_err());

    let mut changes = AttrChanges::new();
    changes.add_value("MAILALIAS", "x@d.test");
    let canonical = registry
        .validate_changes(EntryKind::Account, &changes, false)
        .unwrap();
    assert_eq!(canonical.iter().next().unwrap().0, "mailAlias");
}

#[test]
fn test_load_rejects_enum_without_values() {
    let json = r#"{"id": "x", "name": "x", "attributes": [
        {"name": "colour", "type": "enum", "appliesTo": ["account"]}
    ]}"#;
    assert!(AttributeRegistry::from_json_str(json).is_err());
}
