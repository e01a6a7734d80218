//! Validation of attribute change sets against the registry.

use super::registry::AttributeRegistry;
use super::types::{AttributeDefinition, AttributeType};
use crate::entry::{value, AttrChange, AttrChanges, EntryKind};
use crate::error::{ValidationError, ValidationResult};

impl AttributeRegistry {
    /// Validate a change set for an entry of `kind`.
    ///
    /// Returns the same changes with attribute names in their canonical case.
    /// With `check_immutable`, changes to immutable attributes are rejected.
    pub fn validate_changes(
        &self,
        kind: EntryKind,
        changes: &AttrChanges,
        check_immutable: bool,
    ) -> ValidationResult<AttrChanges> {
        let mut canonical = AttrChanges::new();

        for (name, change) in changes.iter() {
            let definition = self
                .get(name)
                .ok_or_else(|| ValidationError::unknown(name))?;

            if !definition.applies_to(kind) {
                return Err(ValidationError::NotApplicable {
                    attribute: definition.name.clone(),
                    kind,
                });
            }

            if check_immutable && definition.immutable {
                return Err(ValidationError::immutable(&definition.name));
            }

            match change {
                AttrChange::Replace(values) => {
                    let count = values.iter().filter(|v| !v.is_empty()).count();
                    if count > 1 && !definition.multi_valued {
                        return Err(ValidationError::SingleValued {
                            attribute: definition.name.clone(),
                            count,
                        });
                    }
                    for value in values.iter().filter(|v| !v.is_empty()) {
                        self.validate_value(definition, value)?;
                    }
                }
                AttrChange::Add(value) | AttrChange::Remove(value) => {
                    if !definition.multi_valued {
                        return Err(ValidationError::custom(format!(
                            "cannot add or remove single values of single-valued attribute '{}'",
                            definition.name
                        )));
                    }
                    if matches!(change, AttrChange::Add(_)) {
                        self.validate_value(definition, value)?;
                    }
                }
            }

            canonical.push_change(definition.name.clone(), change.clone());
        }

        Ok(canonical)
    }

    /// Check one value against its definition.
    pub fn validate_value(
        &self,
        definition: &AttributeDefinition,
        raw: &str,
    ) -> ValidationResult<()> {
        let invalid = || ValidationError::InvalidValue {
            attribute: definition.name.clone(),
            expected: definition.data_type,
            value: raw.to_string(),
        };

        match definition.data_type {
            AttributeType::String => Ok(()),
            AttributeType::Boolean => value::parse_bool(raw).map(|_| ()).ok_or_else(invalid),
            AttributeType::Integer => {
                let number: i32 = raw.trim().parse().map_err(|_| invalid())?;
                Self::check_range(definition, i64::from(number))
            }
            AttributeType::Long => {
                let number = value::parse_long(raw).ok_or_else(invalid)?;
                Self::check_range(definition, number)
            }
            AttributeType::Duration => value::parse_time_interval(raw)
                .map(|_| ())
                .ok_or_else(invalid),
            AttributeType::GeneralizedTime => value::parse_generalized_time(raw)
                .map(|_| ())
                .ok_or_else(invalid),
            AttributeType::Enum => {
                if definition.enum_values.iter().any(|allowed| allowed == raw) {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidEnumValue {
                        attribute: definition.name.clone(),
                        value: raw.to_string(),
                        allowed: definition.enum_values.clone(),
                    })
                }
            }
            AttributeType::Address => {
                if is_valid_address(raw) {
                    Ok(())
                } else {
                    Err(invalid())
                }
            }
            AttributeType::Id => {
                if raw.chars().any(char::is_whitespace) {
                    Err(invalid())
                } else {
                    Ok(())
                }
            }
        }
    }

    fn check_range(definition: &AttributeDefinition, number: i64) -> ValidationResult<()> {
        let below = definition.min.is_some_and(|min| number < min);
        let above = definition.max.is_some_and(|max| number > max);
        if below || above {
            return Err(ValidationError::OutOfRange {
                attribute: definition.name.clone(),
                value: number,
                min: definition.min,
                max: definition.max,
            });
        }
        Ok(())
    }
}

/// `local@domain` with non-empty parts, no whitespace and a single `@`.
pub fn is_valid_address(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !address.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
