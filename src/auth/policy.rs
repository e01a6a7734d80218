//! Password strength policy.

use crate::entry::{attrs, Entry};
use crate::error::{ProvisioningError, ProvisioningResult};

/// Strength requirements read from an account (through its defaults chain).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub min_upper_case: usize,
    pub min_lower_case: usize,
    pub min_numeric: usize,
    pub min_punctuation: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 64,
            min_upper_case: 0,
            min_lower_case: 0,
            min_numeric: 0,
            min_punctuation: 0,
        }
    }
}

impl PasswordPolicy {
    /// Read the policy attributes; unset or negative values keep the defaults.
    pub fn from_entry(entry: &Entry) -> Self {
        let defaults = Self::default();
        let read = |value: i32, fallback: usize| usize::try_from(value).unwrap_or(fallback);
        Self {
            min_length: read(entry.get(&attrs::PASSWORD_MIN_LENGTH), defaults.min_length),
            max_length: read(entry.get(&attrs::PASSWORD_MAX_LENGTH), defaults.max_length),
            min_upper_case: read(
                entry.get(&attrs::PASSWORD_MIN_UPPER_CASE_CHARS),
                defaults.min_upper_case,
            ),
            min_lower_case: read(
                entry.get(&attrs::PASSWORD_MIN_LOWER_CASE_CHARS),
                defaults.min_lower_case,
            ),
            min_numeric: read(
                entry.get(&attrs::PASSWORD_MIN_NUMERIC_CHARS),
                defaults.min_numeric,
            ),
            min_punctuation: read(
                entry.get(&attrs::PASSWORD_MIN_PUNCTUATION_CHARS),
                defaults.min_punctuation,
            ),
        }
    }

    /// Check a candidate password, failing with `InvalidPassword`.
    pub fn check(&self, password: &str) -> ProvisioningResult<()> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(invalid(format!(
                "too short, minimum length is {}",
                self.min_length
            )));
        }
        if self.max_length > 0 && length > self.max_length {
            return Err(invalid(format!(
                "too long, maximum length is {}",
                self.max_length
            )));
        }

        let count = |predicate: fn(&char) -> bool| password.chars().filter(predicate).count();
        let classes = [
            (count(char::is_ascii_uppercase), self.min_upper_case, "upper case"),
            (count(char::is_ascii_lowercase), self.min_lower_case, "lower case"),
            (count(char::is_ascii_digit), self.min_numeric, "numeric"),
            (count(char::is_ascii_punctuation), self.min_punctuation, "punctuation"),
        ];
        for (found, required, class) in classes {
            if found < required {
                return Err(invalid(format!(
                    "needs at least {} {} characters",
                    required, class
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> ProvisioningError {
    ProvisioningError::InvalidPassword { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{AttrChanges, EntryKind};
    use crate::error::ErrorCode;

    #[test]
    fn test_defaults_apply_when_unset() {
        let entry = Entry::new(EntryKind::Account, "a", "a@d.test");
        let policy = PasswordPolicy::from_entry(&entry);
        assert_eq!(policy, PasswordPolicy::default());
        assert!(policy.check("test123").is_ok());
        assert_eq!(policy.check("short").unwrap_err().code(), ErrorCode::InvalidPassword);
        assert!(policy.check(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_character_classes() {
        let mut entry = Entry::new(EntryKind::Account, "a", "a@d.test");
        let mut changes = AttrChanges::new();
        changes
            .set(&attrs::PASSWORD_MIN_UPPER_CASE_CHARS, 1)
            .set(&attrs::PASSWORD_MIN_NUMERIC_CHARS, 2)
            .set(&attrs::PASSWORD_MIN_PUNCTUATION_CHARS, 1);
        entry.apply(&changes);

        let policy = PasswordPolicy::from_entry(&entry);
        assert!(policy.check("abcdef12!").is_err());
        assert!(policy.check("Abcdef1!").is_err());
        assert!(policy.check("Abcdef12!").is_ok());
    }
}
