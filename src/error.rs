//! Error types for directory provisioning operations.
//!
//! Every fallible provisioning call returns a [`ProvisioningError`]. Callers that
//! need to branch on the kind of failure match on [`ProvisioningError::code`]
//! instead of inspecting messages.

use crate::entry::EntryKind;
use crate::filter::FilterError;
use crate::schema::AttributeType;
use std::fmt;

/// Main error type for provisioning operations.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    /// The entry addressed by a lookup or mutation does not exist
    #[error("No such {kind}: {key}")]
    NoSuchEntry { kind: EntryKind, key: String },

    /// An alias that was expected on an entry is not there
    #[error("No such alias: {alias}")]
    NoSuchAlias { alias: String },

    /// An entry with the same name or address already exists
    #[error("{kind} already exists: {name}")]
    EntryExists { kind: EntryKind, name: String },

    /// The request is malformed or not allowed
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// An attribute change did not conform to the attribute schema
    #[error("Invalid attribute change: {0}")]
    Validation(#[from] ValidationError),

    /// A search filter could not be parsed
    #[error("Invalid search filter: {0}")]
    Filter(#[from] FilterError),

    /// A domain still holds addressable entries
    #[error("Domain {name} is not empty")]
    DomainNotEmpty { name: String },

    /// Authentication was refused
    #[error("Authentication failed for {account}: {reason}")]
    AuthFailed { account: String, reason: String },

    /// The account is in maintenance mode and cannot authenticate
    #[error("Account {account} is in maintenance mode")]
    MaintenanceMode { account: String },

    /// A password was rejected by the password policy
    #[error("Invalid password: {message}")]
    InvalidPassword { message: String },

    /// A search matched more entries than it was allowed to return
    #[error("Too many search results (limit {limit})")]
    TooManySearchResults { limit: usize },

    /// The storage backend failed
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Anything else
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Typed error code reported by [`ProvisioningError::code`].
///
/// The `Display` form is the dotted wire code (`service.INVALID_REQUEST`,
/// `account.NO_SUCH_ACCOUNT`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidRequest,
    Failure,
    NoSuchEntry(EntryKind),
    NoSuchAlias,
    EntryExists(EntryKind),
    DomainNotEmpty,
    AuthFailed,
    MaintenanceMode,
    InvalidPassword,
    TooManySearchResults,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidRequest => write!(f, "service.INVALID_REQUEST"),
            ErrorCode::Failure => write!(f, "service.FAILURE"),
            ErrorCode::NoSuchEntry(kind) => write!(f, "account.NO_SUCH_{}", kind.code_name()),
            ErrorCode::NoSuchAlias => write!(f, "account.NO_SUCH_ALIAS"),
            ErrorCode::EntryExists(kind) => write!(f, "account.{}_EXISTS", kind.code_name()),
            ErrorCode::DomainNotEmpty => write!(f, "account.DOMAIN_NOT_EMPTY"),
            ErrorCode::AuthFailed => write!(f, "account.AUTH_FAILED"),
            ErrorCode::MaintenanceMode => write!(f, "account.MAINTENANCE_MODE"),
            ErrorCode::InvalidPassword => write!(f, "account.INVALID_PASSWORD"),
            ErrorCode::TooManySearchResults => write!(f, "account.TOO_MANY_SEARCH_RESULTS"),
        }
    }
}

impl ProvisioningError {
    /// The typed code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ProvisioningError::NoSuchEntry { kind, .. } => ErrorCode::NoSuchEntry(*kind),
            ProvisioningError::NoSuchAlias { .. } => ErrorCode::NoSuchAlias,
            ProvisioningError::EntryExists { kind, .. } => ErrorCode::EntryExists(*kind),
            ProvisioningError::InvalidRequest { .. }
            | ProvisioningError::Validation(_)
            | ProvisioningError::Filter(_) => ErrorCode::InvalidRequest,
            ProvisioningError::DomainNotEmpty { .. } => ErrorCode::DomainNotEmpty,
            ProvisioningError::AuthFailed { .. } => ErrorCode::AuthFailed,
            ProvisioningError::MaintenanceMode { .. } => ErrorCode::MaintenanceMode,
            ProvisioningError::InvalidPassword { .. } => ErrorCode::InvalidPassword,
            ProvisioningError::TooManySearchResults { .. } => ErrorCode::TooManySearchResults,
            ProvisioningError::Storage { .. } | ProvisioningError::Internal { .. } => {
                ErrorCode::Failure
            }
        }
    }

    /// Create a no-such-entry error
    pub fn no_such(kind: EntryKind, key: impl Into<String>) -> Self {
        Self::NoSuchEntry {
            kind,
            key: key.into(),
        }
    }

    /// Create an entry-exists error
    pub fn exists(kind: EntryKind, name: impl Into<String>) -> Self {
        Self::EntryExists {
            kind,
            name: name.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an authentication failure
    pub fn auth_failed(account: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AuthFailed {
            account: account.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wrap a storage backend error
    pub fn storage<E>(operation: &str, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: format!("{} failed: {}", operation, error),
            source: Some(Box::new(error)),
        }
    }
}

/// Attribute schema violations found while validating a change set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Attribute is not declared in the schema
    #[error("Unknown attribute '{attribute}'")]
    UnknownAttribute { attribute: String },

    /// Attribute is declared but not for this kind of entry
    #[error("Attribute '{attribute}' does not apply to {kind} entries")]
    NotApplicable { attribute: String, kind: EntryKind },

    /// Attribute cannot be modified
    #[error("Attribute '{attribute}' is immutable")]
    Immutable { attribute: String },

    /// Value does not parse as the declared type
    #[error("Attribute '{attribute}' expects a {expected} value, got '{value}'")]
    InvalidValue {
        attribute: String,
        expected: AttributeType,
        value: String,
    },

    /// Enum attribute given a value outside its declared set
    #[error("Attribute '{attribute}' has invalid value '{value}', allowed values: {allowed:?}")]
    InvalidEnumValue {
        attribute: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Numeric value outside the declared bounds
    #[error("Attribute '{attribute}' value {value} is outside [{min:?}, {max:?}]")]
    OutOfRange {
        attribute: String,
        value: i64,
        min: Option<i64>,
        max: Option<i64>,
    },

    /// More than one value given for a single-valued attribute
    #[error("Attribute '{attribute}' is single-valued, got {count} values")]
    SingleValued { attribute: String, count: usize },

    /// General validation failure
    #[error("Validation failed: {message}")]
    Custom { message: String },
}

impl ValidationError {
    /// Create an unknown attribute error
    pub fn unknown(attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            attribute: attribute.into(),
        }
    }

    /// Create an immutable attribute error
    pub fn immutable(attribute: impl Into<String>) -> Self {
        Self::Immutable {
            attribute: attribute.into(),
        }
    }

    /// Create a custom validation error
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

pub type ProvisioningResult<T> = Result<T, ProvisioningError>;
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let error = ProvisioningError::no_such(EntryKind::Account, "a@b.test");
        assert_eq!(error.code(), ErrorCode::NoSuchEntry(EntryKind::Account));
        assert_eq!(error.code().to_string(), "account.NO_SUCH_ACCOUNT");

        let error = ProvisioningError::exists(EntryKind::DistributionList, "dl@b.test");
        assert_eq!(error.code().to_string(), "account.DISTRIBUTION_LIST_EXISTS");
    }

    #[test]
    fn test_validation_maps_to_invalid_request() {
        let error = ProvisioningError::from(ValidationError::immutable("id"));
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert!(error.to_string().contains("immutable"));
    }

    #[test]
    fn test_storage_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let error = ProvisioningError::storage("put", io);
        assert_eq!(error.code(), ErrorCode::Failure);
        let source = std::error::Error::source(&error).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("disk gone"));
    }
}
