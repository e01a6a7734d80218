//! Errors raised by the in-memory backend.
//!
//! They know nothing about entries or provisioning rules; the engine wraps
//! them into [`crate::error::ProvisioningError::Storage`].

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Malformed lookup, such as an empty attribute path.
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },
}

impl StorageError {
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            StorageError::invalid_query("attribute path is empty").to_string(),
            "Invalid query: attribute path is empty"
        );
    }
}
