//! Configuration of the provisioning engine.
//!
//! [`ProvisioningConfig`] names the entries the engine bootstraps (default
//! domain, default class of service, local server, administrators) and a few
//! limits. It can be built in code with [`ProvisioningConfig::builder`] or
//! loaded from JSON; missing fields take their defaults.
//!
//! # Examples
//!
//! ```rust
//! use dirprov::config::ProvisioningConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProvisioningConfig::builder()
//!     .with_default_domain("corp.example.test")
//!     .with_gal_max_results(50)
//!     .build()?;
//! assert_eq!(config.default_domain, "corp.example.test");
//!
//! let config = ProvisioningConfig::from_json_str(r#"{"localServerName": "mail-1"}"#)?;
//! assert_eq!(config.local_server_name, "mail-1");
//! assert_eq!(config.default_cos_name, "default");
//! # Ok(())
//! # }
//! ```

use crate::error::{ProvisioningError, ProvisioningResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable the smoke binary reads a config path from.
pub const CONFIG_ENV_VAR: &str = "DIRPROV_CONFIG";

/// Settings of a [`crate::provisioning::StandardProvisioning`] instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvisioningConfig {
    /// Domain used to qualify bare names, created at bootstrap.
    pub default_domain: String,

    /// Name of the class of service accounts fall back to.
    pub default_cos_name: String,

    /// Name of the server `get_local_server` returns.
    pub local_server_name: String,

    /// Services enabled on the local server.
    pub local_server_services: Vec<String>,

    /// Local part of the system administrator, kept apart from directory accounts.
    pub system_admin_name: String,

    /// Local part of the global administrator created in the default domain.
    pub admin_name: String,

    /// Initial password of both administrators.
    pub admin_password: String,

    /// Upper bound of GAL results when the domain does not set one.
    pub gal_max_results: usize,

    /// Allowed clock skew of pre-auth timestamps, in seconds.
    pub preauth_max_skew_secs: u64,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            default_domain: "example.test".to_string(),
            default_cos_name: "default".to_string(),
            local_server_name: "localhost".to_string(),
            local_server_services: vec![
                "mailbox".to_string(),
                "ldap".to_string(),
                "mta".to_string(),
            ],
            system_admin_name: "zimbra".to_string(),
            admin_name: "admin".to_string(),
            admin_password: "test123".to_string(),
            gal_max_results: 100,
            preauth_max_skew_secs: 300,
        }
    }
}

impl ProvisioningConfig {
    pub fn builder() -> ProvisioningConfigBuilder {
        ProvisioningConfigBuilder::default()
    }

    /// Load and validate a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ProvisioningResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProvisioningError::invalid_request(format!(
                "cannot read config {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(content: &str) -> ProvisioningResult<Self> {
        let config: Self = serde_json::from_str(content).map_err(|e| {
            ProvisioningError::invalid_request(format!("invalid config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ProvisioningResult<()> {
        let required = [
            ("defaultDomain", &self.default_domain),
            ("defaultCosName", &self.default_cos_name),
            ("localServerName", &self.local_server_name),
            ("systemAdminName", &self.system_admin_name),
            ("adminName", &self.admin_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ProvisioningError::invalid_request(format!(
                    "config field {} cannot be empty",
                    field
                )));
            }
        }
        if self.default_domain.contains('@') || self.admin_name.contains('@') {
            return Err(ProvisioningError::invalid_request(
                "defaultDomain and adminName must not contain '@'",
            ));
        }
        if self.gal_max_results == 0 {
            return Err(ProvisioningError::invalid_request(
                "galMaxResults must be positive",
            ));
        }
        Ok(())
    }

    /// Address of the bootstrap global administrator.
    pub fn admin_address(&self) -> String {
        format!("{}@{}", self.admin_name, self.default_domain)
    }

    pub fn preauth_max_skew_ms(&self) -> i64 {
        i64::try_from(self.preauth_max_skew_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

/// Fluent builder for [`ProvisioningConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProvisioningConfigBuilder {
    config: ProvisioningConfig,
}

impl ProvisioningConfigBuilder {
    pub fn with_default_domain(mut self, domain: impl Into<String>) -> Self {
        self.config.default_domain = domain.into();
        self
    }

    pub fn with_default_cos_name(mut self, name: impl Into<String>) -> Self {
        self.config.default_cos_name = name.into();
        self
    }

    pub fn with_local_server(mut self, name: impl Into<String>, services: Vec<String>) -> Self {
        self.config.local_server_name = name.into();
        self.config.local_server_services = services;
        self
    }

    pub fn with_system_admin_name(mut self, name: impl Into<String>) -> Self {
        self.config.system_admin_name = name.into();
        self
    }

    pub fn with_admin(mut self, name: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.admin_name = name.into();
        self.config.admin_password = password.into();
        self
    }

    pub fn with_gal_max_results(mut self, max: usize) -> Self {
        self.config.gal_max_results = max;
        self
    }

    pub fn with_preauth_max_skew_secs(mut self, secs: u64) -> Self {
        self.config.preauth_max_skew_secs = secs;
        self
    }

    /// Validate and return the config.
    pub fn build(self) -> ProvisioningResult<ProvisioningConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_defaults() {
        let config = ProvisioningConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.admin_address(), "admin@example.test");
        assert_eq!(config.preauth_max_skew_ms(), 300_000);
    }

    #[test]
    fn test_builder_validates() {
        let error = ProvisioningConfig::builder()
            .with_default_domain("")
            .build()
            .unwrap_err();
        assert_eq!(error.code(), ErrorCode::InvalidRequest);

        let config = ProvisioningConfig::builder()
            .with_local_server("mail-1", vec!["mailbox".into()])
            .with_admin("root", "secret99")
            .build()
            .unwrap();
        assert_eq!(config.local_server_services, vec!["mailbox".to_string()]);
        assert_eq!(config.admin_address(), "root@example.test");
    }

    #[test]
    fn test_json_round_trip() {
        let config = ProvisioningConfig::builder()
            .with_gal_max_results(7)
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("galMaxResults"));
        assert_eq!(ProvisioningConfig::from_json_str(&json).unwrap(), config);
        assert!(ProvisioningConfig::from_json_str("{not json").is_err());
        assert!(ProvisioningConfig::from_json_str(r#"{"galMaxResults": 0}"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("dirprov-config-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, r#"{"defaultDomain": "file.test"}"#).unwrap();
        let config = ProvisioningConfig::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.default_domain, "file.test");
        assert!(ProvisioningConfig::from_file(&path).is_err());
    }
}
