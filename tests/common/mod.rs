//! Shared fixtures for the provisioning integration tests.

#![allow(dead_code)]

use dirprov::auth::generate_pre_auth_key;
use dirprov::config::ProvisioningConfig;
use dirprov::entry::{attrs, Account, AttrChanges, Domain};
use dirprov::provisioning::StandardProvisioning;
use dirprov::storage::InMemoryStorage;

pub const TEST_DOMAIN: &str = "corp.example.test";
pub const TEST_PASSWORD: &str = "test123";

pub type TestProvisioning = StandardProvisioning<InMemoryStorage>;

/// Route engine logs through the test harness; `RUST_LOG=debug` shows them.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A freshly bootstrapped directory with the default configuration.
pub async fn provisioning() -> TestProvisioning {
    provisioning_with(ProvisioningConfig::default()).await
}

pub async fn provisioning_with(config: ProvisioningConfig) -> TestProvisioning {
    init_logging();
    StandardProvisioning::new(InMemoryStorage::new(), config)
        .await
        .expect("bootstrap should succeed")
}

/// Create [`TEST_DOMAIN`] with a pre-auth key.
pub async fn create_test_domain(prov: &TestProvisioning) -> Domain {
    let mut changes = AttrChanges::new();
    changes.set(&attrs::PRE_AUTH_KEY, generate_pre_auth_key());
    prov.create_domain(TEST_DOMAIN, changes)
        .await
        .expect("domain creation should succeed")
}

pub fn address(user: &str) -> String {
    format!("{}@{}", user, TEST_DOMAIN)
}

/// Create `<user>@TEST_DOMAIN` with [`TEST_PASSWORD`].
pub async fn create_account(prov: &TestProvisioning, user: &str) -> Account {
    create_account_with(prov, user, AttrChanges::new()).await
}

pub async fn create_account_with(
    prov: &TestProvisioning,
    user: &str,
    changes: AttrChanges,
) -> Account {
    prov.create_account(&address(user), Some(TEST_PASSWORD), changes)
        .await
        .expect("account creation should succeed")
}

/// Attribute changes with a display name.
pub fn display_name(name: &str) -> AttrChanges {
    let mut changes = AttrChanges::new();
    changes.set(&attrs::DISPLAY_NAME, name);
    changes
}

/// Sorted names of a slice of entries.
pub fn names<E: dirprov::NamedEntry>(entries: &[E]) -> Vec<String> {
    let mut names: Vec<String> = entries.iter().map(|e| e.name().to_string()).collect();
    names.sort();
    names
}
