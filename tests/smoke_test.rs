//! The scripted smoke test run end to end against the in-memory directory.

mod common;

use dirprov::config::ProvisioningConfig;
use dirprov::entry::AttrChanges;
use dirprov::harness::{AutoConfirm, HarnessError, ProvisioningSmokeTest};
use dirprov::provisioning::{EntryBy, Provisioning, StandardProvisioning};
use dirprov::storage::InMemoryStorage;

#[tokio::test]
async fn test_smoke_test_passes_and_cleans_up() {
    let storage = InMemoryStorage::new();
    let config = ProvisioningConfig::default();
    let prov = StandardProvisioning::new(storage.clone(), config.clone())
        .await
        .unwrap();
    let before = storage.stats().await.total_documents;

    let test_id = ProvisioningSmokeTest::new(&prov, &config, AutoConfirm)
        .with_test_id("it-1")
        .execute()
        .await
        .unwrap();

    assert_eq!(test_id, "it-1");
    assert_eq!(storage.stats().await.total_documents, before);
    assert!(
        prov.get_domain(EntryBy::name("domain-it-1.ldap-test-domain"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_smoke_test_runs_twice_with_distinct_ids() {
    let config = ProvisioningConfig::default();
    let prov = common::provisioning_with(config.clone()).await;

    for id in ["first", "second"] {
        let result = ProvisioningSmokeTest::new(&prov, &config, AutoConfirm)
            .with_test_id(id)
            .execute()
            .await;
        assert_eq!(result.unwrap(), id);
    }
}

#[tokio::test]
async fn test_smoke_test_follows_configured_names() {
    let config = ProvisioningConfig::builder()
        .with_default_cos_name("standard")
        .with_system_admin_name("root")
        .with_admin("postmaster", "secret99")
        .build()
        .unwrap();
    let prov = common::provisioning_with(config.clone()).await;

    let result = ProvisioningSmokeTest::new(&prov, &config, AutoConfirm)
        .with_test_id("configured")
        .execute()
        .await;
    assert!(result.is_ok(), "{:?}", result.err());
}

#[tokio::test]
async fn test_smoke_test_fails_when_its_domain_exists() {
    let config = ProvisioningConfig::default();
    let prov = common::provisioning_with(config.clone()).await;

    let smoke = ProvisioningSmokeTest::new(&prov, &config, AutoConfirm).with_test_id("taken");
    let domain = smoke.names().domain.clone();
    prov.create_domain(&domain, AttrChanges::new()).await.unwrap();

    match smoke.execute().await {
        Err(HarnessError::Provisioning(e)) => {
            assert_eq!(e.code().to_string(), "account.DOMAIN_EXISTS");
        }
        other => panic!("expected a provisioning error, got {:?}", other),
    }
}
