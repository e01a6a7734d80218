//! Identities and data sources owned by an account.

mod common;

use common::{create_account, create_test_domain, names, provisioning};
use dirprov::entry::{attrs, AttrChanges, DataSourceType, EntryKind};
use dirprov::error::ErrorCode;
use dirprov::provisioning::{EntryBy, Provisioning, DEFAULT_IDENTITY_NAME};

fn from_display(name: &str) -> AttrChanges {
    let mut changes = AttrChanges::new();
    changes.set(&attrs::PREF_FROM_DISPLAY, name);
    changes
}

#[tokio::test]
async fn test_default_identity() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = create_account(&prov, "user").await;

    let by_name = prov
        .get_identity(&account, EntryBy::name(DEFAULT_IDENTITY_NAME))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_name.id(), account.id());
    assert_eq!(by_name.account_id(), Some(account.id()));
    assert_eq!(by_name.from_address().as_deref(), Some(account.name()));

    let by_id = prov
        .get_identity(&account, EntryBy::id(account.id()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.name(), DEFAULT_IDENTITY_NAME);
}

#[tokio::test]
async fn test_identities_are_listed_default_first() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = create_account(&prov, "user").await;

    prov.create_identity(&account, "work", from_display("At Work"))
        .await
        .unwrap();
    prov.create_identity(&account, "Home", AttrChanges::new())
        .await
        .unwrap();

    let all = prov.get_all_identities(&account).await.unwrap();
    let listed: Vec<&str> = all.iter().map(|identity| identity.name()).collect();
    assert_eq!(listed, [DEFAULT_IDENTITY_NAME, "Home", "work"]);
    assert_eq!(all[2].from_display().as_deref(), Some("At Work"));

    let err = prov
        .create_identity(&account, "work", AttrChanges::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::EntryExists(EntryKind::Identity));
}

#[tokio::test]
async fn test_default_identity_is_reserved() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = create_account(&prov, "user").await;

    let err = prov
        .create_identity(&account, "default", AttrChanges::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::EntryExists(EntryKind::Identity));

    let err = prov
        .delete_identity(&account, DEFAULT_IDENTITY_NAME)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn test_modifying_default_identity_changes_the_account() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let mut account = create_account(&prov, "user").await;

    prov.modify_identity(&account, DEFAULT_IDENTITY_NAME, from_display("User Name"))
        .await
        .unwrap();
    prov.reload(&mut account).await.unwrap();
    assert_eq!(
        account.get(&attrs::PREF_FROM_DISPLAY).as_deref(),
        Some("User Name")
    );

    let mut rename = AttrChanges::new();
    rename.set(&attrs::PREF_IDENTITY_NAME, "renamed");
    let err = prov
        .modify_identity(&account, DEFAULT_IDENTITY_NAME, rename)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn test_identity_rename_and_delete() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = create_account(&prov, "user").await;
    prov.create_identity(&account, "work", AttrChanges::new())
        .await
        .unwrap();
    prov.create_identity(&account, "home", AttrChanges::new())
        .await
        .unwrap();

    let mut rename = AttrChanges::new();
    rename.set(&attrs::PREF_IDENTITY_NAME, "office");
    prov.modify_identity(&account, "work", rename).await.unwrap();
    assert!(
        prov.get_identity(&account, EntryBy::name("office"))
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        prov.get_identity(&account, EntryBy::name("work"))
            .await
            .unwrap()
            .is_none()
    );

    let mut clash = AttrChanges::new();
    clash.set(&attrs::PREF_IDENTITY_NAME, "home");
    let err = prov
        .modify_identity(&account, "office", clash)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::EntryExists(EntryKind::Identity));

    prov.delete_identity(&account, "office").await.unwrap();
    let err = prov.delete_identity(&account, "office").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchEntry(EntryKind::Identity));
}

#[tokio::test]
async fn test_data_sources() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = create_account(&prov, "user").await;

    let mut changes = AttrChanges::new();
    changes
        .set(&attrs::DATA_SOURCE_HOST, "pop.example.test")
        .set(&attrs::DATA_SOURCE_PORT, 110);
    let source = prov
        .create_data_source(&account, DataSourceType::Pop3, "datasource-1", changes)
        .await
        .unwrap();
    assert_eq!(source.data_source_type(), Some(DataSourceType::Pop3));
    assert_eq!(source.account_id(), Some(account.id()));
    assert!(!source.is_enabled());

    let found = prov
        .get_data_source(&account, EntryBy::name("datasource-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id(), source.id());
    assert_eq!(found.host().as_deref(), Some("pop.example.test"));
    assert_eq!(found.port(), 110);

    let err = prov
        .create_data_source(&account, DataSourceType::Imap, "datasource-1", AttrChanges::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::EntryExists(EntryKind::DataSource));

    let mut enable = AttrChanges::new();
    enable.set(&attrs::DATA_SOURCE_ENABLED, true);
    prov.modify_data_source(&account, source.id(), enable)
        .await
        .unwrap();
    let found = prov
        .get_data_source(&account, EntryBy::id(source.id()))
        .await
        .unwrap()
        .unwrap();
    assert!(found.is_enabled());
}

#[tokio::test]
async fn test_data_source_type_is_immutable() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = create_account(&prov, "user").await;
    let source = prov
        .create_data_source(&account, DataSourceType::Imap, "mailbox", AttrChanges::new())
        .await
        .unwrap();

    let mut changes = AttrChanges::new();
    changes.set(&attrs::DATA_SOURCE_TYPE, DataSourceType::Pop3);
    let err = prov
        .modify_data_source(&account, source.id(), changes)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    let mut bad_port = AttrChanges::new();
    bad_port.set(&attrs::DATA_SOURCE_PORT, 70000);
    assert!(
        prov.modify_data_source(&account, source.id(), bad_port)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_children_are_scoped_to_their_account() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let alice = create_account(&prov, "alice").await;
    let bob = create_account(&prov, "bob").await;

    // The same names may be used by different accounts.
    for account in [&alice, &bob] {
        prov.create_identity(account, "work", AttrChanges::new())
            .await
            .unwrap();
        prov.create_data_source(account, DataSourceType::Rss, "feed", AttrChanges::new())
            .await
            .unwrap();
    }

    let alice_sources = prov.get_all_data_sources(&alice).await.unwrap();
    assert_eq!(names(&alice_sources), vec!["feed".to_string()]);
    let alice_source = &alice_sources[0];
    assert!(
        prov.get_data_source(&bob, EntryBy::id(alice_source.id()))
            .await
            .unwrap()
            .is_none()
    );

    let err = prov
        .delete_data_source(&bob, alice_source.id())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchEntry(EntryKind::DataSource));

    prov.delete_data_source(&alice, alice_source.id())
        .await
        .unwrap();
    assert!(prov.get_all_data_sources(&alice).await.unwrap().is_empty());
    assert_eq!(prov.get_all_data_sources(&bob).await.unwrap().len(), 1);
}
