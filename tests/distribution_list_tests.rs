//! Distribution lists, nested membership and dynamic groups.

mod common;

use common::{address, create_account, create_account_with, create_test_domain, names, provisioning};
use dirprov::entry::{attrs, AttrChanges, EntryKind};
use dirprov::error::ErrorCode;
use dirprov::provisioning::{EntryBy, Provisioning};

#[tokio::test]
async fn test_list_lookup_by_id_name_and_alias() {
    let prov = provisioning().await;
    let domain = create_test_domain(&prov).await;

    let mut list = prov
        .create_distribution_list(&address("team"), AttrChanges::new())
        .await
        .unwrap();
    prov.add_alias(&mut list, &address("crew")).await.unwrap();

    for by in [
        EntryBy::id(list.id()),
        EntryBy::name(address("team")),
        EntryBy::name(address("crew")),
    ] {
        let found = prov.get_distribution_list(by).await.unwrap().unwrap();
        assert_eq!(found.id(), list.id());
    }
    assert_eq!(
        list.get(&attrs::MAIL_STATUS).map(|s| s.to_string()).as_deref(),
        Some("enabled")
    );
    assert_eq!(
        prov.get_all_distribution_lists(&domain).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_add_and_remove_members() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let mut list = prov
        .create_distribution_list(&address("team"), AttrChanges::new())
        .await
        .unwrap();

    prov.add_members(&mut list, &[address("a").as_str(), address("B").as_str()])
        .await
        .unwrap();
    prov.add_members(&mut list, &[address("b").as_str()]).await.unwrap();
    assert_eq!(
        list.get_multi("member"),
        vec![address("a"), address("b")]
    );

    let err = prov
        .remove_members(&mut list, &[address("c").as_str()])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    prov.remove_members(&mut list, &[address("A").as_str()])
        .await
        .unwrap();
    assert_eq!(list.get_multi("member"), vec![address("b")]);
}

#[tokio::test]
async fn test_list_cannot_contain_itself() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let mut list = prov
        .create_distribution_list(&address("team"), AttrChanges::new())
        .await
        .unwrap();
    prov.add_alias(&mut list, &address("crew")).await.unwrap();

    for own in [address("team"), address("crew")] {
        let err = prov
            .add_members(&mut list, &[own.as_str()])
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}

#[tokio::test]
async fn test_nested_membership() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = create_account(&prov, "user").await;

    let mut outer = prov
        .create_distribution_list(&address("outer"), AttrChanges::new())
        .await
        .unwrap();
    let mut inner = prov
        .create_distribution_list(&address("inner"), AttrChanges::new())
        .await
        .unwrap();
    prov.add_members(&mut outer, &[address("inner").as_str()])
        .await
        .unwrap();
    prov.add_members(&mut inner, &[account.name()])
        .await
        .unwrap();

    let ids = prov.get_distribution_list_ids(&account).await.unwrap();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(outer.id()) && ids.contains(inner.id()));

    let all = prov.get_distribution_lists(&account, false).await.unwrap();
    assert_eq!(all.ids(), vec![inner.id(), outer.id()]);
    assert_eq!(all.via.len(), 1);
    assert_eq!(all.via.get(outer.name()), Some(&inner.name().to_string()));

    let direct = prov.get_distribution_lists(&account, true).await.unwrap();
    assert_eq!(direct.ids(), vec![inner.id()]);
    assert!(direct.via.is_empty());

    assert!(prov.in_distribution_list(&account, outer.id()).await.unwrap());
}

#[tokio::test]
async fn test_membership_cycles_terminate() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = create_account(&prov, "user").await;

    let mut a = prov
        .create_distribution_list(&address("list-a"), AttrChanges::new())
        .await
        .unwrap();
    let mut b = prov
        .create_distribution_list(&address("list-b"), AttrChanges::new())
        .await
        .unwrap();
    prov.add_members(&mut a, &[address("list-b").as_str(), account.name()])
        .await
        .unwrap();
    prov.add_members(&mut b, &[address("list-a").as_str()]).await.unwrap();

    let all = prov.get_distribution_lists(&account, false).await.unwrap();
    assert_eq!(names(&all.lists), vec![address("list-a"), address("list-b")]);
}

#[tokio::test]
async fn test_membership_through_alias() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let mut account = create_account(&prov, "user").await;
    prov.add_alias(&mut account, &address("nick")).await.unwrap();

    let mut list = prov
        .create_distribution_list(&address("team"), AttrChanges::new())
        .await
        .unwrap();
    prov.add_members(&mut list, &[address("nick").as_str()]).await.unwrap();
    assert!(prov.in_distribution_list(&account, list.id()).await.unwrap());

    // Dropping the alias drops the membership made through it.
    prov.remove_alias(&mut account, &address("nick")).await.unwrap();
    assert!(!prov.in_distribution_list(&account, list.id()).await.unwrap());
    prov.reload(&mut list).await.unwrap();
    assert!(list.get_multi("member").is_empty());
}

#[tokio::test]
async fn test_renames_and_deletes_follow_memberships() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = create_account(&prov, "user").await;
    let mut outer = prov
        .create_distribution_list(&address("outer"), AttrChanges::new())
        .await
        .unwrap();
    let inner = prov
        .create_distribution_list(&address("inner"), AttrChanges::new())
        .await
        .unwrap();
    prov.add_members(&mut outer, &[address("inner").as_str(), account.name()])
        .await
        .unwrap();

    prov.rename_account(account.id(), &address("renamed"))
        .await
        .unwrap();
    prov.rename_distribution_list(inner.id(), &address("inner-2"))
        .await
        .unwrap();
    prov.reload(&mut outer).await.unwrap();
    let mut members = outer.get_multi("member");
    members.sort();
    assert_eq!(members, vec![address("inner-2"), address("renamed")]);

    prov.delete_distribution_list(inner.id()).await.unwrap();
    prov.delete_account(account.id()).await.unwrap();
    prov.reload(&mut outer).await.unwrap();
    assert!(outer.get_multi("member").is_empty());

    let err = prov
        .rename_distribution_list(inner.id(), &address("again"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSuchEntry(EntryKind::DistributionList));
}

#[tokio::test]
async fn test_dynamic_group_members() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;

    let mut engineering = AttrChanges::new();
    engineering.set_str("description", "engineering");
    create_account_with(&prov, "alice", engineering.clone()).await;
    create_account_with(&prov, "bob", engineering).await;
    create_account(&prov, "carol").await;

    let mut changes = AttrChanges::new();
    changes.set(&attrs::MEMBER_URL, "ldap:///??sub?(description=engineering)");
    let group = prov
        .create_dynamic_group(&address("engineers"), changes)
        .await
        .unwrap();

    let members = prov.get_dynamic_group_members(&group).await.unwrap();
    assert_eq!(names(&members), vec![address("alice"), address("bob")]);

    let found = prov
        .get_dynamic_group(EntryBy::name(address("engineers")))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id(), group.id());

    prov.delete_dynamic_group(group.id()).await.unwrap();
    assert!(
        prov.get_dynamic_group(EntryBy::id(group.id()))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_dynamic_group_rejects_bad_member_url() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;

    let mut changes = AttrChanges::new();
    changes.set(&attrs::MEMBER_URL, "ldap:///??sub?(description=");
    assert!(
        prov.create_dynamic_group(&address("broken"), changes)
            .await
            .is_err()
    );
}
