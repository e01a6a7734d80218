//! Global address list and directory searches.

mod common;

use common::{
    address, create_account, create_account_with, create_test_domain, display_name, names,
    provisioning, TestProvisioning, TEST_DOMAIN,
};
use dirprov::entry::{attrs, AttrChanges, CalResType, Domain, EntryKind};
use dirprov::error::ErrorCode;
use dirprov::filter::{EntrySearchFilter, Multi, Operator, Single};
use dirprov::provisioning::{
    AccountBy, EntryTypes, GalContact, GalSearchType, Provisioning, SearchOptions, SearchParams,
};
use proptest::prelude::*;
use std::time::Duration;

/// alice, albert and bob plus the list all-staff.
async fn populated() -> (TestProvisioning, Domain) {
    let prov = provisioning().await;
    let domain = create_test_domain(&prov).await;

    let mut alice = display_name("Alice Smith");
    alice.set_str("description", "engineering");
    create_account_with(&prov, "alice", alice).await;
    let mut albert = display_name("Albert Jones");
    albert.set_str("description", "engineering");
    create_account_with(&prov, "albert", albert).await;
    create_account_with(&prov, "bob", display_name("Bob Brown")).await;
    prov.create_distribution_list(&address("all-staff"), AttrChanges::new())
        .await
        .unwrap();
    (prov, domain)
}

fn emails(matches: &[GalContact]) -> Vec<&str> {
    matches.iter().filter_map(GalContact::email).collect()
}

#[tokio::test]
async fn test_auto_complete_gal() {
    let (prov, domain) = populated().await;

    let result = prov
        .auto_complete_gal(&domain, "al", GalSearchType::All, 10)
        .await
        .unwrap();
    assert_eq!(
        emails(&result.matches),
        [address("albert"), address("alice"), address("all-staff")]
    );
    assert!(!result.has_more);
    assert!(result.token.is_none());

    // Surname prefixes match too.
    let result = prov
        .auto_complete_gal(&domain, "smi", GalSearchType::All, 10)
        .await
        .unwrap();
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].full_name(), Some("Alice Smith"));

    let result = prov
        .auto_complete_gal(&domain, "AL", GalSearchType::Account, 1)
        .await
        .unwrap();
    assert_eq!(emails(&result.matches), [address("albert")]);
    assert!(result.has_more);

    let result = prov
        .auto_complete_gal(&domain, "al", GalSearchType::Group, 10)
        .await
        .unwrap();
    assert_eq!(emails(&result.matches), [address("all-staff")]);
}

#[tokio::test]
async fn test_gal_skips_hidden_entries() {
    let (prov, domain) = populated().await;
    let mut albert = prov
        .get_account(AccountBy::name(address("albert")))
        .await
        .unwrap()
        .unwrap();
    prov.set_attr(&mut albert, &attrs::HIDE_IN_GAL, true)
        .await
        .unwrap();

    let result = prov
        .auto_complete_gal(&domain, "al", GalSearchType::Account, 10)
        .await
        .unwrap();
    assert_eq!(emails(&result.matches), [address("alice")]);
}

#[tokio::test]
async fn test_gal_results_are_capped_by_the_domain() {
    let (prov, mut domain) = populated().await;
    prov.set_attr(&mut domain, &attrs::GAL_MAX_RESULTS, 2)
        .await
        .unwrap();

    let result = prov
        .auto_complete_gal(&domain, "", GalSearchType::All, 0)
        .await
        .unwrap();
    assert_eq!(result.matches.len(), 2);
    assert!(result.has_more);

    let result = prov
        .search_gal(&domain, "*", GalSearchType::All, None)
        .await
        .unwrap();
    assert_eq!(result.matches.len(), 2);
    assert!(result.has_more);
}

#[tokio::test]
async fn test_search_gal() {
    let (prov, domain) = populated().await;

    let result = prov
        .search_gal(&domain, "bert", GalSearchType::All, None)
        .await
        .unwrap();
    assert_eq!(emails(&result.matches), [address("albert")]);
    assert!(result.token.is_some());

    // Entries of other domains never show up.
    prov.create_domain("other.test", AttrChanges::new())
        .await
        .unwrap();
    prov.create_account("albert@other.test", None, AttrChanges::new())
        .await
        .unwrap();
    let result = prov
        .search_gal(&domain, "", GalSearchType::All, None)
        .await
        .unwrap();
    assert_eq!(result.matches.len(), 4);
}

#[tokio::test]
async fn test_search_gal_with_token_returns_changes_only() {
    let (prov, domain) = populated().await;
    let first = prov
        .search_gal(&domain, "", GalSearchType::All, None)
        .await
        .unwrap();
    let token = first.token.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let mut bob = prov
        .get_account(AccountBy::name(address("bob")))
        .await
        .unwrap()
        .unwrap();
    prov.set_attr(&mut bob, &attrs::DISPLAY_NAME, "Robert Brown")
        .await
        .unwrap();

    let changed = prov
        .search_gal(&domain, "", GalSearchType::All, Some(&token))
        .await
        .unwrap();
    assert_eq!(emails(&changed.matches), [address("bob")]);
    assert_eq!(changed.matches[0].full_name(), Some("Robert Brown"));

    let err = prov
        .search_gal(&domain, "", GalSearchType::All, Some("yesterday"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn test_search_accounts() {
    let (prov, _) = populated().await;

    let found = prov
        .search_accounts(
            "(&(description=engineering)(mail=*@corp.example.test))",
            &SearchParams::new().sorted_by("displayName", false),
        )
        .await
        .unwrap();
    let found: Vec<&str> = found.iter().map(|account| account.name()).collect();
    assert_eq!(found, [address("alice"), address("albert")]);

    let found = prov
        .search_accounts(
            "(uid=bob)",
            &SearchParams::new().with_return_attrs(["displayName"]),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get_str("displayName"), Some("Bob Brown"));
    assert_eq!(found[0].get_str("uid"), None);

    // Lists are not accounts.
    let found = prov
        .search_accounts("(mail=all-staff@*)", &SearchParams::new())
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_search_limits_and_bad_filters() {
    let (prov, _) = populated().await;

    let err = prov
        .search_accounts(
            "(description=engineering)",
            &SearchParams::new().with_max_results(1),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TooManySearchResults);

    let err = prov
        .search_accounts("(description=engineering", &SearchParams::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    let err = prov
        .search_directory(&SearchOptions::new().with_filter("(&(cn=x)"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn test_search_calendar_resources() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    for (user, kind, capacity) in [
        ("room-1", CalResType::Location, 12),
        ("room-2", CalResType::Location, 4),
        ("projector", CalResType::Equipment, 1),
    ] {
        let mut changes = display_name(user);
        changes
            .set(&attrs::CAL_RES_TYPE, kind)
            .set(&attrs::CAL_RES_CAPACITY, capacity);
        prov.create_calendar_resource(&address(user), None, changes)
            .await
            .unwrap();
    }
    create_account(&prov, "room-3").await;

    let filter = EntrySearchFilter::new(Multi::and(vec![
        Single::new("calResType", Operator::Eq, "Location").into(),
        Single::new("calResCapacity", Operator::Ge, "10").into(),
    ]));
    let found = prov
        .search_calendar_resources(&filter, &SearchParams::new())
        .await
        .unwrap();
    assert_eq!(names(&found), vec![address("room-1")]);

    let filter = EntrySearchFilter::new(Single::new("uid", Operator::StartsWith, "room"));
    let found = prov
        .search_calendar_resources(&filter, &SearchParams::new())
        .await
        .unwrap();
    assert_eq!(names(&found), vec![address("room-1"), address("room-2")]);
}

#[tokio::test]
async fn test_search_directory_within_domain() {
    let (prov, _) = populated().await;

    let types =
        EntryTypes::ACCOUNTS | EntryTypes::DISTRIBUTION_LISTS | EntryTypes::DOMAINS;
    let found = prov
        .search_directory(&SearchOptions::new().with_domain(TEST_DOMAIN).with_types(types))
        .await
        .unwrap();
    let found: Vec<&str> = found.iter().map(|entry| entry.name()).collect();
    assert_eq!(
        found,
        [
            address("albert").as_str(),
            address("alice").as_str(),
            address("all-staff").as_str(),
            address("bob").as_str(),
            TEST_DOMAIN,
        ]
    );

    let found = prov
        .search_directory(
            &SearchOptions::new()
                .with_domain(TEST_DOMAIN)
                .with_types(EntryTypes::COSES),
        )
        .await
        .unwrap();
    assert!(found.is_empty());

    let found = prov
        .search_directory(&SearchOptions::new().with_types(EntryTypes::COSES))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind(), EntryKind::Cos);
}

#[tokio::test]
async fn test_search_directory_lists_aliases() {
    let (prov, _) = populated().await;
    let mut bob = prov
        .get_account(AccountBy::name(address("bob")))
        .await
        .unwrap()
        .unwrap();
    prov.add_alias(&mut bob, &address("robert")).await.unwrap();

    let found = prov
        .search_directory(
            &SearchOptions::new()
                .with_domain(TEST_DOMAIN)
                .with_types(EntryTypes::ALIASES),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), address("robert"));
    assert_eq!(found[0].id(), bob.id());
    assert_eq!(found[0].get_str("aliasTargetName"), Some(bob.name()));

    let found = prov
        .search_directory(
            &SearchOptions::new()
                .with_filter("(mail=robert@*)")
                .with_types(EntryTypes::ACCOUNTS | EntryTypes::ALIASES),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind(), EntryKind::Account);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn sorted_searches_are_ordered(
        display_names in prop::collection::vec("[a-zA-Z]{1,8}", 1..6),
        ascending in any::<bool>(),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let sorted = runtime.block_on(async {
            let prov = provisioning().await;
            create_test_domain(&prov).await;
            for (i, name) in display_names.iter().enumerate() {
                create_account_with(&prov, &format!("user{}", i), display_name(name)).await;
            }
            prov.search_accounts(
                "(mail=*@corp.example.test)",
                &SearchParams::new().sorted_by("displayName", ascending),
            )
            .await
            .unwrap()
        });

        prop_assert_eq!(sorted.len(), display_names.len());
        let keys: Vec<String> = sorted
            .iter()
            .map(|account| account.get_str("displayName").unwrap_or_default().to_lowercase())
            .collect();
        for pair in keys.windows(2) {
            if ascending {
                prop_assert!(pair[0] <= pair[1]);
            } else {
                prop_assert!(pair[0] >= pair[1]);
            }
        }
    }
}
