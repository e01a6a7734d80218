//! Password authentication, pre-auth and password changes.

mod common;

use common::{address, create_account, create_test_domain, provisioning, TEST_PASSWORD};
use dirprov::auth::{AuthProtocol, PreAuthRequest};
use dirprov::entry::{attrs, AccountStatus, AttrChanges, MailStatus};
use dirprov::error::ErrorCode;
use dirprov::provisioning::{ModifyOptions, Provisioning};

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[tokio::test]
async fn test_auth_account() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = create_account(&prov, "user").await;

    prov.auth_account(&account, TEST_PASSWORD, AuthProtocol::Imap)
        .await
        .unwrap();

    let err = prov
        .auth_account(&account, "wrong-password", AuthProtocol::Imap)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthFailed);
}

#[tokio::test]
async fn test_auth_depends_on_status() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let mut account = create_account(&prov, "user").await;

    prov.modify_account_status(&mut account, AccountStatus::Maintenance)
        .await
        .unwrap();
    let err = prov
        .auth_account(&account, TEST_PASSWORD, AuthProtocol::Soap)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MaintenanceMode);

    prov.modify_account_status(&mut account, AccountStatus::Closed)
        .await
        .unwrap();
    assert_eq!(account.mail_status(), Some(MailStatus::Disabled));
    let err = prov
        .auth_account(&account, TEST_PASSWORD, AuthProtocol::Soap)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthFailed);

    prov.modify_account_status(&mut account, AccountStatus::Active)
        .await
        .unwrap();
    prov.auth_account(&account, TEST_PASSWORD, AuthProtocol::Soap)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_account_without_password_cannot_log_in() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let account = prov
        .create_account(&address("nopass"), None, AttrChanges::new())
        .await
        .unwrap();

    let err = prov
        .auth_account(&account, "", AuthProtocol::Http)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthFailed);
}

#[tokio::test]
async fn test_pre_auth() {
    let prov = provisioning().await;
    let domain = create_test_domain(&prov).await;
    let key = domain.get_str("preAuthKey").unwrap().to_string();
    let account = create_account(&prov, "user").await;

    let by_name = PreAuthRequest {
        account: account.name().to_string(),
        by: "name".to_string(),
        timestamp: now_ms(),
        expires: 0,
    };
    let signature = by_name.sign(&key).unwrap();
    prov.pre_auth_account(
        &account,
        &by_name.account,
        &by_name.by,
        by_name.timestamp,
        by_name.expires,
        &signature,
    )
    .await
    .unwrap();

    let by_id = PreAuthRequest {
        account: account.id().to_string(),
        by: "id".to_string(),
        timestamp: now_ms(),
        expires: 60_000,
    };
    let signature = by_id.sign(&key).unwrap();
    prov.pre_auth_account(
        &account,
        &by_id.account,
        &by_id.by,
        by_id.timestamp,
        by_id.expires,
        &signature,
    )
    .await
    .unwrap();

    let err = prov
        .pre_auth_account(
            &account,
            &by_name.account,
            &by_name.by,
            by_name.timestamp,
            by_name.expires,
            "00",
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthFailed);
}

#[tokio::test]
async fn test_pre_auth_rejects_stale_and_foreign_requests() {
    let prov = provisioning().await;
    let domain = create_test_domain(&prov).await;
    let key = domain.get_str("preAuthKey").unwrap().to_string();
    let account = create_account(&prov, "user").await;
    create_account(&prov, "other").await;

    let stale = PreAuthRequest {
        account: account.name().to_string(),
        by: "name".to_string(),
        timestamp: now_ms() - 60 * 60 * 1000,
        expires: 0,
    };
    let signature = stale.sign(&key).unwrap();
    let err = prov
        .pre_auth_account(&account, &stale.account, "name", stale.timestamp, 0, &signature)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthFailed);

    // A valid signature for another account does not log this one in.
    let other = PreAuthRequest {
        account: address("other"),
        by: "name".to_string(),
        timestamp: now_ms(),
        expires: 0,
    };
    let signature = other.sign(&key).unwrap();
    let err = prov
        .pre_auth_account(&account, &other.account, "name", other.timestamp, 0, &signature)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthFailed);

    let err = prov
        .pre_auth_account(&account, account.name(), "uid", now_ms(), 0, "00")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn test_pre_auth_needs_domain_key() {
    let prov = provisioning().await;
    let account = prov
        .create_account("keyless", Some(TEST_PASSWORD), AttrChanges::new())
        .await
        .unwrap();

    let request = PreAuthRequest {
        account: account.name().to_string(),
        by: "name".to_string(),
        timestamp: now_ms(),
        expires: 0,
    };
    let signature = request.sign("not-the-key").unwrap();
    let err = prov
        .pre_auth_account(&account, account.name(), "name", request.timestamp, 0, &signature)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthFailed);
}

#[tokio::test]
async fn test_change_password() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let mut account = create_account(&prov, "user").await;
    let before = account.get(&attrs::PASSWORD_MODIFIED_TIME);

    let err = prov
        .change_password(&mut account, "wrong-password", "newpass1")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthFailed);

    prov.change_password(&mut account, TEST_PASSWORD, "newpass1")
        .await
        .unwrap();
    assert!(account.get(&attrs::PASSWORD_MODIFIED_TIME) >= before);
    prov.auth_account(&account, "newpass1", AuthProtocol::Test)
        .await
        .unwrap();
    assert!(
        prov.auth_account(&account, TEST_PASSWORD, AuthProtocol::Test)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_password_policy() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let mut account = create_account(&prov, "user").await;

    let err = prov
        .check_password_strength(&account, "abc")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPassword);

    let mut policy = AttrChanges::new();
    policy
        .set(&attrs::PASSWORD_MIN_NUMERIC_CHARS, 2)
        .set(&attrs::PASSWORD_MIN_UPPER_CASE_CHARS, 1);
    prov.modify_attrs(&mut account, &policy, ModifyOptions::default())
        .await
        .unwrap();

    assert!(prov.check_password_strength(&account, "Secret12").await.is_ok());
    let err = prov
        .set_password(&mut account, "secret12")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPassword);

    prov.set_password(&mut account, "Secret12").await.unwrap();
    prov.auth_account(&account, "Secret12", AuthProtocol::Pop3)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_locked_password_cannot_be_changed() {
    let prov = provisioning().await;
    create_test_domain(&prov).await;
    let mut account = create_account(&prov, "user").await;
    prov.set_attr(&mut account, &attrs::PASSWORD_LOCKED, true)
        .await
        .unwrap();

    let err = prov
        .change_password(&mut account, TEST_PASSWORD, "newpass1")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPassword);

    // An administrator may still reset it.
    prov.set_password(&mut account, "newpass1").await.unwrap();
}
