//! Integration tests for session slot lifecycle and provisioning quotas.

mod helpers;

use sessionhub_core::ErrorKind;
use sessionhub_entity::usage::MessageKind;
use sessionhub_entity::user::{ConnectionState, CreateUser};

#[tokio::test]
async fn test_set_qrcode_scoped_by_instance() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let user = ctx.create_user("qr", None).await;

    ctx.session
        .set_qrcode(user.id, "qr-payload-1", &ctx.instance)
        .await
        .unwrap();
    assert_eq!(ctx.reload_user(user.id).await.qrcode, "qr-payload-1");

    let err = ctx
        .session
        .set_qrcode(user.id, "qr-payload-2", "some-other-instance")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(ctx.reload_user(user.id).await.qrcode, "qr-payload-1");
}

#[tokio::test]
async fn test_set_pairing_code_scoped_by_instance() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let user = ctx.create_user("pairing", None).await;

    let err = ctx
        .session
        .set_pairing_code(user.id, "ABCD-1234", "some-other-instance")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(ctx.reload_user(user.id).await.pairing_code, "");

    ctx.session
        .set_pairing_code(user.id, "ABCD-1234", &ctx.instance)
        .await
        .unwrap();
    assert_eq!(ctx.reload_user(user.id).await.pairing_code, "ABCD-1234");
}

#[tokio::test]
async fn test_unscoped_setters_ignore_missing_users() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let missing = i64::MAX;

    ctx.session.set_connected(missing).await.unwrap();
    ctx.session.set_disconnected(missing).await.unwrap();
    ctx.session.set_jid(missing, "jid").await.unwrap();
    ctx.session.set_webhook(missing, "https://example.test").await.unwrap();
    ctx.session.set_events(missing, "Message").await.unwrap();
    ctx.session.delete_user(missing).await.unwrap();
}

#[tokio::test]
async fn test_field_setters() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let user = ctx.create_user("fields", None).await;

    ctx.session
        .set_jid(user.id, "5511999999999@s.whatsapp.net")
        .await
        .unwrap();
    ctx.session
        .set_webhook(user.id, "https://hooks.example.test/a")
        .await
        .unwrap();
    ctx.session.set_events(user.id, "Message,Receipt").await.unwrap();

    let reloaded = ctx.reload_user(user.id).await;
    assert_eq!(reloaded.jid, "5511999999999@s.whatsapp.net");
    assert_eq!(reloaded.webhook, "https://hooks.example.test/a");
    assert_eq!(reloaded.events, "Message,Receipt");
}

#[tokio::test]
async fn test_connect_and_disconnect_record_presence() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let user = ctx.create_user("lifecycle", None).await;
    assert_eq!(user.connected, ConnectionState::Disconnected);

    let online = ctx.session.connect(user.id).await.unwrap();
    assert!(online.is_online);
    assert!(ctx.reload_user(user.id).await.is_connected());

    let message = ctx
        .session
        .record_message(user.id, MessageKind::Document)
        .await
        .unwrap();
    assert_eq!(message.count_document_msg, 1);

    let offline = ctx.session.disconnect(user.id).await.unwrap();
    assert!(!offline.is_online);
    assert!(offline.disconnected_at.is_some());
    assert!(!ctx.reload_user(user.id).await.is_connected());
}

#[tokio::test]
async fn test_update_user_saves_all_columns() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let mut user = ctx.create_user("before", None).await;

    user.name = "after".to_string();
    user.expiration = 3600;
    user.connected = ConnectionState::Connected;
    let saved = ctx.session.update_user(&user).await.unwrap();

    assert_eq!(saved.name, "after");
    assert_eq!(saved.expiration, 3600);
    assert!(saved.is_connected());
}

#[tokio::test]
async fn test_update_deleted_user_not_found() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let user = ctx.create_user("doomed", None).await;
    ctx.session.delete_user(user.id).await.unwrap();

    let err = ctx.session.update_user(&user).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(ctx.user_repo.find_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_token_conflicts() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let user = ctx.create_user("original", None).await;

    let err = ctx
        .session
        .create_user(&CreateUser::new("copy", user.token.clone(), None, &ctx.instance))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_company_quota_enforced() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let company = ctx.create_company(3, 2).await;

    ctx.create_user("one", Some(company.id)).await;
    ctx.create_user("two", Some(company.id)).await;

    let err = ctx
        .session
        .create_user(&CreateUser::new(
            "three",
            helpers::unique("user"),
            Some(company.id),
            &ctx.instance,
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let elsewhere = helpers::unique("instance");
    ctx.create_user_in("three", Some(company.id), &elsewhere).await;

    let err = ctx
        .session
        .create_user(&CreateUser::new(
            "four",
            helpers::unique("user"),
            Some(company.id),
            &helpers::unique("instance"),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let quota = ctx.reporting.company_quota(company.id, &ctx.instance).await.unwrap();
    assert_eq!(quota.company_users, 3);
    assert_eq!(quota.instance_users, 2);
    assert!(!quota.has_capacity());
}

#[tokio::test]
async fn test_unknown_company_conflicts() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };

    let err = ctx
        .session
        .create_user(&CreateUser::new(
            "orphan",
            helpers::unique("user"),
            Some(i64::MAX),
            &ctx.instance,
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_provisioning_respects_quota() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let company = ctx.create_company(1, 1).await;

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let session = std::sync::Arc::clone(&ctx.session);
            let data = CreateUser::new(
                format!("racer-{i}"),
                helpers::unique("user"),
                Some(company.id),
                &ctx.instance,
            );
            tokio::spawn(async move { session.create_user(&data).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e.kind, ErrorKind::Conflict),
        }
    }
    assert_eq!(created, 1);

    let quota = ctx.reporting.company_quota(company.id, &ctx.instance).await.unwrap();
    assert_eq!(quota.company_users, 1);
    assert_eq!(quota.instance_users, 1);
}

#[tokio::test]
async fn test_connect_missing_user_not_found() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };

    let err = ctx.session.connect(i64::MAX).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(ctx.usage_row_count(i64::MAX).await, 0);

    let err = ctx.session.disconnect(i64::MAX).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_connect_deleted_user_writes_no_ledger_row() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let user = ctx.create_user("retired", None).await;
    ctx.session.delete_user(user.id).await.unwrap();

    let err = ctx.session.connect(user.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = ctx.session.disconnect(user.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    assert_eq!(ctx.usage_row_count(user.id).await, 0);
}
