//! Integration tests for read-only queries.

mod helpers;

use sessionhub_core::ErrorKind;
use sessionhub_core::config::SessionConfig;

#[tokio::test]
async fn test_company_users_ordered_connected_first() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let company = ctx.create_company(10, 10).await;

    let u1 = ctx.create_user("u1", Some(company.id)).await;
    let u2 = ctx.create_user("u2", Some(company.id)).await;
    let u3 = ctx.create_user("u3", Some(company.id)).await;
    let u4 = ctx.create_user("u4", Some(company.id)).await;
    ctx.session.set_connected(u3.id).await.unwrap();
    ctx.session.set_connected(u2.id).await.unwrap();

    let users = ctx
        .reporting
        .list_company_users(company.id, &ctx.instance)
        .await
        .unwrap();
    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();

    assert_eq!(ids, vec![u2.id, u3.id, u1.id, u4.id]);
}

#[tokio::test]
async fn test_soft_deleted_users_are_invisible() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let company = ctx.create_company(10, 10).await;

    let kept = ctx.create_user("kept", Some(company.id)).await;
    let removed = ctx.create_user("removed", Some(company.id)).await;
    ctx.session.set_connected(kept.id).await.unwrap();
    ctx.session.set_connected(removed.id).await.unwrap();
    ctx.session.delete_user(removed.id).await.unwrap();

    let connected = ctx.reporting.list_connected_users().await.unwrap();
    assert_eq!(connected.len(), 1);
    assert_eq!(connected[0].id, kept.id);

    let company_users = ctx
        .reporting
        .list_company_users(company.id, &ctx.instance)
        .await
        .unwrap();
    assert_eq!(company_users.len(), 1);

    assert_eq!(
        ctx.reporting.count_connected_users(&ctx.instance).await.unwrap(),
        1
    );

    let err = ctx.reporting.get_user_by_id(removed.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = ctx
        .reporting
        .get_user_by_token(&removed.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_connected_listing_scoped_to_instance() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let here = ctx.create_user("here", None).await;
    let there = ctx
        .create_user_in("there", None, &helpers::unique("instance"))
        .await;
    ctx.session.set_connected(here.id).await.unwrap();
    ctx.session.set_connected(there.id).await.unwrap();

    let connected = ctx.reporting.list_connected_users().await.unwrap();
    let ids: Vec<i64> = connected.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![here.id]);
}

#[tokio::test]
async fn test_connected_listing_requires_instance() {
    let Some(ctx) = helpers::TestContext::with_session(SessionConfig { instance: None }).await
    else {
        return;
    };

    let err = ctx.reporting.list_connected_users().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn test_lookups_by_token() {
    let Some(ctx) = helpers::TestContext::new().await else {
        return;
    };
    let company = ctx.create_company(5, 5).await;
    let user = ctx.create_user("lookup", Some(company.id)).await;

    let found = ctx.reporting.get_user_by_token(&user.token).await.unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.company_id, Some(company.id));

    let found = ctx
        .reporting
        .get_company_by_token(&company.token)
        .await
        .unwrap();
    assert_eq!(found.id, company.id);
    assert_eq!(ctx.reporting.get_company_by_id(company.id).await.unwrap().name, company.name);

    let err = ctx
        .reporting
        .get_company_by_token(&helpers::unique("company"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
