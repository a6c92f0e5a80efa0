//! In-memory integration tests for server registration and maintenance.

use super::helpers::{HOME_URL, Registry, home_request, registry};
use mockable::DefaultClock;
use server_registry::servers::{
    adapters::memory::InMemoryServerRepository,
    domain::{RequestingUser, UserId},
    ports::RemoteError,
    services::{
        CreateServerRequest, ErrorKind, LoginFields, ServerPatch, ServerRegistryService,
        ServerRegistryServiceError,
    },
};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_server_is_found_with_issued_token(registry: Registry) {
    let created = registry.register_home().await;

    let found = registry.reload(&created).await;

    assert_eq!(found.name().as_str(), "Home");
    assert_eq!(found.session().token(), "token-1");
    assert_eq!(found.address().as_str(), HOME_URL);
    assert!(found.urls().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_login_persists_nothing(registry: Registry) {
    let request =
        CreateServerRequest::new("Home", LoginFields::new("jellyfin", HOME_URL, "a", "wrong"));

    let result = registry.service.create(&registry.admin, request).await;

    assert!(matches!(
        result,
        Err(ServerRegistryServiceError::Remote(RemoteError::Rejected { .. }))
    ));
    let listed = registry
        .service
        .find_many(&registry.admin)
        .await
        .expect("listing succeeds");
    assert!(listed.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rename_does_not_contact_remote(registry: Registry) {
    let created = registry.register_home().await;
    let calls_before = registry.remote.login_calls().expect("call count");

    let updated = registry
        .service
        .update(
            &registry.admin,
            created.id(),
            ServerPatch::Details {
                name: Some("Den".to_owned()),
                url: None,
            },
        )
        .await
        .expect("rename succeeds");

    assert_eq!(updated.name().as_str(), "Den");
    assert_eq!(registry.remote.login_calls().expect("call count"), calls_before);
    assert_eq!(registry.reload(&created).await.session().token(), "token-1");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_reauthentication_keeps_stored_record(registry: Registry) {
    let created = registry.register_home().await;

    let result = registry
        .service
        .update(
            &registry.admin,
            created.id(),
            ServerPatch::Reauthenticate {
                name: Some("Den".to_owned()),
                login: LoginFields::new("jellyfin", HOME_URL, "a", "wrong"),
            },
        )
        .await;

    assert_eq!(result.map(|_| ()).map_err(|err| err.kind()), Err(ErrorKind::Auth));
    let stored = registry.reload(&created).await;
    assert_eq!(stored.name().as_str(), "Home");
    assert_eq!(stored.session().token(), "token-1");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successful_reauthentication_stores_new_session(registry: Registry) {
    let created = registry.register_home().await;

    registry
        .service
        .update(
            &registry.admin,
            created.id(),
            ServerPatch::Reauthenticate {
                name: None,
                login: LoginFields::new("jellyfin", HOME_URL, "a", "p"),
            },
        )
        .await
        .expect("re-authentication succeeds");

    assert_eq!(registry.reload(&created).await.session().token(), "token-2");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_server_is_not_found(registry: Registry) {
    let created = registry.register_home().await;

    registry
        .service
        .delete_by_id(&registry.admin, created.id())
        .await
        .expect("delete succeeds");

    let result = registry.service.find_by_id(&registry.admin, created.id()).await;
    assert!(matches!(
        result,
        Err(ServerRegistryServiceError::ServerNotFound(id)) if id == created.id()
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn members_only_see_granted_servers(registry: Registry) {
    let granted = registry.register_home().await;
    let hidden = registry
        .service
        .create(&registry.admin, home_request())
        .await
        .expect("second registration succeeds");
    let member = RequestingUser::member(UserId::new(), [granted.id()]);

    let visible = registry
        .service
        .find_many(&member)
        .await
        .expect("listing succeeds");
    let lookup = registry.service.find_by_id(&member, hidden.id()).await;

    assert_eq!(visible.len(), 1);
    assert_eq!(visible.first().map(|server| server.id()), Some(granted.id()));
    assert!(matches!(lookup, Err(ServerRegistryServiceError::ServerNotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn members_cannot_register_servers(registry: Registry) {
    let member = RequestingUser::member(UserId::new(), []);

    let result = registry.service.create(&member, home_request()).await;

    assert!(matches!(result, Err(ServerRegistryServiceError::Forbidden)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_failure_leaves_session_untouched(registry: Registry) {
    let created = registry.register_home().await;
    registry
        .remote
        .fail_refresh_with(Some(RemoteError::rejected("session expired")))
        .expect("failure configured");

    let result = registry.service.refresh(&registry.admin, created.id()).await;

    assert!(matches!(result, Err(ServerRegistryServiceError::Remote(_))));
    assert_eq!(registry.reload(&created).await.session().token(), "token-1");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_remote_times_out(registry: Registry) {
    registry
        .remote
        .set_latency(Some(Duration::from_millis(500)))
        .expect("latency configured");
    let service = ServerRegistryService::new(
        Arc::new(InMemoryServerRepository::new()),
        Arc::new(registry.remote.clone()),
        Arc::new(DefaultClock),
    )
    .with_remote_timeout(Duration::from_millis(50));

    let result = service.create(&registry.admin, home_request()).await;

    assert_eq!(result.map(|_| ()).map_err(|err| err.kind()), Err(ErrorKind::Timeout));
    assert!(service
        .find_many(&registry.admin)
        .await
        .expect("listing succeeds")
        .is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rename_during_slow_refresh_is_kept(registry: Registry) {
    let created = registry.register_home().await;
    registry
        .remote
        .set_latency(Some(Duration::from_millis(300)))
        .expect("latency configured");
    let service = registry.service.clone();
    let admin = registry.admin.clone();
    let server_id = created.id();
    let refresh = tokio::spawn(async move { service.refresh(&admin, server_id).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    let renamed = registry
        .service
        .update(
            &registry.admin,
            created.id(),
            ServerPatch::Details {
                name: Some("Den".to_owned()),
                url: None,
            },
        )
        .await
        .expect("rename succeeds");
    let refreshed = refresh
        .await
        .expect("refresh task joins")
        .expect("refresh succeeds");

    assert_eq!(renamed.name().as_str(), "Den");
    assert_eq!(refreshed.name().as_str(), "Den");
    let stored = registry.reload(&created).await;
    assert_eq!(stored.name().as_str(), "Den");
    assert_eq!(stored.session().token(), "token-2");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_finishing_after_reauthentication_conflicts(registry: Registry) {
    let created = registry.register_home().await;
    registry
        .remote
        .set_latency(Some(Duration::from_millis(300)))
        .expect("latency configured");
    let service = registry.service.clone();
    let admin = registry.admin.clone();
    let server_id = created.id();
    let refresh = tokio::spawn(async move { service.refresh(&admin, server_id).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    registry
        .remote
        .set_latency(None)
        .expect("latency cleared");
    registry
        .service
        .update(
            &registry.admin,
            created.id(),
            ServerPatch::Reauthenticate {
                name: None,
                login: LoginFields::new("jellyfin", HOME_URL, "a", "p"),
            },
        )
        .await
        .expect("re-authentication succeeds");
    let result = refresh.await.expect("refresh task joins");

    assert_eq!(
        result.map(|_| ()).map_err(|err| err.kind()),
        Err(ErrorKind::Conflict)
    );
    assert_eq!(registry.reload(&created).await.session().token(), "token-2");
}
