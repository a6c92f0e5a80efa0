//! Unit tests for server registry service orchestration.

use std::sync::Arc;

use crate::servers::{
    adapters::memory::InMemoryServerRepository,
    domain::{
        MediaServer, RemoteLogin, RemoteSession, RequestingUser, ScanStatus, ServerAddress,
        ServerCredentials, ServerId, UserId,
    },
    ports::{MediaServerRemote, RemoteError, RemoteResult, ServerRepository},
    services::{
        CreateServerRequest, ErrorKind, LoginFields, ServerPatch, ServerRegistryService,
        ServerRegistryServiceError,
    },
};
use async_trait::async_trait;
use mockable::DefaultClock;
use mockall::mock;
use rstest::{fixture, rstest};

mock! {
    pub Remote {}

    #[async_trait]
    impl MediaServerRemote for Remote {
        async fn login(&self, credentials: &ServerCredentials) -> RemoteResult<RemoteLogin>;
        async fn refresh(
            &self,
            server: &MediaServer,
            address: &ServerAddress,
        ) -> RemoteResult<RemoteSession>;
        async fn start_scan(
            &self,
            server: &MediaServer,
            address: &ServerAddress,
            folder_id: Option<String>,
        ) -> RemoteResult<()>;
    }
}

type TestService = ServerRegistryService<InMemoryServerRepository, MockRemote, DefaultClock>;

struct Harness {
    service: TestService,
    repository: Arc<InMemoryServerRepository>,
}

fn harness(remote: MockRemote) -> Harness {
    let repository = Arc::new(InMemoryServerRepository::new());
    let service = ServerRegistryService::new(
        Arc::clone(&repository),
        Arc::new(remote),
        Arc::new(DefaultClock),
    );
    Harness {
        service,
        repository,
    }
}

#[fixture]
fn admin() -> RequestingUser {
    RequestingUser::admin(UserId::new())
}

fn accept_login(
    token: &'static str,
) -> impl Fn(&ServerCredentials) -> RemoteResult<RemoteLogin> + Send + 'static {
    move |credentials| {
        Ok(RemoteLogin::new(
            RemoteSession::new(credentials.username(), token).with_remote_user_id("u-1"),
            credentials.address().clone(),
        ))
    }
}

fn home_request() -> CreateServerRequest {
    CreateServerRequest::new(
        "Home",
        LoginFields::new("jellyfin", "http://h:8096", "a", "p"),
    )
}

fn remote_accepting_one_login() -> MockRemote {
    let mut remote = MockRemote::new();
    remote
        .expect_login()
        .times(1)
        .returning(accept_login("T"));
    remote
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_persists_after_successful_login(admin: RequestingUser) {
    let Harness { service, .. } = harness(remote_accepting_one_login());

    let created = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");
    let found = service
        .find_by_id(&admin, created.id())
        .await
        .expect("server exists");

    assert_eq!(found.name().as_str(), "Home");
    assert_eq!(found.session().token(), "T");
    assert_eq!(found.address().as_str(), "http://h:8096");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_does_not_persist_when_login_rejected(admin: RequestingUser) {
    let mut remote = MockRemote::new();
    remote
        .expect_login()
        .times(1)
        .returning(|_| Err(RemoteError::rejected("invalid password")));
    let Harness {
        service,
        repository,
    } = harness(remote);

    let result = service.create(&admin, home_request()).await;

    let err = result.expect_err("rejected login must fail");
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(repository.list_all().await.expect("list").is_empty());
}

#[rstest]
#[case(CreateServerRequest::new("  ", LoginFields::new("jellyfin", "http://h:8096", "a", "p")))]
#[case(CreateServerRequest::new("Home", LoginFields::new("jellyfin", "", "a", "p")))]
#[case(CreateServerRequest::new("Home", LoginFields::new("plex", "http://h:8096", "a", "p")))]
#[case(CreateServerRequest::new("Home", LoginFields::new("jellyfin", "http://h:8096", " ", "p")))]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_create_never_contacts_remote(
    admin: RequestingUser,
    #[case] request: CreateServerRequest,
) {
    let mut remote = MockRemote::new();
    remote.expect_login().times(0);
    let Harness { service, .. } = harness(remote);

    let err = service
        .create(&admin, request)
        .await
        .expect_err("invalid input must fail");

    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_requires_admin() {
    let mut remote = MockRemote::new();
    remote.expect_login().times(0);
    let Harness { service, .. } = harness(remote);
    let member = RequestingUser::member(UserId::new(), []);

    let result = service.create(&member, home_request()).await;

    assert!(matches!(result, Err(ServerRegistryServiceError::Forbidden)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn details_patch_does_not_call_login(admin: RequestingUser) {
    let Harness { service, .. } = harness(remote_accepting_one_login());
    let created = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");

    let updated = service
        .update(
            &admin,
            created.id(),
            ServerPatch::Details {
                name: Some("Living room".to_owned()),
                url: None,
            },
        )
        .await
        .expect("rename succeeds");

    assert_eq!(updated.name().as_str(), "Living room");
    assert_eq!(updated.session().token(), "T");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_details_patch_is_rejected(admin: RequestingUser) {
    let Harness { service, .. } = harness(remote_accepting_one_login());
    let created = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");

    let err = service
        .update(
            &admin,
            created.id(),
            ServerPatch::Details {
                name: None,
                url: None,
            },
        )
        .await
        .expect_err("empty patch must fail");

    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_reauthentication_keeps_stored_session(admin: RequestingUser) {
    let mut remote = MockRemote::new();
    let mut sequence = mockall::Sequence::new();
    remote
        .expect_login()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(accept_login("T"));
    remote
        .expect_login()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_| Err(RemoteError::rejected("invalid password")));
    let Harness { service, .. } = harness(remote);
    let created = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");

    let result = service
        .update(
            &admin,
            created.id(),
            ServerPatch::Reauthenticate {
                name: Some("Renamed".to_owned()),
                login: LoginFields::new("jellyfin", "http://h:8096", "a", "wrong"),
            },
        )
        .await;

    assert!(matches!(result, Err(ServerRegistryServiceError::Remote(_))));
    let stored = service
        .find_by_id(&admin, created.id())
        .await
        .expect("server exists");
    assert_eq!(stored.session().token(), "T");
    assert_eq!(stored.name().as_str(), "Home");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn successful_reauthentication_stores_new_session(admin: RequestingUser) {
    let mut remote = MockRemote::new();
    let mut sequence = mockall::Sequence::new();
    remote
        .expect_login()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(accept_login("T"));
    remote
        .expect_login()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(accept_login("T2"));
    let Harness { service, .. } = harness(remote);
    let created = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");

    let updated = service
        .update(
            &admin,
            created.id(),
            ServerPatch::Reauthenticate {
                name: None,
                login: LoginFields::new("jellyfin", "https://h.example.com", "a", "p2"),
            },
        )
        .await
        .expect("re-authentication succeeds");

    assert_eq!(updated.session().token(), "T2");
    assert_eq!(updated.address().as_str(), "https://h.example.com");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reauthentication_cannot_change_server_type(admin: RequestingUser) {
    let Harness { service, .. } = harness(remote_accepting_one_login());
    let created = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");

    let err = service
        .update(
            &admin,
            created.id(),
            ServerPatch::Reauthenticate {
                name: None,
                login: LoginFields::new("navidrome", "http://h:4533", "a", "p"),
            },
        )
        .await
        .expect_err("type change must fail");

    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_targets_enabled_url(admin: RequestingUser) {
    let mut remote = remote_accepting_one_login();
    remote
        .expect_refresh()
        .withf(|_, address| address.as_str() == "https://remote.example.com")
        .times(1)
        .returning(|server, _| {
            Ok(RemoteSession::new(server.session().username(), "T2").with_remote_user_id("u-1"))
        });
    let Harness { service, .. } = harness(remote);
    let created = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");
    service
        .create_url(&admin, created.id(), "https://remote.example.com")
        .await
        .expect("url added");

    let refreshed = service
        .refresh(&admin, created.id())
        .await
        .expect("refresh succeeds");

    assert_eq!(refreshed.session().token(), "T2");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_refresh_keeps_prior_token(admin: RequestingUser) {
    let mut remote = remote_accepting_one_login();
    remote
        .expect_refresh()
        .times(1)
        .returning(|_, _| Err(RemoteError::rejected("session expired")));
    let Harness { service, .. } = harness(remote);
    let created = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");

    let err = service
        .refresh(&admin, created.id())
        .await
        .expect_err("refresh must fail");

    assert_eq!(err.kind(), ErrorKind::Auth);
    let stored = service
        .find_by_id(&admin, created.id())
        .await
        .expect("server exists");
    assert_eq!(stored.session().token(), "T");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_scan_returns_accepted_ticket(admin: RequestingUser) {
    let mut remote = remote_accepting_one_login();
    remote
        .expect_start_scan()
        .withf(|_, address, folder| {
            address.as_str() == "http://h:8096" && folder.as_deref() == Some("music")
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let Harness { service, .. } = harness(remote);
    let created = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");

    let ticket = service
        .full_scan(&admin, created.id(), Some("music".to_owned()))
        .await
        .expect("scan accepted");

    assert_eq!(ticket.server_id(), created.id());
    assert_eq!(ticket.folder_id(), Some("music"));
    assert_eq!(ticket.status(), ScanStatus::Accepted);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn members_only_see_granted_servers(admin: RequestingUser) {
    let mut remote = MockRemote::new();
    remote.expect_login().times(2).returning(accept_login("T"));
    let Harness { service, .. } = harness(remote);
    let visible = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");
    let hidden = service
        .create(&admin, home_request())
        .await
        .expect("create succeeds");
    let member = RequestingUser::member(UserId::new(), [visible.id()]);

    let listed = service.find_many(&member).await.expect("list succeeds");
    let hidden_lookup = service.find_by_id(&member, hidden.id()).await;

    assert_eq!(
        listed.iter().map(MediaServer::id).collect::<Vec<_>>(),
        vec![visible.id()]
    );
    assert!(matches!(
        hidden_lookup,
        Err(ServerRegistryServiceError::ServerNotFound(id)) if id == hidden.id()
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_server_is_not_found(admin: RequestingUser) {
    let Harness { service, .. } = harness(MockRemote::new());

    let err = service
        .delete_by_id(&admin, ServerId::new())
        .await
        .expect_err("unknown server");

    assert_eq!(err.kind(), ErrorKind::NotFound);
}
