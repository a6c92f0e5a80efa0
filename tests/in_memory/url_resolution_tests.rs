//! In-memory integration tests for alternate URLs and URL resolution.

use super::helpers::{HOME_URL, Registry, address, registry};
use server_registry::servers::{
    domain::{MediaServer, ServerUrl, ServerUrlId},
    services::{ErrorKind, ServerRegistryServiceError},
};
use rstest::rstest;

const LAN_URL: &str = "http://10.0.0.2:8096";
const VPN_URL: &str = "http://vpn:8096";

async fn with_urls(registry: &Registry, urls: &[&str]) -> (MediaServer, Vec<ServerUrl>) {
    let server = registry.register_home().await;
    let mut created = Vec::new();
    for url in urls {
        let added = registry
            .service
            .create_url(&registry.admin, server.id(), url)
            .await
            .expect("url added");
        created.push(added);
    }
    (registry.reload(&server).await, created)
}

fn enabled(server: &MediaServer) -> Vec<ServerUrlId> {
    server
        .urls()
        .iter()
        .filter(|url| url.is_enabled())
        .map(ServerUrl::id)
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn first_url_starts_enabled_and_later_ones_disabled(registry: Registry) {
    let (server, urls) = with_urls(&registry, &[LAN_URL, VPN_URL]).await;

    let flags: Vec<bool> = urls.iter().map(ServerUrl::is_enabled).collect();
    assert_eq!(flags, vec![true, false]);
    assert_eq!(server.resolved_address().as_str(), LAN_URL);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn enabling_a_url_disables_the_previous_one(registry: Registry) {
    let (server, urls) = with_urls(&registry, &[LAN_URL, VPN_URL]).await;
    let vpn = urls.get(1).expect("vpn url").id();

    registry
        .service
        .enable_url_by_id(&registry.admin, server.id(), vpn)
        .await
        .expect("enable succeeds");

    let reloaded = registry.reload(&server).await;
    assert_eq!(enabled(&reloaded), vec![vpn]);
    assert_eq!(reloaded.resolved_address().as_str(), VPN_URL);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabling_falls_back_to_primary_address(registry: Registry) {
    let (server, urls) = with_urls(&registry, &[LAN_URL]).await;

    let disabled = registry
        .service
        .disable_url_by_id(&registry.admin, server.id(), None)
        .await
        .expect("disable succeeds");
    let again = registry
        .service
        .disable_url_by_id(&registry.admin, server.id(), None)
        .await
        .expect("second disable is a no-op");

    assert_eq!(disabled, urls.first().map(ServerUrl::id));
    assert_eq!(again, None);
    let reloaded = registry.reload(&server).await;
    assert!(enabled(&reloaded).is_empty());
    assert_eq!(reloaded.resolved_address().as_str(), HOME_URL);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scans_target_the_resolved_url(registry: Registry) {
    let (server, urls) = with_urls(&registry, &[LAN_URL, VPN_URL]).await;
    let vpn = urls.get(1).expect("vpn url").id();
    registry
        .service
        .enable_url_by_id(&registry.admin, server.id(), vpn)
        .await
        .expect("enable succeeds");

    let ticket = registry
        .service
        .full_scan(&registry.admin, server.id(), Some("music".to_owned()))
        .await
        .expect("scan accepted");

    let scans = registry.remote.scans().expect("recorded scans");
    let recorded = scans.first().expect("one scan recorded");
    assert_eq!(recorded.address, address(VPN_URL));
    assert_eq!(recorded.folder_id.as_deref(), Some("music"));
    assert_eq!(ticket.folder_id(), Some("music"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_url_conflicts(registry: Registry) {
    let (server, _) = with_urls(&registry, &[LAN_URL]).await;

    let result = registry
        .service
        .create_url(&registry.admin, server.id(), LAN_URL)
        .await;

    assert_eq!(result.map(|_| ()).map_err(|err| err.kind()), Err(ErrorKind::Conflict));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_unknown_url_is_not_found(registry: Registry) {
    let result = registry
        .service
        .delete_url_by_id(&registry.admin, ServerUrlId::new())
        .await;

    assert!(matches!(result, Err(ServerRegistryServiceError::UrlNotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_server_removes_its_urls(registry: Registry) {
    let (server, urls) = with_urls(&registry, &[LAN_URL, VPN_URL]).await;

    registry
        .service
        .delete_by_id(&registry.admin, server.id())
        .await
        .expect("delete succeeds");

    for url in &urls {
        let result = registry
            .service
            .delete_url_by_id(&registry.admin, url.id())
            .await;
        assert!(matches!(result, Err(ServerRegistryServiceError::UrlNotFound(_))));
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_switches_leave_at_most_one_enabled_url(registry: Registry) {
    let candidates: Vec<String> = (2..6).map(|host| format!("http://10.0.0.{host}:8096")).collect();
    let candidate_refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
    let (server, urls) = with_urls(&registry, &candidate_refs).await;
    let targets: Vec<ServerUrlId> = urls.iter().map(ServerUrl::id).collect();

    let mut tasks = Vec::new();
    for round in 0..48_usize {
        let service = registry.service.clone();
        let admin = registry.admin.clone();
        let server_id = server.id();
        let target = targets.get(round % targets.len()).copied();
        tasks.push(tokio::spawn(async move {
            match target {
                Some(url_id) if round % 3 != 0 => {
                    service.enable_url_by_id(&admin, server_id, url_id).await
                }
                _ => service
                    .disable_url_by_id(&admin, server_id, None)
                    .await
                    .map(|_| ()),
            }
        }));
    }
    for task in tasks {
        task.await
            .expect("switch task joins")
            .expect("switch succeeds");
    }

    let reloaded = registry.reload(&server).await;
    let enabled_now = enabled(&reloaded);
    assert!(enabled_now.len() <= 1, "several URLs enabled: {enabled_now:?}");
    assert!(enabled_now.iter().all(|url_id| targets.contains(url_id)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_urls_are_all_stored_with_one_enabled(registry: Registry) {
    let server = registry.register_home().await;

    let mut tasks = Vec::new();
    for host in 2..10 {
        let service = registry.service.clone();
        let admin = registry.admin.clone();
        let server_id = server.id();
        tasks.push(tokio::spawn(async move {
            service
                .create_url(&admin, server_id, &format!("http://10.0.0.{host}:8096"))
                .await
        }));
    }
    for task in tasks {
        task.await
            .expect("create task joins")
            .expect("url stored without conflict");
    }

    let reloaded = registry.reload(&server).await;
    assert_eq!(reloaded.urls().len(), 8);
    assert_eq!(enabled(&reloaded).len(), 1);
}
