//! Then steps for server registry BDD scenarios.

use super::world::{RegistryWorld, run_async};
use rstest_bdd_macros::then;
use server_registry::servers::{
    domain::{MediaServer, ServerUrl},
    services::{ErrorKind, ServerRegistryServiceError},
};

fn reload(world: &RegistryWorld) -> Result<MediaServer, eyre::Report> {
    let server_id = world.registered()?.id();
    run_async(world.service.find_by_id(&world.admin, server_id))
        .map_err(|err| eyre::eyre!("find_by_id failed: {err}"))
}

#[then(r#"the registered server is named "{name}""#)]
fn server_is_named(world: &RegistryWorld, name: String) -> Result<(), eyre::Report> {
    let server = reload(world)?;
    if server.name().as_str() != name {
        return Err(eyre::eyre!(
            "expected name '{name}', found '{}'",
            server.name().as_str()
        ));
    }
    Ok(())
}

#[then("the registered server holds a session token")]
fn server_holds_token(world: &RegistryWorld) -> Result<(), eyre::Report> {
    let server = reload(world)?;
    if server.session().token().is_empty() {
        return Err(eyre::eyre!("expected a stored session token"));
    }
    Ok(())
}

#[then("registration fails with an authentication error")]
fn registration_fails_with_auth_error(world: &RegistryWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_create_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing registration result in scenario world"))?;
    match result {
        Err(err) if err.kind() == ErrorKind::Auth => Ok(()),
        other => Err(eyre::eyre!("expected authentication error, got {other:?}")),
    }
}

#[then("listing servers returns {count:usize} entries")]
fn listing_returns_count(world: &RegistryWorld, count: usize) -> Result<(), eyre::Report> {
    let servers = run_async(world.service.find_many(&world.admin))
        .map_err(|err| eyre::eyre!("find_many failed: {err}"))?;
    if servers.len() != count {
        return Err(eyre::eyre!(
            "expected {count} servers, found {}",
            servers.len()
        ));
    }
    Ok(())
}

#[then(r#"only the alternate URL "{url}" is enabled"#)]
fn only_url_enabled(world: &RegistryWorld, url: String) -> Result<(), eyre::Report> {
    let expected = world.url(&url)?.id();
    let server = reload(world)?;
    let enabled: Vec<_> = server
        .urls()
        .iter()
        .filter(|candidate| candidate.is_enabled())
        .map(ServerUrl::id)
        .collect();
    if enabled != vec![expected] {
        return Err(eyre::eyre!("expected only {expected} enabled, found {enabled:?}"));
    }
    Ok(())
}

#[then("no alternate URL is enabled")]
fn no_url_enabled(world: &RegistryWorld) -> Result<(), eyre::Report> {
    let server = reload(world)?;
    if let Some(enabled) = server.enabled_url() {
        return Err(eyre::eyre!("expected no enabled URL, found {}", enabled.id()));
    }
    Ok(())
}

#[then(r#"the server resolves to "{url}""#)]
fn server_resolves_to(world: &RegistryWorld, url: String) -> Result<(), eyre::Report> {
    let server = reload(world)?;
    let resolved = server.resolved_address().as_str();
    if resolved != url {
        return Err(eyre::eyre!("expected resolved URL '{url}', found '{resolved}'"));
    }
    Ok(())
}

#[then("looking up the server fails with not found")]
fn lookup_not_found(world: &RegistryWorld) -> Result<(), eyre::Report> {
    let server_id = world.registered()?.id();
    match run_async(world.service.find_by_id(&world.admin, server_id)) {
        Err(ServerRegistryServiceError::ServerNotFound(_)) => Ok(()),
        other => Err(eyre::eyre!("expected not found, got {other:?}")),
    }
}

#[then(r#"deleting the alternate URL "{url}" fails with not found"#)]
fn delete_url_not_found(world: &RegistryWorld, url: String) -> Result<(), eyre::Report> {
    let url_id = world.url(&url)?.id();
    match run_async(world.service.delete_url_by_id(&world.admin, url_id)) {
        Err(ServerRegistryServiceError::UrlNotFound(_)) => Ok(()),
        other => Err(eyre::eyre!("expected URL not found, got {other:?}")),
    }
}
