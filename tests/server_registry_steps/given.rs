//! Given steps for server registry BDD scenarios.

use super::world::{RegistryWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use server_registry::servers::domain::ServerAddress;

#[given(
    r#"a remote jellyfin server at "{url}" with account "{username}" and password "{password}""#
)]
fn a_remote_server(
    world: &mut RegistryWorld,
    url: String,
    username: String,
    password: String,
) -> Result<(), eyre::Report> {
    let address = ServerAddress::parse(&url).wrap_err("parse remote address")?;
    world
        .remote
        .add_account(&address, &username, password)
        .wrap_err("register remote account")?;
    world.remote_url = url;
    world.username = username;
    Ok(())
}

#[given(r#"a registered server "{name}""#)]
fn a_registered_server(world: &mut RegistryWorld, name: String) -> Result<(), eyre::Report> {
    let request = world.request(&name, "p");
    let created = run_async(world.service.create(&world.admin, request))
        .wrap_err("register server for scenario")?;
    world.server = Some(created);
    Ok(())
}

#[given(r#"the alternate URL "{url}" is added"#)]
fn alternate_url_added(world: &mut RegistryWorld, url: String) -> Result<(), eyre::Report> {
    let server_id = world.registered()?.id();
    let added = run_async(world.service.create_url(&world.admin, server_id, &url))
        .wrap_err("add alternate URL")?;
    world.urls.insert(url, added);
    Ok(())
}
