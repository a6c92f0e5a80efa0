//! When steps for server registry BDD scenarios.

use super::world::{RegistryWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when(r#"the server "{name}" is registered with password "{password}""#)]
fn register_server(world: &mut RegistryWorld, name: String, password: String) {
    let request = world.request(&name, &password);
    let result = run_async(world.service.create(&world.admin, request));
    if let Ok(server) = &result {
        world.server = Some(server.clone());
    }
    world.last_create_result = Some(result);
}

#[when(r#"the alternate URL "{url}" is enabled"#)]
fn enable_url(world: &mut RegistryWorld, url: String) -> Result<(), eyre::Report> {
    let server_id = world.registered()?.id();
    let url_id = world.url(&url)?.id();
    run_async(world.service.enable_url_by_id(&world.admin, server_id, url_id))
        .wrap_err("enable alternate URL")
}

#[when("the enabled URL is disabled")]
fn disable_url(world: &mut RegistryWorld) -> Result<(), eyre::Report> {
    let server_id = world.registered()?.id();
    run_async(world.service.disable_url_by_id(&world.admin, server_id, None))
        .wrap_err("disable enabled URL")?;
    Ok(())
}

#[when("the server is deleted")]
fn delete_server(world: &mut RegistryWorld) -> Result<(), eyre::Report> {
    let server_id = world.registered()?.id();
    run_async(world.service.delete_by_id(&world.admin, server_id)).wrap_err("delete server")
}
