//! Route handlers translating HTTP requests into registry operations.

use super::{
    AppState,
    envelope::{ApiSuccess, no_content},
    error::ApiError,
    model::{ScanResponse, ServerResponse, ServerUrlResponse},
    requests::{
        CreateServerBody, CreateUrlBody, DisableUrlBody, ScanBody, UpdateServerBody, parse_json,
        parse_optional_json,
    },
};
use crate::servers::{
    domain::{RequestingUser, ServerDomainError, ServerId, ServerUrlId},
    services::ServerRegistryServiceError,
};
use axum::{
    Extension,
    body::Bytes,
    extract::{Path, State},
    response::Response,
};
use serde::Serialize;

type ApiResult<T> = Result<ApiSuccess<T>, ApiError>;

fn invalid(err: ServerDomainError) -> ApiError {
    ServerRegistryServiceError::from(err).into()
}

fn server_id(raw: &str) -> Result<ServerId, ApiError> {
    ServerId::parse(raw).map_err(invalid)
}

fn url_id(raw: &str) -> Result<ServerUrlId, ApiError> {
    ServerUrlId::parse(raw).map_err(invalid)
}

/// Health probe payload.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    status: &'static str,
}

/// `GET /health`
pub async fn health() -> ApiSuccess<HealthStatus> {
    ApiSuccess::ok(HealthStatus { status: "ok" })
}

/// `GET /servers/{serverId}`
pub async fn get_server(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
    Path(raw_id): Path<String>,
) -> ApiResult<ServerResponse> {
    let server = state.service.find_by_id(&user, server_id(&raw_id)?).await?;
    Ok(ApiSuccess::ok(ServerResponse::from(&server)))
}

/// `GET /servers`
pub async fn list_servers(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
) -> ApiResult<Vec<ServerResponse>> {
    let servers = state.service.find_many(&user).await?;
    Ok(ApiSuccess::ok(
        servers.iter().map(ServerResponse::from).collect(),
    ))
}

/// `POST /servers`
pub async fn create_server(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
    body: Bytes,
) -> ApiResult<ServerResponse> {
    let request: CreateServerBody = parse_json(&body)?;
    let server = state.service.create(&user, request.into()).await?;
    Ok(ApiSuccess::ok(ServerResponse::from(&server)))
}

/// `PATCH`/`PUT /servers/{serverId}`
pub async fn update_server(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<ServerResponse> {
    let id = server_id(&raw_id)?;
    let request: UpdateServerBody = parse_json(&body)?;
    let server = state.service.update(&user, id, request.into()).await?;
    Ok(ApiSuccess::ok(ServerResponse::from(&server)))
}

/// `DELETE /servers/{serverId}`
pub async fn delete_server(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    state.service.delete_by_id(&user, server_id(&raw_id)?).await?;
    Ok(no_content())
}

/// `POST /servers/{serverId}/refresh`
pub async fn refresh_server(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
    Path(raw_id): Path<String>,
) -> ApiResult<ServerResponse> {
    let server = state.service.refresh(&user, server_id(&raw_id)?).await?;
    Ok(ApiSuccess::ok(ServerResponse::from(&server)))
}

/// `POST /servers/{serverId}/scan`
pub async fn scan_server(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<ScanResponse> {
    let id = server_id(&raw_id)?;
    let request: ScanBody = parse_optional_json(&body)?;
    let ticket = state
        .service
        .full_scan(&user, id, request.server_folder_id)
        .await?;
    Ok(ApiSuccess::ok(ScanResponse::from(&ticket)))
}

/// `POST /servers/{serverId}/urls`
pub async fn create_server_url(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<ServerUrlResponse> {
    let id = server_id(&raw_id)?;
    let request: CreateUrlBody = parse_json(&body)?;
    let url = state.service.create_url(&user, id, &request.url).await?;
    Ok(ApiSuccess::ok(ServerUrlResponse::from(&url)))
}

/// `DELETE /urls/{urlId}`
pub async fn delete_server_url(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    state
        .service
        .delete_url_by_id(&user, url_id(&raw_id)?)
        .await?;
    Ok(no_content())
}

/// `POST /servers/{serverId}/urls/{urlId}/enable`
pub async fn enable_server_url(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
    Path((raw_server_id, raw_url_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let id = server_id(&raw_server_id)?;
    let target = url_id(&raw_url_id)?;
    state.service.enable_url_by_id(&user, id, target).await?;
    Ok(no_content())
}

/// `POST /servers/{serverId}/urls/disable`
pub async fn disable_server_url(
    State(state): State<AppState>,
    Extension(user): Extension<RequestingUser>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = server_id(&raw_id)?;
    let request: DisableUrlBody = parse_optional_json(&body)?;
    state
        .service
        .disable_url_by_id(&user, id, request.expected()?)
        .await?;
    Ok(no_content())
}
