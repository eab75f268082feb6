// src/handlers/crm.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthContext, i18n::Locale, json::AppJson},
    models::crm::{Client, ClientPayload, ClientQuery},
};

// Normaliza antes de validar: e-mail "" vira None em vez de e-mail inválido
fn checked(payload: ClientPayload) -> Result<ClientPayload, AppError> {
    let payload = payload.normalized();
    payload.validate()?;
    Ok(payload)
}

#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "CRM",
    params(ClientQuery),
    responses((status = 200, description = "Clientes da empresa", body = [Client])),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Query(query): Query<ClientQuery>,
) -> Result<Json<Vec<Client>>, ApiError> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let clients = app_state
        .crm_service
        .list_clients(ctx.company_id, search)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(clients))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Client>, ApiError> {
    let client = app_state
        .crm_service
        .get_client(ctx.company_id, client_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(client))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "CRM",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos ou CPF/CNPJ duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    AppJson(payload): AppJson<ClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = checked(payload).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let client = app_state
        .crm_service
        .create_client(ctx.company_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = ClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 400, description = "Dados inválidos ou CPF/CNPJ duplicado"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(client_id): Path<Uuid>,
    AppJson(payload): AppJson<ClientPayload>,
) -> Result<Json<Client>, ApiError> {
    let payload = checked(payload).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let client = app_state
        .crm_service
        .update_client(ctx.company_id, client_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(client))
}

#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente excluído"),
        (status = 400, description = "Cliente possui vendas"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(client_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .crm_service
        .delete_client(ctx.company_id, client_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
