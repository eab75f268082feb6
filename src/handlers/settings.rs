// src/handlers/settings.rs

use axum::{extract::State, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthContext,
        i18n::Locale,
        json::AppJson,
        rbac::{Privileged, RequireRole},
    },
    models::settings::{CompanySettings, UpdateSettingsRequest},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Configurações atuais", body = CompanySettings),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
) -> Result<Json<CompanySettings>, ApiError> {
    let settings = app_state
        .settings_service
        .get(ctx.company_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(settings))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Configurações salvas", body = CompanySettings),
        (status = 400, description = "Categoria padrão inexistente ou sem tipo de receita"),
        (status = 403, description = "Apenas OWNER/ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Privileged>,
    AppJson(payload): AppJson<UpdateSettingsRequest>,
) -> Result<Json<CompanySettings>, ApiError> {
    let updated = app_state
        .settings_service
        .update(guard.context().company_id, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(updated))
}
