// src/handlers/commissions.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::{error::ApiError, period::PeriodQuery},
    config::AppState,
    middleware::{
        auth::AuthContext,
        i18n::Locale,
        json::AppJson,
        rbac::{Privileged, RequireRole},
    },
    models::commission::{CommissionQuery, CommissionRate, CommissionRatePayload, CommissionSummary, CommissionView},
};

// GET /api/commissions (userId ignorado para CASHIER/USER)
#[utoipa::path(
    get,
    path = "/api/commissions",
    tag = "Commissions",
    params(CommissionQuery),
    responses(
        (status = 200, description = "Comissões do período", body = [CommissionView]),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_commissions(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Query(query): Query<CommissionQuery>,
) -> Result<Json<Vec<CommissionView>>, ApiError> {
    let commissions = app_state
        .commission_service
        .list(ctx, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(commissions))
}

#[utoipa::path(
    get,
    path = "/api/commissions/summary",
    tag = "Commissions",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Totais por usuário (averageRate só para OWNER/ADMIN)", body = [CommissionSummary]),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn commission_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<CommissionSummary>>, ApiError> {
    let summary = app_state
        .commission_service
        .summary(ctx, query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/commissions/rates",
    tag = "Commissions",
    responses((status = 200, description = "Taxas configuradas", body = [CommissionRate])),
    security(("api_jwt" = []))
)]
pub async fn list_rates(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Privileged>,
) -> Result<Json<Vec<CommissionRate>>, ApiError> {
    let rates = app_state
        .commission_service
        .list_rates(guard.context())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rates))
}

#[utoipa::path(
    put,
    path = "/api/commissions/rates",
    tag = "Commissions",
    request_body = CommissionRatePayload,
    responses(
        (status = 200, description = "Taxa gravada", body = CommissionRate),
        (status = 400, description = "Percentual fora de 0..=100 ou alvo ambíguo"),
        (status = 403, description = "Apenas OWNER/ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_rate(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Privileged>,
    AppJson(payload): AppJson<CommissionRatePayload>,
) -> Result<Json<CommissionRate>, ApiError> {
    let rate = app_state
        .commission_service
        .set_rate(guard.context(), payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rate))
}
