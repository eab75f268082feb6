// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::{error::ApiError, period::PeriodQuery},
    config::AppState,
    middleware::{auth::AuthContext, i18n::Locale},
    models::dashboard::{ByCategoryQuery, CategoryTotal, DashboardSummary, MonthlyTotal, YearQuery},
};

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Cards do topo", body = DashboardSummary),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = app_state
        .dashboard_service
        .summary(ctx.company_id, query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/by-category",
    tag = "Dashboard",
    params(ByCategoryQuery),
    responses(
        (status = 200, description = "Totais por categoria", body = [CategoryTotal]),
        (status = 400, description = "Tipo ou mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_by_category(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Query(query): Query<ByCategoryQuery>,
) -> Result<Json<Vec<CategoryTotal>>, ApiError> {
    let totals = app_state
        .dashboard_service
        .by_category(ctx.company_id, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(totals))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/monthly",
    tag = "Dashboard",
    params(YearQuery),
    responses((status = 200, description = "Receitas e despesas mês a mês", body = [MonthlyTotal])),
    security(("api_jwt" = []))
)]
pub async fn get_monthly(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<MonthlyTotal>>, ApiError> {
    let months = app_state
        .dashboard_service
        .monthly(ctx.company_id, query.year)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(months))
}
