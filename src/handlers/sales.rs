// src/handlers/sales.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    common::{error::ApiError, period::PeriodQuery},
    config::AppState,
    middleware::{
        auth::AuthContext,
        i18n::Locale,
        json::AppJson,
        rbac::{Privileged, RequireRole},
    },
    models::{
        commission::SellerReport,
        sales::{CreateSalePayload, Sale, SaleDetail, SaleQuery},
    },
};

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda registrada com itens, baixas, receita e comissão", body = SaleDetail),
        (status = 400, description = "Dados inválidos, cliente inexistente ou estoque insuficiente"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    AppJson(payload): AppJson<CreateSalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .sales_service
        .create_sale(ctx, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    params(SaleQuery),
    responses(
        (status = 200, description = "Vendas do período (CASHIER/USER veem só as próprias)", body = [Sale]),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Query(query): Query<SaleQuery>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let sales = app_state
        .sales_service
        .list_sales(ctx, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(sales))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda com cliente, vendedor, itens e comissões", body = SaleDetail),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(sale_id): Path<Uuid>,
) -> Result<Json<SaleDetail>, ApiError> {
    let detail = app_state
        .sales_service
        .get_sale(ctx, sale_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

// GET /api/sales/reports/by-seller
#[utoipa::path(
    get,
    path = "/api/sales/reports/by-seller",
    tag = "Sales",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Totais por vendedor", body = [SellerReport]),
        (status = 403, description = "Apenas OWNER/ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn report_by_seller(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Privileged>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<SellerReport>>, ApiError> {
    let report = app_state
        .sales_service
        .report_by_seller(guard.context().company_id, query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(report))
}

// GET /api/sales/{id}/receipt
#[utoipa::path(
    get,
    path = "/api/sales/{id}/receipt",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Recibo em PDF", content_type = "application/pdf"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn sale_receipt(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(sale_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let pdf_bytes = app_state
        .document_service
        .generate_receipt(ctx, sale_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Headers para o navegador baixar ou mostrar o PDF
    let disposition = format!("inline; filename=\"recibo_{}.pdf\"", sale_id);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf_bytes).into_response())
}
