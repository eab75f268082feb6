// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthContext,
        i18n::Locale,
        json::AppJson,
        rbac::{Privileged, RequireRole},
    },
    models::inventory::{
        CreateProductPayload, Product, StockAdjustmentPayload, StockMovement, UpdateProductPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Inventory",
    responses((status = 200, description = "Catálogo de produtos", body = [Product])),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = app_state
        .inventory_service
        .list_products(ctx.company_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(products))
}

// GET /api/products/low-stock
#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    tag = "Inventory",
    responses((status = 200, description = "Produtos com estoque <= mínimo", body = [Product])),
    security(("api_jwt" = []))
)]
pub async fn list_low_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = app_state
        .inventory_service
        .list_low_stock(ctx.company_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = app_state
        .inventory_service
        .get_product(ctx.company_id, product_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Inventory",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas OWNER/ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Privileged>,
    AppJson(payload): AppJson<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let ctx = guard.context();
    let product = app_state
        .inventory_service
        .create_product(ctx.company_id, ctx.user_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /api/products/{id} (estoque não muda por aqui)
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Privileged>,
    Path(product_id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateProductPayload>,
) -> Result<Json<Product>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .inventory_service
        .update_product(guard.context().company_id, product_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "Produto excluído"),
        (status = 400, description = "Produto já vendido"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Privileged>,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .inventory_service
        .delete_product(guard.context().company_id, product_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/products/{id}/stock
#[utoipa::path(
    post,
    path = "/api/products/{id}/stock",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = StockAdjustmentPayload,
    responses(
        (status = 200, description = "Estoque ajustado", body = Product),
        (status = 400, description = "Estoque resultante negativo ou dados inválidos"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(product_id): Path<Uuid>,
    AppJson(payload): AppJson<StockAdjustmentPayload>,
) -> Result<Json<Product>, ApiError> {
    payload
        .check()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .inventory_service
        .adjust_stock(ctx.company_id, ctx.user_id, product_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(product))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/movements",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Histórico de movimentações", body = [StockMovement]),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Vec<StockMovement>>, ApiError> {
    let movements = app_state
        .inventory_service
        .list_movements(ctx.company_id, product_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(movements))
}
