// src/handlers/finance.rs

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
    middleware::{
        auth::AuthContext,
        i18n::Locale,
        json::AppJson,
        rbac::{Privileged, RequireRole},
    },
    models::finance::{
        Category, CategoryPayload, CategoryQuery, LedgerEntry, LedgerEntryPayload, LedgerKind, LedgerQuery,
    },
};

// ---
// CATEGORIAS
// ---

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Finance",
    params(CategoryQuery),
    responses((status = 200, description = "Categorias da empresa", body = [Category])),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = app_state
        .finance_service
        .list_categories(ctx.company_id, query.kind)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(categories))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Finance",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 400, description = "Nome já usado para este tipo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Privileged>,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let category = app_state
        .finance_service
        .create_category(guard.context().company_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Privileged>,
    Path(category_id): Path<Uuid>,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<Json<Category>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let category = app_state
        .finance_service
        .update_category(guard.context().company_id, category_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria excluída"),
        (status = 400, description = "Categoria em uso"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Privileged>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .finance_service
        .delete_category(guard.context().company_id, category_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// LANÇAMENTOS
// Receitas e despesas compartilham a implementação; só o livro muda.
// ---

async fn list_entries(
    kind: LedgerKind,
    app_state: AppState,
    locale: Locale,
    ctx: AuthContext,
    query: LedgerQuery,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    let entries = app_state
        .finance_service
        .list_entries(kind, ctx.company_id, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entries))
}

async fn get_entry(
    kind: LedgerKind,
    app_state: AppState,
    locale: Locale,
    ctx: AuthContext,
    entry_id: Uuid,
) -> Result<Json<LedgerEntry>, ApiError> {
    let entry = app_state
        .finance_service
        .get_entry(kind, ctx.company_id, entry_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entry))
}

async fn create_entry(
    kind: LedgerKind,
    app_state: AppState,
    locale: Locale,
    ctx: AuthContext,
    payload: LedgerEntryPayload,
) -> Result<(StatusCode, Json<LedgerEntry>), ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .finance_service
        .create_entry(kind, ctx.company_id, ctx.user_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_entry(
    kind: LedgerKind,
    app_state: AppState,
    locale: Locale,
    ctx: AuthContext,
    entry_id: Uuid,
    payload: LedgerEntryPayload,
) -> Result<Json<LedgerEntry>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .finance_service
        .update_entry(kind, ctx.company_id, entry_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entry))
}

async fn delete_entry(
    kind: LedgerKind,
    app_state: AppState,
    locale: Locale,
    ctx: AuthContext,
    entry_id: Uuid,
) -> Result<StatusCode, ApiError> {
    app_state
        .finance_service
        .delete_entry(kind, ctx.company_id, entry_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Receitas ---

#[utoipa::path(
    get,
    path = "/api/revenues",
    tag = "Finance",
    params(LedgerQuery),
    responses(
        (status = 200, description = "Receitas do período", body = [LedgerEntry]),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_revenues(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    list_entries(LedgerKind::Revenue, app_state, locale, ctx, query).await
}

#[utoipa::path(
    get,
    path = "/api/revenues/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da receita")),
    responses(
        (status = 200, description = "Receita", body = LedgerEntry),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_revenue(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<LedgerEntry>, ApiError> {
    get_entry(LedgerKind::Revenue, app_state, locale, ctx, entry_id).await
}

#[utoipa::path(
    post,
    path = "/api/revenues",
    tag = "Finance",
    request_body = LedgerEntryPayload,
    responses(
        (status = 201, description = "Receita criada", body = LedgerEntry),
        (status = 400, description = "Dados inválidos ou categoria incompatível")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_revenue(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    AppJson(payload): AppJson<LedgerEntryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    create_entry(LedgerKind::Revenue, app_state, locale, ctx, payload).await
}

#[utoipa::path(
    put,
    path = "/api/revenues/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da receita")),
    request_body = LedgerEntryPayload,
    responses(
        (status = 200, description = "Receita atualizada", body = LedgerEntry),
        (status = 400, description = "Dados inválidos ou receita gerada por venda"),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_revenue(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(entry_id): Path<Uuid>,
    AppJson(payload): AppJson<LedgerEntryPayload>,
) -> Result<Json<LedgerEntry>, ApiError> {
    update_entry(LedgerKind::Revenue, app_state, locale, ctx, entry_id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/revenues/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da receita")),
    responses(
        (status = 204, description = "Receita excluída"),
        (status = 400, description = "Receita gerada por venda"),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_revenue(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_entry(LedgerKind::Revenue, app_state, locale, ctx, entry_id).await
}

// --- Despesas ---

#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Finance",
    params(LedgerQuery),
    responses(
        (status = 200, description = "Despesas do período", body = [LedgerEntry]),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    list_entries(LedgerKind::Expense, app_state, locale, ctx, query).await
}

#[utoipa::path(
    get,
    path = "/api/expenses/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 200, description = "Despesa", body = LedgerEntry),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<LedgerEntry>, ApiError> {
    get_entry(LedgerKind::Expense, app_state, locale, ctx, entry_id).await
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Finance",
    request_body = LedgerEntryPayload,
    responses(
        (status = 201, description = "Despesa criada", body = LedgerEntry),
        (status = 400, description = "Dados inválidos ou categoria incompatível")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    AppJson(payload): AppJson<LedgerEntryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    create_entry(LedgerKind::Expense, app_state, locale, ctx, payload).await
}

#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    request_body = LedgerEntryPayload,
    responses(
        (status = 200, description = "Despesa atualizada", body = LedgerEntry),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(entry_id): Path<Uuid>,
    AppJson(payload): AppJson<LedgerEntryPayload>,
) -> Result<Json<LedgerEntry>, ApiError> {
    update_entry(LedgerKind::Expense, app_state, locale, ctx, entry_id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 204, description = "Despesa excluída"),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: AuthContext,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete_entry(LedgerKind::Expense, app_state, locale, ctx, entry_id).await
}
