// src/routes.rs

use axum::{
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

/// Todas as rotas da API. A autenticação fica nos extratores de cada handler
/// (AuthContext / RequireRole), não em camadas de middleware.
pub fn app_router(app_state: AppState) -> Router {
    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me));

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users).post(handlers::users::create_user))
        .route("/{id}/role", put(handlers::users::update_role));

    let category_routes = Router::new()
        .route("/", get(handlers::finance::list_categories).post(handlers::finance::create_category))
        .route(
            "/{id}",
            put(handlers::finance::update_category).delete(handlers::finance::delete_category),
        );

    let revenue_routes = Router::new()
        .route("/", get(handlers::finance::list_revenues).post(handlers::finance::create_revenue))
        .route(
            "/{id}",
            get(handlers::finance::get_revenue)
                .put(handlers::finance::update_revenue)
                .delete(handlers::finance::delete_revenue),
        );

    let expense_routes = Router::new()
        .route("/", get(handlers::finance::list_expenses).post(handlers::finance::create_expense))
        .route(
            "/{id}",
            get(handlers::finance::get_expense)
                .put(handlers::finance::update_expense)
                .delete(handlers::finance::delete_expense),
        );

    let product_routes = Router::new()
        .route("/", get(handlers::inventory::list_products).post(handlers::inventory::create_product))
        .route("/low-stock", get(handlers::inventory::list_low_stock))
        .route(
            "/{id}",
            get(handlers::inventory::get_product)
                .put(handlers::inventory::update_product)
                .delete(handlers::inventory::delete_product),
        )
        .route("/{id}/stock", post(handlers::inventory::adjust_stock))
        .route("/{id}/movements", get(handlers::inventory::list_movements));

    let client_routes = Router::new()
        .route("/", get(handlers::crm::list_clients).post(handlers::crm::create_client))
        .route(
            "/{id}",
            get(handlers::crm::get_client)
                .put(handlers::crm::update_client)
                .delete(handlers::crm::delete_client),
        );

    // Venda não tem PUT nem DELETE
    let sale_routes = Router::new()
        .route("/", get(handlers::sales::list_sales).post(handlers::sales::create_sale))
        .route("/reports/by-seller", get(handlers::sales::report_by_seller))
        .route("/{id}", get(handlers::sales::get_sale))
        .route("/{id}/receipt", get(handlers::sales::sale_receipt));

    let commission_routes = Router::new()
        .route("/", get(handlers::commissions::list_commissions))
        .route("/summary", get(handlers::commissions::commission_summary))
        .route("/rates", get(handlers::commissions::list_rates).put(handlers::commissions::set_rate));

    let task_routes = Router::new()
        .route("/", get(handlers::tasks::list_tasks).post(handlers::tasks::create_task))
        .route(
            "/{id}",
            get(handlers::tasks::get_task)
                .put(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route("/{id}/status", put(handlers::tasks::update_task_status));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/by-category", get(handlers::dashboard::get_by_category))
        .route("/monthly", get(handlers::dashboard::get_monthly));

    let settings_routes = Router::new().route(
        "/",
        get(handlers::settings::get_settings).put(handlers::settings::update_settings),
    );

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/revenues", revenue_routes)
        .nest("/api/expenses", expense_routes)
        .nest("/api/products", product_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/sales", sale_routes)
        .nest("/api/commissions", commission_routes)
        .nest("/api/tasks", task_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/settings", settings_routes)
        .with_state(app_state)
}


#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use sqlx::{postgres::PgPoolOptions, PgPool};
    use tower::ServiceExt;

    use crate::{
        models::auth::{Role, User},
        test_support::{seed_owner, seed_user, state_with, test_config},
    };

    // Pool preguiçoso: estas rotas falham antes de chegar ao banco
    fn offline_state() -> AppState {
        let config = test_config();
        let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        AppState::with_pool(config, pool)
    }

    async fn cashier(state: &AppState) -> User {
        let owner = seed_owner(state).await;
        seed_user(state, owner.company_id, Role::Cashier).await
    }

    async fn call(state: AppState, request: Request<Body>) -> Response {
        app_router(state).oneshot(request).await.unwrap()
    }

    fn get(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, token: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = call(
            offline_state(),
            Request::builder().uri("/api/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_missing_token_is_401() {
        let response = call(
            offline_state(),
            Request::builder().uri("/api/auth/me").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_garbage_token_is_403() {
        let response = call(offline_state(), get("/api/auth/me", "nem.um.jwt")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL com um Postgres acessível"]
    async fn test_cashier_cannot_read_seller_report(pool: PgPool) {
        let state = state_with(pool);
        let user = cashier(&state).await;
        let token = state.auth_service.create_token(&user).unwrap();

        let response = call(state, get("/api/sales/reports/by-seller", &token)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL com um Postgres acessível"]
    async fn test_role_claim_is_ignored_in_favor_of_stored_role(pool: PgPool) {
        let state = state_with(pool);
        let user = cashier(&state).await;

        // Token diz ADMIN, o banco diz CASHIER
        let forged = User { role: Role::Admin, ..user };
        let token = state.auth_service.create_token(&forged).unwrap();

        let response = call(state, get("/api/sales/reports/by-seller", &token)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL com um Postgres acessível"]
    async fn test_role_change_applies_to_existing_token(pool: PgPool) {
        let state = state_with(pool);
        let user = cashier(&state).await;
        let token = state.auth_service.create_token(&user).unwrap();

        state
            .user_service
            .update_role(user.company_id, user.id, Role::Admin)
            .await
            .unwrap();

        let response = call(state, get("/api/sales/reports/by-seller", &token)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL com um Postgres acessível"]
    async fn test_inactive_user_is_403(pool: PgPool) {
        let state = state_with(pool.clone());
        let user = cashier(&state).await;
        let token = state.auth_service.create_token(&user).unwrap();

        sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
            .bind(user.id)
            .execute(&pool)
            .await
            .unwrap();

        let response = call(state, get("/api/auth/me", &token)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL com um Postgres acessível"]
    async fn test_sale_validation_collects_every_field(pool: PgPool) {
        let state = state_with(pool);
        let user = cashier(&state).await;
        let token = state.auth_service.create_token(&user).unwrap();

        let body = r#"{
            "items": [{ "itemName": "", "quantity": 0, "unitPrice": -1 }],
            "discount": -5,
            "paymentMethod": "PIX"
        }"#;
        let response = call(state, post_json("/api/sales", &token, body)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let details = body["details"].as_object().unwrap();
        assert!(details.contains_key("discount"));
        assert!(details.contains_key("clientName"));
        assert!(details.contains_key("items[0].itemName"));
        assert!(details.contains_key("items[0].quantity"));
        assert!(details.contains_key("items[0].unitPrice"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL com um Postgres acessível"]
    async fn test_empty_sale_and_unknown_payment_method_are_400(pool: PgPool) {
        let state = state_with(pool);
        let user = cashier(&state).await;
        let token = state.auth_service.create_token(&user).unwrap();

        let empty = r#"{"clientName":"Consumidor Final","items":[],"paymentMethod":"CASH"}"#;
        let response = call(state.clone(), post_json("/api/sales", &token, empty)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["details"]["items"].is_array());

        let bitcoin = r#"{"clientName":"Ana","items":[{"itemName":"Caneta","quantity":1,"unitPrice":2}],"paymentMethod":"BITCOIN"}"#;
        let response = call(state, post_json("/api/sales", &token, bitcoin)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["details"]["body"].is_array());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requer DATABASE_URL com um Postgres acessível"]
    async fn test_invalid_month_is_400(pool: PgPool) {
        let state = state_with(pool);
        let owner = seed_owner(&state).await;
        let token = state.auth_service.create_token(&owner).unwrap();

        let response = call(state, get("/api/commissions?month=13", &token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
