// src/test_support.rs
//
// Montagem de estado e dados para os testes. Os testes com banco rodam com
// `cargo test -- --ignored` e um DATABASE_URL apontando para um Postgres.

use std::path::PathBuf;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    config::{AppState, Config},
    models::auth::{CreateUserPayload, RegisterUserPayload, Role, User},
};

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/granaflux_test".into(),
        jwt_secret: "segredo-de-teste".into(),
        bind_addr: "127.0.0.1:0".into(),
        production: false,
        db_max_connections: 1,
        token_ttl_hours: 1,
        default_commission_percent: Decimal::from(5),
        task_strict_transitions: false,
        fonts_dir: PathBuf::from("./fonts"),
    }
}

pub fn state_with(pool: PgPool) -> AppState {
    AppState::with_pool(test_config(), pool)
}

/// Registra uma empresa nova e devolve o OWNER.
pub async fn seed_owner(state: &AppState) -> User {
    let token = state
        .auth_service
        .register(RegisterUserPayload {
            company_name: "Papelaria Central".into(),
            tax_id: None,
            name: "Ana Dona".into(),
            email: format!("dona-{}@papelaria.com", Uuid::new_v4()),
            password: "senha-forte".into(),
        })
        .await
        .unwrap();

    let claims = state.auth_service.decode_token(&token).unwrap();
    state.auth_service.me(claims.company_id, claims.sub).await.unwrap().user
}

pub async fn seed_user(state: &AppState, company_id: Uuid, role: Role) -> User {
    state
        .user_service
        .create(
            company_id,
            CreateUserPayload {
                name: format!("{:?}", role),
                email: format!("{}@papelaria.com", Uuid::new_v4()),
                password: "senha-forte".into(),
                role,
            },
        )
        .await
        .unwrap()
}
