// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejectionReason,
    TypedHeader,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::Role,
};

/// O principal autenticado. O token só identifica o usuário; papel e empresa vêm do banco.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

/// Lê o Bearer, valida o JWT e recarrega o usuário.
/// Sem cabeçalho -> MissingToken (401); token ruim, expirado ou de usuário
/// inexistente -> InvalidToken (403); usuário desativado -> InactiveUser (403).
pub(crate) async fn authenticate<S>(parts: &mut Parts, state: &S) -> Result<AuthContext, AppError>
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| match rejection.reason() {
                TypedHeaderRejectionReason::Missing => AppError::MissingToken,
                _ => AppError::InvalidToken,
            })?;

    let app_state = AppState::from_ref(state);
    let user = app_state.auth_service.validate_token(bearer.token()).await?;

    Ok(AuthContext {
        user_id: user.id,
        company_id: user.company_id,
        role: user.role,
    })
}

pub(crate) fn request_locale(parts: &Parts) -> Locale {
    Locale::from_header(
        parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok()),
    )
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state).await {
            Ok(ctx) => Ok(ctx),
            Err(e) => {
                let app_state = AppState::from_ref(state);
                Err(e.to_api_error(&request_locale(parts), &app_state.i18n_store))
            }
        }
    }
}
