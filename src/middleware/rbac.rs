// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::auth::{authenticate, request_locale, AuthContext},
    models::auth::Role,
};

/// Um conjunto de papéis autorizados.
pub trait RoleSet: Send + Sync + 'static {
    fn allows(role: Role) -> bool;
}

/// O guardião: autentica e exige que o papel pertença a `T`.
/// Entrega o próprio AuthContext para o handler.
pub struct RequireRole<T>(pub AuthContext, PhantomData<T>);

impl<T> RequireRole<T> {
    pub fn context(&self) -> AuthContext {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleSet,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let outcome = authenticate(parts, state).await.and_then(|ctx| {
            if T::allows(ctx.role) {
                Ok(ctx)
            } else {
                tracing::warn!(user_id = %ctx.user_id, role = ?ctx.role, "Acesso negado por papel");
                Err(AppError::Forbidden)
            }
        });

        match outcome {
            Ok(ctx) => Ok(RequireRole(ctx, PhantomData)),
            Err(e) => {
                let app_state = AppState::from_ref(state);
                Err(e.to_api_error(&request_locale(parts), &app_state.i18n_store))
            }
        }
    }
}

// ---
// CONJUNTOS DE PAPÉIS
// ---

/// OWNER e ADMIN
pub struct Privileged;
impl RoleSet for Privileged {
    fn allows(role: Role) -> bool {
        role.is_privileged()
    }
}

pub struct OwnerOnly;
impl RoleSet for OwnerOnly {
    fn allows(role: Role) -> bool {
        role == Role::Owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_sets() {
        assert!(Privileged::allows(Role::Owner));
        assert!(Privileged::allows(Role::Admin));
        assert!(!Privileged::allows(Role::Cashier));
        assert!(!Privileged::allows(Role::User));

        assert!(OwnerOnly::allows(Role::Owner));
        assert!(!OwnerOnly::allows(Role::Admin));
    }
}
