// src/middleware/json.rs

use axum::{
    extract::{FromRef, FromRequest, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

/// `Json<T>` cuja rejeição (sintaxe, tipo, enum desconhecido) sai como 400
/// no formato de erro da API, em vez do 422 em texto puro do axum.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_header(
            req.headers()
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok()),
        );

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                let app_state = AppState::from_ref(state);
                Err(AppError::InvalidBody(rejection.body_text()).to_api_error(&locale, &app_state.i18n_store))
            }
        }
    }
}
