use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// O erro de domínio. Cada variante sabe a sua chave de tradução e o seu status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    // JSON malformado ou com valores fora do enum (ex: paymentMethod desconhecido)
    #[error("Corpo da requisição inválido: {0}")]
    InvalidBody(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token ausente")]
    MissingToken,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário desativado")]
    InactiveUser,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // Recurso endereçado pela URL (/{id}) não existe na empresa -> 404
    #[error("{0} não encontrado")]
    NotFound(&'static str),

    // Entidade referenciada no corpo da requisição não existe na empresa -> 400
    #[error("{0} referenciado não encontrado")]
    ReferenceNotFound(&'static str),

    #[error("Estoque insuficiente para '{item}' (disponível: {available})")]
    InsufficientStock { item: String, available: i32 },

    #[error("Estoque resultante negativo ({resulting})")]
    NegativeStock { resulting: i32 },

    #[error("Desconto maior que o total")]
    DiscountExceedsTotal,

    #[error("{0} possui registros vinculados")]
    HasDependents(&'static str),

    #[error("Documento '{0}' já cadastrado")]
    DuplicateDocument(String),

    #[error("Categoria '{0}' já existe")]
    CategoryNameAlreadyExists(String),

    #[error("Tipo de categoria incompatível")]
    IncompatibleCategory,

    #[error("Lançamento gerado por venda não pode ser alterado")]
    SaleEntryLocked,

    #[error("Transição de {from} para {to} não permitida")]
    InvalidTransition { from: String, to: String },

    #[error("Período inválido")]
    InvalidPeriod,

    #[error("O papel OWNER não pode ser alterado")]
    OwnerRoleImmutable,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// A resposta de erro que sai pela API: { "error": "...", "details": {...} }
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidBody(_)
            | AppError::ReferenceNotFound(_)
            | AppError::InsufficientStock { .. }
            | AppError::NegativeStock { .. }
            | AppError::DiscountExceedsTotal
            | AppError::HasDependents(_)
            | AppError::DuplicateDocument(_)
            | AppError::CategoryNameAlreadyExists(_)
            | AppError::IncompatibleCategory
            | AppError::SaleEntryLocked
            | AppError::InvalidTransition { .. }
            | AppError::InvalidPeriod
            | AppError::OwnerRoleImmutable => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::MissingToken => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken | AppError::Forbidden | AppError::InactiveUser => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Chave de tradução + parâmetros para interpolação
    fn message_key(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            AppError::ValidationError(_) => ("error.validation", vec![]),
            AppError::InvalidBody(_) => ("error.invalid_body", vec![]),
            AppError::EmailAlreadyExists => ("error.email_exists", vec![]),
            AppError::InvalidCredentials => ("error.invalid_credentials", vec![]),
            AppError::MissingToken => ("error.missing_token", vec![]),
            AppError::InvalidToken => ("error.invalid_token", vec![]),
            AppError::Forbidden => ("error.forbidden", vec![]),
            AppError::InactiveUser => ("error.inactive_user", vec![]),
            AppError::UserNotFound => ("error.user_not_found", vec![]),
            AppError::NotFound(entity) => ("error.not_found", vec![("entity", entity.to_string())]),
            AppError::ReferenceNotFound(entity) => {
                ("error.reference_not_found", vec![("entity", entity.to_string())])
            }
            AppError::InsufficientStock { item, available } => (
                "error.insufficient_stock",
                vec![("item", item.clone()), ("available", available.to_string())],
            ),
            AppError::NegativeStock { resulting } => {
                ("error.negative_stock", vec![("resulting", resulting.to_string())])
            }
            AppError::DiscountExceedsTotal => ("error.discount_exceeds_total", vec![]),
            AppError::HasDependents(entity) => {
                ("error.has_dependents", vec![("entity", entity.to_string())])
            }
            AppError::DuplicateDocument(doc) => ("error.duplicate_document", vec![("document", doc.clone())]),
            AppError::CategoryNameAlreadyExists(name) => {
                ("error.category_exists", vec![("name", name.clone())])
            }
            AppError::IncompatibleCategory => ("error.incompatible_category", vec![]),
            AppError::SaleEntryLocked => ("error.sale_entry_locked", vec![]),
            AppError::InvalidTransition { from, to } => (
                "error.invalid_transition",
                vec![("from", from.clone()), ("to", to.clone())],
            ),
            AppError::InvalidPeriod => ("error.invalid_period", vec![]),
            AppError::OwnerRoleImmutable => ("error.owner_role_immutable", vec![]),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => ("error.internal", vec![]),
        }
    }

    /// Converte o erro de domínio na resposta HTTP, traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let (key, params) = self.message_key();

        // Nomes de entidades também são traduzidos ("entity.product" -> "Produto")
        let params: Vec<(&str, String)> = params
            .into_iter()
            .map(|(name, value)| {
                if name == "entity" {
                    (name, store.translate(&locale.0, &value, &[]))
                } else {
                    (name, value)
                }
            })
            .collect();

        let error = store.translate(&locale.0, key, &params);

        let details = match &self {
            AppError::ValidationError(errors) => Some(json!(validation_details(errors))),
            AppError::InvalidBody(reason) => Some(json!({ "body": [reason] })),
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {:?}", self);
                store
                    .include_internal_details
                    .then(|| json!({ "internal": self.to_string(), "debug": format!("{:?}", self) }))
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

/// Achata os erros do validator (incluindo listas aninhadas) em "campo" -> [mensagens].
/// As chaves usam os nomes do JSON (camelCase): `items[0].unitPrice`, `clientName`.
pub fn validation_details(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    collect_messages("", errors, &mut out);
    out
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let field = json_name(field);
        let path = if prefix.is_empty() {
            field
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                });
                out.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

// unit_price -> unitPrice
fn json_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    fn store() -> I18nStore {
        I18nStore::from_registry(false)
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InactiveUser.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("entity.task").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::ReferenceNotFound("entity.client").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InsufficientStock { item: "Caneta".into(), available: 0 }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::EmailAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_insufficient_stock_message_names_item_and_available() {
        let api = AppError::InsufficientStock { item: "Caneta Azul".into(), available: 3 }
            .to_api_error(&Locale("pt".into()), &store());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.error.starts_with("Estoque insuficiente"));
        assert!(api.error.contains("Caneta Azul"));
        assert!(api.error.contains('3'));
        assert!(api.details.is_none());
    }

    #[test]
    fn test_entity_names_are_translated() {
        let api = AppError::ReferenceNotFound("entity.client").to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.error, "Client not found.");
    }

    #[test]
    fn test_internal_details_hidden_unless_enabled() {
        let hidden = AppError::InternalServerError(anyhow::anyhow!("segredo"))
            .to_api_error(&Locale("pt".into()), &I18nStore::from_registry(false));
        assert!(hidden.details.is_none());
        assert!(!hidden.error.contains("segredo"));

        let shown = AppError::InternalServerError(anyhow::anyhow!("segredo"))
            .to_api_error(&Locale("pt".into()), &I18nStore::from_registry(true));
        assert!(shown.details.unwrap().to_string().contains("segredo"));
    }

    #[test]
    fn test_validation_details_flatten_nested_lists() {
        let mut item_errors = ValidationErrors::new();
        let mut err = ValidationError::new("range");
        err.message = Some("A quantidade deve ser no mínimo 1.".into());
        item_errors.add("quantity", err);
        item_errors.add("unit_price", ValidationError::new("range"));

        let mut root = ValidationErrors::new();
        root.add("paymentMethod", ValidationError::new("required"));
        let mut list = BTreeMap::new();
        list.insert(0usize, Box::new(item_errors));
        root.errors_mut().insert("items".into(), ValidationErrorsKind::List(list));

        let details = validation_details(&root);
        assert_eq!(
            details.get("items[0].quantity").unwrap(),
            &vec!["A quantidade deve ser no mínimo 1.".to_string()]
        );
        assert_eq!(details.get("paymentMethod").unwrap(), &vec!["required".to_string()]);
        assert!(details.contains_key("items[0].unitPrice"));
        assert!(!details.contains_key("items[0].unit_price"));
    }

    #[test]
    fn test_json_name_is_camel_case() {
        assert_eq!(json_name("client_name"), "clientName");
        assert_eq!(json_name("default_sales_category_id"), "defaultSalesCategoryId");
        assert_eq!(json_name("discount"), "discount");
        assert_eq!(json_name("__all__"), "all");
    }
}
