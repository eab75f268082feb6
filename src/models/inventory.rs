// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::error::AppError;

// --- Produto (catálogo + saldo) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub category_id: Option<Uuid>,
    #[schema(example = "Caneta Azul")]
    pub name: String,
    #[schema(example = "BIC Cristal")]
    pub model: Option<String>,
    pub description: Option<String>,
    #[schema(example = "10.00")]
    pub price: Decimal,
    // Só muda via operações que gravam StockMovement
    #[schema(example = 5)]
    pub stock: i32,
    #[schema(example = 2)]
    pub min_stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

// --- Movimentações de Estoque ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "stock_movement_type", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum StockMovementType {
    In,         // Entrada: soma
    Out,        // Saída: subtrai
    Adjustment, // Ajuste: define o valor absoluto
}

impl StockMovementType {
    /// Calcula o saldo candidato. Nunca devolve um valor negativo.
    pub fn apply(self, current: i32, quantity: i32) -> Result<i32, AppError> {
        let candidate = match self {
            StockMovementType::In => current.checked_add(quantity),
            StockMovementType::Out => current.checked_sub(quantity),
            StockMovementType::Adjustment => Some(quantity),
        }
        .ok_or_else(quantity_out_of_range)?;

        if candidate < 0 {
            return Err(AppError::NegativeStock { resulting: candidate });
        }
        Ok(candidate)
    }
}

// Saldo que não cabe em i32 é erro de entrada, não do servidor
fn quantity_out_of_range() -> AppError {
    let mut errors = validator::ValidationErrors::new();
    let mut err = ValidationError::new("range");
    err.message = Some("A quantidade informada ultrapassa o limite de estoque.".into());
    errors.add("quantity", err);
    AppError::ValidationError(errors)
}

// --- STOCK MOVEMENT (Histórico, somente inserção) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub product_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: StockMovementType,
    pub quantity: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    #[schema(example = "Venda #550e8400-e29b-41d4-a716-446655440000")]
    pub reason: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---
// Validação Customizada
// ---
pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("O campo é obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub model: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[serde(default)]
    #[validate(range(min = 0, message = "O estoque inicial não pode ser negativo."))]
    pub stock: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    pub min_stock: i32,
}

// PUT nunca altera o saldo: estoque só muda via /stock
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub model: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    pub min_stock: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustmentPayload {
    pub quantity: i32,
    #[serde(rename = "type")]
    pub kind: StockMovementType,
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Compra do fornecedor")]
    pub reason: String,
}

impl StockAdjustmentPayload {
    /// IN/OUT exigem quantidade >= 0; ADJUSTMENT aceita qualquer inteiro
    /// (um alvo negativo é barrado depois pela regra de saldo).
    pub fn check(&self) -> Result<(), validator::ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => validator::ValidationErrors::new(),
            Err(e) => e,
        };

        if self.kind != StockMovementType::Adjustment && self.quantity < 0 {
            let mut err = ValidationError::new("range");
            err.message = Some("A quantidade não pode ser negativa.".into());
            errors.add("quantity", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_adds() {
        assert_eq!(StockMovementType::In.apply(5, 3).unwrap(), 8);
    }

    #[test]
    fn test_out_subtracts_down_to_zero() {
        assert_eq!(StockMovementType::Out.apply(5, 5).unwrap(), 0);
    }

    #[test]
    fn test_out_below_zero_is_rejected() {
        assert!(matches!(
            StockMovementType::Out.apply(2, 3),
            Err(AppError::NegativeStock { resulting: -1 })
        ));
    }

    #[test]
    fn test_overflowing_entry_is_a_validation_error() {
        match StockMovementType::In.apply(1, i32::MAX) {
            Err(AppError::ValidationError(errors)) => {
                assert!(errors.field_errors().contains_key("quantity"));
            }
            other => panic!("esperava ValidationError, veio {:?}", other),
        }
        let err = StockMovementType::In.apply(1, i32::MAX).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        // Sem estouro no limite exato
        assert_eq!(StockMovementType::In.apply(0, i32::MAX).unwrap(), i32::MAX);
    }

    #[test]
    fn test_adjustment_sets_absolute_value() {
        assert_eq!(StockMovementType::Adjustment.apply(40, 7).unwrap(), 7);
        assert_eq!(StockMovementType::Adjustment.apply(40, 0).unwrap(), 0);
        assert!(StockMovementType::Adjustment.apply(40, -1).is_err());
    }

    #[test]
    fn test_sequence_never_goes_negative() {
        // Operações rejeitadas deixam o saldo como estava
        let ops = [
            (StockMovementType::In, 10),
            (StockMovementType::Out, 4),
            (StockMovementType::Out, 7),
            (StockMovementType::Adjustment, 2),
            (StockMovementType::Out, 3),
            (StockMovementType::In, 1),
        ];
        let mut stock = 0;
        for (kind, qty) in ops {
            if let Ok(next) = kind.apply(stock, qty) {
                stock = next;
            }
            assert!(stock >= 0);
        }
        assert_eq!(stock, 3);
    }

    #[test]
    fn test_adjustment_payload_checks() {
        let negative_out = StockAdjustmentPayload {
            quantity: -2,
            kind: StockMovementType::Out,
            reason: "Perda".into(),
        };
        assert!(negative_out.check().is_err());

        let blank_reason = StockAdjustmentPayload {
            quantity: 1,
            kind: StockMovementType::In,
            reason: "   ".into(),
        };
        let errors = blank_reason.check().unwrap_err();
        assert!(errors.field_errors().contains_key("reason"));

        let adjustment = StockAdjustmentPayload {
            quantity: 12,
            kind: StockMovementType::Adjustment,
            reason: "Inventário".into(),
        };
        assert!(adjustment.check().is_ok());
    }
}
