// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::common::error::AppError;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "category_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryType {
    Revenue,
    Expense,
    Both,
    Product,
}

impl CategoryType {
    pub fn accepts_revenue(self) -> bool {
        matches!(self, CategoryType::Revenue | CategoryType::Both)
    }

    pub fn accepts_expense(self) -> bool {
        matches!(self, CategoryType::Expense | CategoryType::Both)
    }
}

// Qual dos dois livros (receitas ou despesas) está sendo manipulado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
    Revenue,
    Expense,
}

impl LedgerKind {
    pub fn table(self) -> &'static str {
        match self {
            LedgerKind::Revenue => "revenues",
            LedgerKind::Expense => "expenses",
        }
    }

    pub fn entity(self) -> &'static str {
        match self {
            LedgerKind::Revenue => "entity.revenue",
            LedgerKind::Expense => "entity.expense",
        }
    }

    pub fn accepts(self, category: CategoryType) -> bool {
        match self {
            LedgerKind::Revenue => category.accepts_revenue(),
            LedgerKind::Expense => category.accepts_expense(),
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    #[schema(example = "Vendas")]
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: CategoryType,
    #[schema(example = "#22C55E")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Um lançamento do livro-razão. Receitas e despesas compartilham o mesmo formato;
/// `sale_id` só é preenchido em receitas derivadas de uma venda.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    #[schema(example = "Venda balcão")]
    pub description: String,
    #[schema(example = "150.00")]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date, example = "2025-03-15")]
    pub date: NaiveDate,
    pub category_id: Uuid,
    pub user_id: Uuid,
    #[sqlx(default)]
    pub sale_id: Option<Uuid>,
    pub notes: Option<String>,
    pub attachment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Receita gerada por venda nasce com a venda e não muda depois.
    pub fn ensure_editable(&self) -> Result<(), AppError> {
        if self.sale_id.is_some() {
            return Err(AppError::SaleEntryLocked);
        }
        Ok(())
    }
}

pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryType,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryPayload {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub category_id: Uuid,
    pub notes: Option<String>,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    pub kind: Option<CategoryType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_accepts_category_types() {
        assert!(LedgerKind::Revenue.accepts(CategoryType::Revenue));
        assert!(LedgerKind::Revenue.accepts(CategoryType::Both));
        assert!(!LedgerKind::Revenue.accepts(CategoryType::Expense));
        assert!(!LedgerKind::Revenue.accepts(CategoryType::Product));
        assert!(LedgerKind::Expense.accepts(CategoryType::Expense));
        assert!(LedgerKind::Expense.accepts(CategoryType::Both));
        assert!(!LedgerKind::Expense.accepts(CategoryType::Revenue));
    }

    fn entry(sale_id: Option<Uuid>) -> LedgerEntry {
        let now = Utc::now();
        LedgerEntry {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            description: "Venda #1".into(),
            amount: Decimal::from(50),
            date: now.date_naive(),
            category_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            sale_id,
            notes: None,
            attachment_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sale_revenue_is_locked() {
        assert!(entry(None).ensure_editable().is_ok());
        assert!(matches!(
            entry(Some(Uuid::new_v4())).ensure_editable(),
            Err(AppError::SaleEntryLocked)
        ));
        assert_eq!(AppError::SaleEntryLocked.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_amount_must_be_positive() {
        let payload = LedgerEntryPayload {
            description: "Aluguel".into(),
            amount: Decimal::ZERO,
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            category_id: Uuid::new_v4(),
            notes: None,
            attachment_url: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }
}
