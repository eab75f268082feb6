// src/models/sales.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::error::AppError;
use crate::models::auth::Role;
use crate::models::commission::Commission;
use crate::models::crm::Client;
use crate::models::inventory::{validate_not_blank, validate_not_negative};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
    BankTransfer,
    Check,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::CreditCard => "Cartão de Crédito",
            PaymentMethod::DebitCard => "Cartão de Débito",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::BankTransfer => "Transferência",
            PaymentMethod::Check => "Cheque",
        }
    }
}

/// Arredondamento monetário (2 casas, meio para longe do zero).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// --- Venda (imutável depois de criada) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub client_id: Option<Uuid>,
    #[schema(example = "Consumidor Final")]
    pub client_name: String,
    pub seller_id: Uuid,
    #[schema(example = "50.00")]
    pub total: Decimal,
    #[schema(example = "0.00")]
    pub discount: Decimal,
    #[schema(example = "50.00")]
    pub final_total: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Option<Uuid>,
    #[schema(example = "Caneta Azul")]
    pub item_name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

// Dados públicos do vendedor (sem hash de senha)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// A venda com todas as relações, como devolvida por POST e GET /api/sales/{id}.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub client: Option<Client>,
    pub seller: SellerSummary,
    pub items: Vec<SaleItem>,
    pub commissions: Vec<Commission>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemPayload {
    pub product_id: Option<Uuid>,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Caneta Azul")]
    pub item_name: String,

    pub description: Option<String>,

    #[validate(range(min = 1, message = "A quantidade deve ser no mínimo 1."))]
    #[schema(example = 5)]
    pub quantity: i32,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "10.00")]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,

    #[validate(nested)]
    pub items: Vec<SaleItemPayload>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub discount: Decimal,

    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl CreateSalePayload {
    /// Roda as validações derivadas e as regras entre campos, juntando tudo
    /// em um único ValidationErrors.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        if self.items.is_empty() {
            let mut err = ValidationError::new("length");
            err.message = Some("A venda deve ter ao menos um item.".into());
            errors.add("items", err);
        }

        let has_name = self
            .client_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if self.client_id.is_none() && !has_name {
            let mut err = ValidationError::new("required");
            err.message = Some("Informe o cliente ou o nome do cliente.".into());
            errors.add("client_name", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Quantidade total pedida por produto do catálogo, na ordem em que aparece.
    /// Duas linhas do mesmo produto contam juntas na checagem de estoque.
    pub fn product_demands(&self) -> Vec<ProductDemand> {
        let mut index: HashMap<Uuid, usize> = HashMap::new();
        let mut demands: Vec<ProductDemand> = Vec::new();

        for item in &self.items {
            let Some(product_id) = item.product_id else { continue };
            match index.get(&product_id) {
                Some(&i) => demands[i].quantity += i64::from(item.quantity),
                None => {
                    index.insert(product_id, demands.len());
                    demands.push(ProductDemand {
                        product_id,
                        item_name: item.item_name.clone(),
                        quantity: i64::from(item.quantity),
                    });
                }
            }
        }
        demands
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDemand {
    pub product_id: Uuid,
    pub item_name: String,
    pub quantity: i64,
}

/// Totais da venda. `final_total` nunca é negativo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub total: Decimal,
    pub discount: Decimal,
    pub final_total: Decimal,
}

impl SaleTotals {
    pub fn compute(items: &[SaleItemPayload], discount: Decimal) -> Result<Self, AppError> {
        let mut total = Decimal::ZERO;
        for item in items {
            total = line_total(item.quantity, item.unit_price)
                .and_then(|line| total.checked_add(line))
                .ok_or_else(amount_out_of_range)?;
        }
        let total = round_money(total);
        let discount = round_money(discount);

        if discount > total {
            return Err(AppError::DiscountExceedsTotal);
        }

        Ok(Self { total, discount, final_total: total - discount })
    }
}

pub fn line_total(quantity: i32, unit_price: Decimal) -> Option<Decimal> {
    Decimal::from(quantity).checked_mul(unit_price).map(round_money)
}

fn amount_out_of_range() -> AppError {
    let mut errors = ValidationErrors::new();
    let mut err = ValidationError::new("range");
    err.message = Some("O valor total da venda está fora do limite permitido.".into());
    errors.add("items", err);
    AppError::ValidationError(errors)
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SaleQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub seller_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::validation_details;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(product: Option<Uuid>, name: &str, quantity: i32, price: Decimal) -> SaleItemPayload {
        SaleItemPayload {
            product_id: product,
            item_name: name.into(),
            description: None,
            quantity,
            unit_price: price,
        }
    }

    fn payload(items: Vec<SaleItemPayload>) -> CreateSalePayload {
        CreateSalePayload {
            client_id: None,
            client_name: Some("Consumidor Final".into()),
            items,
            discount: Decimal::ZERO,
            payment_method: PaymentMethod::Pix,
            notes: None,
        }
    }

    #[test]
    fn test_totals_sum_lines_exactly() {
        let items = vec![
            item(None, "Serviço", 3, dec("0.10")),
            item(None, "Caneta", 5, dec("10.00")),
        ];
        let totals = SaleTotals::compute(&items, dec("0.30")).unwrap();
        assert_eq!(totals.total, dec("50.30"));
        assert_eq!(totals.final_total, dec("50.00"));
        assert_eq!(totals.final_total, totals.total - totals.discount);
    }

    #[test]
    fn test_discount_above_total_is_rejected() {
        let items = vec![item(None, "Caneta", 1, dec("10"))];
        assert!(matches!(
            SaleTotals::compute(&items, dec("10.01")),
            Err(AppError::DiscountExceedsTotal)
        ));
        // Desconto igual ao total zera a venda
        assert_eq!(SaleTotals::compute(&items, dec("10")).unwrap().final_total, Decimal::ZERO);
    }

    #[test]
    fn test_check_collects_every_violation() {
        let mut p = payload(vec![
            item(None, "", 0, dec("-1")),
            item(None, "Ok", 1, dec("1")),
        ]);
        p.client_name = None;
        p.discount = dec("-5");

        let details = validation_details(&p.check().unwrap_err());
        assert!(details.contains_key("items[0].itemName"));
        assert!(details.contains_key("items[0].quantity"));
        assert!(details.contains_key("items[0].unitPrice"));
        assert!(!details.keys().any(|k| k.starts_with("items[1]")));
        assert!(details.contains_key("discount"));
        assert!(details.contains_key("clientName"));
    }

    #[test]
    fn test_empty_items_rejected() {
        let details = validation_details(&payload(vec![]).check().unwrap_err());
        assert!(details.contains_key("items"));
    }

    #[test]
    fn test_client_id_replaces_client_name() {
        let mut p = payload(vec![item(None, "Caneta", 1, dec("1"))]);
        p.client_name = None;
        p.client_id = Some(Uuid::new_v4());
        assert!(p.check().is_ok());
    }

    #[test]
    fn test_unknown_payment_method_fails_to_parse() {
        let body = r#"{"clientName":"X","items":[{"itemName":"A","quantity":1,"unitPrice":1}],"paymentMethod":"BITCOIN"}"#;
        assert!(serde_json::from_str::<CreateSalePayload>(body).is_err());

        let body = r#"{"clientName":"X","items":[{"itemName":"A","quantity":1,"unitPrice":1}],"paymentMethod":"CREDIT_CARD"}"#;
        let p: CreateSalePayload = serde_json::from_str(body).unwrap();
        assert_eq!(p.payment_method, PaymentMethod::CreditCard);
        assert_eq!(p.discount, Decimal::ZERO);
    }

    #[test]
    fn test_product_demands_aggregate_repeated_products() {
        let pen = Uuid::new_v4();
        let pad = Uuid::new_v4();
        let p = payload(vec![
            item(Some(pen), "Caneta", 2, dec("1")),
            item(None, "Embrulho", 1, dec("1")),
            item(Some(pad), "Bloco", 1, dec("1")),
            item(Some(pen), "Caneta", 3, dec("1")),
        ]);

        let demands = p.product_demands();
        assert_eq!(demands.len(), 2);
        assert_eq!(demands[0], ProductDemand { product_id: pen, item_name: "Caneta".into(), quantity: 5 });
        assert_eq!(demands[1].product_id, pad);
    }
}
