// src/models/commission.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::auth::Role;
use crate::models::sales::round_money;

// Gravada junto com a venda e nunca recalculada
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub sale_id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "5.00")]
    pub percentage: Decimal,
    #[schema(example = "2.50")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

// Linha da listagem, já com o nome do vendedor e o valor da venda
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionView {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub percentage: Decimal,
    pub amount: Decimal,
    pub sale_total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSummary {
    pub user_id: Uuid,
    pub user_name: String,
    pub total_commissions: Decimal,
    pub commission_count: i64,
    pub total_sales: Decimal,
    // Só aparece para OWNER/ADMIN
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerReport {
    pub seller_id: Uuid,
    pub seller_name: String,
    pub role: Role,
    pub sales_count: i64,
    pub total_sales: Decimal,
    pub total_discount: Decimal,
    pub total_commission: Decimal,
}

/// Taxa configurada para um usuário específico ou para um papel inteiro.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRate {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub role: Option<Role>,
    #[schema(example = "5.00")]
    pub percentage: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRatePayload {
    pub user_id: Option<Uuid>,
    pub role: Option<Role>,
    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "7.5")]
    pub percentage: Decimal,
}

fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("O percentual deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

impl CommissionRatePayload {
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        if self.user_id.is_some() == self.role.is_some() {
            let mut err = ValidationError::new("target");
            err.message = Some("Informe exatamente um entre userId e role.".into());
            errors.add("user_id", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CommissionQuery {
    pub user_id: Option<Uuid>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Valor da comissão sobre o total final, arredondado para centavos.
pub fn commission_amount(final_total: Decimal, percentage: Decimal) -> Decimal {
    round_money(final_total * percentage / Decimal::ONE_HUNDRED)
}

/// totalCommissions / totalSales × 100, ou 0 quando não houve vendas.
pub fn average_rate(total_commissions: Decimal, total_sales: Decimal) -> Decimal {
    if total_sales.is_zero() {
        return Decimal::ZERO;
    }
    round_money(total_commissions / total_sales * Decimal::ONE_HUNDRED)
}

/// Escolhe a taxa: regra do usuário, depois a do papel, depois o padrão.
pub fn resolve_rate(user_rate: Option<Decimal>, role_rate: Option<Decimal>, default: Decimal) -> Decimal {
    user_rate.or(role_rate).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_five_percent_of_fifty() {
        assert_eq!(commission_amount(dec("50"), dec("5")), dec("2.50"));
    }

    #[test]
    fn test_amount_rounds_to_cents() {
        // 33.33 * 5% = 1.6665
        assert_eq!(commission_amount(dec("33.33"), dec("5")), dec("1.67"));
        assert_eq!(commission_amount(Decimal::ZERO, dec("5")), Decimal::ZERO);
    }

    #[test]
    fn test_average_rate_guards_division_by_zero() {
        assert_eq!(average_rate(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(average_rate(dec("5"), dec("100")), dec("5"));
    }

    #[test]
    fn test_rate_resolution_order() {
        let default = dec("5");
        assert_eq!(resolve_rate(Some(dec("8")), Some(dec("3")), default), dec("8"));
        assert_eq!(resolve_rate(None, Some(dec("3")), default), dec("3"));
        assert_eq!(resolve_rate(None, None, default), default);
    }

    #[test]
    fn test_rate_payload_requires_single_target() {
        let both = CommissionRatePayload {
            user_id: Some(Uuid::new_v4()),
            role: Some(Role::Cashier),
            percentage: dec("5"),
        };
        assert!(both.check().is_err());

        let neither = CommissionRatePayload { user_id: None, role: None, percentage: dec("5") };
        assert!(neither.check().is_err());

        let too_high = CommissionRatePayload { user_id: None, role: Some(Role::User), percentage: dec("100.01") };
        assert!(too_high.check().unwrap_err().field_errors().contains_key("percentage"));

        let ok = CommissionRatePayload { user_id: None, role: Some(Role::User), percentage: dec("100") };
        assert!(ok.check().is_ok());
    }
}
