// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::finance::CategoryType;

// Cards do topo, para o mês filtrado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_revenues: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub sales_count: i64,
    pub sales_total: Decimal,
    pub low_stock_count: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_id: Uuid,
    pub category_name: String,
    pub color: Option<String>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    #[schema(example = 3)]
    pub month: u32,
    pub revenues: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

// Linha crua da agregação mensal (uma por mês que teve lançamento)
#[derive(Debug, FromRow)]
pub struct MonthlyRow {
    pub month: i32,
    pub total: Decimal,
}

/// Preenche os doze meses, com zero onde não houve lançamento.
pub fn fill_months(revenues: &[MonthlyRow], expenses: &[MonthlyRow]) -> Vec<MonthlyTotal> {
    let sum_for = |rows: &[MonthlyRow], month: u32| {
        rows.iter()
            .filter(|r| r.month == month as i32)
            .map(|r| r.total)
            .sum::<Decimal>()
    };

    (1..=12)
        .map(|month| {
            let revenues = sum_for(revenues, month);
            let expenses = sum_for(expenses, month);
            MonthlyTotal { month, revenues, expenses, balance: revenues - expenses }
        })
        .collect()
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ByCategoryQuery {
    #[serde(rename = "type")]
    pub kind: Option<CategoryType>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_months_zero_fills_gaps() {
        let revenues = vec![MonthlyRow { month: 3, total: Decimal::from(100) }];
        let expenses = vec![
            MonthlyRow { month: 3, total: Decimal::from(40) },
            MonthlyRow { month: 12, total: Decimal::from(10) },
        ];

        let months = fill_months(&revenues, &expenses);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].balance, Decimal::ZERO);
        assert_eq!(months[2].balance, Decimal::from(60));
        assert_eq!(months[11].balance, Decimal::from(-10));
    }
}
