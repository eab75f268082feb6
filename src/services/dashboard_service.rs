// src/services/dashboard_service.rs

use chrono::{Datelike, Utc};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::{
        error::AppError,
        period::{Period, PeriodQuery},
    },
    db::DashboardRepository,
    models::{
        dashboard::{fill_months, ByCategoryQuery, CategoryTotal, DashboardSummary, MonthlyTotal},
        finance::{CategoryType, LedgerKind},
    },
};

/// ?type= do relatório por categoria: REVENUE (padrão) ou EXPENSE.
pub fn ledger_for(kind: Option<CategoryType>) -> Result<LedgerKind, AppError> {
    match kind {
        None | Some(CategoryType::Revenue) => Ok(LedgerKind::Revenue),
        Some(CategoryType::Expense) => Ok(LedgerKind::Expense),
        Some(_) => {
            let mut errors = ValidationErrors::new();
            let mut err = ValidationError::new("type");
            err.message = Some("Use REVENUE ou EXPENSE.".into());
            errors.add("type", err);
            Err(AppError::ValidationError(errors))
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn summary(&self, company_id: Uuid, query: PeriodQuery) -> Result<DashboardSummary, AppError> {
        let period = Period::from_query(query)?;
        self.repo.summary(company_id, &period).await
    }

    pub async fn by_category(&self, company_id: Uuid, query: &ByCategoryQuery) -> Result<Vec<CategoryTotal>, AppError> {
        let kind = ledger_for(query.kind)?;
        let period = Period::from_query(PeriodQuery { month: query.month, year: query.year })?;
        self.repo.by_category(kind, company_id, &period).await
    }

    pub async fn monthly(&self, company_id: Uuid, year: Option<i32>) -> Result<Vec<MonthlyTotal>, AppError> {
        let period = Period::year(year.unwrap_or_else(|| Utc::now().year()))?;

        let revenues = self.repo.monthly(LedgerKind::Revenue, company_id, &period).await?;
        let expenses = self.repo.monthly(LedgerKind::Expense, company_id, &period).await?;

        Ok(fill_months(&revenues, &expenses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_category_type_defaults_to_revenue() {
        assert_eq!(ledger_for(None).unwrap(), LedgerKind::Revenue);
        assert_eq!(ledger_for(Some(CategoryType::Expense)).unwrap(), LedgerKind::Expense);
        assert!(matches!(ledger_for(Some(CategoryType::Both)), Err(AppError::ValidationError(_))));
        assert!(matches!(ledger_for(Some(CategoryType::Product)), Err(AppError::ValidationError(_))));
    }
}
