// src/services/settings_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, SettingsRepository},
    models::settings::{CompanySettings, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsService {
    repo: SettingsRepository,
    finance_repo: FinanceRepository,
    pool: PgPool,
}

impl SettingsService {
    pub fn new(repo: SettingsRepository, finance_repo: FinanceRepository, pool: PgPool) -> Self {
        Self { repo, finance_repo, pool }
    }

    pub async fn get(&self, company_id: Uuid) -> Result<CompanySettings, AppError> {
        self.repo.get_settings(company_id).await
    }

    pub async fn update(&self, company_id: Uuid, mut input: UpdateSettingsRequest) -> Result<CompanySettings, AppError> {
        // A categoria padrão de vendas tem que aceitar receita
        if let Some(category_id) = input.default_sales_category_id {
            let category = self
                .finance_repo
                .find_category(&self.pool, company_id, category_id)
                .await?
                .ok_or(AppError::ReferenceNotFound("entity.category"))?;
            if !category.kind.accepts_revenue() {
                return Err(AppError::IncompatibleCategory);
            }
        }

        input.pix_key = input.pix_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        input.receipt_footer = input.receipt_footer.filter(|f| !f.trim().is_empty());

        let settings = self.repo.update_settings(&self.pool, company_id, &input).await?;

        tracing::info!(company_id = %company_id, "Configurações atualizadas");
        Ok(settings)
    }
}
