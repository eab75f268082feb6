// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::settings::{CompanySettings, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_settings(&self, company_id: Uuid) -> Result<CompanySettings, AppError> {
        self.get_settings_with(&self.pool, company_id).await
    }

    // Empresa sem linha em company_settings = tudo vazio
    pub async fn get_settings_with<'e, E>(&self, executor: E, company_id: Uuid) -> Result<CompanySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, CompanySettings>("SELECT * FROM company_settings WHERE company_id = $1")
            .bind(company_id)
            .fetch_optional(executor)
            .await?;

        Ok(settings.unwrap_or(CompanySettings { company_id, ..Default::default() }))
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        input: &UpdateSettingsRequest,
    ) -> Result<CompanySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let settings = sqlx::query_as::<_, CompanySettings>(
            r#"
            INSERT INTO company_settings (company_id, default_sales_category_id, pix_key, receipt_footer)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (company_id)
            DO UPDATE SET
                default_sales_category_id = EXCLUDED.default_sales_category_id,
                pix_key = EXCLUDED.pix_key,
                receipt_footer = EXCLUDED.receipt_footer,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(input.default_sales_category_id)
        .bind(input.pix_key.as_deref())
        .bind(input.receipt_footer.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
