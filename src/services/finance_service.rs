// src/services/finance_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        period::{Period, PeriodQuery},
    },
    db::{finance_repo::NewLedgerEntry, FinanceRepository},
    models::finance::{
        Category, CategoryPayload, CategoryType, LedgerEntry, LedgerEntryPayload, LedgerKind, LedgerQuery,
    },
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    pool: PgPool,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // ---
    // CATEGORIAS
    // ---

    pub async fn list_categories(&self, company_id: Uuid, kind: Option<CategoryType>) -> Result<Vec<Category>, AppError> {
        self.repo.list_categories(company_id, kind).await
    }

    pub async fn create_category(&self, company_id: Uuid, payload: CategoryPayload) -> Result<Category, AppError> {
        let category = self
            .repo
            .create_category(&self.pool, company_id, payload.name.trim(), payload.kind, payload.color.as_deref())
            .await?;

        tracing::info!(company_id = %company_id, category_id = %category.id, "Categoria criada");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        company_id: Uuid,
        category_id: Uuid,
        mut payload: CategoryPayload,
    ) -> Result<Category, AppError> {
        payload.name = payload.name.trim().to_string();
        self.repo
            .update_category(&self.pool, company_id, category_id, &payload)
            .await?
            .ok_or(AppError::NotFound("entity.category"))
    }

    pub async fn delete_category(&self, company_id: Uuid, category_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_category(&self.pool, company_id, category_id).await? {
            return Err(AppError::NotFound("entity.category"));
        }
        tracing::info!(company_id = %company_id, category_id = %category_id, "Categoria excluída");
        Ok(())
    }

    // ---
    // LANÇAMENTOS
    // ---

    // A categoria precisa existir na empresa e aceitar este tipo de lançamento
    async fn check_category(&self, kind: LedgerKind, company_id: Uuid, category_id: Uuid) -> Result<(), AppError> {
        let category = self
            .repo
            .find_category(&self.pool, company_id, category_id)
            .await?
            .ok_or(AppError::ReferenceNotFound("entity.category"))?;

        if !kind.accepts(category.kind) {
            return Err(AppError::IncompatibleCategory);
        }
        Ok(())
    }

    pub async fn list_entries(
        &self,
        kind: LedgerKind,
        company_id: Uuid,
        query: &LedgerQuery,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let period = Period::from_query(PeriodQuery { month: query.month, year: query.year })?;
        self.repo.list_entries(kind, company_id, &period, query.category_id).await
    }

    pub async fn get_entry(&self, kind: LedgerKind, company_id: Uuid, entry_id: Uuid) -> Result<LedgerEntry, AppError> {
        self.repo
            .find_entry(kind, company_id, entry_id)
            .await?
            .ok_or(AppError::NotFound(kind.entity()))
    }

    pub async fn create_entry(
        &self,
        kind: LedgerKind,
        company_id: Uuid,
        user_id: Uuid,
        payload: LedgerEntryPayload,
    ) -> Result<LedgerEntry, AppError> {
        self.check_category(kind, company_id, payload.category_id).await?;

        let entry = self
            .repo
            .create_entry(&self.pool, kind, company_id, NewLedgerEntry::from_payload(&payload, user_id))
            .await?;

        tracing::info!(company_id = %company_id, entry_id = %entry.id, ledger = kind.table(), "Lançamento criado");
        Ok(entry)
    }

    pub async fn update_entry(
        &self,
        kind: LedgerKind,
        company_id: Uuid,
        entry_id: Uuid,
        payload: LedgerEntryPayload,
    ) -> Result<LedgerEntry, AppError> {
        // 404 do recurso antes do 400 da referência
        self.get_entry(kind, company_id, entry_id).await?.ensure_editable()?;
        self.check_category(kind, company_id, payload.category_id).await?;

        self.repo
            .update_entry(&self.pool, kind, company_id, entry_id, &payload)
            .await?
            .ok_or(AppError::NotFound(kind.entity()))
    }

    pub async fn delete_entry(&self, kind: LedgerKind, company_id: Uuid, entry_id: Uuid) -> Result<(), AppError> {
        self.get_entry(kind, company_id, entry_id).await?.ensure_editable()?;

        if !self.repo.delete_entry(&self.pool, kind, company_id, entry_id).await? {
            return Err(AppError::NotFound(kind.entity()));
        }
        tracing::info!(company_id = %company_id, entry_id = %entry_id, ledger = kind.table(), "Lançamento excluído");
        Ok(())
    }
}
