// src/db/finance_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{is_foreign_key_violation, unique_violation},
        error::AppError,
        period::Period,
    },
    models::finance::{Category, CategoryPayload, CategoryType, LedgerEntry, LedgerEntryPayload, LedgerKind},
};

// Os campos de um lançamento prontos para gravar
pub struct NewLedgerEntry<'a> {
    pub description: &'a str,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub sale_id: Option<Uuid>,
    pub notes: Option<&'a str>,
    pub attachment_url: Option<&'a str>,
}

impl<'a> NewLedgerEntry<'a> {
    pub fn from_payload(payload: &'a LedgerEntryPayload, user_id: Uuid) -> Self {
        Self {
            description: &payload.description,
            amount: payload.amount,
            date: payload.date,
            category_id: payload.category_id,
            user_id,
            sale_id: None,
            notes: payload.notes.as_deref(),
            attachment_url: payload.attachment_url.as_deref(),
        }
    }
}

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // CATEGORIAS
    // ---

    pub async fn list_categories(
        &self,
        company_id: Uuid,
        kind: Option<CategoryType>,
    ) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE company_id = $1
              AND ($2::category_type IS NULL OR type = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(company_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1 AND company_id = $2")
            .bind(category_id)
            .bind(company_id)
            .fetch_optional(executor)
            .await?;
        Ok(category)
    }

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        name: &str,
        kind: CategoryType,
        color: Option<&str>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, company_id, name, type, color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(name)
        .bind(kind)
        .bind(color)
        .fetch_one(executor)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => AppError::CategoryNameAlreadyExists(name.to_string()),
            None => e.into(),
        })
    }

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        category_id: Uuid,
        payload: &CategoryPayload,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $3, type = $4, color = $5, updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(category_id)
        .bind(company_id)
        .bind(&payload.name)
        .bind(payload.kind)
        .bind(payload.color.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => AppError::CategoryNameAlreadyExists(payload.name.clone()),
            None => e.into(),
        })
    }

    /// Falha com HasDependents enquanto receitas, despesas ou produtos apontarem para a categoria.
    pub async fn delete_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        category_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND company_id = $2")
            .bind(category_id)
            .bind(company_id)
            .execute(executor)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::HasDependents("entity.category")
                } else {
                    e.into()
                }
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Categoria de receita cujo nome contém "Vendas" (fallback quando a empresa
    /// não configurou uma categoria padrão).
    pub async fn find_sales_category<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE company_id = $1
              AND type IN ('REVENUE', 'BOTH')
              AND name ILIKE '%vendas%'
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(category)
    }

    // ---
    // LANÇAMENTOS (receitas e despesas)
    // ---

    pub async fn list_entries(
        &self,
        kind: LedgerKind,
        company_id: Uuid,
        period: &Period,
        category_id: Option<Uuid>,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let sql = format!(
            r#"
            SELECT * FROM {}
            WHERE company_id = $1
              AND date >= $2 AND date < $3
              AND ($4::uuid IS NULL OR category_id = $4)
            ORDER BY date DESC, created_at DESC
            "#,
            kind.table()
        );

        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(company_id)
            .bind(period.start)
            .bind(period.end)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    pub async fn find_entry(
        &self,
        kind: LedgerKind,
        company_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<LedgerEntry>, AppError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1 AND company_id = $2", kind.table());
        let entry = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(entry_id)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    pub async fn create_entry<'e, E>(
        &self,
        executor: E,
        kind: LedgerKind,
        company_id: Uuid,
        entry: NewLedgerEntry<'_>,
    ) -> Result<LedgerEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Só receitas têm a coluna sale_id
        let query = match kind {
            LedgerKind::Revenue => sqlx::query_as::<_, LedgerEntry>(
                r#"
                INSERT INTO revenues (id, company_id, description, amount, date, category_id, user_id, notes, attachment_url, sale_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
                "#,
            ),
            LedgerKind::Expense => sqlx::query_as::<_, LedgerEntry>(
                r#"
                INSERT INTO expenses (id, company_id, description, amount, date, category_id, user_id, notes, attachment_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
                "#,
            ),
        };

        let query = query
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(entry.description)
            .bind(entry.amount)
            .bind(entry.date)
            .bind(entry.category_id)
            .bind(entry.user_id)
            .bind(entry.notes)
            .bind(entry.attachment_url);

        let query = match kind {
            LedgerKind::Revenue => query.bind(entry.sale_id),
            LedgerKind::Expense => query,
        };

        Ok(query.fetch_one(executor).await?)
    }

    pub async fn update_entry<'e, E>(
        &self,
        executor: E,
        kind: LedgerKind,
        company_id: Uuid,
        entry_id: Uuid,
        payload: &LedgerEntryPayload,
    ) -> Result<Option<LedgerEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE {}
            SET description = $3, amount = $4, date = $5, category_id = $6,
                notes = $7, attachment_url = $8, updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
            kind.table()
        );

        let entry = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(entry_id)
            .bind(company_id)
            .bind(&payload.description)
            .bind(payload.amount)
            .bind(payload.date)
            .bind(payload.category_id)
            .bind(payload.notes.as_deref())
            .bind(payload.attachment_url.as_deref())
            .fetch_optional(executor)
            .await?;
        Ok(entry)
    }

    pub async fn delete_entry<'e, E>(
        &self,
        executor: E,
        kind: LedgerKind,
        company_id: Uuid,
        entry_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND company_id = $2", kind.table());
        let result = sqlx::query(&sql)
            .bind(entry_id)
            .bind(company_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
