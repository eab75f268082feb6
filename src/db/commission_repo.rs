// src/db/commission_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::Period},
    models::{
        auth::Role,
        commission::{Commission, CommissionRate, CommissionSummary, CommissionView},
    },
};

#[derive(Clone)]
pub struct CommissionRepository {
    pool: PgPool,
}

impl CommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_commission<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        sale_id: Uuid,
        user_id: Uuid,
        percentage: Decimal,
        amount: Decimal,
    ) -> Result<Commission, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commission = sqlx::query_as::<_, Commission>(
            r#"
            INSERT INTO commissions (id, company_id, sale_id, user_id, percentage, amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(sale_id)
        .bind(user_id)
        .bind(percentage)
        .bind(amount)
        .fetch_one(executor)
        .await?;
        Ok(commission)
    }

    pub async fn list_for_sale<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Vec<Commission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commissions = sqlx::query_as::<_, Commission>("SELECT * FROM commissions WHERE sale_id = $1")
            .bind(sale_id)
            .fetch_all(executor)
            .await?;
        Ok(commissions)
    }

    pub async fn list(
        &self,
        company_id: Uuid,
        period: &Period,
        user_id: Option<Uuid>,
    ) -> Result<Vec<CommissionView>, AppError> {
        let rows = sqlx::query_as::<_, CommissionView>(
            r#"
            SELECT
                c.id, c.sale_id, c.user_id, u.name AS user_name,
                c.percentage, c.amount, s.final_total AS sale_total, c.created_at
            FROM commissions c
            JOIN users u ON u.id = c.user_id
            JOIN sales s ON s.id = c.sale_id
            WHERE c.company_id = $1
              AND c.created_at >= $2 AND c.created_at < $3
              AND ($4::uuid IS NULL OR c.user_id = $4)
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(period.start_utc())
        .bind(period.end_utc())
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Agrupa por usuário. `average_rate` fica para o serviço preencher.
    pub async fn summary(
        &self,
        company_id: Uuid,
        period: &Period,
        user_id: Option<Uuid>,
    ) -> Result<Vec<CommissionSummary>, AppError> {
        let rows = sqlx::query_as::<_, CommissionSummary>(
            r#"
            SELECT
                c.user_id,
                u.name AS user_name,
                COALESCE(SUM(c.amount), 0) AS total_commissions,
                COUNT(c.id) AS commission_count,
                COALESCE(SUM(s.final_total), 0) AS total_sales
            FROM commissions c
            JOIN users u ON u.id = c.user_id
            JOIN sales s ON s.id = c.sale_id
            WHERE c.company_id = $1
              AND c.created_at >= $2 AND c.created_at < $3
              AND ($4::uuid IS NULL OR c.user_id = $4)
            GROUP BY c.user_id, u.name
            ORDER BY total_commissions DESC
            "#,
        )
        .bind(company_id)
        .bind(period.start_utc())
        .bind(period.end_utc())
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---
    // Taxas configuradas
    // ---

    pub async fn list_rates(&self, company_id: Uuid) -> Result<Vec<CommissionRate>, AppError> {
        let rates = sqlx::query_as::<_, CommissionRate>(
            "SELECT * FROM commission_rates WHERE company_id = $1 ORDER BY role NULLS LAST, updated_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rates)
    }

    /// (taxa do usuário, taxa do papel); qualquer uma pode não existir.
    pub async fn find_rates<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<(Option<Decimal>, Option<Decimal>), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rates = sqlx::query_as::<_, (Option<Decimal>, Option<Decimal>)>(
            r#"
            SELECT
                (SELECT percentage FROM commission_rates WHERE company_id = $1 AND user_id = $2),
                (SELECT percentage FROM commission_rates WHERE company_id = $1 AND role = $3)
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await?;
        Ok(rates)
    }

    pub async fn upsert_user_rate<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        user_id: Uuid,
        percentage: Decimal,
    ) -> Result<CommissionRate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rate = sqlx::query_as::<_, CommissionRate>(
            r#"
            INSERT INTO commission_rates (id, company_id, user_id, percentage)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (company_id, user_id) WHERE user_id IS NOT NULL
            DO UPDATE SET percentage = EXCLUDED.percentage, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(user_id)
        .bind(percentage)
        .fetch_one(executor)
        .await?;
        Ok(rate)
    }

    pub async fn upsert_role_rate<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        role: Role,
        percentage: Decimal,
    ) -> Result<CommissionRate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rate = sqlx::query_as::<_, CommissionRate>(
            r#"
            INSERT INTO commission_rates (id, company_id, role, percentage)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (company_id, role) WHERE role IS NOT NULL
            DO UPDATE SET percentage = EXCLUDED.percentage, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(role)
        .bind(percentage)
        .fetch_one(executor)
        .await?;
        Ok(rate)
    }
}
