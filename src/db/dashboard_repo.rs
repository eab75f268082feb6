// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::Period},
    models::{
        dashboard::{CategoryTotal, DashboardSummary, MonthlyRow},
        finance::LedgerKind,
    },
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Soma de um livro (receitas ou despesas) no período
    async fn ledger_total(
        tx: &mut Transaction<'_, Postgres>,
        kind: LedgerKind,
        company_id: Uuid,
        period: &Period,
    ) -> Result<Decimal, AppError> {
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) FROM {} WHERE company_id = $1 AND date >= $2 AND date < $3",
            kind.table()
        );
        let total: Decimal = sqlx::query_scalar(&sql)
            .bind(company_id)
            .bind(period.start)
            .bind(period.end)
            .fetch_one(&mut **tx)
            .await?;
        Ok(total)
    }

    // 1. Resumo (cards do topo)
    pub async fn summary(&self, company_id: Uuid, period: &Period) -> Result<DashboardSummary, AppError> {
        // Transação só para ter um snapshot consistente das leituras
        let mut tx = self.pool.begin().await?;

        let total_revenues = Self::ledger_total(&mut tx, LedgerKind::Revenue, company_id, period).await?;
        let total_expenses = Self::ledger_total(&mut tx, LedgerKind::Expense, company_id, period).await?;

        let (sales_count, sales_total): (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(final_total), 0)
            FROM sales
            WHERE company_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(company_id)
        .bind(period.start_utc())
        .bind(period.end_utc())
        .fetch_one(&mut *tx)
        .await?;

        let low_stock_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE company_id = $1 AND stock <= min_stock")
                .bind(company_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            total_revenues,
            total_expenses,
            balance: total_revenues - total_expenses,
            sales_count,
            sales_total,
            low_stock_count,
        })
    }

    // 2. Totais por categoria
    pub async fn by_category(
        &self,
        kind: LedgerKind,
        company_id: Uuid,
        period: &Period,
    ) -> Result<Vec<CategoryTotal>, AppError> {
        let sql = format!(
            r#"
            SELECT
                c.id AS category_id,
                c.name AS category_name,
                c.color,
                COALESCE(SUM(l.amount), 0) AS total
            FROM {} l
            JOIN categories c ON c.id = l.category_id
            WHERE l.company_id = $1 AND l.date >= $2 AND l.date < $3
            GROUP BY c.id, c.name, c.color
            ORDER BY total DESC
            "#,
            kind.table()
        );

        let rows = sqlx::query_as::<_, CategoryTotal>(&sql)
            .bind(company_id)
            .bind(period.start)
            .bind(period.end)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // 3. Série mensal (só os meses com lançamento; o serviço completa os demais)
    pub async fn monthly(&self, kind: LedgerKind, company_id: Uuid, year: &Period) -> Result<Vec<MonthlyRow>, AppError> {
        let sql = format!(
            r#"
            SELECT EXTRACT(MONTH FROM date)::int AS month, COALESCE(SUM(amount), 0) AS total
            FROM {}
            WHERE company_id = $1 AND date >= $2 AND date < $3
            GROUP BY 1
            ORDER BY 1
            "#,
            kind.table()
        );

        let rows = sqlx::query_as::<_, MonthlyRow>(&sql)
            .bind(company_id)
            .bind(year.start)
            .bind(year.end)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
