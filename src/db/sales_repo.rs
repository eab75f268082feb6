// src/db/sales_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::Period},
    models::{
        commission::SellerReport,
        sales::{line_total, CreateSalePayload, Sale, SaleItem, SaleItemPayload, SaleTotals, SellerSummary},
    },
};

#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_sale<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        seller_id: Uuid,
        client_name: &str,
        payload: &CreateSalePayload,
        totals: &SaleTotals,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales
                (id, company_id, client_id, client_name, seller_id, total, discount, final_total, payment_method, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(payload.client_id)
        .bind(client_name)
        .bind(seller_id)
        .bind(totals.total)
        .bind(totals.discount)
        .bind(totals.final_total)
        .bind(payload.payment_method)
        .bind(payload.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        position: i32,
        item: &SaleItemPayload,
    ) -> Result<SaleItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Os totais já foram calculados com sucesso antes da transação
        let total_price = line_total(item.quantity, item.unit_price)
            .ok_or_else(|| anyhow::anyhow!("estouro no total do item '{}'", item.item_name))?;

        let item = sqlx::query_as::<_, SaleItem>(
            r#"
            INSERT INTO sale_items
                (id, sale_id, product_id, item_name, description, quantity, unit_price, total_price, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sale_id)
        .bind(item.product_id)
        .bind(item.item_name.trim())
        .bind(item.description.as_deref())
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(total_price)
        .bind(position)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn find_sale<'e, E>(&self, executor: E, company_id: Uuid, sale_id: Uuid) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = $1 AND company_id = $2")
            .bind(sale_id)
            .bind(company_id)
            .fetch_optional(executor)
            .await?;
        Ok(sale)
    }

    pub async fn list_items<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Vec<SaleItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, SaleItem>("SELECT * FROM sale_items WHERE sale_id = $1 ORDER BY position ASC")
            .bind(sale_id)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn find_seller<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        seller_id: Uuid,
    ) -> Result<Option<SellerSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let seller = sqlx::query_as::<_, SellerSummary>(
            "SELECT id, name, email, role FROM users WHERE id = $1 AND company_id = $2",
        )
        .bind(seller_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(seller)
    }

    pub async fn list_sales(
        &self,
        company_id: Uuid,
        period: &Period,
        seller_id: Option<Uuid>,
    ) -> Result<Vec<Sale>, AppError> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE company_id = $1
              AND created_at >= $2 AND created_at < $3
              AND ($4::uuid IS NULL OR seller_id = $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(period.start_utc())
        .bind(period.end_utc())
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    // Relatório por vendedor: uma comissão por venda, então o LEFT JOIN não duplica linhas
    pub async fn report_by_seller(&self, company_id: Uuid, period: &Period) -> Result<Vec<SellerReport>, AppError> {
        let rows = sqlx::query_as::<_, SellerReport>(
            r#"
            SELECT
                s.seller_id,
                u.name AS seller_name,
                u.role,
                COUNT(s.id) AS sales_count,
                COALESCE(SUM(s.final_total), 0) AS total_sales,
                COALESCE(SUM(s.discount), 0) AS total_discount,
                COALESCE(SUM(c.amount), 0) AS total_commission
            FROM sales s
            JOIN users u ON u.id = s.seller_id
            LEFT JOIN commissions c ON c.sale_id = s.id
            WHERE s.company_id = $1
              AND s.created_at >= $2 AND s.created_at < $3
            GROUP BY s.seller_id, u.name, u.role
            ORDER BY total_sales DESC
            "#,
        )
        .bind(company_id)
        .bind(period.start_utc())
        .bind(period.end_utc())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
