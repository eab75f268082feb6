// src/db/inventory_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{CreateProductPayload, Product, StockMovement, StockMovementType, UpdateProductPayload},
};

// Uma linha do histórico de estoque pronta para gravar
pub struct NewStockMovement<'a> {
    pub company_id: Uuid,
    pub product_id: Uuid,
    pub kind: StockMovementType,
    pub quantity: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub reason: &'a str,
    pub user_id: Uuid,
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list_products(&self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE company_id = $1 ORDER BY name ASC")
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn list_low_stock(&self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE company_id = $1 AND stock <= min_stock
            ORDER BY (stock - min_stock) ASC, name ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND company_id = $2")
            .bind(product_id)
            .bind(company_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Produtos da empresa entre os ids pedidos (ids de outra empresa simplesmente não voltam).
    pub async fn find_products_by_ids<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE company_id = $1 AND id = ANY($2)")
            .bind(company_id)
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    /// SELECT ... FOR UPDATE: segura a linha até o fim da transação.
    pub async fn lock_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND company_id = $2 FOR UPDATE",
        )
        .bind(product_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn list_movements(&self, company_id: Uuid, product_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE company_id = $1 AND product_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    pub async fn has_sale_items<'e, E>(&self, executor: E, product_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sale_items WHERE product_id = $1)")
            .bind(product_id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    // ---
    // Escrita (Transacional)
    // ---

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, company_id, category_id, name, model, description, price, stock, min_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(payload.category_id)
        .bind(&payload.name)
        .bind(payload.model.as_deref())
        .bind(payload.description.as_deref())
        .bind(payload.price)
        .bind(payload.stock)
        .bind(payload.min_stock)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    // O saldo (stock) fica de fora de propósito: só muda via movimentação
    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $3, model = $4, description = $5, category_id = $6,
                price = $7, min_stock = $8, updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(company_id)
        .bind(&payload.name)
        .bind(payload.model.as_deref())
        .bind(payload.description.as_deref())
        .bind(payload.category_id)
        .bind(payload.price)
        .bind(payload.min_stock)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn set_stock<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
        new_stock: i32,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET stock = $3, updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(company_id)
        .bind(new_stock)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    /// Baixa condicional: só decrementa se ainda houver saldo. Devolve o novo saldo,
    /// ou None quando o saldo não basta (ou o produto não é da empresa).
    pub async fn decrement_stock<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let new_stock: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE products SET stock = stock - $3, updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND stock >= $3
            RETURNING stock
            "#,
        )
        .bind(product_id)
        .bind(company_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;
        Ok(new_stock)
    }

    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        movement: NewStockMovement<'_>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (id, company_id, product_id, type, quantity, previous_stock, new_stock, reason, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(movement.company_id)
        .bind(movement.product_id)
        .bind(movement.kind)
        .bind(movement.quantity)
        .bind(movement.previous_stock)
        .bind(movement.new_stock)
        .bind(movement.reason)
        .bind(movement.user_id)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    pub async fn delete_movements<'e, E>(&self, executor: E, company_id: Uuid, product_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM stock_movements WHERE company_id = $1 AND product_id = $2")
            .bind(company_id)
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete_product<'e, E>(&self, executor: E, company_id: Uuid, product_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND company_id = $2")
            .bind(product_id)
            .bind(company_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
