// src/services/inventory_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{inventory_repo::NewStockMovement, FinanceRepository, InventoryRepository},
    models::inventory::{
        CreateProductPayload, Product, StockAdjustmentPayload, StockMovement, StockMovementType, UpdateProductPayload,
    },
};

const INITIAL_STOCK_REASON: &str = "Estoque inicial";

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    finance_repo: FinanceRepository,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository, finance_repo: FinanceRepository, pool: PgPool) -> Self {
        Self { inventory_repo, finance_repo, pool }
    }

    async fn check_category(&self, company_id: Uuid, category_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(category_id) = category_id {
            self.finance_repo
                .find_category(&self.pool, company_id, category_id)
                .await?
                .ok_or(AppError::ReferenceNotFound("entity.category"))?;
        }
        Ok(())
    }

    pub async fn list_products(&self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.inventory_repo.list_products(company_id).await
    }

    pub async fn list_low_stock(&self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.inventory_repo.list_low_stock(company_id).await
    }

    pub async fn get_product(&self, company_id: Uuid, product_id: Uuid) -> Result<Product, AppError> {
        self.inventory_repo
            .find_product(&self.pool, company_id, product_id)
            .await?
            .ok_or(AppError::NotFound("entity.product"))
    }

    // --- CREATE PRODUCT ---
    // Estoque inicial > 0 entra no histórico como IN
    pub async fn create_product(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        payload: CreateProductPayload,
    ) -> Result<Product, AppError> {
        self.check_category(company_id, payload.category_id).await?;

        let mut tx = self.pool.begin().await?;

        let product = self.inventory_repo.create_product(&mut *tx, company_id, &payload).await?;

        if product.stock > 0 {
            self.inventory_repo
                .insert_movement(
                    &mut *tx,
                    NewStockMovement {
                        company_id,
                        product_id: product.id,
                        kind: StockMovementType::In,
                        quantity: product.stock,
                        previous_stock: 0,
                        new_stock: product.stock,
                        reason: INITIAL_STOCK_REASON,
                        user_id,
                    },
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!(company_id = %company_id, product_id = %product.id, stock = product.stock, "Produto criado");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        company_id: Uuid,
        product_id: Uuid,
        payload: UpdateProductPayload,
    ) -> Result<Product, AppError> {
        self.get_product(company_id, product_id).await?;
        self.check_category(company_id, payload.category_id).await?;

        self.inventory_repo
            .update_product(&self.pool, company_id, product_id, &payload)
            .await?
            .ok_or(AppError::NotFound("entity.product"))
    }

    /// Recusa enquanto algum item de venda apontar para o produto. O histórico
    /// de movimentações vai junto com o produto.
    pub async fn delete_product(&self, company_id: Uuid, product_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.inventory_repo
            .lock_product(&mut *tx, company_id, product_id)
            .await?
            .ok_or(AppError::NotFound("entity.product"))?;

        if self.inventory_repo.has_sale_items(&mut *tx, product_id).await? {
            return Err(AppError::HasDependents("entity.product"));
        }

        self.inventory_repo.delete_movements(&mut *tx, company_id, product_id).await?;
        self.inventory_repo.delete_product(&mut *tx, company_id, product_id).await?;

        tx.commit().await?;

        tracing::info!(company_id = %company_id, product_id = %product_id, "Produto excluído");
        Ok(())
    }

    // --- AJUSTE MANUAL DE ESTOQUE ---
    // A linha fica travada (FOR UPDATE) do cálculo até o commit
    pub async fn adjust_stock(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        product_id: Uuid,
        payload: StockAdjustmentPayload,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        let product = self
            .inventory_repo
            .lock_product(&mut *tx, company_id, product_id)
            .await?
            .ok_or(AppError::NotFound("entity.product"))?;

        // Saldo negativo: o tx cai no drop e nada é gravado
        let new_stock = payload.kind.apply(product.stock, payload.quantity)?;

        let updated = self
            .inventory_repo
            .set_stock(&mut *tx, company_id, product_id, new_stock)
            .await?;

        self.inventory_repo
            .insert_movement(
                &mut *tx,
                NewStockMovement {
                    company_id,
                    product_id,
                    kind: payload.kind,
                    quantity: payload.quantity,
                    previous_stock: product.stock,
                    new_stock,
                    reason: payload.reason.trim(),
                    user_id,
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            product_id = %product_id,
            kind = ?payload.kind,
            previous = product.stock,
            new = new_stock,
            "Estoque ajustado"
        );
        Ok(updated)
    }

    pub async fn list_movements(&self, company_id: Uuid, product_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        self.get_product(company_id, product_id).await?;
        self.inventory_repo.list_movements(company_id, product_id).await
    }
}
