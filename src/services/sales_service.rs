// src/services/sales_service.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        period::{Period, PeriodQuery},
    },
    db::{
        finance_repo::NewLedgerEntry, inventory_repo::NewStockMovement, CommissionRepository, CrmRepository,
        FinanceRepository, InventoryRepository, SalesRepository, SettingsRepository,
    },
    middleware::auth::AuthContext,
    models::{
        commission::{commission_amount, resolve_rate, SellerReport},
        finance::{Category, LedgerKind},
        inventory::{Product, StockMovementType},
        sales::{CreateSalePayload, ProductDemand, Sale, SaleDetail, SaleQuery, SaleTotals},
    },
};

/// "Venda #<id>": motivo da baixa de estoque e descrição da receita derivada.
pub fn sale_reference(sale_id: Uuid) -> String {
    format!("Venda #{}", sale_id)
}

/// Confere cada produto pedido contra o saldo atual (já agregado por produto).
/// É só a mensagem amigável; quem garante o estoque é a baixa condicional.
pub fn check_stock(demands: &[ProductDemand], products: &[Product]) -> Result<(), AppError> {
    let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();

    for demand in demands {
        let product = by_id
            .get(&demand.product_id)
            .ok_or(AppError::ReferenceNotFound("entity.product"))?;

        if i64::from(product.stock) < demand.quantity {
            return Err(AppError::InsufficientStock {
                item: demand.item_name.clone(),
                available: product.stock,
            });
        }
    }
    Ok(())
}

/// Categoria da receita derivada: a configurada, se aceitar receita; senão a
/// "Vendas" encontrada; senão nenhuma (a venda segue sem receita).
pub fn choose_sales_category(configured: Option<Category>, fallback: Option<Category>) -> Option<Category> {
    configured.filter(|c| c.kind.accepts_revenue()).or(fallback)
}

#[derive(Clone)]
pub struct SalesService {
    sales_repo: SalesRepository,
    inventory_repo: InventoryRepository,
    crm_repo: CrmRepository,
    finance_repo: FinanceRepository,
    commission_repo: CommissionRepository,
    settings_repo: SettingsRepository,
    default_commission_percent: Decimal,
    pool: PgPool,
}

impl SalesService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sales_repo: SalesRepository,
        inventory_repo: InventoryRepository,
        crm_repo: CrmRepository,
        finance_repo: FinanceRepository,
        commission_repo: CommissionRepository,
        settings_repo: SettingsRepository,
        default_commission_percent: Decimal,
        pool: PgPool,
    ) -> Self {
        Self {
            sales_repo,
            inventory_repo,
            crm_repo,
            finance_repo,
            commission_repo,
            settings_repo,
            default_commission_percent,
            pool,
        }
    }

    // --- CREATE SALE ---
    // Venda, itens, baixas de estoque, receita e comissão: tudo ou nada
    pub async fn create_sale(&self, ctx: AuthContext, payload: CreateSalePayload) -> Result<SaleDetail, AppError> {
        payload.check()?;

        // 1. Cliente (referência do corpo -> 400)
        let client = match payload.client_id {
            Some(client_id) => Some(
                self.crm_repo
                    .find_client(&self.pool, ctx.company_id, client_id)
                    .await?
                    .ok_or(AppError::ReferenceNotFound("entity.client"))?,
            ),
            None => None,
        };

        let client_name = payload
            .client_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .or_else(|| client.as_ref().map(|c| c.name.clone()))
            .unwrap_or_default();

        // 2. Pré-checagem de estoque
        let demands = payload.product_demands();
        if !demands.is_empty() {
            let ids: Vec<Uuid> = demands.iter().map(|d| d.product_id).collect();
            let products = self
                .inventory_repo
                .find_products_by_ids(&self.pool, ctx.company_id, &ids)
                .await?;
            if let Err(e) = check_stock(&demands, &products) {
                tracing::warn!(company_id = %ctx.company_id, seller_id = %ctx.user_id, "Venda recusada: {}", e);
                return Err(e);
            }
        }

        // 3. Totais
        let totals = SaleTotals::compute(&payload.items, payload.discount)?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let sale = self
            .sales_repo
            .insert_sale(&mut *tx, ctx.company_id, ctx.user_id, &client_name, &payload, &totals)
            .await?;
        let reference = sale_reference(sale.id);

        for (position, item) in payload.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|e| anyhow::anyhow!("posição do item: {}", e))?;
            self.sales_repo.insert_item(&mut *tx, sale.id, position, item).await?;

            let Some(product_id) = item.product_id else { continue };
            self.decrement_stock(&mut tx, ctx, product_id, &item.item_name, item.quantity, &reference)
                .await?;
        }

        self.record_revenue(&mut tx, ctx, &sale, &reference).await?;

        if ctx.role.earns_commission() {
            let (user_rate, role_rate) = self
                .commission_repo
                .find_rates(&mut *tx, ctx.company_id, ctx.user_id, ctx.role)
                .await?;
            let percentage = resolve_rate(user_rate, role_rate, self.default_commission_percent);
            let amount = commission_amount(sale.final_total, percentage);

            self.commission_repo
                .insert_commission(&mut *tx, ctx.company_id, sale.id, ctx.user_id, percentage, amount)
                .await?;
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(
            company_id = %ctx.company_id,
            sale_id = %sale.id,
            seller_id = %ctx.user_id,
            final_total = %sale.final_total,
            "Venda registrada"
        );

        self.load_detail(ctx.company_id, sale).await
    }

    // Baixa condicional. Zero linhas = outro caixa levou o saldo depois da pré-checagem.
    async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ctx: AuthContext,
        product_id: Uuid,
        item_name: &str,
        quantity: i32,
        reason: &str,
    ) -> Result<(), AppError> {
        let Some(new_stock) = self
            .inventory_repo
            .decrement_stock(&mut **tx, ctx.company_id, product_id, quantity)
            .await?
        else {
            let available = self
                .inventory_repo
                .find_product(&mut **tx, ctx.company_id, product_id)
                .await?
                .map(|p| p.stock)
                .unwrap_or(0);
            tracing::warn!(product_id = %product_id, available, quantity, "Baixa de estoque recusada");
            return Err(AppError::InsufficientStock { item: item_name.trim().to_string(), available });
        };

        self.inventory_repo
            .insert_movement(
                &mut **tx,
                NewStockMovement {
                    company_id: ctx.company_id,
                    product_id,
                    kind: StockMovementType::Out,
                    quantity,
                    previous_stock: new_stock + quantity,
                    new_stock,
                    reason,
                    user_id: ctx.user_id,
                },
            )
            .await?;
        Ok(())
    }

    // Categoria configurada (se for de receita) -> "Vendas" -> nenhuma
    async fn record_revenue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ctx: AuthContext,
        sale: &Sale,
        reference: &str,
    ) -> Result<(), AppError> {
        let settings = self.settings_repo.get_settings_with(&mut **tx, ctx.company_id).await?;

        let configured = match settings.default_sales_category_id {
            Some(category_id) => {
                self.finance_repo
                    .find_category(&mut **tx, ctx.company_id, category_id)
                    .await?
            }
            None => None,
        };
        let fallback = if configured.as_ref().is_some_and(|c| c.kind.accepts_revenue()) {
            None
        } else {
            self.finance_repo.find_sales_category(&mut **tx, ctx.company_id).await?
        };

        let Some(category) = choose_sales_category(configured, fallback) else {
            tracing::warn!(
                company_id = %ctx.company_id,
                sale_id = %sale.id,
                "Nenhuma categoria de receita para vendas; receita não registrada"
            );
            return Ok(());
        };

        self.finance_repo
            .create_entry(
                &mut **tx,
                LedgerKind::Revenue,
                ctx.company_id,
                NewLedgerEntry {
                    description: reference,
                    amount: sale.final_total,
                    date: sale.created_at.date_naive(),
                    category_id: category.id,
                    user_id: sale.seller_id,
                    sale_id: Some(sale.id),
                    notes: None,
                    attachment_url: None,
                },
            )
            .await?;
        Ok(())
    }

    async fn load_detail(&self, company_id: Uuid, sale: Sale) -> Result<SaleDetail, AppError> {
        let client = match sale.client_id {
            Some(client_id) => self.crm_repo.find_client(&self.pool, company_id, client_id).await?,
            None => None,
        };

        let seller = self
            .sales_repo
            .find_seller(&self.pool, company_id, sale.seller_id)
            .await?
            .ok_or(AppError::NotFound("entity.user"))?;

        let items = self.sales_repo.list_items(&self.pool, sale.id).await?;
        let commissions = self.commission_repo.list_for_sale(&self.pool, sale.id).await?;

        Ok(SaleDetail { sale, client, seller, items, commissions })
    }

    // CASHIER/USER só enxergam as próprias vendas; a de outro vendedor é 404
    pub async fn get_sale(&self, ctx: AuthContext, sale_id: Uuid) -> Result<SaleDetail, AppError> {
        let sale = self
            .sales_repo
            .find_sale(&self.pool, ctx.company_id, sale_id)
            .await?
            .filter(|s| ctx.is_privileged() || s.seller_id == ctx.user_id)
            .ok_or(AppError::NotFound("entity.sale"))?;

        self.load_detail(ctx.company_id, sale).await
    }

    pub async fn list_sales(&self, ctx: AuthContext, query: &SaleQuery) -> Result<Vec<Sale>, AppError> {
        let period = Period::from_query(PeriodQuery { month: query.month, year: query.year })?;
        let seller_id = if ctx.is_privileged() { query.seller_id } else { Some(ctx.user_id) };

        self.sales_repo.list_sales(ctx.company_id, &period, seller_id).await
    }

    pub async fn report_by_seller(&self, company_id: Uuid, query: PeriodQuery) -> Result<Vec<SellerReport>, AppError> {
        let period = Period::from_query(query)?;
        self.sales_repo.report_by_seller(company_id, &period).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::finance::CategoryType;

    fn product(stock: i32) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            category_id: None,
            name: "Caneta Azul".into(),
            model: None,
            description: None,
            price: Decimal::TEN,
            stock,
            min_stock: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn demand(product_id: Uuid, quantity: i64) -> ProductDemand {
        ProductDemand { product_id, item_name: "Caneta Azul".into(), quantity }
    }

    #[test]
    fn test_stock_check_accepts_exact_balance() {
        let p = product(5);
        assert!(check_stock(&[demand(p.id, 5)], &[p]).is_ok());
    }

    #[test]
    fn test_stock_check_reports_item_and_available() {
        let p = product(3);
        match check_stock(&[demand(p.id, 4)], &[p]) {
            Err(AppError::InsufficientStock { item, available }) => {
                assert_eq!(item, "Caneta Azul");
                assert_eq!(available, 3);
            }
            other => panic!("esperava InsufficientStock, veio {:?}", other),
        }
    }

    #[test]
    fn test_stock_check_unknown_product_is_reference_error() {
        let p = product(10);
        let result = check_stock(&[demand(Uuid::new_v4(), 1)], &[p]);
        assert!(matches!(result, Err(AppError::ReferenceNotFound("entity.product"))));
    }

    #[test]
    fn test_sale_reference_format() {
        let id = Uuid::nil();
        assert_eq!(sale_reference(id), "Venda #00000000-0000-0000-0000-000000000000");
    }

    fn category(name: &str, kind: CategoryType) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: name.into(),
            kind,
            color: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_configured_revenue_category_wins() {
        let configured = category("Balcão", CategoryType::Both);
        let fallback = category("Vendas", CategoryType::Revenue);
        let chosen = choose_sales_category(Some(configured.clone()), Some(fallback)).unwrap();
        assert_eq!(chosen.id, configured.id);
    }

    #[test]
    fn test_configured_expense_category_falls_back_to_vendas() {
        let configured = category("Aluguel", CategoryType::Expense);
        let fallback = category("Vendas", CategoryType::Revenue);
        let chosen = choose_sales_category(Some(configured), Some(fallback.clone())).unwrap();
        assert_eq!(chosen.id, fallback.id);

        let chosen = choose_sales_category(None, Some(fallback.clone())).unwrap();
        assert_eq!(chosen.id, fallback.id);
    }

    #[test]
    fn test_no_revenue_category_means_no_revenue() {
        assert!(choose_sales_category(None, None).is_none());
        assert!(choose_sales_category(Some(category("Insumos", CategoryType::Product)), None).is_none());
    }

    // --- Fluxo completo contra o banco ---

    mod with_database {
        use super::*;
        use sqlx::PgPool;

        use crate::{
            config::AppState,
            models::{
                auth::{Role, User},
                finance::CategoryPayload,
                inventory::CreateProductPayload,
                sales::{PaymentMethod, SaleItemPayload},
                settings::UpdateSettingsRequest,
            },
            test_support::{seed_owner, seed_user, state_with},
        };

        fn ctx(user: &User) -> AuthContext {
            AuthContext { user_id: user.id, company_id: user.company_id, role: user.role }
        }

        async fn pen(state: &AppState, owner: &User, stock: i32) -> Product {
            state
                .inventory_service
                .create_product(
                    owner.company_id,
                    owner.id,
                    CreateProductPayload {
                        name: "Caneta Azul".into(),
                        model: None,
                        description: None,
                        category_id: None,
                        price: Decimal::TEN,
                        stock,
                        min_stock: 0,
                    },
                )
                .await
                .unwrap()
        }

        fn sale_of(product_id: Uuid, quantity: i32) -> CreateSalePayload {
            CreateSalePayload {
                client_id: None,
                client_name: Some("Consumidor Final".into()),
                items: vec![SaleItemPayload {
                    product_id: Some(product_id),
                    item_name: "Caneta Azul".into(),
                    description: None,
                    quantity,
                    unit_price: Decimal::TEN,
                }],
                discount: Decimal::ZERO,
                payment_method: PaymentMethod::Pix,
                notes: None,
            }
        }

        async fn count(pool: &PgPool, sql: &str, company_id: Uuid) -> i64 {
            sqlx::query_scalar::<_, i64>(sql).bind(company_id).fetch_one(pool).await.unwrap()
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requer DATABASE_URL com um Postgres acessível"]
        async fn test_cashier_sale_moves_stock_revenue_and_commission(pool: PgPool) {
            let state = state_with(pool.clone());
            let owner = seed_owner(&state).await;
            let cashier = seed_user(&state, owner.company_id, Role::Cashier).await;
            let product = pen(&state, &owner, 5).await;

            let detail = state
                .sales_service
                .create_sale(ctx(&cashier), sale_of(product.id, 5))
                .await
                .unwrap();

            assert_eq!(detail.sale.final_total, Decimal::from(50));
            assert_eq!(detail.commissions.len(), 1);
            assert_eq!(detail.commissions[0].amount, "2.50".parse::<Decimal>().unwrap());
            assert_eq!(detail.commissions[0].user_id, cashier.id);

            let product_after = state.inventory_service.get_product(owner.company_id, product.id).await.unwrap();
            assert_eq!(product_after.stock, 0);

            let movements = state.inventory_service.list_movements(owner.company_id, product.id).await.unwrap();
            let out = movements
                .iter()
                .find(|m| m.kind == StockMovementType::Out)
                .unwrap();
            assert_eq!((out.quantity, out.previous_stock, out.new_stock), (5, 5, 0));
            assert_eq!(out.reason, sale_reference(detail.sale.id));

            let (revenue_id, amount, category_name): (Uuid, Decimal, String) = sqlx::query_as(
                "SELECT r.id, r.amount, c.name FROM revenues r JOIN categories c ON c.id = r.category_id WHERE r.sale_id = $1",
            )
            .bind(detail.sale.id)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(amount, Decimal::from(50));
            assert_eq!(category_name, "Vendas");

            // A receita da venda não pode ser apagada pelo CRUD do livro-caixa
            let deleted = state
                .finance_service
                .delete_entry(LedgerKind::Revenue, owner.company_id, revenue_id)
                .await;
            assert!(matches!(deleted, Err(AppError::SaleEntryLocked)));

            // Estoque zerado: a próxima venda é recusada sem deixar rastro
            let again = state.sales_service.create_sale(ctx(&cashier), sale_of(product.id, 1)).await;
            assert!(matches!(again, Err(AppError::InsufficientStock { available: 0, .. })));
            assert_eq!(count(&pool, "SELECT COUNT(*) FROM sales WHERE company_id = $1", owner.company_id).await, 1);
            assert_eq!(count(&pool, "SELECT COUNT(*) FROM revenues WHERE company_id = $1", owner.company_id).await, 1);
            assert_eq!(count(&pool, "SELECT COUNT(*) FROM commissions WHERE company_id = $1", owner.company_id).await, 1);
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requer DATABASE_URL com um Postgres acessível"]
        async fn test_owner_sale_earns_no_commission(pool: PgPool) {
            let state = state_with(pool);
            let owner = seed_owner(&state).await;
            let product = pen(&state, &owner, 5).await;

            let detail = state.sales_service.create_sale(ctx(&owner), sale_of(product.id, 2)).await.unwrap();

            assert!(detail.commissions.is_empty());
            assert_eq!(detail.sale.final_total, Decimal::from(20));
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requer DATABASE_URL com um Postgres acessível"]
        async fn test_configured_category_receives_the_revenue(pool: PgPool) {
            let state = state_with(pool.clone());
            let owner = seed_owner(&state).await;
            let product = pen(&state, &owner, 5).await;

            let counter = state
                .finance_service
                .create_category(
                    owner.company_id,
                    CategoryPayload { name: "Balcão".into(), kind: CategoryType::Revenue, color: None },
                )
                .await
                .unwrap();
            state
                .settings_service
                .update(
                    owner.company_id,
                    UpdateSettingsRequest {
                        default_sales_category_id: Some(counter.id),
                        pix_key: None,
                        receipt_footer: None,
                    },
                )
                .await
                .unwrap();

            let detail = state.sales_service.create_sale(ctx(&owner), sale_of(product.id, 1)).await.unwrap();

            let category_id: Uuid = sqlx::query_scalar("SELECT category_id FROM revenues WHERE sale_id = $1")
                .bind(detail.sale.id)
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(category_id, counter.id);
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requer DATABASE_URL com um Postgres acessível"]
        async fn test_sale_without_revenue_category_still_succeeds(pool: PgPool) {
            let state = state_with(pool.clone());
            let owner = seed_owner(&state).await;
            let product = pen(&state, &owner, 5).await;

            sqlx::query("DELETE FROM categories WHERE company_id = $1 AND type = 'REVENUE'")
                .bind(owner.company_id)
                .execute(&pool)
                .await
                .unwrap();

            state.sales_service.create_sale(ctx(&owner), sale_of(product.id, 1)).await.unwrap();

            assert_eq!(count(&pool, "SELECT COUNT(*) FROM sales WHERE company_id = $1", owner.company_id).await, 1);
            assert_eq!(count(&pool, "SELECT COUNT(*) FROM revenues WHERE company_id = $1", owner.company_id).await, 0);
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requer DATABASE_URL com um Postgres acessível"]
        async fn test_items_come_back_in_cart_order(pool: PgPool) {
            let state = state_with(pool);
            let owner = seed_owner(&state).await;

            let mut payload = sale_of(Uuid::new_v4(), 1);
            payload.items = ["Mochila", "Apagador", "Caderno", "Borracha"]
                .into_iter()
                .map(|name| SaleItemPayload {
                    product_id: None,
                    item_name: name.into(),
                    description: None,
                    quantity: 1,
                    unit_price: Decimal::ONE,
                })
                .collect();

            let created = state.sales_service.create_sale(ctx(&owner), payload).await.unwrap();
            let detail = state.sales_service.get_sale(ctx(&owner), created.sale.id).await.unwrap();

            let names: Vec<&str> = detail.items.iter().map(|i| i.item_name.as_str()).collect();
            assert_eq!(names, ["Mochila", "Apagador", "Caderno", "Borracha"]);
        }

        #[sqlx::test(migrations = "./migrations")]
        #[ignore = "requer DATABASE_URL com um Postgres acessível"]
        async fn test_failed_decrement_rolls_back_the_sale(pool: PgPool) {
            let state = state_with(pool.clone());
            let owner = seed_owner(&state).await;
            let cashier = seed_user(&state, owner.company_id, Role::Cashier).await;
            let product = pen(&state, &owner, 5).await;
            let svc = state.sales_service.clone();

            // Simula outro caixa levando o saldo entre a pré-checagem e a baixa
            let payload = sale_of(product.id, 6);
            let totals = SaleTotals::compute(&payload.items, payload.discount).unwrap();
            let mut tx = pool.begin().await.unwrap();
            let sale = svc
                .sales_repo
                .insert_sale(&mut *tx, owner.company_id, cashier.id, "Consumidor Final", &payload, &totals)
                .await
                .unwrap();

            let result = svc
                .decrement_stock(&mut tx, ctx(&cashier), product.id, "Caneta Azul", 6, &sale_reference(sale.id))
                .await;
            assert!(matches!(result, Err(AppError::InsufficientStock { available: 5, .. })));
            drop(tx);

            assert_eq!(count(&pool, "SELECT COUNT(*) FROM sales WHERE company_id = $1", owner.company_id).await, 0);
            let product_after = state.inventory_service.get_product(owner.company_id, product.id).await.unwrap();
            assert_eq!(product_after.stock, 5);
        }
    }
}
