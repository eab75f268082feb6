// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_role,

        // --- Finance ---
        handlers::finance::list_categories,
        handlers::finance::create_category,
        handlers::finance::update_category,
        handlers::finance::delete_category,
        handlers::finance::list_revenues,
        handlers::finance::get_revenue,
        handlers::finance::create_revenue,
        handlers::finance::update_revenue,
        handlers::finance::delete_revenue,
        handlers::finance::list_expenses,
        handlers::finance::get_expense,
        handlers::finance::create_expense,
        handlers::finance::update_expense,
        handlers::finance::delete_expense,

        // --- Inventory ---
        handlers::inventory::list_products,
        handlers::inventory::list_low_stock,
        handlers::inventory::get_product,
        handlers::inventory::create_product,
        handlers::inventory::update_product,
        handlers::inventory::delete_product,
        handlers::inventory::adjust_stock,
        handlers::inventory::list_movements,

        // --- CRM ---
        handlers::crm::list_clients,
        handlers::crm::get_client,
        handlers::crm::create_client,
        handlers::crm::update_client,
        handlers::crm::delete_client,

        // --- Sales ---
        handlers::sales::create_sale,
        handlers::sales::list_sales,
        handlers::sales::get_sale,
        handlers::sales::report_by_seller,
        handlers::sales::sale_receipt,

        // --- Commissions ---
        handlers::commissions::list_commissions,
        handlers::commissions::commission_summary,
        handlers::commissions::list_rates,
        handlers::commissions::set_rate,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::get_task,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::update_task_status,
        handlers::tasks::delete_task,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_by_category,
        handlers::dashboard::get_monthly,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::Company,
            models::auth::User,
            models::auth::MeResponse,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateRolePayload,
            models::auth::AuthResponse,

            // --- Finance ---
            models::finance::CategoryType,
            models::finance::Category,
            models::finance::CategoryPayload,
            models::finance::LedgerEntry,
            models::finance::LedgerEntryPayload,

            // --- Inventory ---
            models::inventory::Product,
            models::inventory::StockMovementType,
            models::inventory::StockMovement,
            models::inventory::CreateProductPayload,
            models::inventory::UpdateProductPayload,
            models::inventory::StockAdjustmentPayload,

            // --- CRM ---
            models::crm::Client,
            models::crm::ClientPayload,

            // --- Sales ---
            models::sales::PaymentMethod,
            models::sales::Sale,
            models::sales::SaleItem,
            models::sales::SellerSummary,
            models::sales::SaleDetail,
            models::sales::SaleItemPayload,
            models::sales::CreateSalePayload,

            // --- Commissions ---
            models::commission::Commission,
            models::commission::CommissionView,
            models::commission::CommissionSummary,
            models::commission::SellerReport,
            models::commission::CommissionRate,
            models::commission::CommissionRatePayload,

            // --- Tasks ---
            models::tasks::TaskStatus,
            models::tasks::TaskPriority,
            models::tasks::Task,
            models::tasks::CreateTaskPayload,
            models::tasks::UpdateTaskPayload,
            models::tasks::UpdateTaskStatusPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::CategoryTotal,
            models::dashboard::MonthlyTotal,

            // --- Settings ---
            models::settings::CompanySettings,
            models::settings::UpdateSettingsRequest,
        )
    ),
    tags(
        (name = "Auth", description = "Registro da empresa, login e sessão"),
        (name = "Users", description = "Funcionários e papéis"),
        (name = "Finance", description = "Categorias, receitas e despesas"),
        (name = "Inventory", description = "Produtos e movimentações de estoque"),
        (name = "CRM", description = "Clientes"),
        (name = "Sales", description = "Ponto de venda, relatórios e recibos"),
        (name = "Commissions", description = "Comissões e taxas"),
        (name = "Tasks", description = "Tarefas da equipe"),
        (name = "Dashboard", description = "Indicadores gerenciais"),
        (name = "Settings", description = "Configurações da empresa")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
