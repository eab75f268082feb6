pub mod user_repo;
pub use user_repo::UserRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod commission_repo;
pub use commission_repo::CommissionRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
