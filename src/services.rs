pub mod auth;
pub mod commission_service;
pub mod crm_service;
pub mod dashboard_service;
pub mod document_service;
pub mod finance_service;
pub mod inventory_service;
pub mod sales_service;
pub mod settings_service;
pub mod task_service;
pub mod user_service;
