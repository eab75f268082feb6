pub mod auth;
pub mod commissions;
pub mod crm;
pub mod dashboard;
pub mod finance;
pub mod inventory;
pub mod sales;
pub mod settings;
pub mod tasks;
pub mod users;
