// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        CommissionRepository, CrmRepository, DashboardRepository, FinanceRepository, InventoryRepository,
        SalesRepository, SettingsRepository, TaskRepository, UserRepository,
    },
    services::{
        auth::AuthService, commission_service::CommissionService, crm_service::CrmService,
        dashboard_service::DashboardService, document_service::DocumentService, finance_service::FinanceService,
        inventory_service::InventoryService, sales_service::SalesService, settings_service::SettingsService,
        task_service::TaskService, user_service::UserService,
    },
};

// Tudo o que vem do ambiente (.env ou variáveis do processo)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    // APP_ENV=production esconde o detalhe dos erros 500
    pub production: bool,
    pub db_max_connections: u32,
    pub token_ttl_hours: i64,
    pub default_commission_percent: Decimal,
    pub task_strict_transitions: bool,
    pub fonts_dir: PathBuf,
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{} deve ser definida", key))
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Valor inválido para {}: {} ({})", key, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let app_env = env_or("APP_ENV", "development".to_string())?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            production: app_env.eq_ignore_ascii_case("production"),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5)?,
            token_ttl_hours: env_or("TOKEN_TTL_HOURS", 168)?,
            default_commission_percent: env_or("DEFAULT_COMMISSION_PERCENT", Decimal::from(5))?,
            task_strict_transitions: env_or("TASK_STRICT_TRANSITIONS", false)?,
            fonts_dir: env_or("FONTS_DIR", PathBuf::from("./fonts"))?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: I18nStore,

    pub auth_service: AuthService,
    pub user_service: UserService,
    pub finance_service: FinanceService,
    pub inventory_service: InventoryService,
    pub crm_service: CrmService,
    pub sales_service: SalesService,
    pub commission_service: CommissionService,
    pub task_service: TaskService,
    pub dashboard_service: DashboardService,
    pub settings_service: SettingsService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(config: Config, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let crm_repo = CrmRepository::new(db_pool.clone());
        let sales_repo = SalesRepository::new(db_pool.clone());
        let commission_repo = CommissionRepository::new(db_pool.clone());
        let task_repo = TaskRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            finance_repo.clone(),
            config.jwt_secret.clone(),
            config.token_ttl_hours,
            db_pool.clone(),
        );
        let user_service = UserService::new(user_repo.clone(), db_pool.clone());
        let finance_service = FinanceService::new(finance_repo.clone(), db_pool.clone());
        let inventory_service = InventoryService::new(inventory_repo.clone(), finance_repo.clone(), db_pool.clone());
        let crm_service = CrmService::new(crm_repo.clone(), db_pool.clone());
        let sales_service = SalesService::new(
            sales_repo,
            inventory_repo,
            crm_repo,
            finance_repo.clone(),
            commission_repo.clone(),
            settings_repo.clone(),
            config.default_commission_percent,
            db_pool.clone(),
        );
        let commission_service = CommissionService::new(commission_repo, user_repo.clone(), db_pool.clone());
        let task_service = TaskService::new(task_repo, user_repo.clone(), config.task_strict_transitions, db_pool.clone());
        let dashboard_service = DashboardService::new(dashboard_repo);
        let settings_service = SettingsService::new(settings_repo.clone(), finance_repo, db_pool.clone());
        let document_service =
            DocumentService::new(sales_service.clone(), user_repo, settings_repo, config.fonts_dir.clone());

        Self {
            i18n_store: I18nStore::from_registry(!config.production),
            config: Arc::new(config),
            db_pool,
            auth_service,
            user_service,
            finance_service,
            inventory_service,
            crm_service,
            sales_service,
            commission_service,
            task_service,
            dashboard_service,
            settings_service,
            document_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_parses_and_defaults() {
        // Chaves exclusivas deste teste para não interferir em outros
        unsafe {
            env::set_var("GRANAFLUX_TEST_PERCENT", "7.5");
            env::remove_var("GRANAFLUX_TEST_MISSING");
            env::set_var("GRANAFLUX_TEST_BAD", "abc");
        }

        let pct: Decimal = env_or("GRANAFLUX_TEST_PERCENT", Decimal::from(5)).unwrap();
        assert_eq!(pct, "7.5".parse::<Decimal>().unwrap());

        let missing: u32 = env_or("GRANAFLUX_TEST_MISSING", 5).unwrap();
        assert_eq!(missing, 5);

        assert!(env_or::<u32>("GRANAFLUX_TEST_BAD", 5).is_err());
    }
}
