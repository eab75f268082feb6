// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::unique_violation, error::AppError},
    models::auth::{Company, Role, User},
};

// O repositório de usuários e empresas
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        name: &str,
        tax_id: Option<&str>,
        email: &str,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (id, name, tax_id, email)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(tax_id)
        .bind(email)
        .fetch_one(executor)
        .await?;

        Ok(company)
    }

    pub async fn find_company(&self, company_id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    // Busca um usuário pelo e-mail (login). E-mail é único globalmente.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND company_id = $2")
            .bind(user_id)
            .bind(company_id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE company_id = $1 ORDER BY name ASC")
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Cria um novo usuário, traduzindo o e-mail duplicado para um erro amigável
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        email: &str,
        password_hash: &str,
        name: &str,
        role: Role,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, company_id, email, password_hash, name, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .fetch_one(executor)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(constraint) if constraint == "users_email_key" => AppError::EmailAlreadyExists,
            _ => e.into(),
        })
    }

    pub async fn update_role<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET role = $3, updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .bind(role)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }
}
