// src/db/crm_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{is_foreign_key_violation, unique_violation},
        error::AppError,
    },
    models::crm::{Client, ClientPayload},
};

#[derive(Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

// Violação dos índices parciais uq_clients_company_cpf / _cnpj
fn map_document_conflict(e: sqlx::Error, payload: &ClientPayload) -> AppError {
    match unique_violation(&e) {
        Some(constraint) if constraint.ends_with("cnpj") => {
            AppError::DuplicateDocument(payload.cnpj.clone().unwrap_or_default())
        }
        Some(constraint) if constraint.ends_with("cpf") => {
            AppError::DuplicateDocument(payload.cpf.clone().unwrap_or_default())
        }
        _ => e.into(),
    }
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_clients(&self, company_id: Uuid, search: Option<&str>) -> Result<Vec<Client>, AppError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE company_id = $1
              AND ($2::text IS NULL
                   OR name ILIKE $2 OR email ILIKE $2 OR cpf ILIKE $2 OR cnpj ILIKE $2)
            ORDER BY name ASC
            "#,
        )
        .bind(company_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    pub async fn find_client<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1 AND company_id = $2")
            .bind(client_id)
            .bind(company_id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    /// Outro cliente da empresa com o mesmo CPF ou CNPJ (ignorando `exclude_id`).
    pub async fn find_by_document<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        cpf: Option<&str>,
        cnpj: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE company_id = $1
              AND (($2::text IS NOT NULL AND cpf = $2) OR ($3::text IS NOT NULL AND cnpj = $3))
              AND ($4::uuid IS NULL OR id <> $4)
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(cpf)
        .bind(cnpj)
        .bind(exclude_id)
        .fetch_optional(executor)
        .await?;
        Ok(client)
    }

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (id, company_id, name, email, phone, cpf, cnpj, address, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(&payload.name)
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.cpf.as_deref())
        .bind(payload.cnpj.as_deref())
        .bind(payload.address.as_deref())
        .bind(payload.notes.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| map_document_conflict(e, payload))
    }

    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        client_id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $3, email = $4, phone = $5, cpf = $6, cnpj = $7,
                address = $8, notes = $9, updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(company_id)
        .bind(&payload.name)
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.cpf.as_deref())
        .bind(payload.cnpj.as_deref())
        .bind(payload.address.as_deref())
        .bind(payload.notes.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| map_document_conflict(e, payload))
    }

    /// Recusa (HasDependents) enquanto houver vendas para o cliente.
    pub async fn delete_client<'e, E>(&self, executor: E, company_id: Uuid, client_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND company_id = $2")
            .bind(client_id)
            .bind(company_id)
            .execute(executor)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::HasDependents("entity.client")
                } else {
                    e.into()
                }
            })?;
        Ok(result.rows_affected() > 0)
    }
}
