// src/services/crm_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmRepository,
    models::crm::{Client, ClientPayload},
};

#[derive(Clone)]
pub struct CrmService {
    repo: CrmRepository,
    pool: PgPool,
}

impl CrmService {
    pub fn new(repo: CrmRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // Checagem amigável. O índice único parcial fecha a corrida entre duas requisições.
    async fn check_documents(
        &self,
        company_id: Uuid,
        payload: &ClientPayload,
        exclude_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if payload.cpf.is_none() && payload.cnpj.is_none() {
            return Ok(());
        }

        if let Some(existing) = self
            .repo
            .find_by_document(&self.pool, company_id, payload.cpf.as_deref(), payload.cnpj.as_deref(), exclude_id)
            .await?
        {
            let document = match (&payload.cpf, &existing.cpf) {
                (Some(cpf), Some(other)) if cpf == other => cpf.clone(),
                _ => payload.cnpj.clone().unwrap_or_default(),
            };
            return Err(AppError::DuplicateDocument(document));
        }
        Ok(())
    }

    pub async fn list_clients(&self, company_id: Uuid, search: Option<&str>) -> Result<Vec<Client>, AppError> {
        self.repo.list_clients(company_id, search).await
    }

    pub async fn get_client(&self, company_id: Uuid, client_id: Uuid) -> Result<Client, AppError> {
        self.repo
            .find_client(&self.pool, company_id, client_id)
            .await?
            .ok_or(AppError::NotFound("entity.client"))
    }

    pub async fn create_client(&self, company_id: Uuid, payload: ClientPayload) -> Result<Client, AppError> {
        let payload = payload.normalized();
        self.check_documents(company_id, &payload, None).await?;

        let client = self.repo.create_client(&self.pool, company_id, &payload).await?;

        tracing::info!(company_id = %company_id, client_id = %client.id, "Cliente criado");
        Ok(client)
    }

    pub async fn update_client(
        &self,
        company_id: Uuid,
        client_id: Uuid,
        payload: ClientPayload,
    ) -> Result<Client, AppError> {
        let payload = payload.normalized();
        self.get_client(company_id, client_id).await?;
        self.check_documents(company_id, &payload, Some(client_id)).await?;

        self.repo
            .update_client(&self.pool, company_id, client_id, &payload)
            .await?
            .ok_or(AppError::NotFound("entity.client"))
    }

    pub async fn delete_client(&self, company_id: Uuid, client_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_client(&self.pool, company_id, client_id).await? {
            return Err(AppError::NotFound("entity.client"));
        }
        tracing::info!(company_id = %company_id, client_id = %client_id, "Cliente excluído");
        Ok(())
    }
}
