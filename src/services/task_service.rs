// src/services/task_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TaskRepository, UserRepository},
    models::tasks::{CreateTaskPayload, StatusChange, Task, TaskQuery, TaskStatus, UpdateTaskPayload},
};

#[derive(Clone)]
pub struct TaskService {
    repo: TaskRepository,
    user_repo: UserRepository,
    strict_transitions: bool,
    pool: PgPool,
}

impl TaskService {
    pub fn new(repo: TaskRepository, user_repo: UserRepository, strict_transitions: bool, pool: PgPool) -> Self {
        Self { repo, user_repo, strict_transitions, pool }
    }

    async fn check_assignee(&self, company_id: Uuid, assignee_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(assignee_id) = assignee_id {
            self.user_repo
                .find_by_id(&self.pool, company_id, assignee_id)
                .await?
                .ok_or(AppError::ReferenceNotFound("entity.user"))?;
        }
        Ok(())
    }

    pub async fn list(&self, company_id: Uuid, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        self.repo.list(company_id, query).await
    }

    pub async fn get(&self, company_id: Uuid, task_id: Uuid) -> Result<Task, AppError> {
        self.repo
            .find(&self.pool, company_id, task_id)
            .await?
            .ok_or(AppError::NotFound("entity.task"))
    }

    pub async fn create(&self, company_id: Uuid, creator_id: Uuid, mut payload: CreateTaskPayload) -> Result<Task, AppError> {
        payload.title = payload.title.trim().to_string();
        self.check_assignee(company_id, payload.assignee_id).await?;

        let task = self.repo.create(&self.pool, company_id, creator_id, &payload).await?;

        tracing::info!(company_id = %company_id, task_id = %task.id, "Tarefa criada");
        Ok(task)
    }

    pub async fn update(
        &self,
        company_id: Uuid,
        task_id: Uuid,
        mut payload: UpdateTaskPayload,
    ) -> Result<Task, AppError> {
        payload.title = payload.title.trim().to_string();
        self.check_assignee(company_id, payload.assignee_id).await?;

        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .lock(&mut *tx, company_id, task_id)
            .await?
            .ok_or(AppError::NotFound("entity.task"))?;

        let change = match payload.status {
            Some(status) => current.status_change(status, Utc::now(), self.strict_transitions)?,
            None => StatusChange {
                status: current.status,
                started_at: current.started_at,
                completed_at: current.completed_at,
            },
        };

        let task = self.repo.update(&mut *tx, company_id, task_id, &payload, &change).await?;
        tx.commit().await?;

        Ok(task)
    }

    /// Troca de status com carimbo de início/fim. A linha fica travada até o commit.
    pub async fn update_status(&self, company_id: Uuid, task_id: Uuid, status: TaskStatus) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .lock(&mut *tx, company_id, task_id)
            .await?
            .ok_or(AppError::NotFound("entity.task"))?;

        let change = current.status_change(status, Utc::now(), self.strict_transitions)?;
        let task = self.repo.update_status(&mut *tx, company_id, task_id, &change).await?;

        tx.commit().await?;

        tracing::info!(task_id = %task_id, from = current.status.as_str(), to = status.as_str(), "Status da tarefa alterado");
        Ok(task)
    }

    pub async fn delete(&self, company_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, company_id, task_id).await? {
            return Err(AppError::NotFound("entity.task"));
        }
        Ok(())
    }
}
