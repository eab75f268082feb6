// src/db/task_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tasks::{CreateTaskPayload, StatusChange, Task, TaskQuery, UpdateTaskPayload},
};

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, company_id: Uuid, filter: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT * FROM tasks
            WHERE company_id = $1
              AND ($2::task_status IS NULL OR status = $2)
              AND ($3::task_priority IS NULL OR priority = $3)
              AND ($4::uuid IS NULL OR assignee_id = $4)
            ORDER BY due_date ASC NULLS LAST, created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(filter.status)
        .bind(filter.priority)
        .bind(filter.assignee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    pub async fn find<'e, E>(&self, executor: E, company_id: Uuid, task_id: Uuid) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1 AND company_id = $2")
            .bind(task_id)
            .bind(company_id)
            .fetch_optional(executor)
            .await?;
        Ok(task)
    }

    pub async fn lock<'e, E>(&self, executor: E, company_id: Uuid, task_id: Uuid) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1 AND company_id = $2 FOR UPDATE")
            .bind(task_id)
            .bind(company_id)
            .fetch_optional(executor)
            .await?;
        Ok(task)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        creator_id: Uuid,
        payload: &CreateTaskPayload,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, company_id, title, description, priority, assignee_id, creator_id, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(&payload.title)
        .bind(payload.description.as_deref())
        .bind(payload.priority)
        .bind(payload.assignee_id)
        .bind(creator_id)
        .bind(payload.due_date)
        .fetch_one(executor)
        .await?;
        Ok(task)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        task_id: Uuid,
        payload: &UpdateTaskPayload,
        change: &StatusChange,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $3, description = $4, priority = $5, assignee_id = $6, due_date = $7,
                status = $8, started_at = $9, completed_at = $10, updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(task_id)
        .bind(company_id)
        .bind(&payload.title)
        .bind(payload.description.as_deref())
        .bind(payload.priority)
        .bind(payload.assignee_id)
        .bind(payload.due_date)
        .bind(change.status)
        .bind(change.started_at)
        .bind(change.completed_at)
        .fetch_one(executor)
        .await?;
        Ok(task)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        task_id: Uuid,
        change: &StatusChange,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $3, started_at = $4, completed_at = $5, updated_at = NOW()
            WHERE id = $1 AND company_id = $2
            RETURNING *
            "#,
        )
        .bind(task_id)
        .bind(company_id)
        .bind(change.status)
        .bind(change.started_at)
        .bind(change.completed_at)
        .fetch_one(executor)
        .await?;
        Ok(task)
    }

    pub async fn delete<'e, E>(&self, executor: E, company_id: Uuid, task_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND company_id = $2")
            .bind(task_id)
            .bind(company_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
