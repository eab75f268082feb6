// src/models/tasks.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// Tabela de transições do modo estrito. Reescrever o mesmo estado é sempre aceito.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        if self == next {
            return true;
        }
        match self {
            Pending => matches!(next, InProgress | Completed | Cancelled),
            InProgress => matches!(next, Pending | Completed | Cancelled),
            Completed | Cancelled => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    #[schema(ignore)]
    pub company_id: Uuid,
    #[schema(example = "Conferir estoque de canetas")]
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_id: Option<Uuid>,
    pub creator_id: Uuid,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resultado de aplicar um novo status: o que deve ser gravado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: TaskStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// IN_PROGRESS carimba startedAt só na primeira vez; COMPLETED sempre
    /// recarimba completedAt. Com `strict`, saltos fora da tabela são recusados.
    pub fn status_change(&self, next: TaskStatus, now: DateTime<Utc>, strict: bool) -> Result<StatusChange, AppError> {
        if strict && !self.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let started_at = match next {
            TaskStatus::InProgress => self.started_at.or(Some(now)),
            _ => self.started_at,
        };
        let completed_at = match next {
            TaskStatus::Completed => Some(now),
            _ => self.completed_at,
        };

        Ok(StatusChange { status: next, started_at, completed_at })
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub assignee_id: Option<Uuid>,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
}

// Substituição completa; `status`, se vier, passa pelas mesmas regras do /status
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub assignee_id: Option<Uuid>,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskStatusPayload {
    pub status: TaskStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task(status: TaskStatus) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            title: "Inventário".into(),
            description: None,
            status,
            priority: TaskPriority::Medium,
            assignee_id: None,
            creator_id: Uuid::new_v4(),
            due_date: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(task: &mut Task, next: TaskStatus, now: DateTime<Utc>) {
        let change = task.status_change(next, now, false).unwrap();
        task.status = change.status;
        task.started_at = change.started_at;
        task.completed_at = change.completed_at;
    }

    #[test]
    fn test_pause_cycle_keeps_first_started_at() {
        let t0 = Utc::now();
        let mut t = task(TaskStatus::Pending);

        apply(&mut t, TaskStatus::InProgress, t0);
        assert_eq!(t.started_at, Some(t0));

        apply(&mut t, TaskStatus::Pending, t0 + Duration::minutes(5));
        apply(&mut t, TaskStatus::InProgress, t0 + Duration::minutes(10));
        assert_eq!(t.started_at, Some(t0));
    }

    #[test]
    fn test_completed_restamps_every_time() {
        let t0 = Utc::now();
        let mut t = task(TaskStatus::InProgress);

        apply(&mut t, TaskStatus::Completed, t0);
        assert_eq!(t.completed_at, Some(t0));

        let later = t0 + Duration::hours(1);
        apply(&mut t, TaskStatus::Completed, later);
        assert_eq!(t.completed_at, Some(later));
    }

    #[test]
    fn test_permissive_mode_accepts_any_jump() {
        let t = task(TaskStatus::Completed);
        let change = t.status_change(TaskStatus::Pending, Utc::now(), false).unwrap();
        assert_eq!(change.status, TaskStatus::Pending);
    }

    #[test]
    fn test_strict_mode_table() {
        let done = task(TaskStatus::Completed);
        assert!(matches!(
            done.status_change(TaskStatus::Pending, Utc::now(), true),
            Err(AppError::InvalidTransition { .. })
        ));
        assert!(done.status_change(TaskStatus::Completed, Utc::now(), true).is_ok());

        let cancelled = task(TaskStatus::Cancelled);
        assert!(cancelled.status_change(TaskStatus::InProgress, Utc::now(), true).is_err());

        let running = task(TaskStatus::InProgress);
        assert!(running.status_change(TaskStatus::Pending, Utc::now(), true).is_ok());
        assert!(running.status_change(TaskStatus::Cancelled, Utc::now(), true).is_ok());

        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
    }
}
