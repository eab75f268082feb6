// src/services/commission_service.rs

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        period::{Period, PeriodQuery},
    },
    db::{CommissionRepository, UserRepository},
    middleware::auth::AuthContext,
    models::commission::{
        average_rate, CommissionQuery, CommissionRate, CommissionRatePayload, CommissionSummary, CommissionView,
    },
};

#[derive(Clone)]
pub struct CommissionService {
    repo: CommissionRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl CommissionService {
    pub fn new(repo: CommissionRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { repo, user_repo, pool }
    }

    // Fora de OWNER/ADMIN o filtro de usuário é sempre o próprio chamador
    pub async fn list(&self, ctx: AuthContext, query: &CommissionQuery) -> Result<Vec<CommissionView>, AppError> {
        let period = Period::from_query(PeriodQuery { month: query.month, year: query.year })?;
        let user_id = if ctx.is_privileged() { query.user_id } else { Some(ctx.user_id) };

        self.repo.list(ctx.company_id, &period, user_id).await
    }

    pub async fn summary(&self, ctx: AuthContext, query: PeriodQuery) -> Result<Vec<CommissionSummary>, AppError> {
        let period = Period::from_query(query)?;

        if !ctx.is_privileged() {
            return self.repo.summary(ctx.company_id, &period, Some(ctx.user_id)).await;
        }

        let mut rows = self.repo.summary(ctx.company_id, &period, None).await?;
        for row in &mut rows {
            row.average_rate = Some(average_rate(row.total_commissions, row.total_sales));
        }
        Ok(rows)
    }

    pub async fn list_rates(&self, ctx: AuthContext) -> Result<Vec<CommissionRate>, AppError> {
        self.repo.list_rates(ctx.company_id).await
    }

    /// Grava a taxa de um usuário ou de um papel (upsert).
    pub async fn set_rate(&self, ctx: AuthContext, payload: CommissionRatePayload) -> Result<CommissionRate, AppError> {
        payload.check()?;

        let rate = match (payload.user_id, payload.role) {
            (Some(user_id), _) => {
                self.user_repo
                    .find_by_id(&self.pool, ctx.company_id, user_id)
                    .await?
                    .ok_or(AppError::ReferenceNotFound("entity.user"))?;
                self.repo
                    .upsert_user_rate(&self.pool, ctx.company_id, user_id, payload.percentage)
                    .await?
            }
            (None, Some(role)) => {
                self.repo
                    .upsert_role_rate(&self.pool, ctx.company_id, role, payload.percentage)
                    .await?
            }
            // check() já recusou
            (None, None) => return Err(AppError::InvalidBody("userId/role".into())),
        };

        tracing::info!(
            company_id = %ctx.company_id,
            user_id = ?rate.user_id,
            role = ?rate.role,
            percentage = %rate.percentage,
            "Taxa de comissão atualizada"
        );
        Ok(rate)
    }
}
