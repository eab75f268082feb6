// src/services/user_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{CreateUserPayload, Role, User},
    services::auth::hash_password,
};

/// OWNER só nasce no registro da empresa e nunca muda de mãos por aqui.
pub fn check_role_change(current: Role, requested: Role) -> Result<(), AppError> {
    if current == Role::Owner || requested == Role::Owner {
        return Err(AppError::OwnerRoleImmutable);
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(user_repo: UserRepository, pool: PgPool) -> Self {
        Self { user_repo, pool }
    }

    pub async fn list(&self, company_id: Uuid) -> Result<Vec<User>, AppError> {
        self.user_repo.list_by_company(company_id).await
    }

    pub async fn create(&self, company_id: Uuid, payload: CreateUserPayload) -> Result<User, AppError> {
        if payload.role == Role::Owner {
            return Err(AppError::OwnerRoleImmutable);
        }

        let hashed_password = hash_password(&payload.password).await?;
        let email = payload.email.trim().to_lowercase();

        let user = self
            .user_repo
            .create_user(&self.pool, company_id, &email, &hashed_password, payload.name.trim(), payload.role)
            .await?;

        tracing::info!(company_id = %company_id, user_id = %user.id, role = ?user.role, "Usuário criado");
        Ok(user)
    }

    pub async fn update_role(&self, company_id: Uuid, user_id: Uuid, role: Role) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .user_repo
            .find_by_id(&mut *tx, company_id, user_id)
            .await?
            .ok_or(AppError::NotFound("entity.user"))?;

        check_role_change(current.role, role)?;

        let updated = self
            .user_repo
            .update_role(&mut *tx, company_id, user_id, role)
            .await?
            .ok_or(AppError::NotFound("entity.user"))?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, from = ?current.role, to = ?role, "Papel alterado");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_cannot_be_granted_or_removed() {
        assert!(matches!(check_role_change(Role::Owner, Role::Admin), Err(AppError::OwnerRoleImmutable)));
        assert!(matches!(check_role_change(Role::Cashier, Role::Owner), Err(AppError::OwnerRoleImmutable)));
        assert!(check_role_change(Role::Cashier, Role::Admin).is_ok());
        assert!(check_role_change(Role::Admin, Role::User).is_ok());
    }
}
