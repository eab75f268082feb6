// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, UserRepository},
    models::{
        auth::{Claims, MeResponse, RegisterUserPayload, Role, User},
        finance::CategoryType,
    },
};

// Categorias criadas junto com toda empresa nova
const DEFAULT_CATEGORIES: [(&str, CategoryType); 2] =
    [("Vendas", CategoryType::Revenue), ("Despesas Gerais", CategoryType::Expense)];

/// bcrypt é CPU-bound: roda fora do executor assíncrono.
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

/// A linha do banco decide: usuário sumido ou de outra empresa derruba o token,
/// usuário desativado recebe 403.
pub(crate) fn active_user(user: Option<User>) -> Result<User, AppError> {
    let user = user.ok_or(AppError::InvalidToken)?;
    if !user.is_active {
        return Err(AppError::InactiveUser);
    }
    Ok(user)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    finance_repo: FinanceRepository,
    jwt_secret: String,
    token_ttl_hours: i64,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        finance_repo: FinanceRepository,
        jwt_secret: String,
        token_ttl_hours: i64,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, finance_repo, jwt_secret, token_ttl_hours, pool }
    }

    /// Cria empresa + OWNER + categorias padrão numa única transação.
    pub async fn register(&self, payload: RegisterUserPayload) -> Result<String, AppError> {
        // 1. Hashing (fora da transação, não toca no banco)
        let hashed_password = hash_password(&payload.password).await?;
        let email = payload.email.trim().to_lowercase();

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let company = self
            .user_repo
            .create_company(&mut *tx, payload.company_name.trim(), payload.tax_id.as_deref(), &email)
            .await?;

        // Se falhar aqui (e-mail duplicado), a empresa acima é desfeita no drop do tx
        let owner = self
            .user_repo
            .create_user(&mut *tx, company.id, &email, &hashed_password, payload.name.trim(), Role::Owner)
            .await?;

        for (name, kind) in DEFAULT_CATEGORIES {
            self.finance_repo
                .create_category(&mut *tx, company.id, name, kind, None)
                .await?;
        }

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(company_id = %company.id, user_id = %owner.id, "Empresa registrada");

        self.create_token(&owner)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    pub async fn me(&self, company_id: Uuid, user_id: Uuid) -> Result<MeResponse, AppError> {
        let user = self
            .user_repo
            .find_by_id(&self.pool, company_id, user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let company = self
            .user_repo
            .find_company(company_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        Ok(MeResponse { user, company })
    }

    /// Valida assinatura e expiração. Qualquer falha vira InvalidToken.
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Valida o token e recarrega o usuário. Papel e status vêm do banco,
    /// então uma troca de papel vale já na próxima requisição.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;

        let user = self
            .user_repo
            .find_by_id(&self.pool, claims.company_id, claims.sub)
            .await?;

        active_user(user)
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.token_ttl_hours);

        let claims = Claims {
            sub: user.id,
            company_id: user.company_id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service(ttl_hours: i64) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/granaflux_test")
            .unwrap();
        AuthService::new(
            UserRepository::new(pool.clone()),
            FinanceRepository::new(pool.clone()),
            "segredo-de-teste".into(),
            ttl_hours,
            pool,
        )
    }

    fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            email: "caixa@padaria.com".into(),
            password_hash: String::new(),
            name: "Maria".into(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_token_round_trip_carries_company_and_role() {
        let svc = service(168);
        let u = user(Role::Cashier);

        let token = svc.create_token(&u).unwrap();
        let claims = svc.decode_token(&token).unwrap();

        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.company_id, u.company_id);
        assert_eq!(claims.role, Role::Cashier);
    }

    #[tokio::test]
    async fn test_expired_token_is_invalid() {
        // Bem além da tolerância padrão de 60s do jsonwebtoken
        let svc = service(-2);
        let token = svc.create_token(&user(Role::Owner)).unwrap();
        assert!(matches!(svc.decode_token(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_active_user_takes_role_from_row() {
        let mut row = user(Role::Admin);
        row.role = Role::Cashier;
        assert_eq!(active_user(Some(row)).unwrap().role, Role::Cashier);
    }

    #[test]
    fn test_missing_or_inactive_user_is_rejected() {
        assert!(matches!(active_user(None), Err(AppError::InvalidToken)));

        let mut inactive = user(Role::Admin);
        inactive.is_active = false;
        assert!(matches!(active_user(Some(inactive)), Err(AppError::InactiveUser)));
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_invalid() {
        let svc = service(1);
        let mut other = service(1);
        other.jwt_secret = "outro-segredo".into();

        let token = other.create_token(&user(Role::Admin)).unwrap();
        assert!(matches!(svc.decode_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(svc.decode_token("nem.um.jwt"), Err(AppError::InvalidToken)));
    }
}
