//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::repositories::user::{generate_token, hash_password_blocking};
use crate::db::{NewSession, Store};
use crate::domain::Role;
use crate::services::auth_service::{AuthError, AuthService, AuthSession, VerifiedUser};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn new_session(&self) -> NewSession {
        NewSession {
            token: generate_token(),
            expires_at: crate::db::timestamp_days_ahead(self.security.session_ttl_days),
        }
    }
}

fn require_credentials<'a>(email: &'a str, password: &str) -> Result<&'a str, AuthError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    Ok(email)
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sea_orm::DbErr>()
        .and_then(sea_orm::DbErr::sql_err)
        .is_some_and(|e| matches!(e, sea_orm::SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<AuthSession, AuthError> {
        let email = require_credentials(email, password)?;

        let role = match role.map(str::trim).filter(|r| !r.is_empty()) {
            None => Role::Webmaster,
            Some(value) => Role::parse(value)
                .filter(Role::is_self_registrable)
                .ok_or(AuthError::InvalidRole)?,
        };

        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password_blocking(password, &self.security).await?;
        let session = self.new_session();

        // A concurrent registration can still win the race to the unique index.
        let user = match self
            .store
            .create_user_with_session(email, password_hash, role, &session)
            .await
        {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = user.id, role = %role, "User registered");

        Ok(AuthSession {
            success: true,
            token: session.token,
            user: user.into(),
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = require_credentials(email, password)?;

        let user = self
            .store
            .verify_user_password(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let session = self.new_session();
        self.store.create_session(user.id, &session).await?;

        Ok(AuthSession {
            success: true,
            token: session.token,
            user: user.into(),
        })
    }

    async fn verify(&self, token: &str) -> Result<VerifiedUser, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let user = self
            .store
            .find_user_by_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(VerifiedUser {
            success: true,
            user: user.into(),
        })
    }
}
