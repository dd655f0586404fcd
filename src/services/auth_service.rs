//! Domain service for account registration and bearer-token sessions.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid role")]
    InvalidRole,

    #[error("Token not provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Public part of an account.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub email: String,
    pub role: String,
}

impl From<crate::db::User> for UserInfo {
    fn from(user: crate::db::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

/// Outcome of register/login: a fresh bearer token and its owner.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifiedUser {
    pub success: bool,
    pub user: UserInfo,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and its first session.
    ///
    /// `role` defaults to webmaster when absent.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidRole`] for anything but advertiser or
    /// webmaster, and [`AuthError::EmailTaken`] for a duplicate email.
    async fn register(
        &self,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<AuthSession, AuthError>;

    /// Checks credentials and opens a new session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Resolves a bearer token to its owner.
    async fn verify(&self, token: &str) -> Result<VerifiedUser, AuthError>;
}
