use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::user::{NewSession, User};
use crate::entities::{prelude::*, sessions};

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: i32, session: &NewSession) -> Result<()> {
        sessions::ActiveModel {
            user_id: Set(user_id),
            token: Set(session.token.clone()),
            expires_at: Set(session.expires_at.clone()),
            created_at: Set(crate::db::now_timestamp()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert session")?;

        Ok(())
    }

    /// Resolve a token to its owner if the session has not expired.
    /// Sessions are left in place; expired rows simply stop matching.
    pub async fn find_user_by_token(&self, token: &str, now: &str) -> Result<Option<User>> {
        let row = Sessions::find()
            .filter(sessions::Column::Token.eq(token))
            .filter(sessions::Column::ExpiresAt.gt(now))
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query session by token")?;

        Ok(row.and_then(|(_, user)| user.map(User::from)))
    }
}
