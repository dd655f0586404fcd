use anyhow::Result;
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::Role;
use crate::entities::offers;

pub mod migrator;
pub mod repositories;

pub use repositories::click::NewClick;
pub use repositories::conversion::NewConversion;
pub use repositories::offer::{NewOffer, OfferDetail, OfferListing};
pub use repositories::stats::{
    AdminSummary, AdvertiserSummary, ConversionTotals, OfferPerformance, WebmasterPerformance,
    WebmasterSummary,
};
pub use repositories::user::{NewSession, User};

/// Current UTC time as RFC 3339 with fixed microsecond precision, so that
/// lexicographic order of stored timestamps matches chronological order.
#[must_use]
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Timestamp `days` before now, in the same format as [`now_timestamp`].
#[must_use]
pub fn timestamp_days_ago(days: i64) -> String {
    format_timestamp(Utc::now() - ChronoDuration::days(days))
}

/// Timestamp `days` after now, in the same format as [`now_timestamp`].
#[must_use]
pub fn timestamp_days_ahead(days: i64) -> String {
    format_timestamp(Utc::now() + ChronoDuration::days(days))
}

fn format_timestamp(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path_str) = sqlite_file_path(db_url) {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    fn offer_repo(&self) -> repositories::offer::OfferRepository {
        repositories::offer::OfferRepository::new(self.conn.clone())
    }

    fn click_repo(&self) -> repositories::click::ClickRepository {
        repositories::click::ClickRepository::new(self.conn.clone())
    }

    fn conversion_repo(&self) -> repositories::conversion::ConversionRepository {
        repositories::conversion::ConversionRepository::new(self.conn.clone())
    }

    fn stats_repo(&self) -> repositories::stats::StatsRepository {
        repositories::stats::StatsRepository::new(self.conn.clone())
    }

    // Users & sessions

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_with_role(&self, id: i32, role: Role) -> Result<Option<User>> {
        self.user_repo().get_with_role(id, role).await
    }

    pub async fn create_user_with_session(
        &self,
        email: &str,
        password_hash: String,
        role: Role,
        session: &NewSession,
    ) -> Result<User> {
        self.user_repo()
            .create_with_session(email, password_hash, role, session)
            .await
    }

    pub async fn create_user(&self, email: &str, password_hash: String, role: Role) -> Result<User> {
        self.user_repo().create(email, password_hash, role).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn create_session(&self, user_id: i32, session: &NewSession) -> Result<()> {
        self.session_repo().create(user_id, session).await
    }

    pub async fn find_user_by_token(&self, token: &str) -> Result<Option<User>> {
        self.session_repo()
            .find_user_by_token(token, &now_timestamp())
            .await
    }

    // Offers

    pub async fn create_offer<F>(&self, offer: NewOffer, snippet: F) -> Result<offers::Model>
    where
        F: FnOnce(i32) -> String,
    {
        self.offer_repo().create(offer, snippet).await
    }

    pub async fn get_offer(&self, id: i32) -> Result<Option<offers::Model>> {
        self.offer_repo().get(id).await
    }

    pub async fn get_active_offer(&self, id: i32) -> Result<Option<offers::Model>> {
        self.offer_repo().get_active(id).await
    }

    pub async fn offer_exists(&self, id: i32) -> Result<bool> {
        self.offer_repo().exists(id).await
    }

    pub async fn mark_offer_test_lead(&self, id: i32) -> Result<u64> {
        self.offer_repo().mark_test_lead(id).await
    }

    pub async fn mark_offer_prepayment(&self, id: i32) -> Result<u64> {
        self.offer_repo().mark_prepayment(id).await
    }

    pub async fn activate_offer(&self, id: i32) -> Result<u64> {
        self.offer_repo().activate(id).await
    }

    pub async fn get_offer_detail(&self, id: i32) -> Result<Option<OfferDetail>> {
        self.offer_repo().get_detail(id).await
    }

    pub async fn list_offers_by_status(&self, status: &str) -> Result<Vec<OfferListing>> {
        self.offer_repo().list_by_status(status).await
    }

    // Tracking

    pub async fn record_click(&self, click: NewClick) -> Result<crate::entities::clicks::Model> {
        self.click_repo().record(click).await
    }

    pub async fn latest_click(
        &self,
        offer_id: i32,
        webmaster_id: i32,
    ) -> Result<Option<crate::entities::clicks::Model>> {
        self.click_repo().latest_for(offer_id, webmaster_id).await
    }

    pub async fn count_clicks_for(&self, offer_id: i32, webmaster_id: i32) -> Result<u64> {
        self.click_repo().count_for(offer_id, webmaster_id).await
    }

    pub async fn record_conversion(
        &self,
        conversion: NewConversion,
    ) -> Result<crate::entities::conversions::Model> {
        self.conversion_repo().record_and_credit(conversion).await
    }

    // Stats

    pub async fn webmaster_summary(&self, user_id: i32, since: &str) -> Result<WebmasterSummary> {
        self.stats_repo().webmaster_summary(user_id, since).await
    }

    pub async fn advertiser_summary(&self, user_id: i32, since: &str) -> Result<AdvertiserSummary> {
        self.stats_repo().advertiser_summary(user_id, since).await
    }

    pub async fn admin_summary(&self, since: &str) -> Result<AdminSummary> {
        self.stats_repo().admin_summary(since).await
    }
}

/// Filesystem path of a file-backed SQLite URL, or `None` for in-memory and
/// non-SQLite databases.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url.strip_prefix("sqlite:")?;
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_file_path_detection() {
        assert_eq!(sqlite_file_path("sqlite:data/app.db"), Some("data/app.db"));
        assert_eq!(
            sqlite_file_path("sqlite://data/app.db?mode=rwc"),
            Some("data/app.db")
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/cpa"), None);
    }

    #[test]
    fn timestamps_sort_chronologically() {
        let earlier = timestamp_days_ago(1);
        let now = now_timestamp();
        let later = timestamp_days_ahead(1);
        assert!(earlier < now);
        assert!(now < later);
        assert_eq!(now.len(), "2026-01-01T00:00:00.000000Z".len());
    }
}
