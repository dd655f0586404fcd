//! Domain service for per-role dashboards.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Money;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for StatsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for StatsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyConversions {
    pub date: String,
    pub conversions: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebmasterOfferStats {
    pub id: i32,
    pub name: String,
    pub payout: Money,
    pub clicks: i64,
    pub conversions: i64,
    pub earnings: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebmasterStats {
    pub total_clicks: u64,
    pub total_conversions: i64,
    pub total_earnings: Money,
    pub active_offers: u64,
    pub daily_conversions: Vec<DailyConversions>,
    pub top_offers: Vec<WebmasterOfferStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvertiserOfferStats {
    pub id: i32,
    pub name: String,
    pub offer_payout: Money,
    pub status: String,
    pub clicks: i64,
    pub conversions: i64,
    pub spent: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvertiserStats {
    pub total_clicks: u64,
    pub total_conversions: i64,
    pub total_spent: Money,
    pub active_offers: u64,
    pub offers: Vec<AdvertiserOfferStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopWebmaster {
    pub id: i32,
    pub email: String,
    pub conversions: i64,
    pub earnings: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOfferStats {
    pub id: i32,
    pub name: String,
    pub payout: Money,
    pub clicks: i64,
    pub conversions: i64,
    pub commission: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub total_clicks: u64,
    pub total_conversions: i64,
    pub total_commission: Money,
    pub active_offers: u64,
    pub top_webmasters: Vec<TopWebmaster>,
    pub top_offers: Vec<AdminOfferStats>,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoStats {}

/// Dashboard payload; the shape depends on the requested role.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StatsReport {
    Webmaster(WebmasterStats),
    Advertiser(AdvertiserStats),
    Admin(AdminStats),
    Empty(NoStats),
}

#[async_trait::async_trait]
pub trait StatsService: Send + Sync {
    /// Builds the dashboard for `role` over the last `period_days` days.
    /// Unknown roles produce [`StatsReport::Empty`].
    async fn report(
        &self,
        user_id: i32,
        role: &str,
        period_days: i64,
    ) -> Result<StatsReport, StatsError>;
}
