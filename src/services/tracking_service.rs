//! Domain service for click and conversion attribution.

use thiserror::Error;

use crate::domain::PayoutSplit;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("offer_id and wm_id are required")]
    MissingParameters,

    #[error("Offer {0} is not active")]
    OfferNotActive(i32),

    #[error("Webmaster {0} not found")]
    WebmasterNotFound(i32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for TrackingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TrackingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Request metadata captured with a hit.
#[derive(Debug, Clone, Default)]
pub struct HitContext {
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedClick {
    pub click_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedConversion {
    pub conversion_id: i32,
    pub click_id: Option<i32>,
    pub split: PayoutSplit,
}

#[async_trait::async_trait]
pub trait TrackingService: Send + Sync {
    /// Records a click of a tagged visitor.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::OfferNotActive`] unless the offer exists and
    /// is active, and [`TrackingError::WebmasterNotFound`] unless `webmaster_id`
    /// is a webmaster account.
    async fn record_click(
        &self,
        offer_id: i32,
        webmaster_id: i32,
        referrer: &str,
        hit: HitContext,
    ) -> Result<RecordedClick, TrackingError>;

    /// Records an approved conversion, attributes it to the latest click of
    /// the pair and credits the webmaster share.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::OfferNotActive`] unless the offer is active.
    async fn record_conversion(
        &self,
        offer_id: i32,
        webmaster_id: i32,
        hit: HitContext,
    ) -> Result<RecordedConversion, TrackingError>;
}
