//! Domain service for the offer lifecycle.
//!
//! Offers are created `pending`. An advertiser completes a test lead and pays
//! the prepayment; only then does `activate` flip the status to `active`,
//! which makes the offer trackable by the pixel.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Money;

#[derive(Debug, Error)]
pub enum OfferError {
    #[error("Invalid offer data. Minimum payout is 500")]
    InvalidOffer,

    #[error("Offer {0} not found")]
    NotFound(i32),

    #[error("Advertiser {0} not found")]
    AdvertiserNotFound(i32),

    #[error("Activation conditions not met")]
    ActivationConditionsNotMet,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for OfferError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for OfferError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Advertiser input for a new offer.
#[derive(Debug, Clone, Default)]
pub struct CreateOfferRequest {
    pub advertiser_id: Option<i32>,
    pub name: String,
    pub description: String,
    pub payout: Option<Money>,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedOffer {
    pub success: bool,
    pub offer_id: i32,
    pub pixel_code: String,
    pub prepayment_amount: Money,
}

/// Lifecycle transitions an advertiser (or the platform) can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferTransition {
    TestLead,
    Prepayment,
    Activate,
}

impl OfferTransition {
    #[must_use]
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "test_lead" => Some(Self::TestLead),
            "prepayment" => Some(Self::Prepayment),
            "activate" => Some(Self::Activate),
            _ => None,
        }
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::TestLead => "Test lead completed",
            Self::Prepayment => "Prepayment recorded",
            Self::Activate => "Offer activated",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionResult {
    pub success: bool,
    pub message: String,
}

/// Full offer record as returned by `GET /offers?id=`.
#[derive(Debug, Clone, Serialize)]
pub struct OfferDto {
    pub id: i32,
    pub advertiser_id: i32,
    pub name: String,
    pub description: String,
    pub payout: Money,
    pub category: String,
    pub status: String,
    pub prepayment_amount: Money,
    pub prepayment_paid: bool,
    pub test_lead_completed: bool,
    pub pixel_code: Option<String>,
    pub created_at: String,
    pub advertiser_email: Option<String>,
    pub total_clicks: u64,
    pub total_conversions: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferSummaryDto {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub payout: Money,
    pub category: String,
    pub status: String,
    pub clicks: i64,
    pub conversions: i64,
}

#[async_trait::async_trait]
pub trait OfferService: Send + Sync {
    /// Creates a pending offer with its pixel snippet.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::InvalidOffer`] for an empty name, a missing
    /// advertiser or a payout below the minimum.
    async fn create(&self, request: CreateOfferRequest) -> Result<CreatedOffer, OfferError>;

    /// Applies a lifecycle transition.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::NotFound`] for an unknown offer and
    /// [`OfferError::ActivationConditionsNotMet`] when activating an offer
    /// whose test lead or prepayment is outstanding.
    async fn transition(
        &self,
        offer_id: i32,
        transition: OfferTransition,
    ) -> Result<TransitionResult, OfferError>;

    async fn get(&self, offer_id: i32) -> Result<OfferDto, OfferError>;

    /// Lists offers in `status` (default active), newest first.
    async fn list(&self, status: Option<&str>) -> Result<Vec<OfferSummaryDto>, OfferError>;
}
