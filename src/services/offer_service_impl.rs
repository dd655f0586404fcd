//! `SeaORM` implementation of the `OfferService` trait.

use crate::constants::offers::{DEFAULT_LIST_STATUS, MIN_PAYOUT_MINOR, PREPAYMENT_MULTIPLIER};
use crate::db::{NewOffer, Store};
use crate::domain::{Money, Role};
use crate::services::offer_service::{
    CreateOfferRequest, CreatedOffer, OfferDto, OfferError, OfferService, OfferSummaryDto,
    OfferTransition, TransitionResult,
};
use crate::services::pixel::snippet_for;
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmOfferService {
    store: Store,
    pixel_script_url: String,
}

impl SeaOrmOfferService {
    #[must_use]
    pub const fn new(store: Store, pixel_script_url: String) -> Self {
        Self {
            store,
            pixel_script_url,
        }
    }

    async fn require_offer(&self, offer_id: i32, rows_affected: u64) -> Result<(), OfferError> {
        if rows_affected == 0 && !self.store.offer_exists(offer_id).await? {
            return Err(OfferError::NotFound(offer_id));
        }
        Ok(())
    }
}

#[async_trait]
impl OfferService for SeaOrmOfferService {
    async fn create(&self, request: CreateOfferRequest) -> Result<CreatedOffer, OfferError> {
        let name = request.name.trim();
        let (Some(advertiser_id), Some(payout)) = (request.advertiser_id, request.payout) else {
            return Err(OfferError::InvalidOffer);
        };
        if name.is_empty() || payout < Money::from_minor(MIN_PAYOUT_MINOR) {
            return Err(OfferError::InvalidOffer);
        }

        if self
            .store
            .get_user_with_role(advertiser_id, Role::Advertiser)
            .await?
            .is_none()
        {
            return Err(OfferError::AdvertiserNotFound(advertiser_id));
        }

        let prepayment_amount = payout.times(PREPAYMENT_MULTIPLIER);
        let script_url = self.pixel_script_url.clone();

        let offer = self
            .store
            .create_offer(
                NewOffer {
                    advertiser_id,
                    name: name.to_string(),
                    description: request.description,
                    payout,
                    category: request.category,
                    prepayment_amount,
                },
                move |id| snippet_for(&script_url, id),
            )
            .await?;

        info!(
            offer_id = offer.id,
            advertiser_id,
            payout = %payout,
            "Offer created"
        );

        Ok(CreatedOffer {
            success: true,
            offer_id: offer.id,
            pixel_code: offer.pixel_code.unwrap_or_default(),
            prepayment_amount,
        })
    }

    async fn transition(
        &self,
        offer_id: i32,
        transition: OfferTransition,
    ) -> Result<TransitionResult, OfferError> {
        match transition {
            OfferTransition::TestLead => {
                let rows = self.store.mark_offer_test_lead(offer_id).await?;
                self.require_offer(offer_id, rows).await?;
            }
            OfferTransition::Prepayment => {
                let rows = self.store.mark_offer_prepayment(offer_id).await?;
                self.require_offer(offer_id, rows).await?;
            }
            OfferTransition::Activate => {
                let rows = self.store.activate_offer(offer_id).await?;
                if rows == 0 {
                    self.require_offer(offer_id, rows).await?;
                    return Err(OfferError::ActivationConditionsNotMet);
                }
                info!(offer_id, "Offer activated");
            }
        }

        Ok(TransitionResult {
            success: true,
            message: transition.message().to_string(),
        })
    }

    async fn get(&self, offer_id: i32) -> Result<OfferDto, OfferError> {
        let detail = self
            .store
            .get_offer_detail(offer_id)
            .await?
            .ok_or(OfferError::NotFound(offer_id))?;

        let offer = detail.offer;
        Ok(OfferDto {
            id: offer.id,
            advertiser_id: offer.advertiser_id,
            name: offer.name,
            description: offer.description,
            payout: Money::from_minor(offer.payout),
            category: offer.category,
            status: offer.status,
            prepayment_amount: Money::from_minor(offer.prepayment_amount),
            prepayment_paid: offer.prepayment_paid,
            test_lead_completed: offer.test_lead_completed,
            pixel_code: offer.pixel_code,
            created_at: offer.created_at,
            advertiser_email: detail.advertiser_email,
            total_clicks: detail.total_clicks,
            total_conversions: detail.total_conversions,
        })
    }

    async fn list(&self, status: Option<&str>) -> Result<Vec<OfferSummaryDto>, OfferError> {
        let status = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_LIST_STATUS);

        let rows = self.store.list_offers_by_status(status).await?;

        Ok(rows
            .into_iter()
            .map(|row| OfferSummaryDto {
                id: row.id,
                name: row.name,
                description: row.description,
                payout: row.payout,
                category: row.category,
                status: row.status,
                clicks: row.clicks,
                conversions: row.conversions,
            })
            .collect())
    }
}
