//! `SeaORM` implementation of the `TrackingService` trait.

use crate::constants::tracking::{COMMISSION_PERCENT, UTM_MEDIUM, UTM_SOURCE};
use crate::db::{NewClick, NewConversion, Store};
use crate::domain::{Money, Role};
use crate::services::tracking_service::{
    HitContext, RecordedClick, RecordedConversion, TrackingError, TrackingService,
};
use async_trait::async_trait;
use tracing::{debug, info};

pub struct SeaOrmTrackingService {
    store: Store,
}

impl SeaOrmTrackingService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TrackingService for SeaOrmTrackingService {
    async fn record_click(
        &self,
        offer_id: i32,
        webmaster_id: i32,
        referrer: &str,
        hit: HitContext,
    ) -> Result<RecordedClick, TrackingError> {
        if self.store.get_active_offer(offer_id).await?.is_none() {
            debug!(offer_id, "Click for inactive or unknown offer");
            return Err(TrackingError::OfferNotActive(offer_id));
        }

        if self
            .store
            .get_user_with_role(webmaster_id, Role::Webmaster)
            .await?
            .is_none()
        {
            debug!(webmaster_id, "Click for unknown webmaster");
            return Err(TrackingError::WebmasterNotFound(webmaster_id));
        }

        let click = self
            .store
            .record_click(NewClick {
                offer_id,
                webmaster_id,
                ip_address: hit.ip_address,
                user_agent: hit.user_agent,
                referrer: referrer.to_string(),
                utm_source: UTM_SOURCE.to_string(),
                utm_medium: UTM_MEDIUM.to_string(),
            })
            .await?;

        metrics::counter!("cpatrack_clicks_total").increment(1);
        info!(click_id = click.id, offer_id, webmaster_id, "Click recorded");

        Ok(RecordedClick { click_id: click.id })
    }

    async fn record_conversion(
        &self,
        offer_id: i32,
        webmaster_id: i32,
        hit: HitContext,
    ) -> Result<RecordedConversion, TrackingError> {
        // Reads happen before the write transaction so it only ever takes
        // write locks.
        let offer = self
            .store
            .get_active_offer(offer_id)
            .await?
            .ok_or(TrackingError::OfferNotActive(offer_id))?;

        let click_id = self
            .store
            .latest_click(offer_id, webmaster_id)
            .await?
            .map(|click| click.id);

        let split = Money::from_minor(offer.payout).split(COMMISSION_PERCENT);

        let conversion = self
            .store
            .record_conversion(NewConversion {
                offer_id,
                webmaster_id,
                click_id,
                split,
                ip_address: hit.ip_address,
            })
            .await?;

        metrics::counter!("cpatrack_conversions_total").increment(1);
        metrics::counter!("cpatrack_commission_minor_total")
            .increment(split.commission.minor().unsigned_abs());
        info!(
            conversion_id = conversion.id,
            offer_id,
            webmaster_id,
            click_id = ?click_id,
            webmaster_payout = %split.webmaster,
            commission = %split.commission,
            "Conversion credited"
        );

        Ok(RecordedConversion {
            conversion_id: conversion.id,
            click_id,
            split,
        })
    }
}
