use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::stats::{ConversionAmount, click_counts_by_offer, conversion_totals_by_offer};
use crate::domain::{Money, OfferStatus};
use crate::entities::{clicks, conversions, offers, prelude::*};

/// Offer fields supplied by the advertiser.
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub advertiser_id: i32,
    pub name: String,
    pub description: String,
    pub payout: Money,
    pub category: String,
    pub prepayment_amount: Money,
}

/// Offer together with its owner's email and lifetime traffic counts.
#[derive(Debug, Clone)]
pub struct OfferDetail {
    pub offer: offers::Model,
    pub advertiser_email: Option<String>,
    pub total_clicks: u64,
    pub total_conversions: u64,
}

/// Row of the public offer catalogue.
#[derive(Debug, Clone)]
pub struct OfferListing {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub payout: Money,
    pub category: String,
    pub status: String,
    pub clicks: i64,
    pub conversions: i64,
}

pub struct OfferRepository {
    conn: DatabaseConnection,
}

impl OfferRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a pending offer and store the pixel snippet built from its new id.
    /// Both writes share one transaction so an offer never exists without a snippet.
    pub async fn create<F>(&self, offer: NewOffer, snippet: F) -> Result<offers::Model>
    where
        F: FnOnce(i32) -> String,
    {
        let txn = self.conn.begin().await?;

        let inserted = offers::ActiveModel {
            advertiser_id: Set(offer.advertiser_id),
            name: Set(offer.name),
            description: Set(offer.description),
            payout: Set(offer.payout.minor()),
            category: Set(offer.category),
            status: Set(OfferStatus::Pending.as_str().to_string()),
            prepayment_amount: Set(offer.prepayment_amount.minor()),
            prepayment_paid: Set(false),
            test_lead_completed: Set(false),
            pixel_code: Set(None),
            created_at: Set(crate::db::now_timestamp()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert offer")?;

        let code = snippet(inserted.id);
        let mut active: offers::ActiveModel = inserted.into();
        active.pixel_code = Set(Some(code));
        let offer = active
            .update(&txn)
            .await
            .context("Failed to store pixel code")?;

        txn.commit().await?;

        Ok(offer)
    }

    pub async fn get(&self, id: i32) -> Result<Option<offers::Model>> {
        Offers::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query offer")
    }

    pub async fn get_active(&self, id: i32) -> Result<Option<offers::Model>> {
        Offers::find_by_id(id)
            .filter(offers::Column::Status.eq(OfferStatus::Active.as_str()))
            .one(&self.conn)
            .await
            .context("Failed to query active offer")
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        let count = Offers::find_by_id(id)
            .count(&self.conn)
            .await
            .context("Failed to check offer existence")?;
        Ok(count > 0)
    }

    /// Returns the number of rows touched (0 when the offer is unknown).
    pub async fn mark_test_lead(&self, id: i32) -> Result<u64> {
        let result = Offers::update_many()
            .col_expr(offers::Column::TestLeadCompleted, Expr::value(true))
            .filter(offers::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to mark test lead")?;
        Ok(result.rows_affected)
    }

    /// Returns the number of rows touched (0 when the offer is unknown).
    pub async fn mark_prepayment(&self, id: i32) -> Result<u64> {
        let result = Offers::update_many()
            .col_expr(offers::Column::PrepaymentPaid, Expr::value(true))
            .filter(offers::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to mark prepayment")?;
        Ok(result.rows_affected)
    }

    /// Flip the offer to active in a single conditional statement.
    /// Returns 1 only when both the test lead and the prepayment are done.
    pub async fn activate(&self, id: i32) -> Result<u64> {
        let result = Offers::update_many()
            .col_expr(
                offers::Column::Status,
                Expr::value(OfferStatus::Active.as_str()),
            )
            .filter(offers::Column::Id.eq(id))
            .filter(offers::Column::TestLeadCompleted.eq(true))
            .filter(offers::Column::PrepaymentPaid.eq(true))
            .exec(&self.conn)
            .await
            .context("Failed to activate offer")?;
        Ok(result.rows_affected)
    }

    pub async fn get_detail(&self, id: i32) -> Result<Option<OfferDetail>> {
        let row = Offers::find_by_id(id)
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query offer detail")?;

        let Some((offer, advertiser)) = row else {
            return Ok(None);
        };

        let total_clicks = Clicks::find()
            .filter(clicks::Column::OfferId.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to count offer clicks")?;

        let total_conversions = Conversions::find()
            .filter(conversions::Column::OfferId.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to count offer conversions")?;

        Ok(Some(OfferDetail {
            offer,
            advertiser_email: advertiser.map(|u| u.email),
            total_clicks,
            total_conversions,
        }))
    }

    /// Offers in `status`, newest first, with lifetime click and conversion counts.
    pub async fn list_by_status(&self, status: &str) -> Result<Vec<OfferListing>> {
        let rows = Offers::find()
            .filter(offers::Column::Status.eq(status))
            .order_by_desc(offers::Column::CreatedAt)
            .order_by_desc(offers::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list offers")?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let in_status = Condition::all().add(offers::Column::Status.eq(status));
        let clicks = click_counts_by_offer(&self.conn, in_status.clone()).await?;
        let conversions =
            conversion_totals_by_offer(&self.conn, in_status, ConversionAmount::WebmasterPayout)
                .await?;

        Ok(rows
            .into_iter()
            .map(|offer| OfferListing {
                clicks: clicks.get(&offer.id).copied().unwrap_or(0),
                conversions: conversions
                    .get(&offer.id)
                    .map_or(0, |totals| totals.conversions),
                id: offer.id,
                name: offer.name,
                description: offer.description,
                payout: Money::from_minor(offer.payout),
                category: offer.category,
                status: offer.status,
            })
            .collect())
    }
}
