use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{clicks, prelude::*};

/// Click attributes captured by the tracking pixel.
#[derive(Debug, Clone, Default)]
pub struct NewClick {
    pub offer_id: i32,
    pub webmaster_id: i32,
    pub ip_address: String,
    pub user_agent: String,
    pub referrer: String,
    pub utm_source: String,
    pub utm_medium: String,
}

pub struct ClickRepository {
    conn: DatabaseConnection,
}

impl ClickRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn record(&self, click: NewClick) -> Result<clicks::Model> {
        clicks::ActiveModel {
            offer_id: Set(click.offer_id),
            webmaster_id: Set(click.webmaster_id),
            ip_address: Set(click.ip_address),
            user_agent: Set(click.user_agent),
            referrer: Set(click.referrer),
            utm_source: Set(click.utm_source),
            utm_medium: Set(click.utm_medium),
            clicked_at: Set(crate::db::now_timestamp()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert click")
    }

    /// Most recent click for the pair. Ties on timestamp go to the higher id.
    pub async fn latest_for(&self, offer_id: i32, webmaster_id: i32) -> Result<Option<clicks::Model>> {
        Clicks::find()
            .filter(clicks::Column::OfferId.eq(offer_id))
            .filter(clicks::Column::WebmasterId.eq(webmaster_id))
            .order_by_desc(clicks::Column::ClickedAt)
            .order_by_desc(clicks::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query latest click")
    }

    pub async fn count_for(&self, offer_id: i32, webmaster_id: i32) -> Result<u64> {
        Clicks::find()
            .filter(clicks::Column::OfferId.eq(offer_id))
            .filter(clicks::Column::WebmasterId.eq(webmaster_id))
            .count(&self.conn)
            .await
            .context("Failed to count clicks")
    }
}
