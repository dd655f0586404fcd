use anyhow::{Context, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::constants::tracking::CONVERSION_STATUS_APPROVED;
use crate::domain::PayoutSplit;
use crate::entities::{conversions, prelude::*, users};

#[derive(Debug, Clone)]
pub struct NewConversion {
    pub offer_id: i32,
    pub webmaster_id: i32,
    pub click_id: Option<i32>,
    pub split: PayoutSplit,
    pub ip_address: String,
}

pub struct ConversionRepository {
    conn: DatabaseConnection,
}

impl ConversionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert an approved conversion and credit the webmaster share to the
    /// webmaster's balance. Either both writes land or neither does.
    ///
    /// The credit is computed by the database (`balance = balance + x`) so
    /// concurrent conversions for the same webmaster never lose an update.
    /// An unknown webmaster id still gets the conversion row; the credit then
    /// matches no account.
    pub async fn record_and_credit(&self, conversion: NewConversion) -> Result<conversions::Model> {
        let txn = self.conn.begin().await?;

        let inserted = conversions::ActiveModel {
            offer_id: Set(conversion.offer_id),
            webmaster_id: Set(conversion.webmaster_id),
            click_id: Set(conversion.click_id),
            payout: Set(conversion.split.webmaster.minor()),
            commission: Set(conversion.split.commission.minor()),
            ip_address: Set(conversion.ip_address),
            status: Set(CONVERSION_STATUS_APPROVED.to_string()),
            converted_at: Set(crate::db::now_timestamp()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert conversion")?;

        Users::update_many()
            .col_expr(
                users::Column::Balance,
                Expr::col(users::Column::Balance).add(conversion.split.webmaster.minor()),
            )
            .filter(users::Column::Id.eq(conversion.webmaster_id))
            .exec(&txn)
            .await
            .context("Failed to credit webmaster balance")?;

        txn.commit().await?;

        Ok(inserted)
    }
}
