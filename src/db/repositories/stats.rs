use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::constants::tracking::CONVERSION_STATUS_APPROVED;
use crate::domain::{Money, OfferStatus, Role};
use crate::entities::{clicks, conversions, offers, prelude::*, users};

/// Which monetary column of a conversion an aggregate sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionAmount {
    /// Webmaster share
    WebmasterPayout,
    /// Webmaster share plus platform commission (what the advertiser pays)
    Spend,
    /// Platform share
    Commission,
}

impl ConversionAmount {
    fn expr(self) -> SimpleExpr {
        let payout = Expr::col((Conversions, conversions::Column::Payout));
        let commission = Expr::col((Conversions, conversions::Column::Commission));
        match self {
            Self::WebmasterPayout => payout.into(),
            Self::Spend => payout.add(commission),
            Self::Commission => commission.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionTotals {
    pub conversions: i64,
    pub amount: Money,
}

/// Per-offer click and conversion figures.
#[derive(Debug, Clone)]
pub struct OfferPerformance {
    pub id: i32,
    pub name: String,
    pub payout: Money,
    pub status: String,
    pub clicks: i64,
    pub conversions: i64,
    pub amount: Money,
}

#[derive(Debug, Clone)]
pub struct WebmasterPerformance {
    pub id: i32,
    pub email: String,
    pub conversions: i64,
    pub earnings: Money,
}

#[derive(Debug, Clone)]
pub struct WebmasterSummary {
    pub total_clicks: u64,
    pub totals: ConversionTotals,
    pub active_offers: u64,
    /// `(YYYY-MM-DD, conversions)` ascending by date
    pub daily_conversions: Vec<(String, i64)>,
    pub offers: Vec<OfferPerformance>,
}

#[derive(Debug, Clone)]
pub struct AdvertiserSummary {
    pub total_clicks: u64,
    pub totals: ConversionTotals,
    pub active_offers: u64,
    pub offers: Vec<OfferPerformance>,
}

#[derive(Debug, Clone)]
pub struct AdminSummary {
    pub total_clicks: u64,
    pub totals: ConversionTotals,
    pub active_offers: u64,
    pub webmasters: Vec<WebmasterPerformance>,
    pub offers: Vec<OfferPerformance>,
}

/// Read-only rollups over offers, clicks and conversions.
pub struct StatsRepository {
    conn: DatabaseConnection,
}

impl StatsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn webmaster_summary(&self, user_id: i32, since: &str) -> Result<WebmasterSummary> {
        let clicks_in_window = Condition::all()
            .add(clicks::Column::WebmasterId.eq(user_id))
            .add(clicks::Column::ClickedAt.gte(since));

        let conversions_in_window = approved()
            .add(conversions::Column::WebmasterId.eq(user_id))
            .add(conversions::Column::ConvertedAt.gte(since));

        // Offer breakdown is all-time, limited to active offers the webmaster sent traffic to.
        let (total_clicks, totals, active_offers, dates, clicks_by_offer, conversions_by_offer) =
            futures::try_join!(
                count_clicks(&self.conn, clicks_in_window.clone()),
                conversion_totals(
                    &self.conn,
                    conversions_in_window.clone(),
                    ConversionAmount::WebmasterPayout,
                ),
                self.distinct_offers_clicked(clicks_in_window),
                self.conversion_dates(conversions_in_window),
                click_counts_by_offer(
                    &self.conn,
                    Condition::all().add(clicks::Column::WebmasterId.eq(user_id)),
                ),
                conversion_totals_by_offer(
                    &self.conn,
                    approved().add(conversions::Column::WebmasterId.eq(user_id)),
                    ConversionAmount::WebmasterPayout,
                ),
            )?;

        let clicked_ids: Vec<i32> = clicks_by_offer.keys().copied().collect();
        let offers = if clicked_ids.is_empty() {
            Vec::new()
        } else {
            self.load_offers(
                Condition::all()
                    .add(offers::Column::Status.eq(OfferStatus::Active.as_str()))
                    .add(offers::Column::Id.is_in(clicked_ids)),
            )
            .await?
        };

        Ok(WebmasterSummary {
            total_clicks,
            totals,
            active_offers,
            daily_conversions: group_by_day(&dates),
            offers: merge_performance(offers, &clicks_by_offer, &conversions_by_offer),
        })
    }

    pub async fn advertiser_summary(&self, user_id: i32, since: &str) -> Result<AdvertiserSummary> {
        let owned = offers::Column::AdvertiserId.eq(user_id);

        let (total_clicks, totals, active_offers, clicks_by_offer, conversions_by_offer) =
            futures::try_join!(
                count_clicks(
                    &self.conn,
                    Condition::all()
                        .add(owned.clone())
                        .add(clicks::Column::ClickedAt.gte(since)),
                ),
                conversion_totals(
                    &self.conn,
                    approved()
                        .add(owned.clone())
                        .add(conversions::Column::ConvertedAt.gte(since)),
                    ConversionAmount::Spend,
                ),
                count_offers(
                    &self.conn,
                    Condition::all()
                        .add(owned.clone())
                        .add(offers::Column::Status.eq(OfferStatus::Active.as_str())),
                ),
                click_counts_by_offer(&self.conn, Condition::all().add(owned.clone())),
                conversion_totals_by_offer(
                    &self.conn,
                    approved().add(owned.clone()),
                    ConversionAmount::Spend,
                ),
            )?;

        let offers = self.load_offers(Condition::all().add(owned)).await?;

        Ok(AdvertiserSummary {
            total_clicks,
            totals,
            active_offers,
            offers: merge_performance(offers, &clicks_by_offer, &conversions_by_offer),
        })
    }

    pub async fn admin_summary(&self, since: &str) -> Result<AdminSummary> {
        let active = offers::Column::Status.eq(OfferStatus::Active.as_str());
        let in_window = approved().add(conversions::Column::ConvertedAt.gte(since));

        let (
            total_clicks,
            totals,
            active_offers,
            webmasters,
            clicks_by_offer,
            conversions_by_offer,
            offers,
        ) =
            futures::try_join!(
                count_clicks(
                    &self.conn,
                    Condition::all().add(clicks::Column::ClickedAt.gte(since)),
                ),
                conversion_totals(&self.conn, in_window.clone(), ConversionAmount::Commission),
                count_offers(&self.conn, Condition::all().add(active.clone())),
                self.webmaster_performance(in_window),
                click_counts_by_offer(&self.conn, Condition::all().add(active.clone())),
                conversion_totals_by_offer(
                    &self.conn,
                    approved().add(active.clone()),
                    ConversionAmount::Commission,
                ),
                self.load_offers(Condition::all().add(active)),
            )?;

        Ok(AdminSummary {
            total_clicks,
            totals,
            active_offers,
            webmasters,
            offers: merge_performance(offers, &clicks_by_offer, &conversions_by_offer),
        })
    }

    async fn distinct_offers_clicked(&self, condition: Condition) -> Result<u64> {
        Clicks::find()
            .select_only()
            .column(clicks::Column::OfferId)
            .distinct()
            .filter(condition)
            .count(&self.conn)
            .await
            .context("Failed to count distinct clicked offers")
    }

    async fn conversion_dates(&self, condition: Condition) -> Result<Vec<String>> {
        Conversions::find()
            .select_only()
            .column(conversions::Column::ConvertedAt)
            .filter(condition)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load conversion dates")
    }

    async fn load_offers(&self, condition: Condition) -> Result<Vec<offers::Model>> {
        Offers::find()
            .filter(condition)
            .order_by_desc(offers::Column::CreatedAt)
            .order_by_desc(offers::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to load offers for stats")
    }

    /// Conversion totals grouped by webmaster, joined with webmaster accounts.
    async fn webmaster_performance(
        &self,
        condition: Condition,
    ) -> Result<Vec<WebmasterPerformance>> {
        let rows: Vec<(i32, i64, i64)> = Conversions::find()
            .select_only()
            .column(conversions::Column::WebmasterId)
            .column_as(
                Expr::col((Conversions, conversions::Column::Id)).count(),
                "conversions",
            )
            .column_as(
                sum_of(ConversionAmount::WebmasterPayout.expr()),
                "amount",
            )
            .filter(condition)
            .group_by(conversions::Column::WebmasterId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to aggregate conversions by webmaster")?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let accounts: HashMap<i32, String> = Users::find()
            .filter(users::Column::Id.is_in(rows.iter().map(|(id, _, _)| *id)))
            .filter(users::Column::Role.eq(Role::Webmaster.as_str()))
            .all(&self.conn)
            .await
            .context("Failed to load webmaster accounts")?
            .into_iter()
            .map(|u| (u.id, u.email))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|(id, conversions, amount)| {
                accounts.get(&id).map(|email| WebmasterPerformance {
                    id,
                    email: email.clone(),
                    conversions,
                    earnings: Money::from_minor(amount),
                })
            })
            .collect())
    }
}

fn approved() -> Condition {
    Condition::all().add(conversions::Column::Status.eq(CONVERSION_STATUS_APPROVED))
}

/// `CAST(COALESCE(SUM(expr), 0) AS BIGINT)`; the cast keeps Postgres from
/// returning NUMERIC for sums of BIGINT columns.
fn sum_of(amount: SimpleExpr) -> SimpleExpr {
    Func::cast_as(
        Func::coalesce([SimpleExpr::from(Func::sum(amount)), Expr::val(0i64).into()]),
        Alias::new("BIGINT"),
    )
    .into()
}

/// Clicks matching `condition`; offer columns may be referenced.
pub(crate) async fn count_clicks<C: ConnectionTrait>(conn: &C, condition: Condition) -> Result<u64> {
    Clicks::find()
        .inner_join(Offers)
        .filter(condition)
        .count(conn)
        .await
        .context("Failed to count clicks")
}

pub(crate) async fn count_offers<C: ConnectionTrait>(conn: &C, condition: Condition) -> Result<u64> {
    Offers::find()
        .filter(condition)
        .count(conn)
        .await
        .context("Failed to count offers")
}

/// Conversion count and summed amount; offer columns may be referenced.
pub(crate) async fn conversion_totals<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
    amount: ConversionAmount,
) -> Result<ConversionTotals> {
    let row: Option<(i64, i64)> = Conversions::find()
        .select_only()
        .column_as(
            Expr::col((Conversions, conversions::Column::Id)).count(),
            "conversions",
        )
        .column_as(sum_of(amount.expr()), "amount")
        .inner_join(Offers)
        .filter(condition)
        .into_tuple()
        .one(conn)
        .await
        .context("Failed to aggregate conversions")?;

    Ok(row
        .map(|(conversions, amount)| ConversionTotals {
            conversions,
            amount: Money::from_minor(amount),
        })
        .unwrap_or_default())
}

/// Click counts keyed by offer id; offer columns may be referenced.
pub(crate) async fn click_counts_by_offer<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
) -> Result<HashMap<i32, i64>> {
    let rows: Vec<(i32, i64)> = Clicks::find()
        .select_only()
        .column(clicks::Column::OfferId)
        .column_as(Expr::col((Clicks, clicks::Column::Id)).count(), "clicks")
        .inner_join(Offers)
        .filter(condition)
        .group_by(clicks::Column::OfferId)
        .into_tuple()
        .all(conn)
        .await
        .context("Failed to count clicks by offer")?;

    Ok(rows.into_iter().collect())
}

/// Conversion totals keyed by offer id; offer columns may be referenced.
pub(crate) async fn conversion_totals_by_offer<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
    amount: ConversionAmount,
) -> Result<HashMap<i32, ConversionTotals>> {
    let rows: Vec<(i32, i64, i64)> = Conversions::find()
        .select_only()
        .column(conversions::Column::OfferId)
        .column_as(
            Expr::col((Conversions, conversions::Column::Id)).count(),
            "conversions",
        )
        .column_as(sum_of(amount.expr()), "amount")
        .inner_join(Offers)
        .filter(condition)
        .group_by(conversions::Column::OfferId)
        .into_tuple()
        .all(conn)
        .await
        .context("Failed to aggregate conversions by offer")?;

    Ok(rows
        .into_iter()
        .map(|(offer_id, conversions, amount)| {
            (
                offer_id,
                ConversionTotals {
                    conversions,
                    amount: Money::from_minor(amount),
                },
            )
        })
        .collect())
}

fn merge_performance(
    offers: Vec<offers::Model>,
    clicks: &HashMap<i32, i64>,
    conversions: &HashMap<i32, ConversionTotals>,
) -> Vec<OfferPerformance> {
    offers
        .into_iter()
        .map(|offer| {
            let totals = conversions.get(&offer.id).copied().unwrap_or_default();
            OfferPerformance {
                id: offer.id,
                clicks: clicks.get(&offer.id).copied().unwrap_or(0),
                conversions: totals.conversions,
                amount: totals.amount,
                name: offer.name,
                payout: Money::from_minor(offer.payout),
                status: offer.status,
            }
        })
        .collect()
}

/// Buckets RFC 3339 timestamps by their calendar date.
fn group_by_day(timestamps: &[String]) -> Vec<(String, i64)> {
    let mut days: BTreeMap<String, i64> = BTreeMap::new();
    for ts in timestamps {
        let day = ts.get(..10).unwrap_or(ts.as_str()).to_string();
        *days.entry(day).or_insert(0) += 1;
    }
    days.into_iter().collect()
}
