//! `SeaORM` implementation of the `StatsService` trait.

use crate::constants::stats::TOP_LIMIT;
use crate::db::{OfferPerformance, Store};
use crate::domain::Role;
use crate::services::stats_service::{
    AdminOfferStats, AdminStats, AdvertiserOfferStats, AdvertiserStats, DailyConversions, NoStats,
    StatsError, StatsReport, StatsService, TopWebmaster, WebmasterOfferStats, WebmasterStats,
};
use async_trait::async_trait;

pub struct SeaOrmStatsService {
    store: Store,
}

impl SeaOrmStatsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn webmaster(&self, user_id: i32, since: &str) -> Result<WebmasterStats, StatsError> {
        let summary = self.store.webmaster_summary(user_id, since).await?;

        Ok(WebmasterStats {
            total_clicks: summary.total_clicks,
            total_conversions: summary.totals.conversions,
            total_earnings: summary.totals.amount,
            active_offers: summary.active_offers,
            daily_conversions: summary
                .daily_conversions
                .into_iter()
                .map(|(date, conversions)| DailyConversions { date, conversions })
                .collect(),
            top_offers: top_by_conversions(summary.offers)
                .map(|o| WebmasterOfferStats {
                    id: o.id,
                    name: o.name,
                    payout: o.payout,
                    clicks: o.clicks,
                    conversions: o.conversions,
                    earnings: o.amount,
                })
                .collect(),
        })
    }

    async fn advertiser(&self, user_id: i32, since: &str) -> Result<AdvertiserStats, StatsError> {
        let summary = self.store.advertiser_summary(user_id, since).await?;

        Ok(AdvertiserStats {
            total_clicks: summary.total_clicks,
            total_conversions: summary.totals.conversions,
            total_spent: summary.totals.amount,
            active_offers: summary.active_offers,
            offers: summary
                .offers
                .into_iter()
                .map(|o| AdvertiserOfferStats {
                    id: o.id,
                    name: o.name,
                    offer_payout: o.payout,
                    status: o.status,
                    clicks: o.clicks,
                    conversions: o.conversions,
                    spent: o.amount,
                })
                .collect(),
        })
    }

    async fn admin(&self, since: &str) -> Result<AdminStats, StatsError> {
        let summary = self.store.admin_summary(since).await?;

        let mut webmasters = summary.webmasters;
        webmasters.sort_by(|a, b| b.conversions.cmp(&a.conversions).then(a.id.cmp(&b.id)));

        Ok(AdminStats {
            total_clicks: summary.total_clicks,
            total_conversions: summary.totals.conversions,
            total_commission: summary.totals.amount,
            active_offers: summary.active_offers,
            top_webmasters: webmasters
                .into_iter()
                .take(top_limit())
                .map(|w| TopWebmaster {
                    id: w.id,
                    email: w.email,
                    conversions: w.conversions,
                    earnings: w.earnings,
                })
                .collect(),
            top_offers: top_by_conversions(summary.offers)
                .map(|o| AdminOfferStats {
                    id: o.id,
                    name: o.name,
                    payout: o.payout,
                    clicks: o.clicks,
                    conversions: o.conversions,
                    commission: o.amount,
                })
                .collect(),
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn top_limit() -> usize {
    TOP_LIMIT as usize
}

/// Highest-converting offers first; ties keep the newest-first input order.
fn top_by_conversions(mut offers: Vec<OfferPerformance>) -> impl Iterator<Item = OfferPerformance> {
    offers.sort_by(|a, b| b.conversions.cmp(&a.conversions));
    offers.into_iter().take(top_limit())
}

#[async_trait]
impl StatsService for SeaOrmStatsService {
    async fn report(
        &self,
        user_id: i32,
        role: &str,
        period_days: i64,
    ) -> Result<StatsReport, StatsError> {
        if period_days < 0 {
            return Err(StatsError::Validation(
                "period must be a non-negative number of days".to_string(),
            ));
        }
        let since = crate::db::timestamp_days_ago(period_days);

        let report = match Role::parse(role) {
            Some(Role::Webmaster) => StatsReport::Webmaster(self.webmaster(user_id, &since).await?),
            Some(Role::Advertiser) => {
                StatsReport::Advertiser(self.advertiser(user_id, &since).await?)
            }
            Some(Role::Admin) => StatsReport::Admin(self.admin(&since).await?),
            None => StatsReport::Empty(NoStats::default()),
        };

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Money;

    fn perf(id: i32, conversions: i64) -> OfferPerformance {
        OfferPerformance {
            id,
            name: format!("offer {id}"),
            payout: Money::from_minor(50_000),
            status: "active".to_string(),
            clicks: 0,
            conversions,
            amount: Money::ZERO,
        }
    }

    #[test]
    fn top_offers_sorted_and_capped() {
        let offers: Vec<_> = (1..=12).map(|id| perf(id, i64::from(id % 4))).collect();
        let top: Vec<_> = top_by_conversions(offers).collect();
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].conversions >= w[1].conversions));
        assert_eq!(top[0].conversions, 3);
    }

    #[test]
    fn unknown_role_serializes_to_empty_object() {
        let json = serde_json::to_string(&StatsReport::Empty(NoStats::default())).unwrap();
        assert_eq!(json, "{}");
    }
}
