use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, OfferService, SeaOrmAuthService, SeaOrmOfferService, SeaOrmStatsService,
    SeaOrmTrackingService, StatsService, TrackingService,
};

/// Long-lived handles shared by the HTTP surface and the CLI.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub offer_service: Arc<dyn OfferService>,

    pub tracking_service: Arc<dyn TrackingService>,

    pub stats_service: Arc<dyn StatsService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let offer_service = Arc::new(SeaOrmOfferService::new(
            store.clone(),
            config.tracking.pixel_script_url.clone(),
        )) as Arc<dyn OfferService>;

        let tracking_service =
            Arc::new(SeaOrmTrackingService::new(store.clone())) as Arc<dyn TrackingService>;

        let stats_service =
            Arc::new(SeaOrmStatsService::new(store.clone())) as Arc<dyn StatsService>;

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            offer_service,
            tracking_service,
            stats_service,
        }
    }
}
