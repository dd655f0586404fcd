use axum::{
    Router,
    http::{HeaderName, Method, header},
    middleware,
    routing::{MethodRouter, get},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::constants::cors::{AUTH_TOKEN_HEADER, MAX_AGE_SECS};
use crate::services::{AuthService, OfferService, StatsService, TrackingService};
use crate::state::SharedState;

pub mod auth;
mod error;
pub mod observability;
pub mod offers;
pub mod pixel;
pub mod stats;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn offer_service(&self) -> &Arc<dyn OfferService> {
        &self.shared.offer_service
    }

    #[must_use]
    pub fn tracking_service(&self) -> &Arc<dyn TrackingService> {
        &self.shared.tracking_service
    }

    #[must_use]
    pub fn stats_service(&self) -> &Arc<dyn StatsService> {
        &self.shared.stats_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route(
            "/auth",
            endpoint(&[Method::POST], axum::routing::post(auth::handle)),
        )
        .route(
            "/offers",
            endpoint(
                &[Method::GET, Method::POST, Method::PUT],
                get(offers::get_offers)
                    .post(offers::create_offer)
                    .put(offers::update_offer),
            ),
        )
        .route("/pixel", endpoint(&[Method::GET], get(pixel::handle)))
        .route("/stats", endpoint(&[Method::GET], get(stats::get_stats)))
        .route(
            "/metrics",
            endpoint(&[Method::GET], get(observability::get_metrics)),
        )
        .route(
            "/health",
            endpoint(&[Method::GET], get(observability::get_health)),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error::redact_internal_errors,
        ))
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

/// Wraps a route with its CORS policy and a JSON 405 for other methods.
/// `OPTIONS` is answered by the CORS layer with the route's own method list.
fn endpoint(
    methods: &[Method],
    route: MethodRouter<Arc<AppState>>,
) -> MethodRouter<Arc<AppState>> {
    let mut allowed = methods.to_vec();
    allowed.push(Method::OPTIONS);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(allowed)
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(AUTH_TOKEN_HEADER),
        ])
        .max_age(Duration::from_secs(MAX_AGE_SECS));

    route.fallback(method_not_allowed).layer(cors)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
