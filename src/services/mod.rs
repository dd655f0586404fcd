pub mod pixel;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, AuthSession, UserInfo, VerifiedUser};
pub use auth_service_impl::SeaOrmAuthService;

pub mod offer_service;
pub mod offer_service_impl;
pub use offer_service::{
    CreateOfferRequest, CreatedOffer, OfferDto, OfferError, OfferService, OfferSummaryDto,
    OfferTransition, TransitionResult,
};
pub use offer_service_impl::SeaOrmOfferService;

pub mod tracking_service;
pub mod tracking_service_impl;
pub use tracking_service::{HitContext, TrackingError, TrackingService};
pub use tracking_service_impl::SeaOrmTrackingService;

pub mod stats_service;
pub mod stats_service_impl;
pub use stats_service::{StatsError, StatsReport, StatsService};
pub use stats_service_impl::SeaOrmStatsService;
