use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::types::{CreateOfferBody, OffersQuery, UpdateOfferBody, parse_json_body};
use super::validation::{non_empty, validate_offer_id};
use super::{ApiError, AppState};
use crate::constants::offers::MIN_PAYOUT_MINOR;
use crate::domain::Money;
use crate::services::{CreateOfferRequest, OfferError, OfferTransition};

/// `GET /api/offers?id=` returns one offer; without `id` lists offers by status.
pub async fn get_offers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OffersQuery>,
) -> Result<Response, ApiError> {
    if let Some(id) = non_empty(query.id.as_deref()) {
        let offer_id = validate_offer_id(id)?;
        let offer = state.offer_service().get(offer_id).await?;
        return Ok(Json(offer).into_response());
    }

    let offers = state
        .offer_service()
        .list(query.status.as_deref())
        .await?;
    Ok(Json(offers).into_response())
}

pub async fn create_offer(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body: CreateOfferBody = parse_json_body(&body)?;

    // Compared before rounding so 499.996 does not become 500.00.
    let payout = match body.payout {
        Some(value) if value < Money::from_minor(MIN_PAYOUT_MINOR).as_major() => {
            return Err(OfferError::InvalidOffer.into());
        }
        Some(value) => Some(Money::from_major(value).ok_or(OfferError::InvalidOffer)?),
        None => None,
    };

    let created = state
        .offer_service()
        .create(CreateOfferRequest {
            advertiser_id: body.advertiser_id,
            name: body.name.unwrap_or_default(),
            description: body.description.unwrap_or_default(),
            payout,
            category: body.category.unwrap_or_default(),
        })
        .await?;

    Ok(Json(created).into_response())
}

/// `PUT /api/offers {offer_id, action}` applies a lifecycle transition.
pub async fn update_offer(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let body: UpdateOfferBody = parse_json_body(&body)?;

    let offer_id = body
        .offer_id
        .ok_or_else(|| ApiError::validation("offer_id is required"))?;

    let transition = body
        .action
        .as_deref()
        .and_then(OfferTransition::parse)
        .ok_or_else(|| ApiError::validation("Unknown action"))?;

    let result = state
        .offer_service()
        .transition(offer_id, transition)
        .await?;

    Ok(Json(result).into_response())
}
