use axum::{
    extract::{ConnectInfo, FromRequestParts, Query, State},
    http::{HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use super::types::PixelQuery;
use super::validation::{non_empty, parse_id};
use super::{ApiError, AppState};
use crate::constants::tracking::PIXEL_CACHE_CONTROL;
use crate::services::pixel::{PIXEL_SCRIPT, transparent_gif};
use crate::services::{HitContext, TrackingError};

/// Client address and user agent of a pixel hit.
///
/// The address is the first `X-Forwarded-For` hop, else the socket peer.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo(pub HitContext);

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string);

        let ip_address = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_default();

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(Self(HitContext {
            ip_address,
            user_agent,
        }))
    }
}

/// `GET /api/pixel?action=pixel|click|convert`.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PixelQuery>,
    ClientInfo(hit): ClientInfo,
) -> Result<Response, ApiError> {
    let action = non_empty(query.action.as_deref()).unwrap_or("pixel");

    if action == "pixel" {
        return Ok(script_response());
    }

    let ids = non_empty(query.offer_id.as_deref())
        .and_then(parse_id)
        .zip(non_empty(query.wm_id.as_deref()).and_then(parse_id));

    let outcome = match (action, ids) {
        ("click" | "convert", None) => Err(TrackingError::MissingParameters),
        ("click", Some((offer_id, wm_id))) => state
            .tracking_service()
            .record_click(
                offer_id,
                wm_id,
                query.referrer.as_deref().unwrap_or_default(),
                hit,
            )
            .await
            .map(|_| ()),
        ("convert", Some((offer_id, wm_id))) => state
            .tracking_service()
            .record_conversion(offer_id, wm_id, hit)
            .await
            .map(|_| ()),
        _ => return Err(ApiError::validation("Unknown action")),
    };

    match outcome {
        Ok(()) => gif_response(),
        Err(TrackingError::MissingParameters) => Ok(empty_gif(StatusCode::BAD_REQUEST)),
        Err(TrackingError::OfferNotActive(_) | TrackingError::WebmasterNotFound(_)) => {
            Ok(empty_gif(StatusCode::NOT_FOUND))
        }
        Err(e) => Err(e.into()),
    }
}

fn script_response() -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/javascript"),
            ),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static(PIXEL_CACHE_CONTROL),
            ),
        ],
        PIXEL_SCRIPT,
    )
        .into_response()
}

fn gif_response() -> Result<Response, ApiError> {
    let bytes = transparent_gif()?;
    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("image/gif"))],
        bytes,
    )
        .into_response())
}

/// Rejections keep the image content type so `<img>` loaders fail quietly.
fn empty_gif(status: StatusCode) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("image/gif"))],
    )
        .into_response()
}
