use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::types::{AuthRequest, parse_json_body};
use super::{ApiError, AppState};
use crate::constants::cors::AUTH_TOKEN_HEADER;

/// `POST /api/auth`, dispatched on the body's `action` field.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: AuthRequest = parse_json_body(&body)?;

    let email = request.email.as_deref().unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();

    match request.action.as_deref() {
        Some("register") => {
            let session = state
                .auth_service()
                .register(email, password, request.role.as_deref())
                .await?;
            Ok(Json(session).into_response())
        }
        Some("login") => {
            let session = state.auth_service().login(email, password).await?;
            Ok(Json(session).into_response())
        }
        Some("verify") => {
            // Body token first; the header is accepted for clients that send it there.
            let token = request
                .token
                .filter(|t| !t.trim().is_empty())
                .or_else(|| {
                    headers
                        .get(AUTH_TOKEN_HEADER)
                        .and_then(|h| h.to_str().ok())
                        .map(ToString::to_string)
                })
                .unwrap_or_default();
            let verified = state.auth_service().verify(&token).await?;
            Ok(Json(verified).into_response())
        }
        _ => Err(ApiError::validation("Unknown action")),
    }
}
