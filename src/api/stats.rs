use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::types::StatsQuery;
use super::validation::{non_empty, validate_period, validate_user_id};
use super::{ApiError, AppState};

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Result<Response, ApiError> {
    let user_id = validate_user_id(query.user_id.as_deref())?;
    let role = non_empty(query.role.as_deref()).unwrap_or("webmaster");
    let period = validate_period(query.period.as_deref())?;

    let report = state
        .stats_service()
        .report(user_id, role, period)
        .await?;

    Ok(Json(report).into_response())
}
