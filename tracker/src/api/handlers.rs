use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::api::ApiState;
use crate::api::responses::{ErrorResponse, PriceResponse, SummaryResponse};
use crate::price::model::parse_day_key;

/// Error side of every handler; rendered as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(d) => (StatusCode::NOT_FOUND, d),
            ApiError::BadRequest(d) => (StatusCode::BAD_REQUEST, d),
            ApiError::Internal(d) => (StatusCode::INTERNAL_SERVER_ERROR, d),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

fn internal(context: &str, e: anyhow::Error) -> ApiError {
    error!(error = %format!("{e:#}"), "{context}");
    ApiError::Internal(format!("{context}: {e}"))
}

/// Latest ingested price.
///
/// # Errors
/// `404` when no price has been recorded yet, `500` on store failure.
pub async fn get_latest_price(
    State(state): State<ApiState>,
) -> Result<Json<PriceResponse>, ApiError> {
    let latest = state
        .prices
        .latest()
        .await
        .map_err(|e| internal("Error fetching latest price", e))?;

    latest
        .map(|s| Json(s.into()))
        .ok_or_else(|| ApiError::NotFound("No prices found".into()))
}

/// Summary for one `YYYY-MM-DD` day; a zero-valued body when none exists.
///
/// # Errors
/// `400` for a malformed date, `500` on store failure.
pub async fn get_summary_by_day(
    State(state): State<ApiState>,
    Path(date): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let day = parse_day_key(&date)
        .map_err(|e| ApiError::BadRequest(format!("Invalid date {date:?}: {e}")))?;

    let summary = state
        .summaries
        .get(day)
        .await
        .map_err(|e| internal("Error fetching summary", e))?;

    Ok(Json(match summary {
        Some(s) => s.into(),
        None => SummaryResponse::placeholder(day),
    }))
}

/// Every stored daily summary, oldest first.
///
/// # Errors
/// `404` when there are none, `500` on store failure.
pub async fn get_all_summaries(
    State(state): State<ApiState>,
) -> Result<Json<Vec<SummaryResponse>>, ApiError> {
    let summaries = state
        .summaries
        .list_all()
        .await
        .map_err(|e| internal("Error fetching summaries", e))?;

    if summaries.is_empty() {
        return Err(ApiError::NotFound("No summaries found!".into()));
    }

    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}
