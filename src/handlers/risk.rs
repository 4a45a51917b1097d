// src/handlers/risk.rs
use std::sync::Arc;

use log::{info, warn};
use serde_json::json;
use warp::http::StatusCode;
use warp::reply::{with_status, Json, WithStatus};
use warp::Rejection;

use super::error::ApiError;
use crate::models::RiskAnalysis;
use crate::services::details::{decode_symbol, get_risk_analysis, DetailsError};
use crate::services::AppState;

fn risk_reply(analysis: &RiskAnalysis, status: StatusCode) -> WithStatus<Json> {
    with_status(warp::reply::json(&json!({ "risk_analysis": analysis })), status)
}

/// Unlike the other endpoints, failures here still carry an N/A-filled
/// `risk_analysis` object so the risk card can render its placeholder.
pub async fn analyze_risk(symbol: String, state: Arc<AppState>) -> Result<WithStatus<Json>, Rejection> {
    let symbol = decode_symbol(&symbol).map_err(|e| warp::reject::custom(ApiError::from(e)))?;
    info!("Handling risk analysis request for {}", symbol);

    match get_risk_analysis(&state, &symbol).await {
        Ok(analysis) if analysis.is_available() => Ok(risk_reply(&analysis, StatusCode::OK)),
        Ok(analysis) => {
            warn!("Risk analysis unavailable for {}: {:?}", symbol, analysis.error);
            Ok(risk_reply(&analysis, StatusCode::BAD_REQUEST))
        }
        Err(e @ DetailsError::InvalidSymbol(_)) => Err(warp::reject::custom(ApiError::from(e))),
        Err(e) => Ok(risk_reply(
            &RiskAnalysis::unavailable(e.to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        )),
    }
}
