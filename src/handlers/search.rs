// src/handlers/search.rs
use std::collections::HashMap;
use std::sync::Arc;

use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::AppState;

pub async fn search_stocks(params: HashMap<String, String>, state: Arc<AppState>) -> Result<Json, Rejection> {
    let query = params.get("name").map(|q| q.trim()).unwrap_or_default();
    if query.is_empty() {
        return Err(warp::reject::custom(ApiError::bad_request(
            "Please provide a valid stock name or symbol",
        )));
    }

    info!("Handling stock search for '{}'", query);
    match state.fmp.search(query).await {
        Ok(results) => Ok(warp::reply::json(&results)),
        Err(e) => {
            error!("Stock search for '{}' failed: {}", query, e);
            Err(warp::reject::custom(ApiError::internal(e.to_string())))
        }
    }
}
