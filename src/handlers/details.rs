// src/handlers/details.rs
use std::sync::Arc;

use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::details::{decode_symbol, get_stock_details, DetailsError};
use crate::services::AppState;

impl From<DetailsError> for ApiError {
    fn from(err: DetailsError) -> Self {
        match err {
            DetailsError::InvalidSymbol(_) => ApiError::bad_request(err.to_string()),
            DetailsError::NotFound(_) => ApiError::not_found(err.to_string()),
            DetailsError::Upstream(_) => ApiError::internal(err.to_string()),
        }
    }
}

pub async fn get_details(symbol: String, state: Arc<AppState>) -> Result<Json, Rejection> {
    let symbol = decode_symbol(&symbol).map_err(|e| warp::reject::custom(ApiError::from(e)))?;
    info!("Handling request for stock details of {}", symbol);

    match get_stock_details(&state, &symbol).await {
        Ok(details) => Ok(warp::reply::json(&details)),
        Err(e) => {
            error!("Failed to assemble details for {}: {}", symbol, e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}
