// src/handlers/health.rs
use serde_json::json;
use warp::reply::Json;

pub async fn home() -> Result<Json, warp::Rejection> {
    Ok(warp::reply::json(&json!({
        "status": "ok",
        "message": "Stock Analysis API is running",
    })))
}

pub async fn health_check() -> Result<Json, warp::Rejection> {
    Ok(warp::reply::json(&json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
