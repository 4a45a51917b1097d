// src/routes.rs
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::details::get_details;
use crate::handlers::error::ApiError;
use crate::handlers::health::{health_check, home};
use crate::handlers::risk::analyze_risk;
use crate::handlers::search::search_stocks;
use crate::services::AppState;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found";
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.as_str();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed";
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error";
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let home_route = warp::path::end().and(warp::get()).and_then(home);

    let health_route = warp::path!("health").and(warp::get()).and_then(health_check);

    let details_route = warp::path!("stocks" / "details" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_details);

    let search_route = warp::path!("stocks" / "search")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(state_filter.clone())
        .and_then(search_stocks);

    let risk_route = warp::path!("risk" / "analyze" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(analyze_risk);

    info!("All routes configured successfully.");

    home_route
        .or(health_route)
        .or(details_route)
        .or(search_route)
        .or(risk_route)
        .recover(handle_rejection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state() -> Arc<AppState> {
        let config = Config {
            // Nothing listens here; upstream calls fail fast.
            yahoo_base_url: "http://127.0.0.1:9".to_string(),
            fmp_base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        AppState::new(config).unwrap()
    }

    #[tokio::test]
    async fn home_and_health() {
        let api = routes(test_state());

        let resp = warp::test::request().method("GET").path("/").reply(&api).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["message"], "Stock Analysis API is running");

        let resp = warp::test::request().method("GET").path("/health").reply(&api).await;
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let api = routes(test_state());
        let resp = warp::test::request().method("GET").path("/nope").reply(&api).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn search_requires_a_name() {
        let api = routes(test_state());
        let resp = warp::test::request()
            .method("GET")
            .path("/stocks/search?name=%20")
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["error"], "Please provide a valid stock name or symbol");
    }

    #[tokio::test]
    async fn malformed_symbol_is_bad_request() {
        let api = routes(test_state());
        let resp = warp::test::request()
            .method("GET")
            .path("/stocks/details/TCS%3BX")
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn encoded_symbols_are_decoded() {
        let api = routes(test_state());
        let resp = warp::test::request()
            .method("GET")
            .path("/stocks/details/m%26m")
            .reply(&api)
            .await;
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["error"], "No market data found for M&M.NS");

        let resp = warp::test::request()
            .method("GET")
            .path("/stocks/details/%5Ensei")
            .reply(&api)
            .await;
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["error"], "No market data found for ^NSEI");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_not_found() {
        let api = routes(test_state());
        let resp = warp::test::request()
            .method("GET")
            .path("/stocks/details/TCS")
            .reply(&api)
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["error"], "No market data found for TCS.NS");
    }
}
