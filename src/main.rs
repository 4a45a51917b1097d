use env_logger::Env;
use log::{error, info};
use std::net::SocketAddr;
use warp::Filter;

use stock_insight::config::Config;
use stock_insight::routes;
use stock_insight::services::scheduler::start_scheduler;
use stock_insight::services::AppState;
use stock_insight::BoxError;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Logger initialized. Starting the application...");

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    let addr: SocketAddr = (config.host, config.port).into();
    info!("Will bind to: {} (production: {})", addr, config.production);

    let state = AppState::new(config)?;

    // Keep the handle alive for the lifetime of the server.
    let _scheduler = start_scheduler(state.clone()).await?;

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "OPTIONS"]);

    let api = routes::routes(state).with(cors).with(warp::log("stock_insight::http"));
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
