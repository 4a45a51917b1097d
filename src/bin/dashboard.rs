use anyhow::{bail, Context, Result};
use env_logger::Env;
use log::info;
use std::env;
use std::time::Duration;

use stock_insight::client::{load_dashboard, CardKind, DashboardClient, DisclaimerCycle};
use stock_insight::config::Config;

/// Fetches one symbol from a running API and prints the dashboard.
/// With `--watch SECONDS` the prediction disclaimer keeps cycling until the
/// time is up.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let symbol = match args.first() {
        Some(s) => s.clone(),
        None => bail!("usage: dashboard <SYMBOL> [--watch SECONDS]"),
    };
    let watch_secs = match args.iter().position(|a| a == "--watch") {
        Some(i) => args
            .get(i + 1)
            .context("--watch needs a number of seconds")?
            .parse::<u64>()
            .context("--watch needs a number of seconds")?,
        None => 0,
    };

    let config = Config::from_env()?;
    let client = DashboardClient::new(config.api_base.clone(), config.request_timeout * 4)?;
    info!("Using API at {}", config.api_base);

    let view = load_dashboard(&client, &symbol, |step, label| {
        println!("[{}/4] {}...", step + 1, label);
    })
    .await;

    if view.alert().is_some() || !view.has_card(CardKind::Prediction) || watch_secs == 0 {
        print!("{}", view.render(view.has_card(CardKind::Prediction)));
        return Ok(());
    }

    let disclaimer = DisclaimerCycle::start();
    let mut visibility = disclaimer.subscribe();
    print!("{}", view.render(disclaimer.is_visible()));

    let deadline = tokio::time::sleep(Duration::from_secs(watch_secs));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = visibility.changed() => {
                if changed.is_err() {
                    break;
                }
                let visible = *visibility.borrow_and_update();
                println!("--- disclaimer {} ---", if visible { "shown" } else { "hidden" });
                print!("{}", view.render(visible));
            }
        }
    }
    Ok(())
}
