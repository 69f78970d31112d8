use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use weatherdash_core::Config;
use weatherdash_server::AppState;
use weatherdash_weather::WeatherPolicy;

#[tokio::main]
async fn main() -> Result<()> {
    weatherdash_core::init()?;

    let (config, _) = Config::load_validated()?;

    let policy = WeatherPolicy::from_config(&config.weather)
        .context("Failed to create weather provider")?;
    let state = AppState::new(Arc::new(policy), config.weather.default_unit);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                return;
            }
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    tracing::info!(
        "weatherdash starting, upstream {}",
        config.weather.api_base_url
    );
    if let Err(e) = weatherdash_server::serve(&config.server, state, shutdown).await {
        tracing::error!("{} ({})", e.user_message(), e);
        return Err(e.into());
    }

    Ok(())
}
