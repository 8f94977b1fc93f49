mod acquisition;
mod config;
mod credentials;
mod errors;
mod mapping;
mod models;
mod sink;
mod utils;

use log::{error, info};
use tokio::time::{sleep, Duration};

use acquisition::{refresh, AuthSession};
use config::TelemetryConfig;
use sink::ConsoleSink;

const HTTP_TIMEOUT_SECS: u64 = 10;

async fn main_loop(config: TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting boat telemetry service");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?;
    let mut session = AuthSession::new();
    let sink = ConsoleSink;

    loop {
        // A failed cycle is logged and rendered as unavailable by the
        // controller; the loop itself keeps going.
        if let Err(e) = refresh(&client, &config, &mut session, &sink).await {
            error!("Refresh cycle failed: {}", e);
        }

        if config.refresh_period_secs == 0 {
            info!("Periodic refresh disabled, exiting after single cycle");
            return Ok(());
        }

        sleep(Duration::from_secs(config.refresh_period_secs)).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match TelemetryConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        let _ = tx.send(());
    });

    // Run main loop or wait for shutdown signal
    tokio::select! {
        result = main_loop(config) => {
            match result {
                Ok(_) => info!("Program completed successfully"),
                Err(e) => error!("Fatal error: {}", e),
            }
        }
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
