/// Two-tier acquisition: local device first, AirVantage fallback second
use log::info;

use crate::acquisition::session::AuthSession;
use crate::acquisition::{cloud, local};
use crate::config::TelemetryConfig;
use crate::errors::TelemetryResult;
use crate::mapping::normalize;
use crate::sink::RenderSink;

/// Run one refresh cycle.
///
/// Polls the local device and, if it cannot be reached, queries AirVantage
/// instead. The winning raw record is normalized and handed to the sink.
/// A local failure is expected off the boat network and never fails the
/// cycle on its own; a cloud-path failure does, and renders the
/// unavailable state so the outage is visible.
pub async fn refresh(
    client: &reqwest::Client,
    config: &TelemetryConfig,
    session: &mut AuthSession,
    sink: &dyn RenderSink,
) -> TelemetryResult<()> {
    let raw = match local::fetch(client, &config.local_url).await {
        Ok(record) => record,
        Err(e) => {
            info!("No direct access ({}), trying through AirVantage", e);
            match cloud::fetch(
                client,
                &config.airvantage,
                &config.credentials_file,
                session,
            )
            .await
            {
                Ok(record) => record,
                Err(e) => {
                    sink.unavailable(&e.to_string());
                    return Err(e);
                }
            }
        }
    };

    sink.render(&normalize(&raw));
    Ok(())
}
