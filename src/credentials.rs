/// Loading of the AirVantage login and password
use log::info;

use crate::errors::{TelemetryError, TelemetryResult};
use crate::models::Credentials;

/// Read credentials from a local JSON file of the form
///
/// ```json
/// { "login": "mail@company.com", "password": "s3kr3tP455w0rd!" }
/// ```
///
/// Only called when the cloud path needs its first access token, so a
/// missing file is not an error until direct device access has already
/// failed. An unreadable or malformed file fails the refresh cycle with
/// a `CredentialsLoad` error.
pub fn load(path: &str) -> TelemetryResult<Credentials> {
    info!("Loading AirVantage credentials from {}", path);

    let contents = std::fs::read_to_string(path).map_err(|e| TelemetryError::CredentialsLoad {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&contents).map_err(|e| TelemetryError::CredentialsLoad {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
