/// Direct polling of the on-board device
use log::debug;

use crate::errors::TelemetryResult;
use crate::models::RawRecord;
use crate::utils::now_epoch;

/// Origin tag of records that came straight from the local device.
pub const ORIGIN_LOCAL: &str = "Raspberry";

/// Try to get a data record straight from the local device.
///
/// The device answers with the flat path-to-value shape, so the record only
/// needs tagging: `origin` marks the source and `timestamp` is the current
/// wall-clock time, since the device reports live values. Any transport
/// error, timeout or non-success status surfaces as an error; the caller
/// decides whether to fall back to the cloud.
pub async fn fetch(client: &reqwest::Client, url: &str) -> TelemetryResult<RawRecord> {
    debug!("Polling local device at {}", url);

    let response = client.get(url).send().await?.error_for_status()?;
    let mut record = response.json::<RawRecord>().await?;

    record.insert(
        "origin".to_string(),
        serde_json::Value::from(ORIGIN_LOCAL),
    );
    record.insert("timestamp".to_string(), serde_json::Value::from(now_epoch()));

    Ok(record)
}
