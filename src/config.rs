use std::env;
use url::Url;

// The local device exposes its data on a fixed port and path
const LOCAL_DEVICE_PORT: u16 = 9001;
const LOCAL_DEVICE_PATH: &str = "/data.json";

const DEFAULT_LOCAL_HOST: &str = "localhost";
const DEFAULT_AV_SERVER: &str = "eu.airvantage.net";
const DEFAULT_CREDENTIALS_FILE: &str = "auth-airvantage.json";
const DEFAULT_REFRESH_PERIOD_SECS: u64 = 5;

/// AirVantage access configuration, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct AirVantageConfig {
    /// Identifier of the system whose uploads are queried.
    pub system_id: String,
    /// Base URL of the AirVantage API, e.g. `https://eu.airvantage.net`.
    pub base_url: String,
    /// Hostname part of `base_url`, used as the `origin` tag of cloud records.
    pub host: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Well-known URL of the local device endpoint.
    pub local_url: String,
    pub airvantage: AirVantageConfig,
    /// JSON file holding the AirVantage login and password, read lazily.
    pub credentials_file: String,
    /// Seconds between refresh cycles; 0 runs a single cycle and exits.
    pub refresh_period_secs: u64,
}

impl TelemetryConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let local_host =
            env::var("LOCAL_DEVICE_HOST").unwrap_or_else(|_| DEFAULT_LOCAL_HOST.to_string());
        let local_url = format!(
            "http://{}:{}{}",
            local_host, LOCAL_DEVICE_PORT, LOCAL_DEVICE_PATH
        );
        Url::parse(&local_url).map_err(|e| format!("Invalid local device URL {}: {}", local_url, e))?;

        let system_id =
            env::var("AV_SYSTEM_ID").map_err(|_| "AV_SYSTEM_ID environment variable not set")?;
        let client_id =
            env::var("AV_CLIENT_ID").map_err(|_| "AV_CLIENT_ID environment variable not set")?;
        let client_secret = env::var("AV_CLIENT_SECRET")
            .map_err(|_| "AV_CLIENT_SECRET environment variable not set")?;

        // AV_SERVER is usually a bare hostname; accept a full URL as well so
        // that non-production endpoints can be pointed at directly.
        let server = env::var("AV_SERVER").unwrap_or_else(|_| DEFAULT_AV_SERVER.to_string());
        let base_url = if server.contains("://") {
            server.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", server)
        };
        let parsed =
            Url::parse(&base_url).map_err(|e| format!("Invalid AV_SERVER {}: {}", server, e))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| format!("AV_SERVER has no host: {}", server))?
            .to_string();

        let credentials_file = env::var("AV_CREDENTIALS_FILE")
            .unwrap_or_else(|_| DEFAULT_CREDENTIALS_FILE.to_string());

        let refresh_period_secs = match env::var("REFRESH_PERIOD_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("REFRESH_PERIOD_SECS is not a number: {}", raw))?,
            Err(_) => DEFAULT_REFRESH_PERIOD_SECS,
        };

        println!("Local device endpoint: {}", local_url);
        println!("Cloud fallback: system {} at {}", system_id, host);

        Ok(TelemetryConfig {
            local_url,
            airvantage: AirVantageConfig {
                system_id,
                base_url,
                host,
                client_id,
                client_secret,
            },
            credentials_file,
            refresh_period_secs,
        })
    }
}
