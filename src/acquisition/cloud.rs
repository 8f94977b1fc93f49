/// AirVantage fallback: lazy authentication and latest-data query
use log::{debug, info};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;

use crate::acquisition::session::AuthSession;
use crate::config::AirVantageConfig;
use crate::credentials;
use crate::errors::{TelemetryError, TelemetryResult};
use crate::models::{CloudSample, RawRecord};

/// The series whose first sample timestamps the whole record. The cloud has
/// no single "record produced at" field, so the battery voltage upload time
/// stands in for it.
const TIMESTAMP_PROXY_PATH: &str = "boat.bmv.voltage";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Fetch the latest record through AirVantage.
///
/// Requests an access token first if the session does not hold one yet; a
/// token already in the session is reused without touching the credentials
/// file. One failed query fails the cycle, there is no retry.
pub async fn fetch(
    client: &reqwest::Client,
    config: &AirVantageConfig,
    credentials_file: &str,
    session: &mut AuthSession,
) -> TelemetryResult<RawRecord> {
    if !session.has_token() {
        authenticate(client, config, credentials_file, session).await?;
    }
    query_data(client, config, session).await
}

/// Load the login and password and trade them for an access token, stored
/// in the session for the rest of the process lifetime.
async fn authenticate(
    client: &reqwest::Client,
    config: &AirVantageConfig,
    credentials_file: &str,
    session: &mut AuthSession,
) -> TelemetryResult<()> {
    let creds = credentials::load(credentials_file)?;

    info!("Requesting AirVantage access token from {}", config.host);
    let url = format!("{}/api/oauth/token", config.base_url);
    let response = client
        .get(&url)
        .query(&[
            ("grant_type", "password"),
            ("username", creds.login.as_str()),
            ("password", creds.password.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
        ])
        .send()
        .await?;

    match response.status() {
        StatusCode::OK => {
            let body = response.json::<TokenResponse>().await?;
            session.set_token(body.access_token);
            Ok(())
        }
        status => {
            let message = response.text().await.unwrap_or_default();
            Err(TelemetryError::Auth {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Query the latest uploaded data set and flatten it into a RawRecord.
async fn query_data(
    client: &reqwest::Client,
    config: &AirVantageConfig,
    session: &AuthSession,
) -> TelemetryResult<RawRecord> {
    let token = session.token()?;

    debug!("Retrieving latest data from {}", config.host);
    let url = format!(
        "{}/api/v1/systems/{}/data",
        config.base_url, config.system_id
    );
    let response = client
        .get(&url)
        .query(&[("access_token", token)])
        .send()
        .await?;

    match response.status() {
        StatusCode::OK => {
            let series = response
                .json::<HashMap<String, Vec<CloudSample>>>()
                .await?;
            unwrap_series(series, &config.host)
        }
        status => {
            let message = response.text().await.unwrap_or_default();
            Err(TelemetryError::DataFetch {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Keep only the most recent sample of every series and tag the record with
/// its origin and the upload timestamp (milliseconds down to epoch seconds).
fn unwrap_series(
    series: HashMap<String, Vec<CloudSample>>,
    host: &str,
) -> TelemetryResult<RawRecord> {
    let record_ts = series
        .get(TIMESTAMP_PROXY_PATH)
        .and_then(|samples| samples.first())
        .map(|sample| sample.timestamp as f64 / 1000.0)
        .ok_or_else(|| {
            TelemetryError::InvalidResponse(format!(
                "no {} series in data set",
                TIMESTAMP_PROXY_PATH
            ))
        })?;

    let mut record = RawRecord::new();
    for (path, samples) in series {
        if let Some(sample) = samples.into_iter().next() {
            record.insert(path, sample.value);
        }
    }
    record.insert("origin".to_string(), serde_json::Value::from(host));
    record.insert("timestamp".to_string(), serde_json::Value::from(record_ts));

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::io::Write;

    fn test_client() -> reqwest::Client {
        reqwest::Client::new()
    }

    fn test_config(base_url: String) -> AirVantageConfig {
        AirVantageConfig {
            system_id: "sys42".to_string(),
            base_url,
            host: "test.airvantage.example".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
        }
    }

    fn credentials_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "login": "skipper@boat.example", "password": "hunter2" }}"#
        )
        .unwrap();
        file
    }

    fn data_body() -> String {
        json!({
            "boat.bmv.voltage": [
                { "value": 12.4, "timestamp": 1600000000000_i64 },
                { "value": 12.6, "timestamp": 1599999000000_i64 }
            ],
            "boat.bmv.current": [
                { "value": -2.1, "timestamp": 1600000000000_i64 }
            ]
        })
        .to_string()
    }

    #[test]
    fn unwrap_keeps_only_the_most_recent_sample() {
        let series: HashMap<String, Vec<CloudSample>> =
            serde_json::from_str(&data_body()).unwrap();

        let record = unwrap_series(series, "test.airvantage.example").unwrap();
        assert_eq!(record["boat.bmv.voltage"], json!(12.4));
        assert_eq!(record["boat.bmv.current"], json!(-2.1));
        assert_eq!(record["origin"], json!("test.airvantage.example"));
        assert_eq!(record["timestamp"], json!(1600000000.0));
    }

    #[test]
    fn unwrap_without_voltage_series_is_invalid() {
        let series: HashMap<String, Vec<CloudSample>> = serde_json::from_str(
            &json!({
                "boat.bmv.current": [
                    { "value": -2.1, "timestamp": 1600000000000_i64 }
                ]
            })
            .to_string(),
        )
        .unwrap();

        let result = unwrap_series(series, "test.airvantage.example");
        assert!(matches!(result, Err(TelemetryError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn first_fetch_authenticates_with_loaded_credentials() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("GET", "/api/oauth/token")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "password".into()),
                Matcher::UrlEncoded("username".into(), "skipper@boat.example".into()),
                Matcher::UrlEncoded("password".into(), "hunter2".into()),
                Matcher::UrlEncoded("client_id".into(), "client-id".into()),
                Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
            ]))
            .with_status(200)
            .with_body(json!({ "access_token": "tok123" }).to_string())
            .create_async()
            .await;
        let data_mock = server
            .mock("GET", "/api/v1/systems/sys42/data")
            .match_query(Matcher::UrlEncoded("access_token".into(), "tok123".into()))
            .with_status(200)
            .with_body(data_body())
            .create_async()
            .await;

        let creds = credentials_file();
        let config = test_config(server.url());
        let mut session = AuthSession::new();

        let record = fetch(
            &test_client(),
            &config,
            creds.path().to_str().unwrap(),
            &mut session,
        )
        .await
        .unwrap();

        assert_eq!(record["origin"], json!("test.airvantage.example"));
        assert_eq!(session.token().unwrap(), "tok123");
        token_mock.assert_async().await;
        data_mock.assert_async().await;
    }

    #[tokio::test]
    async fn held_token_skips_credentials_and_token_request() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("GET", "/api/oauth/token")
            .expect(0)
            .create_async()
            .await;
        let data_mock = server
            .mock("GET", "/api/v1/systems/sys42/data")
            .match_query(Matcher::UrlEncoded("access_token".into(), "cached".into()))
            .with_status(200)
            .with_body(data_body())
            .create_async()
            .await;

        let config = test_config(server.url());
        let mut session = AuthSession::new();
        session.set_token("cached".to_string());

        // A bogus credentials path proves the file is never touched
        let record = fetch(
            &test_client(),
            &config,
            "/nonexistent/auth-airvantage.json",
            &mut session,
        )
        .await
        .unwrap();

        assert_eq!(record["boat.bmv.voltage"], json!(12.4));
        token_mock.assert_async().await;
        data_mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_token_request_is_an_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/oauth/token")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("bad credentials")
            .create_async()
            .await;

        let creds = credentials_file();
        let config = test_config(server.url());
        let mut session = AuthSession::new();

        let result = fetch(
            &test_client(),
            &config,
            creds.path().to_str().unwrap(),
            &mut session,
        )
        .await;

        assert!(matches!(
            result,
            Err(TelemetryError::Auth { status: 401, .. })
        ));
        assert!(!session.has_token());
    }

    #[tokio::test]
    async fn rejected_data_query_is_a_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/systems/sys42/data")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let config = test_config(server.url());
        let mut session = AuthSession::new();
        session.set_token("cached".to_string());

        let result = fetch(
            &test_client(),
            &config,
            "/nonexistent/auth-airvantage.json",
            &mut session,
        )
        .await;

        assert!(matches!(
            result,
            Err(TelemetryError::DataFetch { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn missing_credentials_file_fails_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let token_mock = server
            .mock("GET", "/api/oauth/token")
            .expect(0)
            .create_async()
            .await;

        let config = test_config(server.url());
        let mut session = AuthSession::new();

        let result = fetch(
            &test_client(),
            &config,
            "/nonexistent/auth-airvantage.json",
            &mut session,
        )
        .await;

        assert!(matches!(
            result,
            Err(TelemetryError::CredentialsLoad { .. })
        ));
        token_mock.assert_async().await;
    }
}
