//! Shared HTTP adapter for the weather and flight providers.
//!
//! Issues GET requests, applies default headers and the request timeout, and
//! sorts every failure into a [`FetchError`] variant.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "WinDO/0.1.0";

/// Thin wrapper over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a client with the given timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create a client with the default 30 second timeout.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// GET `base_url` with `query` and `headers`, and decode the JSON body.
    ///
    /// - unparseable URL → [`FetchError::InvalidUrl`]
    /// - transport failure → [`FetchError::Network`]
    /// - status other than 200 → [`FetchError::Api`] with the body text
    /// - empty body → [`FetchError::NoData`]
    /// - body that does not match `T` → [`FetchError::Decoding`]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        base_url: &str,
        query: &[(&str, String)],
        headers: &[(&'static str, &'static str)],
    ) -> Result<T, FetchError> {
        let url = Self::build_url(base_url, query)?;
        tracing::debug!(url = %redact(&url), "GET");

        let response = self
            .client
            .get(url)
            .headers(Self::header_map(headers)?)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        if status != StatusCode::OK {
            tracing::debug!(status = status.as_u16(), "Provider returned an error status");
            return Err(FetchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Err(FetchError::NoData);
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decoding(e.to_string()))
    }

    fn build_url(base_url: &str, query: &[(&str, String)]) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn header_map(headers: &[(&'static str, &'static str)]) -> Result<HeaderMap, FetchError> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::InvalidUrl(format!("bad header {}: {}", name, e)))?;
            map.insert(name, HeaderValue::from_static(value));
        }
        Ok(map)
    }
}

/// Hide the API key when logging a request URL.
fn redact(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "appid" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Probe {
        value: i32,
    }

    #[tokio::test]
    async fn test_get_json_applies_query_and_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data"))
            .and(query_param("lat", "18.5"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 3})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_defaults().unwrap();
        let probe: Probe = client
            .get_json(
                &format!("{}/data", mock_server.uri()),
                &[("lat", "18.5".to_string())],
                &[("Accept", "application/json")],
            )
            .await
            .unwrap();

        assert_eq!(probe.value, 3);
    }

    #[tokio::test]
    async fn test_non_200_is_api_error_with_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_defaults().unwrap();
        let result: Result<Probe, _> = client.get_json(&mock_server.uri(), &[], &[]).await;

        match result {
            Err(FetchError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "Invalid API key");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_decoding_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"other": 1})))
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_defaults().unwrap();
        let result: Result<Probe, _> = client.get_json(&mock_server.uri(), &[], &[]).await;
        assert!(matches!(result, Err(FetchError::Decoding(_))));
    }

    #[tokio::test]
    async fn test_empty_body_is_no_data() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = HttpClient::with_defaults().unwrap();
        let result: Result<Probe, _> = client.get_json(&mock_server.uri(), &[], &[]).await;
        assert!(matches!(result, Err(FetchError::NoData)));
    }

    #[tokio::test]
    async fn test_malformed_base_url_is_invalid_url() {
        let client = HttpClient::with_defaults().unwrap();
        let result: Result<Probe, _> = client.get_json("not a url", &[], &[]).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = HttpClient::with_defaults().unwrap();
        let result: Result<Probe, _> = client.get_json("http://127.0.0.1:1/", &[], &[]).await;
        let err = result.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_redact_hides_api_key() {
        let url = Url::parse("https://api.example.com/weather?lat=1&appid=secret").unwrap();
        let shown = redact(&url);
        assert!(!shown.contains("secret"));
        assert!(shown.contains("lat=1"));
    }
}
