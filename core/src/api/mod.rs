//! External processing API client
//!
//! Thin client over reqwest with the transport hardening the service
//! requires everywhere: certificate verification on (never disabled), a
//! request timeout, bearer auth from a validated key, and non-2xx mapped
//! to typed errors. Transient failures get a bounded, jittered backoff.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client as HttpClient, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::util::{sanitize_base_url, validate_api_key};

const MAX_RETRIES: u32 = 3;

/// Advisory per-client request ceiling, forwarded to the API.
const REQUEST_LIMIT_HEADER: &str = "X-Request-Limit";
const REQUEST_LIMIT: &str = "100";

#[derive(Debug)]
pub struct ApiClient {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// Fails fast when the API key is absent or not header-safe, so a
    /// bad credential never reaches the wire.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = sanitize_base_url(&config.api_base_url, "api_base_url")
            .map_err(|e| RelayError::InvalidConfig {
                message: e.to_string(),
            })?;

        let api_key = config
            .secrets
            .api_key
            .as_deref()
            .ok_or(RelayError::MissingConfig {
                key: crate::config::ENV_API_KEY.to_string(),
            })?;
        let api_key = validate_api_key(api_key).map_err(|_| RelayError::InvalidCredentials {
            reason: "API key is not valid for an Authorization header".to_string(),
        })?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("datarelay/1.0")
            .build()
            .map_err(|e| RelayError::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }

    /// Submit a payload to the processing endpoint and return the parsed
    /// JSON response.
    pub async fn process(&self, data: &serde_json::Value) -> Result<serde_json::Value> {
        let url = self.endpoint_url("process");
        let headers = self.build_headers()?;

        let response = self
            .retry_with_backoff(|| async {
                self.http_client
                    .post(&url)
                    .headers(headers.clone())
                    .json(data)
                    .send()
                    .await
            })
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: serde_json::Value = response
                    .json()
                    .await
                    .map_err(|e| RelayError::Http(format!("failed to parse response: {}", e)))?;
                Ok(body)
            }
            StatusCode::UNAUTHORIZED => Err(RelayError::Unauthorized {
                message: "processing API rejected the bearer token".to_string(),
            }),
            StatusCode::TOO_MANY_REQUESTS => Err(RelayError::RateLimitExceeded {
                retry_after: parse_retry_after(&response),
            }),
            status => {
                let message = extract_error_message(response).await;
                Err(RelayError::ApiError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Build headers for API requests
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            REQUEST_LIMIT_HEADER,
            HeaderValue::from_static(REQUEST_LIMIT),
        );

        let auth_value = format!("Bearer {}", self.api_key);
        let mut auth_value: HeaderValue =
            auth_value
                .parse()
                .map_err(|_| RelayError::InvalidCredentials {
                    reason: "API key is not valid for an Authorization header".to_string(),
                })?;
        auth_value.set_sensitive(true);
        headers.insert("Authorization", auth_value);

        Ok(headers)
    }

    /// Helper with jittered backoff retry, respecting Retry-After headers
    async fn retry_with_backoff<F, Fut>(&self, operation: F) -> Result<reqwest::Response>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        let mut delay = Duration::from_secs(2);

        loop {
            match operation().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_RETRIES {
                        let wait = parse_retry_after(&response).unwrap_or(delay);
                        warn!(
                            attempt,
                            wait_secs = wait.as_secs(),
                            "rate limited (429), backing off"
                        );
                        sleep(wait).await;
                    } else if status.is_server_error() && attempt < MAX_RETRIES {
                        warn!(%status, attempt, "server error, retrying");
                        sleep(delay).await;
                    } else {
                        return Ok(response);
                    }
                }
                Err(e) => {
                    if attempt >= MAX_RETRIES {
                        return Err(map_transport_error(e));
                    }
                    warn!(attempt, "network error, retrying: {}", e);
                    sleep(delay).await;
                }
            }

            attempt += 1;

            // Exponential backoff with +/- 500ms jitter
            let jitter_ms = rand::thread_rng().gen_range(-500..=500);
            let delay_ms = (delay.as_millis() as i64 * 2 + jitter_ms).max(100) as u64;
            delay = Duration::from_millis(delay_ms);
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> RelayError {
    if e.is_timeout() {
        RelayError::Timeout {
            duration: Duration::from_secs(10),
        }
    } else if e.is_connect() {
        RelayError::ConnectionFailed {
            message: e.to_string(),
        }
    } else {
        RelayError::Http(e.to_string())
    }
}

fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

async fn extract_error_message(response: reqwest::Response) -> String {
    let error_body: Option<serde_json::Value> = response.json().await.ok();
    error_body
        .as_ref()
        .and_then(|v| v.get("error").and_then(|e| e.get("message")))
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn config_with_key(key: &str) -> Config {
        let mut config = Config::default();
        config.secrets.api_key = Some(key.to_string());
        config
    }

    #[test]
    fn new_requires_an_api_key() {
        let config = Config::default();
        let err = ApiClient::new(&config).unwrap_err();
        assert!(matches!(err, RelayError::MissingConfig { .. }));
    }

    #[test]
    fn new_rejects_header_unsafe_key() {
        let config = config_with_key("bad\nkey");
        let err = ApiClient::new(&config).unwrap_err();
        assert!(matches!(err, RelayError::InvalidCredentials { .. }));
        // The key itself must not leak through the error
        assert!(!err.to_string().contains("bad\nkey"));
    }

    #[test]
    fn headers_carry_bearer_auth_and_request_limit() {
        let client = ApiClient::new(&config_with_key("sk-test123")).expect("client");
        let headers = client.build_headers().expect("headers");

        let auth = headers.get("Authorization").expect("auth header");
        assert!(auth.is_sensitive());
        assert_eq!(
            headers.get(REQUEST_LIMIT_HEADER).and_then(|v| v.to_str().ok()),
            Some(REQUEST_LIMIT)
        );
        assert_eq!(
            headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn endpoint_url_handles_trailing_slash() {
        let mut config = config_with_key("sk-test123");
        config.api_base_url = "https://api.production-service.com/v1/".to_string();
        let client = ApiClient::new(&config).expect("client");
        assert_eq!(
            client.endpoint_url("process"),
            "https://api.production-service.com/v1/process"
        );
    }
}
