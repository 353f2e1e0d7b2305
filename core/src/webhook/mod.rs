//! Webhook processing and relay
//!
//! Incoming payloads are authenticated with an HMAC-SHA256 signature
//! over the raw body before anything else happens. A `delete_user`
//! action runs against the store with a bound parameter, then the
//! payload is forwarded to the configured HTTPS endpoint.

use hmac::{Hmac, Mac};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::store::UserStore;
use crate::util::require_https_url;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex-encoded HMAC-SHA256 of the body.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Action name that triggers a user deletion.
pub const ACTION_DELETE_USER: &str = "delete_user";

/// Result of processing one webhook, mirroring the relay's wire answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookOutcome {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_response: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookOutcome {
    pub fn processed(forward_status: u16) -> Self {
        Self {
            status: "processed".to_string(),
            webhook_response: Some(forward_status),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            webhook_response: None,
            message: Some(message.into()),
        }
    }
}

/// Verify a hex-encoded HMAC-SHA256 signature over the raw body.
///
/// Comparison happens inside the Mac, in constant time.
pub fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> Result<()> {
    let expected = hex::decode(signature_hex.trim()).map_err(|_| RelayError::SignatureRejected)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| RelayError::SignatureRejected)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| RelayError::SignatureRejected)
}

/// Compute the hex signature for a body. Used by callers that need to
/// sign outbound test payloads.
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[derive(Debug)]
pub struct WebhookRelay {
    store: UserStore,
    http_client: HttpClient,
    endpoint: String,
    secret: String,
}

impl WebhookRelay {
    /// Build the relay. Fails when the forward endpoint is not https or
    /// the signing secret is absent.
    pub fn from_config(config: &Config, store: UserStore) -> Result<Self> {
        let endpoint = require_https_url(&config.webhook_endpoint, "webhook_endpoint").map_err(
            |e| RelayError::InvalidConfig {
                message: e.to_string(),
            },
        )?;

        let secret =
            config
                .secrets
                .webhook_secret
                .clone()
                .ok_or(RelayError::MissingConfig {
                    key: crate::config::ENV_WEBHOOK_SECRET.to_string(),
                })?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("datarelay/1.0")
            .build()
            .map_err(|e| RelayError::Http(e.to_string()))?;

        Ok(Self {
            store,
            http_client,
            endpoint,
            secret,
        })
    }

    /// Authenticate, apply, and forward one webhook body.
    pub async fn process(&self, body: &[u8], signature: Option<&str>) -> Result<WebhookOutcome> {
        let signature = signature.ok_or(RelayError::SignatureRejected)?;
        verify_signature(&self.secret, body, signature)?;

        let payload: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            RelayError::InvalidPayload {
                reason: e.to_string(),
            }
        })?;

        self.apply_action(&payload).await?;
        let forward_status = self.forward(&payload).await?;
        Ok(WebhookOutcome::processed(forward_status))
    }

    /// Execute the payload's action against local state.
    ///
    /// Only `delete_user` is recognized; anything else passes through
    /// untouched, as the relay is not the authority on other actions.
    pub(crate) async fn apply_action(&self, payload: &serde_json::Value) -> Result<Option<u64>> {
        let action = payload.get("action").and_then(|v| v.as_str());
        if action != Some(ACTION_DELETE_USER) {
            return Ok(None);
        }

        let user_id = payload
            .get("user_id")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| RelayError::InvalidPayload {
                reason: "delete_user requires a numeric user_id".to_string(),
            })?;

        let affected = self.store.delete_user(user_id).await?;
        info!(user_id, affected, "webhook delete applied");
        Ok(Some(affected))
    }

    /// Relay the payload to the configured HTTPS endpoint.
    async fn forward(&self, payload: &serde_json::Value) -> Result<u16> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| RelayError::ConnectionFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "webhook forward rejected");
            return Err(RelayError::ForwardFailed {
                status: status.as_u16(),
            });
        }
        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::UserStore;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    async fn test_relay() -> WebhookRelay {
        let mut config = Config::default();
        config.secrets.webhook_secret = Some(SECRET.to_string());
        let store = UserStore::connect_in_memory().await.expect("store");
        WebhookRelay::from_config(&config, store).expect("relay")
    }

    #[test]
    fn signature_round_trip() {
        let body = br#"{"action":"delete_user","user_id":7}"#;
        let sig = sign_body(SECRET, body);
        assert!(verify_signature(SECRET, body, &sig).is_ok());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let body = br#"{"action":"delete_user","user_id":7}"#;
        let sig = sign_body(SECRET, body);
        let tampered = br#"{"action":"delete_user","user_id":8}"#;
        assert!(matches!(
            verify_signature(SECRET, tampered, &sig),
            Err(RelayError::SignatureRejected)
        ));
    }

    #[test]
    fn garbage_signature_is_rejected() {
        let body = b"{}";
        assert!(verify_signature(SECRET, body, "not-hex").is_err());
        assert!(verify_signature(SECRET, body, "deadbeef").is_err());
    }

    #[tokio::test]
    async fn missing_signature_rejected_before_any_mutation() {
        let relay = test_relay().await;
        let id = relay.store.insert_user("alice").await.expect("insert");

        let body = format!(r#"{{"action":"delete_user","user_id":{}}}"#, id);
        let err = relay.process(body.as_bytes(), None).await.unwrap_err();
        assert!(matches!(err, RelayError::SignatureRejected));

        // The row must still be there
        assert!(relay.store.fetch_user(id).await.expect("fetch").is_some());
    }

    #[tokio::test]
    async fn delete_action_removes_the_bound_user() {
        let relay = test_relay().await;
        let keep = relay.store.insert_user("keep").await.expect("insert");
        let target = relay.store.insert_user("target").await.expect("insert");

        let payload = json!({ "action": ACTION_DELETE_USER, "user_id": target });
        let affected = relay.apply_action(&payload).await.expect("apply");
        assert_eq!(affected, Some(1));
        assert!(relay.store.fetch_user(target).await.expect("fetch").is_none());
        assert!(relay.store.fetch_user(keep).await.expect("fetch").is_some());
    }

    #[tokio::test]
    async fn unknown_action_touches_nothing() {
        let relay = test_relay().await;
        let id = relay.store.insert_user("alice").await.expect("insert");

        let payload = json!({ "action": "ping", "user_id": id });
        let affected = relay.apply_action(&payload).await.expect("apply");
        assert_eq!(affected, None);
        assert!(relay.store.fetch_user(id).await.expect("fetch").is_some());
    }

    #[tokio::test]
    async fn delete_without_user_id_is_invalid() {
        let relay = test_relay().await;
        let payload = json!({ "action": ACTION_DELETE_USER });
        let err = relay.apply_action(&payload).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidPayload { .. }));
    }

    #[tokio::test]
    async fn plaintext_forward_endpoint_is_refused() {
        let mut config = Config::default();
        config.secrets.webhook_secret = Some(SECRET.to_string());
        config.webhook_endpoint = "http://internal-webhook.company.com/process".to_string();
        let store = UserStore::connect_in_memory().await.expect("store");
        let err = WebhookRelay::from_config(&config, store).unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfig { .. }));
    }

    #[test]
    fn outcome_serializes_like_the_wire_answer() {
        let ok = WebhookOutcome::processed(200);
        let rendered = serde_json::to_value(&ok).expect("json");
        assert_eq!(rendered, json!({ "status": "processed", "webhook_response": 200 }));

        let err = WebhookOutcome::error("forwarding failed");
        let rendered = serde_json::to_value(&err).expect("json");
        assert_eq!(
            rendered,
            json!({ "status": "error", "message": "forwarding failed" })
        );
    }
}
