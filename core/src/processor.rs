//! Data processor facade
//!
//! Ties the store, API client, cloud uploader, mailer and webhook relay
//! together behind the service's historical surface: each operation is
//! independent, runs to completion on its own, and reports failure as a
//! sentinel value after logging. Typed errors live in the modules
//! underneath; callers that want them can use those directly.

use std::path::Path;
use tracing::{error, info};

use crate::api::ApiClient;
use crate::cloud::CloudUploader;
use crate::config::Config;
use crate::error::Result;
use crate::mailer::Mailer;
use crate::store::{UserRecord, UserStore};
use crate::webhook::{WebhookOutcome, WebhookRelay};

pub struct DataProcessor {
    config: Config,
    store: UserStore,
    uploader: CloudUploader,
}

impl DataProcessor {
    /// Connect the store and resolve cloud credentials.
    ///
    /// Per-call components (API client, mailer, webhook relay) are built
    /// when used so a missing credential degrades that one operation
    /// instead of the whole service.
    pub async fn new(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| crate::error::RelayError::InvalidConfig {
                message: e.to_string(),
            })?;
        let store = UserStore::connect(&config.database_path).await?;
        let uploader = CloudUploader::from_config(&config).await;
        info!("data processor initialized with secure configuration");
        Ok(Self {
            config,
            store,
            uploader,
        })
    }

    /// Assemble from an existing store (tests, embedded use).
    pub async fn with_store(config: Config, store: UserStore) -> Self {
        let uploader = CloudUploader::from_config(&config).await;
        Self {
            config,
            store,
            uploader,
        }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Fetch a user row; logs and returns None on any failure.
    pub async fn fetch_user_data(&self, user_id: i64) -> Option<UserRecord> {
        match self.store.fetch_user(user_id).await {
            Ok(record) => record,
            Err(e) => {
                error!(user_id, "query failed: {}", e);
                None
            }
        }
    }

    /// Call the external processing API; logs and returns None on failure.
    pub async fn call_external_api(&self, data: &serde_json::Value) -> Option<serde_json::Value> {
        let client = match ApiClient::new(&self.config) {
            Ok(client) => client,
            Err(e) => {
                error!("api client unavailable: {}", e.user_message());
                return None;
            }
        };

        match client.process(data).await {
            Ok(response) => Some(response),
            Err(e) => {
                error!("api request failed: {}", e.user_message());
                None
            }
        }
    }

    /// Upload a file to cloud storage; logs and returns false on failure.
    ///
    /// The bucket defaults to the configured one.
    pub async fn upload_to_cloud(&self, path: &Path, bucket: Option<&str>) -> bool {
        let bucket = bucket.unwrap_or(&self.config.bucket);
        match self.uploader.upload_file(path, bucket).await {
            Ok(uri) => {
                info!(%uri, "file uploaded successfully");
                true
            }
            Err(e) => {
                error!("upload failed: {}", e.user_message());
                false
            }
        }
    }

    /// Send a notification email; logs and returns false on failure.
    pub async fn send_notification_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> bool {
        let mailer = match Mailer::from_config(&self.config) {
            Ok(mailer) => mailer,
            Err(e) => {
                error!("mailer unavailable: {}", e.user_message());
                return false;
            }
        };

        match mailer.send(recipient, subject, body).await {
            Ok(()) => true,
            Err(e) => {
                error!("email failed: {}", e.user_message());
                false
            }
        }
    }

    /// Authenticate and process one webhook body, then relay it.
    ///
    /// Failures come back as an error outcome rather than an Err, matching
    /// what the relay answers on the wire.
    pub async fn process_webhook_data(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> WebhookOutcome {
        let relay = match WebhookRelay::from_config(&self.config, self.store.clone()) {
            Ok(relay) => relay,
            Err(e) => {
                error!("webhook relay unavailable: {}", e.user_message());
                return WebhookOutcome::error(e.user_message());
            }
        };

        match relay.process(body, signature).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("webhook processing failed: {}", e.user_message());
                WebhookOutcome::error(e.user_message())
            }
        }
    }
}
