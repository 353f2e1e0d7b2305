//! Configuration management
//!
//! Handles loading/saving the TOML config file and sourcing secrets from
//! the environment. Secrets are never written back to disk and never
//! appear in Debug output.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::util::require_https_url;

/// Environment variable holding the external API bearer token.
pub const ENV_API_KEY: &str = "DATARELAY_API_KEY";
/// Environment variable holding the SMTP credential.
pub const ENV_SMTP_PASSWORD: &str = "DATARELAY_SMTP_PASSWORD";
/// Environment variable holding the webhook HMAC secret.
pub const ENV_WEBHOOK_SECRET: &str = "DATARELAY_WEBHOOK_SECRET";
/// Standard AWS region variable, honoured before the SDK default chain.
pub const ENV_AWS_REGION: &str = "AWS_REGION";

/// Unified datarelay configuration
///
/// Combines the external API endpoint, cloud storage, SMTP and webhook
/// settings into a single configuration file. Credentials live in
/// [`Secrets`] and come only from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Config file format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Base URL of the external processing API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// HTTPS endpoint incoming webhooks are relayed to
    #[serde(default = "default_webhook_endpoint")]
    pub webhook_endpoint: String,

    /// Default S3 bucket for uploads
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// AWS region override; the SDK default chain applies when unset
    #[serde(default)]
    pub aws_region: Option<String>,

    /// Path of the local sqlite database
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Timeout applied to every outbound network call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// SMTP settings (host/port/sender only; the password is a secret)
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Credentials sourced from the environment, never serialized
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default = "default_smtp_sender")]
    pub sender: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            sender: default_smtp_sender(),
        }
    }
}

/// Credentials pulled from the environment.
///
/// Deliberately not serializable; Debug prints redacted markers so the
/// struct can appear in logs without leaking anything.
#[derive(Clone, Default)]
pub struct Secrets {
    pub api_key: Option<String>,
    pub smtp_password: Option<String>,
    pub webhook_secret: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn mark(v: &Option<String>) -> &'static str {
            if v.is_some() {
                "[redacted]"
            } else {
                "[unset]"
            }
        }
        f.debug_struct("Secrets")
            .field("api_key", &mark(&self.api_key))
            .field("smtp_password", &mark(&self.smtp_password))
            .field("webhook_secret", &mark(&self.webhook_secret))
            .finish()
    }
}

impl Secrets {
    /// Read all credentials from the environment.
    pub fn from_env() -> Self {
        fn non_empty(var: &str) -> Option<String> {
            std::env::var(var).ok().filter(|v| !v.trim().is_empty())
        }
        Self {
            api_key: non_empty(ENV_API_KEY),
            smtp_password: non_empty(ENV_SMTP_PASSWORD),
            webhook_secret: non_empty(ENV_WEBHOOK_SECRET),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            api_base_url: default_api_base_url(),
            webhook_endpoint: default_webhook_endpoint(),
            bucket: default_bucket(),
            aws_region: None,
            database_path: default_database_path(),
            request_timeout_secs: default_timeout_secs(),
            smtp: SmtpConfig::default(),
            secrets: Secrets::default(),
        }
    }
}

impl Config {
    /// Load configuration from file; secrets come from the environment.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.secrets = Secrets::from_env();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file. Secrets are skipped by serde and the
    /// AWS region is resolved at runtime, so the written file is safe to
    /// commit.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default location or fall back to defaults.
    pub fn load_or_default() -> Self {
        if let Some(path) = find_config_file() {
            if let Ok(config) = Self::load(&path) {
                return config;
            }
        }

        let mut config = Self::default();
        config.secrets = Secrets::from_env();
        config
    }

    /// Reject configurations that would weaken the transport or point at
    /// nothing.
    pub fn validate(&self) -> anyhow::Result<()> {
        require_https_url(&self.webhook_endpoint, "webhook_endpoint")?;
        if self.bucket.trim().is_empty() {
            anyhow::bail!("bucket cannot be empty");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Effective AWS region: config value, then AWS_REGION, then the SDK
    /// default provider chain (None).
    pub fn region(&self) -> Option<String> {
        self.aws_region
            .clone()
            .or_else(|| std::env::var(ENV_AWS_REGION).ok().filter(|v| !v.is_empty()))
    }

    /// Get default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("datarelay").join("config.toml"))
    }
}

/// Find the configuration file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join("datarelay.toml");
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(path) = Config::default_path() {
        if path.exists() {
            return Some(path);
        }
    }

    None
}

fn default_version() -> String {
    "1".to_string()
}

fn default_api_base_url() -> String {
    "https://api.production-service.com/v1".to_string()
}

fn default_webhook_endpoint() -> String {
    "https://internal-webhook.company.com/process".to_string()
}

fn default_bucket() -> String {
    "company-sensitive-data".to_string()
}

fn default_database_path() -> String {
    "app_data.db".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_sender() -> String {
    "notifications@company.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unique_temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("datarelay-test-config-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn config_round_trip_save_load() {
        let dir = unique_temp_dir();
        let path = dir.join("config.toml");

        let mut config = Config::default();
        config.bucket = "staging-artifacts".to_string();
        config.save(&path).expect("save");

        let loaded = Config::load(&path).expect("load");
        assert_eq!(loaded.bucket, "staging-artifacts");
        assert_eq!(loaded.request_timeout_secs, 10);
        assert_eq!(loaded.smtp.port, 587);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn secrets_never_reach_disk() {
        let mut config = Config::default();
        config.secrets.api_key = Some("sk-live-very-secret".to_string());
        config.secrets.smtp_password = Some("hunter2".to_string());

        let serialized = toml::to_string_pretty(&config).expect("serialize");
        assert!(!serialized.contains("sk-live-very-secret"));
        assert!(!serialized.contains("hunter2"));
        assert!(!serialized.contains("api_key"));
    }

    #[test]
    fn secrets_debug_is_redacted() {
        let secrets = Secrets {
            api_key: Some("sk-live-very-secret".to_string()),
            smtp_password: None,
            webhook_secret: Some("whsec_abc".to_string()),
        };
        let rendered = format!("{:?}", secrets);
        assert!(rendered.contains("[redacted]"));
        assert!(rendered.contains("[unset]"));
        assert!(!rendered.contains("sk-live-very-secret"));
        assert!(!rendered.contains("whsec_abc"));
    }

    #[test]
    fn validate_rejects_plaintext_webhook_endpoint() {
        let mut config = Config::default();
        config.webhook_endpoint = "http://internal-webhook.company.com/process".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn region_prefers_explicit_config() {
        let mut config = Config::default();
        config.aws_region = Some("eu-central-1".to_string());
        assert_eq!(config.region().as_deref(), Some("eu-central-1"));
    }
}
