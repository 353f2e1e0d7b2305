//! Structured error types for datarelay
//!
//! Provides type-safe error handling with rich context for debugging,
//! operator-friendly messages, and retry classification.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Primary error type for datarelay operations
#[derive(Error, Debug)]
pub enum RelayError {
    // =========================================================================
    // External API Errors
    // =========================================================================
    /// Authentication/authorization errors
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Invalid API key or token
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    /// Rate limit exceeded (429)
    #[error("rate limit exceeded")]
    RateLimitExceeded { retry_after: Option<Duration> },

    /// API returned a non-success status
    #[error("api error: {status} - {message}")]
    ApiError { status: u16, message: String },

    // =========================================================================
    // Database Errors
    // =========================================================================
    /// Record not found
    #[error("user not found: {user_id}")]
    UserNotFound { user_id: i64 },

    /// Query or connection failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    // =========================================================================
    // Cloud Storage Errors
    // =========================================================================
    /// Upload failed; the message never carries credentials
    #[error("cloud upload failed for {key}: {message}")]
    UploadFailed { key: String, message: String },

    /// Local file missing or unreadable before upload
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    // =========================================================================
    // Mail Errors
    // =========================================================================
    /// SMTP delivery failure; the message never carries credentials
    #[error("mail delivery failed: {message}")]
    MailFailed { message: String },

    /// Recipient or sender address did not parse
    #[error("invalid mail address: {address}")]
    InvalidAddress { address: String },

    // =========================================================================
    // Webhook Errors
    // =========================================================================
    /// Signature verification failed
    #[error("webhook signature rejected")]
    SignatureRejected,

    /// Payload missing required fields or malformed
    #[error("invalid webhook payload: {reason}")]
    InvalidPayload { reason: String },

    /// Forwarding endpoint rejected the relay
    #[error("webhook forward failed: {status}")]
    ForwardFailed { status: u16 },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Missing required config
    #[error("missing required configuration: {key}")]
    MissingConfig { key: String },

    // =========================================================================
    // Network / System Errors
    // =========================================================================
    /// Network/connection error
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Timeout
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Service unavailable (maintenance, 503)
    #[error("service temporarily unavailable")]
    ServiceUnavailable,

    // =========================================================================
    // External Error Wrappers
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl RelayError {
    /// Check if error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } => true,
            Self::Timeout { .. } => true,
            Self::ServiceUnavailable => true,
            Self::RateLimitExceeded { .. } => true,

            // API errors - depends on status
            Self::ApiError { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::ForwardFailed { status } => matches!(status, 429 | 500 | 502 | 503 | 504),

            // IO errors - some are retryable
            Self::Io(io_err) => matches!(
                io_err.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
            ),

            // Never retry these
            Self::Unauthorized { .. }
            | Self::InvalidCredentials { .. }
            | Self::UserNotFound { .. }
            | Self::Database(_)
            | Self::UploadFailed { .. }
            | Self::FileNotFound { .. }
            | Self::MailFailed { .. }
            | Self::InvalidAddress { .. }
            | Self::SignatureRejected
            | Self::InvalidPayload { .. }
            | Self::InvalidConfig { .. }
            | Self::MissingConfig { .. }
            | Self::Json(_)
            | Self::Http(_) => false,
        }
    }

    /// Get suggested retry delay for retryable errors
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            Self::RateLimitExceeded { retry_after } => {
                Some(retry_after.unwrap_or(Duration::from_secs(5)))
            }
            Self::Timeout { .. } => Some(Duration::from_secs(1)),
            Self::ConnectionFailed { .. } => Some(Duration::from_secs(2)),
            Self::ServiceUnavailable => Some(Duration::from_secs(10)),
            _ => None,
        }
    }

    /// Get an operator-friendly message.
    ///
    /// Must never embed credentials or tokens, including on auth failures.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { .. } | Self::InvalidCredentials { .. } => {
                "Authentication failed. Check the configured API key.".to_string()
            }
            Self::RateLimitExceeded { .. } => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            Self::SignatureRejected => {
                "Webhook signature did not match. The payload was discarded.".to_string()
            }
            Self::UploadFailed { key, .. } => {
                format!("Upload of '{}' failed. See logs for details.", key)
            }
            Self::MailFailed { .. } => {
                "Notification email could not be delivered.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias using RelayError
pub type Result<T> = std::result::Result<T, RelayError>;

/// Extension trait for converting Option to Result with RelayError
pub trait OptionExt<T> {
    fn ok_or_missing(self, key: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing(self, key: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| RelayError::MissingConfig { key: key.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(RelayError::Timeout {
            duration: Duration::from_secs(10)
        }
        .is_retryable());

        assert!(RelayError::ApiError {
            status: 503,
            message: "down".to_string()
        }
        .is_retryable());

        assert!(!RelayError::Unauthorized {
            message: "bad token".to_string()
        }
        .is_retryable());

        assert!(!RelayError::SignatureRejected.is_retryable());
    }

    #[test]
    fn test_user_messages_carry_no_secrets() {
        let err = RelayError::InvalidCredentials {
            reason: "key sk-live-1234 malformed".to_string(),
        };
        let msg = err.user_message();
        assert!(!msg.contains("sk-live-1234"));
        assert!(msg.contains("API key"));
    }

    #[test]
    fn test_option_ext() {
        let opt: Option<i32> = None;
        let result = opt.ok_or_missing("api_key");
        assert!(matches!(result, Err(RelayError::MissingConfig { .. })));
    }

    #[test]
    fn test_retry_delay_honours_retry_after() {
        let err = RelayError::RateLimitExceeded {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(err.retry_delay(), Some(Duration::from_secs(30)));

        let err = RelayError::RateLimitExceeded { retry_after: None };
        assert_eq!(err.retry_delay(), Some(Duration::from_secs(5)));
    }
}
