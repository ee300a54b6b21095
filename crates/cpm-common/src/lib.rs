// Shared types for the WTI CPM serial port status module.
// Re-export dependencies used in public interfaces of common types

use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use serde_json;
use thiserror::Error;

mod outcome;
mod params;
mod ports;
mod secret;

pub use outcome::{ModuleFailure, ModuleResult};
pub use params::{SerialPortActionInfoParams, DEFAULT_TIMEOUT_SECS};
pub use ports::{PortSelector, ALL_PORTS};
pub use secret::Secret;

/// Every way a serial port status query can fail.
///
/// The transport variants carry the fully built request URL and the
/// underlying error text, so the rendered message is what the automation
/// host shows to the operator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CpmError {
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("GET: Received HTTP error for {url} : {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    #[error("GET: Failed lookup url for {url} : {message}")]
    Lookup { url: String, message: String },

    #[error("GET: Error validating the server's certificate for {url} : {message}")]
    Tls { url: String, message: String },

    #[error("GET: Error connecting to {url} : {message}")]
    Connection { url: String, message: String },

    #[error("GET: Invalid JSON response from {url} : {message}")]
    Decode { url: String, message: String },
}

impl CpmError {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// The request URL the failure relates to, if a request was planned.
    pub fn url(&self) -> Option<&str> {
        match self {
            CpmError::InvalidParameter { .. } => None,
            CpmError::Http { url, .. }
            | CpmError::Lookup { url, .. }
            | CpmError::Tls { url, .. }
            | CpmError::Connection { url, .. }
            | CpmError::Decode { url, .. } => Some(url),
        }
    }
}

// Define the primary Result type for CPM operations
pub type Result<T> = std::result::Result<T, CpmError>;

/// A source of serial port connection status.
///
/// Implementors issue at most one request per call and never retry.
#[async_trait]
pub trait SerialPortStatusFetcher: Send + Sync {
    async fn fetch(&self) -> Result<ModuleResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_url() {
        let url = "https://pdu.example.com/api/v2/config/serialportsaction?ports=2".to_string();
        let err = CpmError::Http {
            url: url.clone(),
            status: 500,
            message: "HTTP Error 500: Internal Server Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            format!("GET: Received HTTP error for {url} : HTTP Error 500: Internal Server Error")
        );
        assert_eq!(err.url(), Some(url.as_str()));

        let tls = CpmError::Tls {
            url: url.clone(),
            message: "certificate verify failed".to_string(),
        };
        let conn = CpmError::Connection {
            url: url.clone(),
            message: "certificate verify failed".to_string(),
        };
        assert_ne!(tls.to_string(), conn.to_string());
        assert!(tls
            .to_string()
            .starts_with("GET: Error validating the server's certificate for https://"));
    }

    #[test]
    fn test_invalid_parameter_has_no_url() {
        let err = CpmError::invalid_parameter("cpm_url", "must not be empty");
        assert_eq!(err.to_string(), "Invalid parameter cpm_url: must not be empty");
        assert!(err.url().is_none());
    }
}
