//! # WTI CPM Serial Port Status Client
//!
//! Retrieves the connection status of the serial ports of a WTI OOB or PDU
//! device through its `serialportsaction` REST endpoint.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cpm_sdk::{CpmClient, PortSelector, SerialPortActionInfoParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let params = SerialPortActionInfoParams::new("nonexist.wti.com", "super")
//!         .with_username("super")
//!         .with_https(true)
//!         .with_ports(PortSelector::new(["2", "4"]));
//!
//!     let client = CpmClient::new(params)?;
//!     let result = client.serial_port_action_info().await?;
//!
//!     println!("{}", result.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! | `cpm_username` | Header | Path |
//! |----------------|--------|------|
//! | non-empty | `Authorization: Basic base64(user:password)` | `/api/v2/config/serialportsaction` |
//! | empty or missing | `X-WTI-API-KEY: <token>` | `/api/v2/token/config/serialportsaction` |
//!
//! Each call issues exactly one GET and never retries. Failures come back as
//! [`CpmError`] variants whose message names the request URL.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

mod classify;
pub mod request;

pub use cpm_common::{
    CpmError, ModuleFailure, ModuleResult, PortSelector, Result, Secret,
    SerialPortActionInfoParams, SerialPortStatusFetcher,
};
pub use request::{basic_auth_value, Credentials, RequestPlan, API_KEY_HEADER};

use classify::{classify_request_error, client_build_error};

/// Client bound to one appliance and one port selection.
///
/// TLS verification, proxy handling and the timeout are fixed when the
/// client is built, so a `CpmClient` is created per parameter set.
pub struct CpmClient {
    client: Client,
    plan: RequestPlan,
    headers: HeaderMap,
}

impl CpmClient {
    /// Validates `params` and prepares the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`CpmError::InvalidParameter`] when the parameters are
    /// rejected, for example an empty `cpm_url` or a token that cannot be
    /// sent as a header value, and [`CpmError::Connection`] when the HTTP
    /// client cannot be set up.
    pub fn new(params: SerialPortActionInfoParams) -> Result<Self> {
        let params = params.validate()?;
        let plan = RequestPlan::from_params(&params);
        let headers = plan.headers()?;

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(params.timeout))
            .danger_accept_invalid_certs(!params.validate_certs);
        if !params.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| client_build_error(&plan.url, e))?;

        debug!(
            url = %plan.url,
            token_mode = plan.credentials.is_token(),
            validate_certs = params.validate_certs,
            use_proxy = params.use_proxy,
            "prepared serial port status request"
        );

        Ok(Self {
            client,
            plan,
            headers,
        })
    }

    /// The full request URL, including the `ports` query.
    pub fn url(&self) -> &str {
        &self.plan.url
    }

    pub fn plan(&self) -> &RequestPlan {
        &self.plan
    }

    /// Fetch the connection status of the selected serial ports.
    ///
    /// The decoded body is returned untouched as `data`; the device usually
    /// answers with a list of `{"port": .., "connstatus": ..}` objects.
    ///
    /// # Errors
    ///
    /// - [`CpmError::Http`] for a non-success status
    /// - [`CpmError::Lookup`] when the host cannot be resolved or the URL is malformed
    /// - [`CpmError::Tls`] when the TLS handshake or certificate validation fails
    /// - [`CpmError::Connection`] when the connection is refused, reset or times out
    /// - [`CpmError::Decode`] when the body is not valid JSON
    pub async fn serial_port_action_info(&self) -> Result<ModuleResult> {
        let url = self.plan.url.as_str();

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| {
                let err = classify_request_error(url, e);
                warn!(error = %err, "serial port status request failed");
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let err = CpmError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                message: format!(
                    "HTTP Error {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            };
            warn!(status = status.as_u16(), error = %err, "appliance returned an error status");
            return Err(err);
        }

        // Decode the raw bytes; invalid UTF-8 must fail rather than be replaced.
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_request_error(url, e))?;
        let data: Value = serde_json::from_slice(&body).map_err(|e| CpmError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        info!(status = status.as_u16(), "retrieved serial port connection status");
        Ok(ModuleResult::unchanged(data))
    }
}

#[async_trait]
impl SerialPortStatusFetcher for CpmClient {
    async fn fetch(&self) -> Result<ModuleResult> {
        self.serial_port_action_info().await
    }
}

/// One-shot helper: build a client for `params` and run the query.
pub async fn serial_port_action_info(params: SerialPortActionInfoParams) -> Result<ModuleResult> {
    CpmClient::new(params)?.serial_port_action_info().await
}
