//! Building the request: credentials, headers and the full URL.

use base64::{engine::general_purpose, Engine as _};
use cpm_common::{CpmError, Result, Secret, SerialPortActionInfoParams};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// Header carrying the user token in token mode.
pub const API_KEY_HEADER: &str = "X-WTI-API-KEY";

const API_ROOT: &str = "/api/v2";
const TOKEN_SEGMENT: &str = "/token";
const SERIAL_PORTS_ACTION: &str = "/config/serialportsaction";

/// How the request authenticates against the appliance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: Secret },
    /// A user token generated on the device.
    ApiKey(Secret),
}

impl Credentials {
    pub fn from_params(params: &SerialPortActionInfoParams) -> Self {
        match params.username() {
            Some(username) => Credentials::Basic {
                username: username.to_string(),
                password: params.cpm_password.clone(),
            },
            None => Credentials::ApiKey(params.cpm_password.clone()),
        }
    }

    pub fn is_token(&self) -> bool {
        matches!(self, Credentials::ApiKey(_))
    }

    fn header(&self) -> Result<(HeaderName, HeaderValue)> {
        let (name, mut value) = match self {
            Credentials::Basic { username, password } => (
                AUTHORIZATION,
                HeaderValue::from_str(&basic_auth_value(username, password))
                    .map_err(|_| CpmError::invalid_parameter("cpm_username", "not valid in an HTTP header"))?,
            ),
            Credentials::ApiKey(token) => (
                HeaderName::from_static("x-wti-api-key"),
                HeaderValue::from_str(token.expose())
                    .map_err(|_| CpmError::invalid_parameter("cpm_password", "not valid in an HTTP header"))?,
            ),
        };
        value.set_sensitive(true);
        Ok((name, value))
    }
}

/// `Basic <base64(username:password)>`
pub fn basic_auth_value(username: &str, password: &Secret) -> String {
    let encoded = general_purpose::STANDARD.encode(format!("{username}:{}", password.expose()));
    format!("Basic {encoded}")
}

/// A fully resolved serial port status request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    pub url: String,
    pub credentials: Credentials,
}

impl RequestPlan {
    pub fn from_params(params: &SerialPortActionInfoParams) -> Self {
        let scheme = if params.use_https { "https://" } else { "http://" };
        // Token mode lives under /api/v2/token/...
        let token = if params.is_token_mode() { TOKEN_SEGMENT } else { "" };
        let url = format!(
            "{scheme}{host}{API_ROOT}{token}{SERIAL_PORTS_ACTION}?ports={ports}",
            host = params.cpm_url,
            ports = params.port.query_value(),
        );

        Self {
            url,
            credentials: Credentials::from_params(params),
        }
    }

    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let (name, value) = self.credentials.header()?;
        headers.insert(name, value);
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpm_common::PortSelector;

    fn params() -> SerialPortActionInfoParams {
        SerialPortActionInfoParams::new("nonexist.wti.com", "super").with_username("super")
    }

    #[test]
    fn test_basic_auth_header() {
        let plan = RequestPlan::from_params(&params());
        let headers = plan.headers().unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Basic c3VwZXI6c3VwZXI=");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(API_KEY_HEADER).is_none());
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn test_token_header() {
        let params = params().with_username("");
        let plan = RequestPlan::from_params(&params);
        let headers = plan.headers().unwrap();

        assert!(plan.credentials.is_token());
        assert_eq!(headers.get(API_KEY_HEADER).unwrap(), "super");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_url_per_auth_mode() {
        let plan = RequestPlan::from_params(&params());
        assert_eq!(
            plan.url,
            "http://nonexist.wti.com/api/v2/config/serialportsaction?ports=*"
        );

        let token = RequestPlan::from_params(&params().with_username(""));
        assert_eq!(
            token.url,
            "http://nonexist.wti.com/api/v2/token/config/serialportsaction?ports=*"
        );
    }

    #[test]
    fn test_url_scheme_and_ports() {
        let single = params().with_https(true).with_ports(PortSelector::new(["2"]));
        let plan = RequestPlan::from_params(&single);
        assert!(plan.url.starts_with("https://"));
        assert!(plan.url.ends_with("?ports=2"));

        let multi = params().with_ports(PortSelector::new(["2", "4"]));
        let plan = RequestPlan::from_params(&multi);
        assert!(plan.url.starts_with("http://"));
        assert!(plan.url.ends_with("?ports=2,4"));
    }

    #[test]
    fn test_host_with_port() {
        let params = params().with_https(true);
        let params = SerialPortActionInfoParams {
            cpm_url: "10.0.0.5:8443".to_string(),
            ..params
        };
        let plan = RequestPlan::from_params(&params);
        assert_eq!(
            plan.url,
            "https://10.0.0.5:8443/api/v2/config/serialportsaction?ports=*"
        );
    }

    #[test]
    fn test_token_with_invalid_header_chars() {
        let params = SerialPortActionInfoParams::new("pdu", "bad\ntoken");
        let err = RequestPlan::from_params(&params).headers().unwrap_err();
        assert!(matches!(err, CpmError::InvalidParameter { ref name, .. } if name == "cpm_password"));
    }
}
