use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{CpmError, PortSelector, Result, Secret};

/// Request timeout applied when none is given, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Keys recognised in an args object. Anything else is rejected, except
/// host-internal keys carrying the `_ansible_` prefix.
const KNOWN_KEYS: &[&str] = &[
    "cpm_url",
    "cpm_username",
    "cpm_password",
    "use_https",
    "validate_certs",
    "use_proxy",
    "port",
    "timeout",
];
const HOST_KEY_PREFIX: &str = "_ansible_";

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Parameters of a serial port connection status query.
///
/// Field names follow the module's argument names so an args object from the
/// automation host deserializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialPortActionInfoParams {
    /// Host name or `host:port` of the appliance, without scheme.
    pub cpm_url: String,
    /// Empty or missing selects token mode.
    #[serde(default)]
    pub cpm_username: Option<String>,
    /// Password, or the user token when no username is given.
    pub cpm_password: Secret,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub use_https: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub validate_certs: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub use_proxy: bool,
    #[serde(default)]
    pub port: PortSelector,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl SerialPortActionInfoParams {
    pub fn new(cpm_url: impl Into<String>, cpm_password: impl Into<Secret>) -> Self {
        Self {
            cpm_url: cpm_url.into(),
            cpm_username: None,
            cpm_password: cpm_password.into(),
            use_https: false,
            validate_certs: false,
            use_proxy: false,
            port: PortSelector::default(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Parse and validate an args object.
    pub fn from_args(args: Value) -> Result<Self> {
        let Value::Object(map) = args else {
            return Err(CpmError::invalid_parameter(
                "args",
                "expected a JSON object of module arguments",
            ));
        };
        reject_unknown_keys(&map)?;

        let params: Self = serde_json::from_value(Value::Object(map))
            .map_err(|e| CpmError::invalid_parameter("args", e.to_string()))?;
        params.validate()
    }

    pub fn from_args_str(args: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(args)
            .map_err(|e| CpmError::invalid_parameter("args", e.to_string()))?;
        Self::from_args(value)
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.cpm_username = Some(username.into());
        self
    }

    pub fn with_https(mut self, enabled: bool) -> Self {
        self.use_https = enabled;
        self
    }

    pub fn with_validate_certs(mut self, enabled: bool) -> Self {
        self.validate_certs = enabled;
        self
    }

    pub fn with_proxy(mut self, enabled: bool) -> Self {
        self.use_proxy = enabled;
        self
    }

    pub fn with_ports(mut self, port: PortSelector) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// The username, when one is set and non-empty.
    pub fn username(&self) -> Option<&str> {
        self.cpm_username.as_deref().filter(|u| !u.is_empty())
    }

    pub fn is_token_mode(&self) -> bool {
        self.username().is_none()
    }

    pub fn validate(self) -> Result<Self> {
        if self.cpm_url.trim().is_empty() {
            return Err(CpmError::invalid_parameter("cpm_url", "must not be empty"));
        }
        if self.port.is_empty() {
            return Err(CpmError::invalid_parameter(
                "port",
                "at least one port or '*' is required",
            ));
        }
        if self.timeout == 0 {
            return Err(CpmError::invalid_parameter(
                "timeout",
                "must be greater than zero",
            ));
        }
        Ok(self)
    }
}

fn reject_unknown_keys(map: &Map<String, Value>) -> Result<()> {
    let mut unknown: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|k| !KNOWN_KEYS.contains(k) && !k.starts_with(HOST_KEY_PREFIX))
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    unknown.sort_unstable();
    Err(CpmError::invalid_parameter(
        "args",
        format!("unsupported parameters: {}", unknown.join(", ")),
    ))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Booleans as the automation host writes them: JSON booleans, 0/1, or
/// yes/no style strings.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    use serde::de::Error;

    match RawFlag::deserialize(deserializer)? {
        RawFlag::Bool(b) => Ok(b),
        RawFlag::Int(1) => Ok(true),
        RawFlag::Int(0) => Ok(false),
        RawFlag::Int(n) => Err(D::Error::custom(format!("{n} is not a valid boolean"))),
        RawFlag::Text(s) => parse_flag(&s)
            .ok_or_else(|| D::Error::custom(format!("'{s}' is not a valid boolean"))),
    }
}

/// Parses yes/no style strings.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "on" | "1" | "true" | "t" => Some(true),
        "n" | "no" | "off" | "0" | "false" | "f" => Some(false),
        _ => None,
    }
}
