use cpm_common::{CpmError, Result, SerialPortActionInfoParams};
use serde_json::{Map, Number, Value};
use std::path::Path;
use tracing::debug;

/// Environment variables consulted when no args file is given, paired with
/// the parameter each one sets.
const ENV_PARAMS: &[(&str, &str)] = &[
    ("CPM_URL", "cpm_url"),
    ("CPM_USERNAME", "cpm_username"),
    ("CPM_PASSWORD", "cpm_password"),
    ("CPM_USE_HTTPS", "use_https"),
    ("CPM_VALIDATE_CERTS", "validate_certs"),
    ("CPM_USE_PROXY", "use_proxy"),
    ("CPM_PORT", "port"),
];
const ENV_TIMEOUT: &str = "CPM_TIMEOUT";

/// Loads module parameters from the args file written by the automation
/// host, or from the environment when there is none.
pub fn load_params(args_file: Option<&Path>) -> Result<SerialPortActionInfoParams> {
    match args_file {
        Some(path) => params_from_file(path),
        None => params_from_env(),
    }
}

pub fn params_from_file(path: &Path) -> Result<SerialPortActionInfoParams> {
    debug!(path = %path.display(), "reading module arguments");
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CpmError::invalid_parameter("args", format!("cannot read {}: {e}", path.display()))
    })?;
    SerialPortActionInfoParams::from_args_str(&contents)
}

pub fn params_from_env() -> Result<SerialPortActionInfoParams> {
    params_from_lookup(|key| std::env::var(key).ok())
}

/// Builds parameters from `lookup`, so values go through the same parsing
/// rules as an args file: yes/no flags and comma separated ports.
pub fn params_from_lookup<F>(lookup: F) -> Result<SerialPortActionInfoParams>
where
    F: Fn(&str) -> Option<String>,
{
    let mut args = Map::new();
    for &(var, param) in ENV_PARAMS {
        if let Some(value) = lookup(var) {
            args.insert(param.to_string(), Value::String(value));
        }
    }
    if let Some(raw) = lookup(ENV_TIMEOUT) {
        let seconds: u64 = raw.trim().parse().map_err(|_| {
            CpmError::invalid_parameter("timeout", format!("{ENV_TIMEOUT} must be a whole number of seconds"))
        })?;
        args.insert("timeout".to_string(), Value::Number(Number::from(seconds)));
    }

    debug!(keys = ?args.keys().collect::<Vec<_>>(), "module arguments from environment");
    SerialPortActionInfoParams::from_args(Value::Object(args))
}
