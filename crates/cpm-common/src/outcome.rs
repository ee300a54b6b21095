use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CpmError;

/// Successful module outcome. `data` is whatever JSON the appliance sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleResult {
    pub changed: bool,
    pub data: Value,
}

impl ModuleResult {
    /// Read-only queries never report a change.
    pub fn unchanged(data: Value) -> Self {
        Self {
            changed: false,
            data,
        }
    }
}

/// Failed module outcome, as reported back to the automation host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFailure {
    pub failed: bool,
    pub changed: bool,
    pub msg: String,
}

impl ModuleFailure {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            changed: false,
            msg: msg.into(),
        }
    }
}

impl From<&CpmError> for ModuleFailure {
    fn from(err: &CpmError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<CpmError> for ModuleFailure {
    fn from(err: CpmError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_serialization() {
        let result = ModuleResult::unchanged(json!([{"port": 2, "connstatus": "Free"}]));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"changed": false, "data": [{"port": 2, "connstatus": "Free"}]})
        );
    }

    #[test]
    fn test_failure_from_error() {
        let err = CpmError::Connection {
            url: "http://pdu/api/v2/config/serialportsaction?ports=*".to_string(),
            message: "Connection refused".to_string(),
        };
        let failure = ModuleFailure::from(err);
        assert!(failure.failed);
        assert!(!failure.changed);
        assert!(failure.msg.starts_with("GET: Error connecting to http://pdu/"));

        let value = serde_json::to_value(&failure).unwrap();
        assert!(value.get("data").is_none());
    }
}
