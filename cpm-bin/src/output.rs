use cpm_common::{CpmError, ModuleFailure, ModuleResult, Result, SerialPortStatusFetcher};
use serde::Serialize;
use tracing::error;

/// The single JSON object printed for the automation host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success(ModuleResult),
    Failure(ModuleFailure),
}

impl Envelope {
    pub fn is_failure(&self) -> bool {
        matches!(self, Envelope::Failure(_))
    }

    /// 0 on success, 1 on failure.
    pub fn exit_code(&self) -> u8 {
        u8::from(self.is_failure())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<CpmError> for Envelope {
    fn from(err: CpmError) -> Self {
        error!(error = %err, "module failed");
        Envelope::Failure(ModuleFailure::from(err))
    }
}

impl From<Result<ModuleResult>> for Envelope {
    fn from(outcome: Result<ModuleResult>) -> Self {
        match outcome {
            Ok(result) => Envelope::Success(result),
            Err(err) => Envelope::from(err),
        }
    }
}

/// Runs one query and wraps its outcome.
pub async fn run_module(fetcher: &dyn SerialPortStatusFetcher) -> Envelope {
    Envelope::from(fetcher.fetch().await)
}
