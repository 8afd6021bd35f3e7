//! Status feed message types.

use serde::{Deserialize, Serialize};

/// Per-step state carried by a status event.
///
/// The feed is a plain string on the wire; anything outside the known set is
/// preserved verbatim so a newer server never breaks decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepStatus {
    Processing,
    Complete,
    Success,
    Error,
    Other(String),
}

impl StepStatus {
    /// Terminal-success rendering class (`Complete` and `Success` are
    /// equivalent on the wire).
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Complete | StepStatus::Success)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StepStatus::Error)
    }
}

impl From<String> for StepStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Processing" => StepStatus::Processing,
            "Complete" => StepStatus::Complete,
            "Success" => StepStatus::Success,
            "Error" => StepStatus::Error,
            _ => StepStatus::Other(s),
        }
    }
}

impl From<StepStatus> for String {
    fn from(status: StepStatus) -> Self {
        match status {
            StepStatus::Processing => "Processing".to_string(),
            StepStatus::Complete => "Complete".to_string(),
            StepStatus::Success => "Success".to_string(),
            StepStatus::Error => "Error".to_string(),
            StepStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Processing => write!(f, "Processing"),
            StepStatus::Complete => write!(f, "Complete"),
            StepStatus::Success => write!(f, "Success"),
            StepStatus::Error => write!(f, "Error"),
            StepStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

impl Default for StepStatus {
    fn default() -> Self {
        StepStatus::Processing
    }
}

/// One pushed progress message.
///
/// `step` is the stable identity: later events for the same step replace the
/// earlier rendering instead of appending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    #[serde(default = "unknown_step")]
    pub step: String,
    #[serde(default)]
    pub status: StepStatus,
    /// Human-readable progress detail; absent or null on the wire when the
    /// backend has nothing to say.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub details: String,
    /// Server-side epoch timestamp, when the backend attaches one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl StatusEvent {
    pub fn new(step: &str, status: StepStatus, details: &str) -> Self {
        Self {
            step: step.to_string(),
            status,
            details: details.to_string(),
            timestamp: None,
        }
    }
}

fn unknown_step() -> String {
    "unknown".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
