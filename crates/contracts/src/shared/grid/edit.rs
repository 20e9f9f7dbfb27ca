use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/grid/{grid}/update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCellRequest {
    pub pk: String,
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCellResponse {
    pub status: UpdateStatus,
    #[serde(default)]
    pub message: String,
}

impl UpdateCellResponse {
    pub fn success() -> Self {
        Self {
            status: UpdateStatus::Success,
            message: "Record aggiornato".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: UpdateStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UpdateStatus::Success
    }
}
