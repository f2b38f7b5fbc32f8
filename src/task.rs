use serde::{Deserialize, Serialize};

/// Description sent with every new task. The client has no field for it yet.
pub const PLACEHOLDER_DESCRIPTION: &str = "Crypto analysis";

/// A task as returned by `/api/v1/tasks/`. Ids are assigned by the backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
}

/// Body of `POST /api/v1/tasks/`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

impl NewTask {
    pub fn from_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: PLACEHOLDER_DESCRIPTION.to_string(),
        }
    }
}
