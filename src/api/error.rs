//! Errors returned by the API client and how they read on screen.

use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with a non-2xx status.
    #[error("{method} {path} returned {status}")]
    Status {
        method: String,
        path: String,
        status: StatusCode,
        /// Body parsed as JSON, when it was JSON.
        payload: Option<serde_json::Value>,
        /// Raw body text.
        text: String,
    },
    /// A 2xx body did not match the expected shape.
    #[error("unexpected response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The `detail` field of a backend error body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationIssue>),
}

/// One entry of a validation error list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationIssue {
    pub msg: String,
    #[serde(default)]
    pub loc: Vec<LocSegment>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Field(String),
    Index(i64),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

impl ValidationIssue {
    /// The field the issue refers to: the last named segment of `loc`, ignoring
    /// the `body`/`query` prefix.
    pub fn field(&self) -> Option<&str> {
        self.loc.iter().rev().find_map(|segment| match segment {
            LocSegment::Field(name) if !matches!(name.as_str(), "body" | "query" | "path") => {
                Some(name.as_str())
            }
            _ => None,
        })
    }

    pub fn describe(&self) -> String {
        match self.field() {
            Some(field) => format!("{field}: {}", self.msg),
            None => self.msg.clone(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }

    /// Parsed `detail` of a non-2xx response, if the backend sent one.
    pub fn detail(&self) -> Option<ErrorDetail> {
        match self {
            ApiError::Status {
                payload: Some(payload),
                ..
            } => serde_json::from_value::<ErrorBody>(payload.clone())
                .ok()
                .map(|body| body.detail),
            _ => None,
        }
    }

    /// Short message for the notice line.
    ///
    /// Validation lists show their first issue with its field, plain details
    /// are shown as sent, anything else falls back to a generic line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport { .. } => "Request failed, check the log for details".to_string(),
            ApiError::Decode { .. } => "Unexpected response from server".to_string(),
            ApiError::Encode(_) => "Could not encode request".to_string(),
            ApiError::Status { status, .. } => match self.detail() {
                Some(ErrorDetail::Message(message)) => message,
                Some(ErrorDetail::Validation(issues)) => match issues.first() {
                    Some(issue) => issue.describe(),
                    None => format!("Request rejected ({status})"),
                },
                None => format!("Request failed ({status})"),
            },
        }
    }
}
