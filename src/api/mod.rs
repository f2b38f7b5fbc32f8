//! HTTP access to the CryptoDesk backend.
//!
//! `ApiClient` resolves paths against the configured base URL and attaches the
//! session's bearer token to every request. Typed endpoint calls live in
//! [`endpoints`].

mod endpoints;
mod error;

pub use endpoints::{Credentials, HealthStatus, RegisterRequest, TokenResponse, PLACEHOLDER_NAME};
pub use error::{ApiError, ErrorDetail, LocSegment, ValidationIssue};

use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};
use url::Url;

use crate::session::Session;

/// Request body encodings the backend accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`.
    Json(serde_json::Value),
    /// Sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }

    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        RequestBody::Form(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Token-bearing client for the backend REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    session: Session,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: Url, session: Session) -> Self {
        Self {
            base_url,
            session,
            http: reqwest::Client::new(),
        }
    }

    /// Joins `path` onto the base URL with exactly one slash between them.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let bytes = self.send(Method::GET, path, None, None).await?;
        decode(path, &bytes)
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        headers: Option<HeaderMap>,
    ) -> Result<T, ApiError> {
        let bytes = self.send(Method::POST, path, Some(body), headers).await?;
        decode(path, &bytes)
    }

    /// Sends a DELETE. Any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None, None).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url_for(path));
        match self.session.token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        headers: Option<HeaderMap>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.url_for(path);
        debug!(%method, %url, "sending request");

        let mut builder = self.request(method.clone(), path);
        builder = match body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Form(pairs)) => builder.form(&pairs),
            None => builder,
        };
        if let Some(headers) = headers {
            builder = builder.headers(headers);
        }

        let response = builder.send().await.map_err(|source| {
            error!(%method, %url, error = %source, "request failed without a response");
            ApiError::Transport {
                url: url.clone(),
                source,
            }
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        debug!(%method, %url, %status, len = bytes.len(), "received response");

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            return Err(ApiError::Status {
                method: method.to_string(),
                path: path.to_string(),
                status,
                payload: serde_json::from_slice(&bytes).ok(),
                text,
            });
        }
        Ok(bytes.to_vec())
    }
}

/// Decodes a success body. An empty body reads as JSON `null`.
fn decode<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Result<T, ApiError> {
    let bytes = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}
