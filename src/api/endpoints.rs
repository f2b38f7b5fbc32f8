use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiClient, ApiError, RequestBody};
use crate::task::{NewTask, Task};

/// Display name sent on registration. The form has no name field.
pub const PLACEHOLDER_NAME: &str = "User";

const HEALTH_PATH: &str = "/";
const TOKEN_PATH: &str = "/api/v1/token";
const REGISTER_PATH: &str = "/api/v1/register";
const TASKS_PATH: &str = "/api/v1/tasks/";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .field("name", &self.name)
            .finish()
    }
}

impl From<Credentials> for RegisterRequest {
    fn from(credentials: Credentials) -> Self {
        Self {
            email: credentials.email,
            password: credentials.password,
            name: PLACEHOLDER_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub message: String,
}

impl ApiClient {
    /// Exchanges credentials for a bearer token.
    ///
    /// The token endpoint follows the OAuth2 password grant and only accepts a
    /// form-urlencoded body, with the email sent as `username`.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        let body = RequestBody::form([
            ("username", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ]);
        let token: TokenResponse = self.post(TOKEN_PATH, body, None).await?;
        info!(email = %credentials.email, "logged in");
        Ok(token)
    }

    /// Creates an account. The response body is not used.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .post(REGISTER_PATH, RequestBody::json(request)?, None)
            .await?;
        info!(email = %request.email, "registered account");
        Ok(())
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get(TASKS_PATH).await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.post(TASKS_PATH, RequestBody::json(task)?, None).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("{TASKS_PATH}{id}")).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get(HEALTH_PATH).await
    }
}
