//! Login / register screen state.

use tracing::warn;

use crate::api::{ApiError, Credentials, RegisterRequest, TokenResponse};
use crate::app::{Effect, Notice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn title(self) -> &'static str {
        match self {
            AuthMode::Login => "Crypto Login",
            AuthMode::Register => "Register",
        }
    }

    pub fn toggle_hint(self) -> &'static str {
        match self {
            AuthMode::Login => "Need account? Register",
            AuthMode::Register => "Have account? Login",
        }
    }
}

/// What happens to the typed email and password when switching modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TogglePolicy {
    #[default]
    Preserve,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    mode: AuthMode,
    email: String,
    password: String,
    focus: AuthField,
    policy: TogglePolicy,
    notice: Option<Notice>,
}

impl AuthForm {
    pub fn new(policy: TogglePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn focus(&self) -> AuthField {
        self.focus
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn input(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            AuthField::Email => AuthField::Password,
            AuthField::Password => AuthField::Email,
        };
    }

    pub fn toggle(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        if self.policy == TogglePolicy::Clear {
            self.email.clear();
            self.password.clear();
            self.focus = AuthField::Email;
        }
        self.notice = None;
    }

    /// Builds the request for the current mode. Validation is left to the backend.
    pub fn submit(&mut self) -> Effect {
        self.notice = None;
        let credentials = Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        };
        match self.mode {
            AuthMode::Login => Effect::Login(credentials),
            AuthMode::Register => Effect::Register(RegisterRequest::from(credentials)),
        }
    }

    /// Returns the issued token on success; on failure the form keeps its fields.
    pub fn on_login(&mut self, result: Result<TokenResponse, ApiError>) -> Option<TokenResponse> {
        match result {
            Ok(token) => Some(token),
            Err(err) => {
                warn!(error = %err, "login failed");
                self.notice = Some(Notice::error(if err.is_transport() {
                    "Login failed, check the log for details".to_string()
                } else {
                    err.user_message()
                }));
                None
            }
        }
    }

    /// A successful registration returns to login and asks for the password again.
    pub fn on_register(&mut self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.mode = AuthMode::Login;
                self.password.clear();
                self.focus = AuthField::Password;
                self.notice = Some(Notice::info("Registered! Please login."));
            }
            Err(err) => {
                warn!(error = %err, "registration failed");
                self.notice = Some(Notice::error(if err.is_transport() {
                    "Registration failed, check the log for details".to_string()
                } else {
                    err.user_message()
                }));
            }
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::NoticeLevel;
    use reqwest::StatusCode;

    fn filled(policy: TogglePolicy) -> AuthForm {
        let mut form = AuthForm::new(policy);
        "a@test.com".chars().for_each(|c| form.input(c));
        form.next_field();
        "pw".chars().for_each(|c| form.input(c));
        form
    }

    fn rejected(status: u16, payload: serde_json::Value) -> ApiError {
        ApiError::Status {
            method: "POST".to_string(),
            path: "/api/v1/token".to_string(),
            status: StatusCode::from_u16(status).unwrap(),
            text: payload.to_string(),
            payload: Some(payload),
        }
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut form = filled(TogglePolicy::Preserve);
        form.backspace();

        assert_eq!(form.email(), "a@test.com");
        assert_eq!(form.password(), "p");
        assert_eq!(form.focus(), AuthField::Password);
    }

    #[test]
    fn test_login_submit_sends_credentials() {
        let mut form = filled(TogglePolicy::Preserve);

        match form.submit() {
            Effect::Login(credentials) => {
                assert_eq!(credentials.email, "a@test.com");
                assert_eq!(credentials.password, "pw");
            }
            other => panic!("expected login effect, got {other:?}"),
        }
    }

    #[test]
    fn test_register_submit_uses_placeholder_name() {
        let mut form = filled(TogglePolicy::Preserve);
        form.toggle();

        match form.submit() {
            Effect::Register(request) => {
                assert_eq!(request.email, "a@test.com");
                assert_eq!(request.name, "User");
            }
            other => panic!("expected register effect, got {other:?}"),
        }
    }

    #[test]
    fn test_submit_does_not_validate_locally() {
        let mut form = AuthForm::new(TogglePolicy::Preserve);
        assert!(matches!(form.submit(), Effect::Login(c) if c == Credentials::default()));
    }

    #[test]
    fn test_toggle_preserves_fields_by_default() {
        let mut form = filled(TogglePolicy::Preserve);
        form.toggle();

        assert_eq!(form.mode(), AuthMode::Register);
        assert_eq!(form.email(), "a@test.com");
        assert_eq!(form.password(), "pw");

        form.toggle();
        assert_eq!(form.mode(), AuthMode::Login);
    }

    #[test]
    fn test_toggle_clears_fields_when_configured() {
        let mut form = filled(TogglePolicy::Clear);
        form.toggle();

        assert_eq!(form.mode(), AuthMode::Register);
        assert!(form.email().is_empty());
        assert!(form.password().is_empty());
        assert_eq!(form.focus(), AuthField::Email);
    }

    #[test]
    fn test_login_failure_keeps_fields_and_shows_detail() {
        let mut form = filled(TogglePolicy::Preserve);
        let token = form.on_login(Err(rejected(
            400,
            serde_json::json!({"detail": "Incorrect email or password"}),
        )));

        assert!(token.is_none());
        assert_eq!(form.mode(), AuthMode::Login);
        assert_eq!(form.password(), "pw");
        let notice = form.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.text, "Incorrect email or password");
    }

    #[test]
    fn test_login_success_returns_token() {
        let mut form = filled(TogglePolicy::Preserve);
        let token = form.on_login(Ok(TokenResponse {
            access_token: "tok123".to_string(),
            token_type: "bearer".to_string(),
        }));

        assert_eq!(token.unwrap().access_token, "tok123");
    }

    #[test]
    fn test_register_success_switches_to_login_and_clears_password() {
        let mut form = filled(TogglePolicy::Preserve);
        form.toggle();
        form.on_register(Ok(()));

        assert_eq!(form.mode(), AuthMode::Login);
        assert_eq!(form.email(), "a@test.com");
        assert!(form.password().is_empty());
        assert_eq!(form.notice().unwrap().level, NoticeLevel::Info);
    }

    #[test]
    fn test_register_validation_error_names_field() {
        let mut form = filled(TogglePolicy::Preserve);
        form.toggle();
        form.on_register(Err(rejected(
            422,
            serde_json::json!({"detail": [{"msg": "not a valid email", "loc": ["body", "email"]}]}),
        )));

        assert_eq!(form.mode(), AuthMode::Register);
        let text = &form.notice().unwrap().text;
        assert!(text.contains("not a valid email"));
        assert!(text.contains("email"));
    }
}
