//! Screen controller.
//!
//! `App::update` is the only place state changes. It never performs I/O: it
//! returns effects for the runtime, which reports back with outcome events.
//! Every screen change bumps the view generation, and outcomes tagged with an
//! older generation are dropped so late responses cannot touch a screen the
//! user has already left.

use tracing::{debug, error, info};

use crate::api::{ApiError, Credentials, RegisterRequest, TokenResponse};
use crate::auth::{AuthForm, TogglePolicy};
use crate::session::Session;
use crate::task::{NewTask, Task};
use crate::task_board::TaskBoard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-line message shown under the active screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Requests for the runtime to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Login(Credentials),
    Register(RegisterRequest),
    LoadTasks,
    CreateTask(NewTask),
    DeleteTask(i64),
}

/// Result of an executed effect.
#[derive(Debug)]
pub enum Outcome {
    LoggedIn(Result<TokenResponse, ApiError>),
    Registered(Result<(), ApiError>),
    TasksLoaded(Result<Vec<Task>, ApiError>),
    TaskCreated(Result<Task, ApiError>),
    TaskDeleted { id: i64, result: Result<(), ApiError> },
}

/// User intents, already translated from key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Input(char),
    Backspace,
    NextField,
    Submit,
    ToggleMode,
    SelectNext,
    SelectPrevious,
    RequestDelete,
    Confirm,
    Cancel,
    Reload,
    Quit,
}

#[derive(Debug)]
pub enum AppEvent {
    Command(Command),
    Outcome { generation: u64, outcome: Outcome },
}

#[derive(Debug)]
pub enum Screen {
    Auth(AuthForm),
    Tasks(TaskBoard),
}

#[derive(Debug)]
pub struct App {
    screen: Screen,
    session: Session,
    policy: TogglePolicy,
    generation: u64,
    should_quit: bool,
}

impl App {
    /// Starts on the task board when a token is already stored, otherwise on login.
    pub fn new(session: Session, policy: TogglePolicy) -> (Self, Vec<Effect>) {
        let mut app = Self {
            screen: Screen::Auth(AuthForm::new(policy)),
            session,
            policy,
            generation: 0,
            should_quit: false,
        };
        let effects = if app.session.is_authenticated() {
            app.show_tasks()
        } else {
            vec![]
        };
        (app, effects)
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn update(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Command(Command::Quit) => {
                self.should_quit = true;
                vec![]
            }
            AppEvent::Command(command) => match &mut self.screen {
                Screen::Auth(form) => auth_command(form, command),
                Screen::Tasks(board) => board_command(board, command),
            },
            AppEvent::Outcome {
                generation,
                outcome,
            } => {
                if generation != self.generation {
                    debug!(
                        generation,
                        current = self.generation,
                        "dropping outcome for inactive view"
                    );
                    return vec![];
                }
                self.apply_outcome(outcome)
            }
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) -> Vec<Effect> {
        if outcome_unauthorized(&outcome) {
            info!("session rejected by backend, returning to login");
            self.show_auth(Some(Notice::error(
                "Session expired, please log in again.",
            )));
            return vec![];
        }

        let outcome = match outcome {
            Outcome::LoggedIn(result) => return self.on_logged_in(result),
            other => other,
        };
        match (outcome, &mut self.screen) {
            (Outcome::Registered(result), Screen::Auth(form)) => {
                form.on_register(result);
                vec![]
            }
            (Outcome::TasksLoaded(result), Screen::Tasks(board)) => {
                board.on_loaded(result);
                vec![]
            }
            (Outcome::TaskCreated(result), Screen::Tasks(board)) => board.on_created(result),
            (Outcome::TaskDeleted { id, result }, Screen::Tasks(board)) => {
                board.on_deleted(id, result)
            }
            (outcome, _) => {
                debug!(?outcome, "outcome does not apply to the current screen");
                vec![]
            }
        }
    }

    fn on_logged_in(&mut self, result: Result<TokenResponse, ApiError>) -> Vec<Effect> {
        let Screen::Auth(form) = &mut self.screen else {
            return vec![];
        };
        let Some(token) = form.on_login(result) else {
            return vec![];
        };
        if let Err(err) = self.session.set_token(token.access_token) {
            error!(error = %err, "failed to persist session token");
            form.set_notice(Notice::error(format!("Could not save session: {err}")));
            return vec![];
        }
        self.show_tasks()
    }

    fn show_auth(&mut self, notice: Option<Notice>) {
        self.generation += 1;
        let form = AuthForm::new(self.policy);
        self.screen = Screen::Auth(match notice {
            Some(notice) => form.with_notice(notice),
            None => form,
        });
    }

    fn show_tasks(&mut self) -> Vec<Effect> {
        self.generation += 1;
        let board = TaskBoard::new();
        let effects = vec![board.load()];
        self.screen = Screen::Tasks(board);
        effects
    }
}

fn auth_command(form: &mut AuthForm, command: Command) -> Vec<Effect> {
    match command {
        Command::Input(c) => form.input(c),
        Command::Backspace => form.backspace(),
        Command::NextField => form.next_field(),
        Command::ToggleMode => form.toggle(),
        Command::Submit => return vec![form.submit()],
        _ => {}
    }
    vec![]
}

fn board_command(board: &mut TaskBoard, command: Command) -> Vec<Effect> {
    if board.pending_delete().is_some() {
        return match command {
            Command::Confirm => board.confirm_delete().into_iter().collect(),
            Command::Cancel => {
                board.cancel_delete();
                vec![]
            }
            _ => vec![],
        };
    }

    match command {
        Command::Input(c) => board.input(c),
        Command::Backspace => board.backspace(),
        Command::SelectNext => board.select_next(),
        Command::SelectPrevious => board.select_previous(),
        Command::RequestDelete => {
            board.request_delete();
        }
        Command::Submit => return board.submit_draft().into_iter().collect(),
        Command::Reload => return vec![board.load()],
        _ => {}
    }
    vec![]
}

/// Whether a task call was refused for a missing or expired token.
fn outcome_unauthorized(outcome: &Outcome) -> bool {
    fn rejected<T>(result: &Result<T, ApiError>) -> bool {
        matches!(result, Err(err) if err.is_unauthorized())
    }

    match outcome {
        Outcome::TasksLoaded(result) => rejected(result),
        Outcome::TaskCreated(result) => rejected(result),
        Outcome::TaskDeleted { result, .. } => rejected(result),
        Outcome::LoggedIn(_) | Outcome::Registered(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMode;
    use reqwest::StatusCode;

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            owner_id: None,
        }
    }

    fn unauthorized() -> ApiError {
        ApiError::Status {
            method: "GET".to_string(),
            path: "/api/v1/tasks/".to_string(),
            status: StatusCode::UNAUTHORIZED,
            payload: Some(serde_json::json!({"detail": "Invalid token"})),
            text: r#"{"detail":"Invalid token"}"#.to_string(),
        }
    }

    fn outcome(app: &App, outcome: Outcome) -> AppEvent {
        AppEvent::Outcome {
            generation: app.generation(),
            outcome,
        }
    }

    fn board(app: &App) -> &TaskBoard {
        match app.screen() {
            Screen::Tasks(board) => board,
            Screen::Auth(_) => panic!("expected task board"),
        }
    }

    fn form(app: &App) -> &AuthForm {
        match app.screen() {
            Screen::Auth(form) => form,
            Screen::Tasks(_) => panic!("expected auth form"),
        }
    }

    #[test]
    fn test_starts_on_login_without_token() {
        let (app, effects) = App::new(Session::in_memory(), TogglePolicy::Preserve);

        assert!(effects.is_empty());
        assert_eq!(form(&app).mode(), AuthMode::Login);
    }

    #[test]
    fn test_starts_on_board_with_stored_token() {
        let session = Session::in_memory();
        session.set_token("tok123").unwrap();

        let (app, effects) = App::new(session, TogglePolicy::Preserve);

        assert_eq!(effects, vec![Effect::LoadTasks]);
        assert!(board(&app).is_empty());
    }

    #[test]
    fn test_login_persists_token_and_loads_tasks() {
        let session = Session::in_memory();
        let (mut app, _) = App::new(session.clone(), TogglePolicy::Preserve);

        let effects = app.update(AppEvent::Command(Command::Submit));
        assert!(matches!(effects.as_slice(), [Effect::Login(_)]));

        let event = outcome(
            &app,
            Outcome::LoggedIn(Ok(TokenResponse {
                access_token: "tok123".to_string(),
                token_type: "bearer".to_string(),
            })),
        );
        let effects = app.update(event);

        assert_eq!(session.token().as_deref(), Some("tok123"));
        assert_eq!(effects, vec![Effect::LoadTasks]);
        assert!(matches!(app.screen(), Screen::Tasks(_)));
    }

    #[test]
    fn test_stale_outcome_is_ignored() {
        let session = Session::in_memory();
        session.set_token("tok123").unwrap();
        let (mut app, _) = App::new(session, TogglePolicy::Preserve);
        let stale_generation = app.generation();

        app.update(outcome(&app, Outcome::TasksLoaded(Err(unauthorized()))));
        assert!(matches!(app.screen(), Screen::Auth(_)));

        let effects = app.update(AppEvent::Outcome {
            generation: stale_generation,
            outcome: Outcome::TasksLoaded(Ok(vec![task(1, "Buy BTC")])),
        });

        assert!(effects.is_empty());
        assert!(matches!(app.screen(), Screen::Auth(_)));
    }

    #[test]
    fn test_unauthorized_returns_to_login_with_notice() {
        let session = Session::in_memory();
        session.set_token("expired").unwrap();
        let (mut app, _) = App::new(session.clone(), TogglePolicy::Preserve);

        app.update(outcome(&app, Outcome::TaskCreated(Err(unauthorized()))));

        let notice = form(&app).notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.contains("log in"));
        assert_eq!(session.token().as_deref(), Some("expired"));
    }

    #[test]
    fn test_delete_waits_for_confirmation() {
        let session = Session::in_memory();
        session.set_token("tok123").unwrap();
        let (mut app, _) = App::new(session, TogglePolicy::Preserve);
        app.update(outcome(&app, Outcome::TasksLoaded(Ok(vec![task(7, "Buy BTC")]))));

        assert!(app.update(AppEvent::Command(Command::RequestDelete)).is_empty());
        assert!(app.update(AppEvent::Command(Command::Input('x'))).is_empty());
        assert!(board(&app).draft_title.is_empty());

        let effects = app.update(AppEvent::Command(Command::Confirm));
        assert_eq!(effects, vec![Effect::DeleteTask(7)]);
    }

    #[test]
    fn test_declined_delete_issues_nothing() {
        let session = Session::in_memory();
        session.set_token("tok123").unwrap();
        let (mut app, _) = App::new(session, TogglePolicy::Preserve);
        app.update(outcome(&app, Outcome::TasksLoaded(Ok(vec![task(7, "Buy BTC")]))));

        app.update(AppEvent::Command(Command::RequestDelete));
        assert!(app.update(AppEvent::Command(Command::Cancel)).is_empty());
        assert!(app.update(AppEvent::Command(Command::Confirm)).is_empty());
    }

    #[test]
    fn test_quit_sets_flag() {
        let (mut app, _) = App::new(Session::in_memory(), TogglePolicy::Preserve);
        app.update(AppEvent::Command(Command::Quit));
        assert!(app.should_quit());
    }

    #[test]
    fn test_register_outcome_on_board_is_ignored() {
        let session = Session::in_memory();
        session.set_token("tok123").unwrap();
        let (mut app, _) = App::new(session, TogglePolicy::Preserve);

        let effects = app.update(outcome(&app, Outcome::Registered(Ok(()))));
        assert!(effects.is_empty());
        assert!(matches!(app.screen(), Screen::Tasks(_)));
    }
}
