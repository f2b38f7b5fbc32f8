//! Effect execution and the terminal event loop.

use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::Backend;
use ratatui::Terminal;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::api::ApiClient;
use crate::app::{App, AppEvent, Effect, Outcome};
use crate::ui;

/// How long the loop waits for a key before checking for finished requests.
const TICK: Duration = Duration::from_millis(50);

/// Runs one effect against the backend.
pub async fn perform(client: &ApiClient, effect: Effect) -> Outcome {
    match effect {
        Effect::Login(credentials) => Outcome::LoggedIn(client.login(&credentials).await),
        Effect::Register(request) => Outcome::Registered(client.register(&request).await),
        Effect::LoadTasks => Outcome::TasksLoaded(client.list_tasks().await),
        Effect::CreateTask(task) => Outcome::TaskCreated(client.create_task(&task).await),
        Effect::DeleteTask(id) => Outcome::TaskDeleted {
            id,
            result: client.delete_task(id).await,
        },
    }
}

/// Spawns effects on the tokio runtime and routes their outcomes back to the loop.
pub struct Dispatcher {
    client: ApiClient,
    handle: Handle,
    tx: UnboundedSender<AppEvent>,
}

impl Dispatcher {
    pub fn new(client: ApiClient, handle: Handle) -> (Self, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { client, handle, tx }, rx)
    }

    /// Tags each effect with `generation` so stale outcomes can be dropped.
    pub fn dispatch(&self, generation: u64, effects: Vec<Effect>) {
        for effect in effects {
            debug!(generation, ?effect, "dispatching effect");
            let client = self.client.clone();
            let tx = self.tx.clone();
            self.handle.spawn(async move {
                let outcome = perform(&client, effect).await;
                // The receiver is gone only once the loop has exited.
                let _ = tx.send(AppEvent::Outcome {
                    generation,
                    outcome,
                });
            });
        }
    }
}

pub fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dispatcher: &Dispatcher,
    mut outcomes: UnboundedReceiver<AppEvent>,
    initial: Vec<Effect>,
) -> Result<()> {
    dispatcher.dispatch(app.generation(), initial);

    while !app.should_quit() {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("Failed to draw frame")?;

        while let Ok(event) = outcomes.try_recv() {
            let effects = app.update(event);
            dispatcher.dispatch(app.generation(), effects);
        }

        if !event::poll(TICK).context("Failed to poll terminal events")? {
            continue;
        }
        if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(command) = ui::command_for(app, key) {
                let effects = app.update(AppEvent::Command(command));
                dispatcher.dispatch(app.generation(), effects);
            }
        }
    }
    Ok(())
}
