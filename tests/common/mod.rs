#![allow(dead_code)]

use std::collections::VecDeque;

use cryptodesk::api::ApiClient;
use cryptodesk::app::{App, AppEvent, Command, Effect};
use cryptodesk::runtime::perform;
use cryptodesk::session::Session;
use serde_json::{json, Value};
use url::Url;
use wiremock::MockServer;

pub fn client_for(server: &MockServer, session: Session) -> ApiClient {
    ApiClient::new(Url::parse(&server.uri()).unwrap(), session)
}

pub fn task_json(id: i64, title: &str) -> Value {
    json!({"id": id, "title": title, "description": "Crypto analysis", "owner_id": 1})
}

/// Types `text` into the focused field one key at a time.
pub fn type_text(app: &mut App, text: &str) -> Vec<Effect> {
    text.chars()
        .flat_map(|c| app.update(AppEvent::Command(Command::Input(c))))
        .collect()
}

/// Runs effects in order, feeding every outcome back into the app, until
/// nothing is left to do.
pub async fn drive(app: &mut App, client: &ApiClient, effects: Vec<Effect>) {
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        let generation = app.generation();
        let outcome = perform(client, effect).await;
        queue.extend(app.update(AppEvent::Outcome {
            generation,
            outcome,
        }));
    }
}
