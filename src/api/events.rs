use axum::response::sse::Event;
use serde::{Deserialize, Serialize};

use crate::chat::followup::Followup;
use crate::chat::stream::ChatEvent;
use crate::chat::{Request, TurnResult};

/// Body of `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub prompt: String,
}

impl ChatPayload {
    pub fn into_request(self) -> Request {
        Request::new(self.command.unwrap_or_default(), self.prompt)
    }
}

/// Body of `POST /commands/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct InvokePayload {
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// Last event of a turn's stream.
#[derive(Debug, Serialize)]
pub struct TurnComplete {
    pub result: TurnResult,
    pub followups: Vec<Followup>,
}

pub fn chat_event(event: &ChatEvent) -> Result<Event, axum::Error> {
    Event::default().event(event.kind()).json_data(event)
}

pub fn done_event(complete: &TurnComplete) -> Result<Event, axum::Error> {
    Event::default().event("done").json_data(complete)
}
