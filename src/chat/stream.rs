use serde::Serialize;
use tokio::sync::mpsc;

use crate::chat::actions::OpenUrlAction;

/// Something shown to the user while a turn runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Progress { message: String },
    Markdown { content: String },
    Button(OpenUrlAction),
}

impl ChatEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::Progress { .. } => "progress",
            ChatEvent::Markdown { .. } => "markdown",
            ChatEvent::Button(_) => "button",
        }
    }
}

/// Ordered output sink for a single turn.
#[derive(Debug, Clone)]
pub struct ResponseStream {
    tx: mpsc::UnboundedSender<ChatEvent>,
}

impl ResponseStream {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn progress(&self, message: impl Into<String>) {
        self.emit(ChatEvent::Progress {
            message: message.into(),
        });
    }

    pub fn markdown(&self, content: impl Into<String>) {
        self.emit(ChatEvent::Markdown {
            content: content.into(),
        });
    }

    pub fn button(&self, action: OpenUrlAction) {
        self.emit(ChatEvent::Button(action));
    }

    fn emit(&self, event: ChatEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Response stream closed, dropping event");
        }
    }
}

#[cfg(test)]
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<ChatEvent>) -> Vec<ChatEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
