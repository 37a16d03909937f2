use serde::Serialize;

use crate::chat::TurnResult;

/// A suggested next message offered after a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Followup {
    pub prompt: String,
    pub label: String,
    pub command: String,
}

/// Followups are the same whatever the turn did.
pub fn followups_for(_result: &TurnResult) -> Vec<Followup> {
    vec![Followup {
        prompt: "Use AIOps to perform operations on your workspace.".to_string(),
        label: "Deploy, Status, Scan".to_string(),
        command: "explain".to_string(),
    }]
}
