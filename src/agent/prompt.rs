use super::ChatMessage;

/// System instruction sent ahead of every free-form chat prompt.
pub const SYSTEM_PROMPT: &str =
    "Your AIOps assistant can Deploy a branch, Get the status of a workflow or perform a SAST Scan! ";

/// The system/user exchange for a free-form prompt. The prompt is passed through untouched.
pub fn fallback_messages(prompt: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
}
