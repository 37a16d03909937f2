use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::{stream, Stream, StreamExt};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::api::events::{chat_event, done_event, ChatPayload, InvokePayload, TurnComplete};
use crate::chat::followup::followups_for;
use crate::chat::stream::ResponseStream;
use crate::chat::{Command, TurnResult};
use crate::server::AppState;

/// Run one chat turn and stream its events back as SSE.
///
/// Dropping the response (client disconnect) cancels the turn.
pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatPayload>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let request = payload.into_request();
    let command = Command::parse(&request.command);
    let (response, events) = ResponseStream::channel();

    let cancel = state.shutdown.child_token();
    let guard = cancel.clone().drop_guard();

    let turn_state = Arc::clone(&state);
    let turn = tokio::spawn(async move {
        turn_state.router.handle(&request, &response, &cancel).await
    });

    let done = stream::once(async move {
        let result = match turn.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(command = %command, error = %e, "Turn task failed");
                TurnResult::new(command)
            }
        };
        drop(guard);
        tracing::debug!(command = result.command(), "Turn complete");

        let followups = followups_for(&result);
        done_event(&TurnComplete { result, followups })
    });

    let body = UnboundedReceiverStream::new(events)
        .map(|event| chat_event(&event))
        .chain(done);

    Sse::new(body).keep_alive(KeepAlive::default())
}

/// Invoke a command registered at start-up, e.g. the open-URL command behind buttons.
pub async fn invoke_command(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Option<Json<InvokePayload>>,
) -> StatusCode {
    if !state.commands.contains(&id) {
        tracing::warn!(command = %id, "Unknown command");
        return StatusCode::NOT_FOUND;
    }

    let arguments = payload
        .map(|Json(payload)| payload.arguments)
        .unwrap_or_default();
    match state.commands.invoke(&id, &arguments).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) if e.is_input_error() => {
            tracing::warn!(command = %id, error = %e, "Rejected command invocation");
            StatusCode::BAD_REQUEST
        }
        Err(e) => {
            tracing::error!(command = %id, error = %e, "Command failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub async fn health_check() -> &'static str {
    "ok"
}
