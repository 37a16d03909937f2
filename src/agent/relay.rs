use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::agent::prompt::fallback_messages;
use crate::agent::ChatModel;
use crate::chat::stream::ResponseStream;
use crate::chat::until_cancelled;
use crate::error::{AppError, Result};

/// Forward a free-form prompt to the model and re-emit each fragment as it arrives.
///
/// Returns the number of fragments relayed. A cancelled turn stops at the next
/// fragment boundary and drops the open stream. A failure after at least one
/// fragment was shown comes back as [`AppError::StreamInterrupted`].
pub async fn relay(
    model: &dyn ChatModel,
    model_id: &str,
    prompt: &str,
    stream: &ResponseStream,
    cancel: &CancellationToken,
) -> Result<usize> {
    let messages = fallback_messages(prompt);
    let mut fragments = until_cancelled(cancel, model.stream_chat(model_id, &messages, cancel)).await??;

    let mut relayed = 0usize;
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(relayed, "Relay cancelled");
                return Err(AppError::Cancelled);
            }
            next = fragments.next() => next,
        };

        match next {
            Some(Ok(fragment)) => {
                stream.markdown(fragment);
                relayed += 1;
            }
            Some(Err(e)) => {
                tracing::warn!(relayed, error = %e, "Model stream failed");
                if relayed == 0 {
                    return Err(e);
                }
                return Err(AppError::StreamInterrupted(e.to_string()));
            }
            None => break,
        }
    }

    tracing::debug!(relayed, "Model stream finished");
    Ok(relayed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::SYSTEM_PROMPT;
    use crate::chat::stream::{drain, ChatEvent};
    use crate::testing::FakeModel;

    fn markdown(events: &[ChatEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                ChatEvent::Markdown { content } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fragments_are_relayed_verbatim_in_order() {
        let model = FakeModel::replying(&["I can ", "deploy", " **branches**\n"]);
        let (stream, mut rx) = ResponseStream::channel();

        let relayed = relay(&model, "claude-test", "hi", &stream, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(relayed, 3);
        let events = drain(&mut rx);
        assert_eq!(markdown(&events), vec!["I can ", "deploy", " **branches**\n"]);
    }

    #[tokio::test]
    async fn test_sends_system_and_user_messages() {
        let model = FakeModel::replying(&[]);
        let (stream, _rx) = ResponseStream::channel();

        relay(&model, "claude-test", "what now?", &stream, &CancellationToken::new())
            .await
            .unwrap();

        let requests = model.requests().await;
        assert_eq!(requests.len(), 1);
        let (model_id, messages) = &requests[0];
        assert_eq!(model_id, "claude-test");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].content, "what now?");
    }

    #[tokio::test]
    async fn test_stream_error_stops_relay() {
        let model = FakeModel::scripted(vec![
            Ok("partial".to_string()),
            Err("overloaded".to_string()),
            Ok("never".to_string()),
        ]);
        let (stream, mut rx) = ResponseStream::channel();

        let err = relay(&model, "claude-test", "hi", &stream, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StreamInterrupted(ref msg) if msg.contains("overloaded")));
        assert_eq!(markdown(&drain(&mut rx)), vec!["partial"]);
    }

    #[tokio::test]
    async fn test_error_before_first_fragment_keeps_original_error() {
        let model = FakeModel::scripted(vec![Err("invalid x-api-key".to_string())]);
        let (stream, mut rx) = ResponseStream::channel();

        let err = relay(&model, "claude-test", "hi", &stream, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ModelApi(_)));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_halts_emission() {
        let model = FakeModel::hanging(&["one", "two"]);
        let (stream, mut rx) = ResponseStream::channel();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = relay(&model, "claude-test", "hi", &stream, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled));
        assert_eq!(markdown(&drain(&mut rx)), vec!["one", "two"]);
    }
}
