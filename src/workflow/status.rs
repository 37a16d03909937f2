use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::chat::actions::open_url_button;
use crate::chat::stream::ResponseStream;
use crate::chat::tokenizer::Tokens;
use crate::chat::{ensure_active, until_cancelled};
use crate::error::{AppError, Result};
use crate::platform::types::WorkflowRun;
use crate::platform::CiBackend;

/// Report the latest run of the workflow named by the first prompt token.
///
/// The backend's ordering is authoritative: the first run returned is the
/// most recent. The card is held back by `pacing` before it is shown.
pub async fn poll_status(
    backend: &dyn CiBackend,
    pacing: Duration,
    prompt: &str,
    stream: &ResponseStream,
    cancel: &CancellationToken,
) -> Result<WorkflowRun> {
    let workflow_id = Tokens::new(prompt).required(0, "workflow")?;

    ensure_active(cancel)?;
    let runs = until_cancelled(cancel, backend.list_runs(workflow_id)).await??;

    let run = runs.into_iter().next().ok_or_else(|| AppError::NoRuns {
        workflow: workflow_id.to_string(),
    })?;

    tracing::info!(
        workflow = workflow_id,
        title = %run.title,
        state = run.display_state(),
        "Fetched latest workflow run"
    );

    until_cancelled(cancel, tokio::time::sleep(pacing)).await?;

    stream.markdown(run.render_markdown());
    stream.button(open_url_button(&run.browsable_url));

    Ok(run)
}
