use tokio_util::sync::CancellationToken;

use crate::chat::stream::ResponseStream;
use crate::chat::tokenizer::Tokens;
use crate::chat::{ensure_active, until_cancelled};
use crate::error::{AppError, Result};
use crate::platform::types::{DispatchInputs, DispatchRequest};
use crate::platform::CiBackend;

/// Branch and target environment taken from a deploy prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployArgs {
    pub branch: String,
    pub environment: String,
}

impl DeployArgs {
    /// `<branch> <environment>`. Newlines pasted into the environment are dropped.
    pub fn parse(prompt: &str) -> Result<Self> {
        let tokens = Tokens::new(prompt);
        let branch = tokens.required(0, "branch")?;
        let environment = tokens.required(1, "environment")?.replace(['\n', '\r'], "");

        if environment.is_empty() {
            return Err(AppError::MissingArgument {
                name: "environment",
            });
        }

        Ok(Self {
            branch: branch.to_string(),
            environment,
        })
    }

    pub fn into_dispatch(self, workflow_id: &str) -> DispatchRequest {
        DispatchRequest {
            workflow_id: workflow_id.to_string(),
            git_ref: self.branch.clone(),
            inputs: DispatchInputs {
                environment: self.environment,
                branch: self.branch,
            },
        }
    }
}

/// Dispatch the deploy workflow for the branch and environment in `prompt`.
///
/// Completion is not awaited; `/status` reports on the run afterwards.
pub async fn dispatch_deploy(
    backend: &dyn CiBackend,
    workflow_id: &str,
    prompt: &str,
    stream: &ResponseStream,
    cancel: &CancellationToken,
) -> Result<DispatchRequest> {
    let request = DeployArgs::parse(prompt)?.into_dispatch(workflow_id);

    ensure_active(cancel)?;

    tracing::info!(
        workflow = %request.workflow_id,
        branch = %request.inputs.branch,
        environment = %request.inputs.environment,
        "Dispatching deploy workflow"
    );

    until_cancelled(cancel, backend.dispatch_workflow(&request)).await??;

    stream.markdown(format!(
        "Deployment of `{}` to **{}** has been requested.",
        request.inputs.branch, request.inputs.environment
    ));

    Ok(request)
}
