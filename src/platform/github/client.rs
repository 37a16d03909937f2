use async_trait::async_trait;
use octocrab::Octocrab;

use crate::config::GitHubConfig;
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::CiBackend;

use super::mapper::{self, WorkflowRunsPayload};

/// GitHub Actions backend scoped to one repository.
pub struct GitHubActions {
    client: Octocrab,
    owner: String,
    repo: String,
    runs_per_page: u8,
}

impl GitHubActions {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        if config.owner.is_empty() || config.repo.is_empty() {
            return Err(AppError::Config(
                "github.owner and github.repo must be set".to_string(),
            ));
        }

        let client = Octocrab::builder()
            .personal_token(config.token.clone())
            .build()
            .map_err(|e| AppError::GitHubApi(format!("Failed to build octocrab client: {e}")))?;

        Ok(Self {
            client,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            runs_per_page: config.runs_per_page.max(1),
        })
    }

    fn runs_route(&self, workflow_id: &str) -> String {
        format!(
            "/repos/{}/{}/actions/workflows/{}/runs",
            self.owner,
            self.repo,
            urlencoding::encode(workflow_id)
        )
    }
}

#[async_trait]
impl CiBackend for GitHubActions {
    async fn list_runs(&self, workflow_id: &str) -> Result<Vec<WorkflowRun>> {
        let route = self.runs_route(workflow_id);
        let per_page = self.runs_per_page.to_string();

        let page: WorkflowRunsPayload = self
            .client
            .get(&route, Some(&[("per_page", per_page.as_str())]))
            .await
            .map_err(|e| AppError::GitHubApi(format!("Failed to list workflow runs: {e}")))?;

        tracing::debug!(
            workflow = workflow_id,
            total_count = page.total_count,
            returned = page.workflow_runs.len(),
            latest_created_at = ?page.workflow_runs.first().and_then(|r| r.created_at),
            "Fetched workflow runs"
        );

        Ok(page
            .workflow_runs
            .into_iter()
            .map(mapper::map_workflow_run)
            .collect())
    }

    async fn dispatch_workflow(&self, request: &DispatchRequest) -> Result<()> {
        let inputs = serde_json::to_value(&request.inputs)?;

        self.client
            .actions()
            .create_workflow_dispatch(
                &self.owner,
                &self.repo,
                &request.workflow_id,
                &request.git_ref,
            )
            .inputs(inputs)
            .send()
            .await
            .map_err(|e| AppError::GitHubApi(format!("Failed to dispatch workflow: {e}")))?;

        Ok(())
    }
}
