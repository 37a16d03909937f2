pub mod github;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

/// The CI/CD backend the router drives. Owner, repo and credentials are
/// bound when the implementation is constructed.
#[async_trait]
pub trait CiBackend: Send + Sync {
    /// List the runs of a workflow, most recent first.
    async fn list_runs(&self, workflow_id: &str) -> Result<Vec<WorkflowRun>>;

    /// Start a new run of a workflow.
    async fn dispatch_workflow(&self, request: &DispatchRequest) -> Result<()>;
}
