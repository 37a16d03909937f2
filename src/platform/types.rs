use serde::{Deserialize, Serialize};

/// State shown when a run has no conclusion yet.
pub const IN_PROGRESS: &str = "In Progress";

/// One execution of a GitHub Actions workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub title: String,
    pub conclusion: Option<String>,
    pub status: Option<String>,
    pub browsable_url: String,
}

impl WorkflowRun {
    /// Display state of the run. Never empty: a missing conclusion reads as
    /// `In Progress` unless the run already reports itself `completed`.
    pub fn display_state(&self) -> &str {
        if let Some(conclusion) = self.conclusion.as_deref() {
            return conclusion;
        }
        match self.status.as_deref() {
            Some(status @ "completed") => status,
            _ => IN_PROGRESS,
        }
    }

    /// Two-line markdown card for the run.
    pub fn render_markdown(&self) -> String {
        format!(
            "Workflow - **{}**\n\nStatus - _{}_",
            self.title,
            self.display_state()
        )
    }
}

/// Inputs passed to the deploy workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchInputs {
    pub environment: String,
    pub branch: String,
}

/// A request to start a new run of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchRequest {
    pub workflow_id: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub inputs: DispatchInputs,
}
