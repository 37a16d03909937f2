use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::platform::types;

/// Body of `GET /repos/{owner}/{repo}/actions/workflows/{id}/runs`.
#[derive(Debug, Deserialize)]
pub struct WorkflowRunsPayload {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub workflow_runs: Vec<WorkflowRunPayload>,
}

#[derive(Debug, Deserialize)]
pub struct WorkflowRunPayload {
    pub id: u64,
    pub name: Option<String>,
    pub display_title: Option<String>,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub html_url: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Map a GitHub run payload to our platform run type.
pub fn map_workflow_run(run: WorkflowRunPayload) -> types::WorkflowRun {
    types::WorkflowRun {
        title: run
            .display_title
            .filter(|t| !t.is_empty())
            .or(run.name)
            .unwrap_or_default(),
        conclusion: run.conclusion,
        status: run.status,
        browsable_url: run.html_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_runs_page() {
        let body = r#"{
            "total_count": 2,
            "workflow_runs": [
                {
                    "id": 30433642,
                    "name": "Build",
                    "display_title": "Update README.md",
                    "status": "queued",
                    "conclusion": null,
                    "html_url": "https://github.com/octo-org/octo-repo/actions/runs/30433642",
                    "created_at": "2020-01-22T19:33:08Z"
                },
                {
                    "id": 30433641,
                    "name": "Build",
                    "status": "completed",
                    "conclusion": "success",
                    "html_url": "https://github.com/octo-org/octo-repo/actions/runs/30433641"
                }
            ]
        }"#;

        let page: WorkflowRunsPayload = serde_json::from_str(body).unwrap();
        assert_eq!(page.total_count, 2);

        let runs: Vec<_> = page.workflow_runs.into_iter().map(map_workflow_run).collect();
        assert_eq!(runs[0].title, "Update README.md");
        assert_eq!(runs[0].conclusion, None);
        assert_eq!(runs[0].display_state(), "In Progress");
        assert_eq!(runs[1].title, "Build");
        assert_eq!(runs[1].conclusion.as_deref(), Some("success"));
    }

    #[test]
    fn test_empty_display_title_falls_back_to_name() {
        let run = WorkflowRunPayload {
            id: 1,
            name: Some("Nightly Build".to_string()),
            display_title: Some(String::new()),
            status: Some("completed".to_string()),
            conclusion: None,
            html_url: "https://x/run/1".to_string(),
            created_at: None,
        };
        assert_eq!(map_workflow_run(run).title, "Nightly Build");
    }
}
