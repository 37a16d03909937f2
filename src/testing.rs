//! In-memory stand-ins for the GitHub, model and URL-opener backends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::agent::{ChatMessage, ChatModel, FragmentStream};
use crate::chat::actions::UrlOpener;
use crate::error::{AppError, Result};
use crate::platform::types::{DispatchRequest, WorkflowRun};
use crate::platform::CiBackend;

pub struct FakeBackend {
    runs: Vec<WorkflowRun>,
    failure: Option<String>,
    listed: Mutex<Vec<String>>,
    dispatched: Mutex<Vec<DispatchRequest>>,
}

impl FakeBackend {
    pub fn with_runs(runs: Vec<WorkflowRun>) -> Self {
        Self {
            runs,
            failure: None,
            listed: Mutex::new(Vec::new()),
            dispatched: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::with_runs(Vec::new())
        }
    }

    pub async fn listed(&self) -> Vec<String> {
        self.listed.lock().await.clone()
    }

    pub async fn dispatched(&self) -> Vec<DispatchRequest> {
        self.dispatched.lock().await.clone()
    }
}

#[async_trait]
impl CiBackend for FakeBackend {
    async fn list_runs(&self, workflow_id: &str) -> Result<Vec<WorkflowRun>> {
        self.listed.lock().await.push(workflow_id.to_string());
        match &self.failure {
            Some(message) => Err(AppError::GitHubApi(message.clone())),
            None => Ok(self.runs.clone()),
        }
    }

    async fn dispatch_workflow(&self, request: &DispatchRequest) -> Result<()> {
        self.dispatched.lock().await.push(request.clone());
        match &self.failure {
            Some(message) => Err(AppError::GitHubApi(message.clone())),
            None => Ok(()),
        }
    }
}

/// Replays scripted fragments. `Err` entries become model errors; with
/// `hang` set the stream never finishes after the script runs out.
pub struct FakeModel {
    script: Vec<std::result::Result<String, String>>,
    hang: bool,
    requests: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    dropped: Arc<AtomicBool>,
}

impl FakeModel {
    pub fn replying(fragments: &[&str]) -> Self {
        Self::scripted(fragments.iter().map(|f| Ok(f.to_string())).collect())
    }

    pub fn scripted(script: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script,
            hang: false,
            requests: Mutex::new(Vec::new()),
            dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn hanging(fragments: &[&str]) -> Self {
        Self {
            hang: true,
            ..Self::replying(fragments)
        }
    }

    pub async fn requests(&self) -> Vec<(String, Vec<ChatMessage>)> {
        self.requests.lock().await.clone()
    }

    /// True once the last stream handed out has been dropped.
    pub fn stream_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

/// Sets its flag when dropped along with the stream that owns it.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn stream_chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        _cancel: &CancellationToken,
    ) -> Result<FragmentStream> {
        self.requests
            .lock()
            .await
            .push((model.to_string(), messages.to_vec()));

        let items: Vec<Result<String>> = self
            .script
            .iter()
            .map(|item| item.clone().map_err(AppError::ModelApi))
            .collect();
        let scripted = futures_util::stream::iter(items);

        self.dropped.store(false, Ordering::SeqCst);
        let flag = DropFlag(Arc::clone(&self.dropped));
        let stream = if self.hang {
            scripted.chain(futures_util::stream::pending()).boxed()
        } else {
            scripted.boxed()
        };
        Ok(futures_util::stream::unfold((stream, flag), |(mut stream, flag)| async move {
            let item = stream.next().await?;
            Some((item, (stream, flag)))
        })
        .boxed())
    }
}

/// Records every URL it is asked to open.
#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub async fn opened(&self) -> Vec<String> {
        self.opened.lock().await.clone()
    }
}

#[async_trait]
impl UrlOpener for RecordingOpener {
    async fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().await.push(url.to_string());
        Ok(())
    }
}
