use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, Result};

/// Id of the process-wide command that opens a URL externally.
pub const OPEN_URL_COMMAND: &str = "aiops.openUrl";

const OPEN_RUN_LABEL: &str = "Open workflow run";

/// A clickable action bound to the open-URL command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenUrlAction {
    pub label: String,
    pub command: String,
    pub arguments: Vec<String>,
}

/// Button that opens a workflow run in the user's browser.
pub fn open_url_button(url: &str) -> OpenUrlAction {
    OpenUrlAction {
        label: OPEN_RUN_LABEL.to_string(),
        command: OPEN_URL_COMMAND.to_string(),
        arguments: vec![url.to_string()],
    }
}

#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemUrlOpener {
    program: PathBuf,
    prefix_args: Vec<OsString>,
}

impl SystemUrlOpener {
    pub fn new() -> Result<Self> {
        Self::for_os(std::env::consts::OS)
    }

    fn for_os(target_os: &str) -> Result<Self> {
        match target_os {
            "macos" => Ok(Self {
                program: PathBuf::from("open"),
                prefix_args: Vec::new(),
            }),
            "linux" => Ok(Self {
                program: PathBuf::from("xdg-open"),
                prefix_args: Vec::new(),
            }),
            "windows" => Ok(Self {
                program: PathBuf::from("cmd"),
                prefix_args: vec![
                    OsString::from("/C"),
                    OsString::from("start"),
                    OsString::from(""),
                ],
            }),
            _ => Err(AppError::Command(format!(
                "URL opening is unsupported on `{target_os}`"
            ))),
        }
    }

    fn args_for(&self, url: &str) -> Vec<OsString> {
        let mut args = self.prefix_args.clone();
        args.push(OsString::from(url));
        args
    }
}

#[async_trait]
impl UrlOpener for SystemUrlOpener {
    async fn open(&self, url: &str) -> Result<()> {
        let status = tokio::process::Command::new(&self.program)
            .args(self.args_for(url))
            .status()
            .await?;

        if !status.success() {
            return Err(AppError::Command(format!(
                "`{}` exited with {status}",
                self.program.display()
            )));
        }
        Ok(())
    }
}

/// A command the chat front-end can invoke by id.
#[async_trait]
pub trait RegisteredCommand: Send + Sync {
    async fn invoke(&self, arguments: &[String]) -> Result<()>;
}

/// The open-URL command. Takes the URL as its only argument.
pub struct OpenUrlCommand {
    opener: Arc<dyn UrlOpener>,
}

impl OpenUrlCommand {
    pub fn new(opener: Arc<dyn UrlOpener>) -> Self {
        Self { opener }
    }
}

#[async_trait]
impl RegisteredCommand for OpenUrlCommand {
    async fn invoke(&self, arguments: &[String]) -> Result<()> {
        let url = match arguments {
            [url] => url,
            [] => return Err(AppError::MissingArgument { name: "url" }),
            _ => {
                return Err(AppError::Command(format!(
                    "{OPEN_URL_COMMAND} takes exactly one argument, got {}",
                    arguments.len()
                )))
            }
        };

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::Command(format!("Refusing to open non-http URL: {url}")));
        }

        tracing::info!(url = %url, "Opening URL");
        self.opener.open(url).await
    }
}

/// Commands registered at start-up. Each id may be registered once.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn RegisteredCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, command: Box<dyn RegisteredCommand>) -> Result<()> {
        if self.commands.contains_key(id) {
            return Err(AppError::Command(format!("Command `{id}` is already registered")));
        }
        self.commands.insert(id.to_string(), command);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    pub async fn invoke(&self, id: &str, arguments: &[String]) -> Result<()> {
        let command = self
            .commands
            .get(id)
            .ok_or_else(|| AppError::Command(format!("Unknown command: {id}")))?;
        command.invoke(arguments).await
    }
}
