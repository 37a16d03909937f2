use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    /// Workflow file the `deploy` command dispatches.
    #[serde(default = "default_deploy_workflow_id")]
    pub deploy_workflow_id: String,
    #[serde(default = "default_runs_per_page")]
    pub runs_per_page: u8,
}

// Manual Debug impl to avoid leaking the access token
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"[REDACTED]")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("deploy_workflow_id", &self.deploy_workflow_id)
            .field("runs_per_page", &self.runs_per_page)
            .finish()
    }
}

#[derive(Deserialize, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

// Manual Debug impl to avoid leaking the API key
impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatusConfig {
    /// Pause before the status card is rendered. Display pacing only, not a retry.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
        }
    }
}

impl StatusConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_deploy_workflow_id() -> String {
    "deploy.yml".to_string()
}

fn default_runs_per_page() -> u8 {
    5
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_pacing_ms() -> u64 {
    3000
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("aiops").required(false));
        }

        // Environment variable overrides with AIOPS_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("AIOPS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_applies_defaults() {
        let file = write_config(
            r#"
[github]
token = "ghp_test"
owner = "acme"
repo = "shop"

[model]
api_key = "sk-test"
"#,
        );

        let config = AppConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.github.owner, "acme");
        assert_eq!(config.github.deploy_workflow_id, "deploy.yml");
        assert_eq!(config.github.runs_per_page, 5);
        assert_eq!(config.model.model, "claude-sonnet-4-20250514");
        assert_eq!(config.status.pacing(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_reads_overrides() {
        let file = write_config(
            r#"
[github]
token = "ghp_test"
owner = "acme"
repo = "shop"
deploy_workflow_id = "deploy-azure.yml"

[model]
api_key = "sk-test"
model = "claude-3-5-haiku-latest"

[status]
pacing_ms = 0
"#,
        );

        let config = AppConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.github.deploy_workflow_id, "deploy-azure.yml");
        assert_eq!(config.model.model, "claude-3-5-haiku-latest");
        assert_eq!(config.status.pacing(), Duration::ZERO);
    }

    #[test]
    fn test_missing_required_section_is_config_error() {
        let file = write_config("[server]\nport = 8080\n");
        let err = AppConfig::load(file.path().to_str()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let github = GitHubConfig {
            token: "ghp_secret".to_string(),
            owner: "acme".to_string(),
            repo: "shop".to_string(),
            deploy_workflow_id: default_deploy_workflow_id(),
            runs_per_page: 5,
        };
        let rendered = format!("{github:?}");
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
