use std::fmt::{self, Debug};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

pub const DEFAULT_PLATFORM_URL: &str = "https://live.fastn.ai/api";
pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Credentials and endpoint for the automation platform (catalog, execution, docs).
#[derive(Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub api_key: String,
    pub space_id: String,
    pub tenant_id: String,
    pub stage: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl PlatformConfig {
    pub fn new(api_key: impl Into<String>, space_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            space_id: space_id.into(),
            tenant_id: String::new(),
            stage: "LIVE".to_string(),
            base_url: DEFAULT_PLATFORM_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Debug for PlatformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_key", &"<redacted>")
            .field("space_id", &self.space_id)
            .field("tenant_id", &self.tenant_id)
            .field("stage", &self.stage)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Credentials and model selection for the completion endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl CompletionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_COMPLETION_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    /// Upper bound on completion submissions for a single query.
    pub max_iterations: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Everything the process needs, sourced once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub platform: PlatformConfig,
    pub completion: CompletionConfig,
    pub agent: AgentConfig,
    pub listen_addr: String,
}

impl Settings {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("UPSTREAM_TIMEOUT_SECS is not a number: '{}'", raw))?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        let api_key = lookup("FASTN_API_KEY").unwrap_or_else(|| {
            warn!("FASTN_API_KEY is not set; platform calls will be rejected upstream");
            String::new()
        });
        let space_id = lookup("FASTN_SPACE_ID").unwrap_or_else(|| {
            warn!("FASTN_SPACE_ID is not set; platform calls will be rejected upstream");
            String::new()
        });
        let platform = PlatformConfig {
            api_key,
            space_id,
            tenant_id: lookup("FASTN_TENANT_ID").unwrap_or_default(),
            stage: lookup("FASTN_STAGE").unwrap_or_else(|| "LIVE".to_string()),
            base_url: lookup("FASTN_BASE_URL").unwrap_or_else(|| DEFAULT_PLATFORM_URL.to_string()),
            timeout,
        };

        let completion = CompletionConfig {
            api_key: lookup("OPENAI_API_KEY").context("OPENAI_API_KEY must be set in .env")?,
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string()),
            timeout,
        };

        let max_iterations = match lookup("AGENT_MAX_ITERATIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("AGENT_MAX_ITERATIONS is not a number: '{}'", raw))?,
            None => DEFAULT_MAX_ITERATIONS,
        };
        if max_iterations == 0 {
            bail!("AGENT_MAX_ITERATIONS must be at least 1");
        }

        Ok(Self {
            platform,
            completion,
            agent: AgentConfig { max_iterations },
            listen_addr: lookup("GATEWAY_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        })
    }

    /// Logs which credentials are present without revealing them.
    pub fn log_credentials(&self) {
        info!(
            "FASTN_API_KEY: {} (length {})",
            mask(&self.platform.api_key),
            self.platform.api_key.len()
        );
        info!(
            "FASTN_SPACE_ID: {} (length {})",
            if self.platform.space_id.is_empty() { "MISSING" } else { self.platform.space_id.as_str() },
            self.platform.space_id.len()
        );
        info!("Completion model: {}", self.completion.model);
    }
}

/// Shows the first 8 characters of a secret.
pub fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return "MISSING".to_string();
    }
    let prefix: String = secret.chars().take(8).collect();
    format!("{}...", prefix)
}
