use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::PlatformConfig;
use crate::error::PlatformError;
use crate::registry::{RawTool, ToolDescriptor};

/// The automation platform: lists actions and runs them.
#[async_trait]
pub trait ToolPlatform: Send + Sync {
    async fn fetch_tools(&self) -> Result<Vec<ToolDescriptor>, PlatformError>;

    /// Runs an action. Not idempotent: callers must never retry this.
    async fn execute_tool(&self, action_id: &str, parameters: Value)
        -> Result<Value, PlatformError>;

    /// Asks the platform's documentation agent a question and returns its `output`.
    async fn query_docs(&self, prompt: &str) -> Result<Value, PlatformError>;
}

#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: Client,
    config: PlatformConfig,
}

impl PlatformClient {
    pub fn new(config: PlatformConfig) -> Result<Self, PlatformError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, PlatformError> {
        let url = self.url(path);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .header("x-fastn-api-key", &self.config.api_key)
            .header("x-fastn-space-id", &self.config.space_id)
            .header("x-fastn-space-tenantid", &self.config.tenant_id)
            .header("stage", &self.config.stage)
            .header("x-fastn-custom-auth", "true")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Platform call {} failed: {} {}", path, status.as_u16(), body);
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| PlatformError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ToolPlatform for PlatformClient {
    async fn fetch_tools(&self) -> Result<Vec<ToolDescriptor>, PlatformError> {
        let data = self.post("/ucl/getTools", json!({ "input": {} })).await?;
        let raw: Vec<RawTool> =
            serde_json::from_value(data).map_err(|e| PlatformError::Decode(e.to_string()))?;
        Ok(raw.into_iter().map(ToolDescriptor::from).collect())
    }

    async fn execute_tool(
        &self,
        action_id: &str,
        parameters: Value,
    ) -> Result<Value, PlatformError> {
        self.post(
            "/ucl/executeTool",
            json!({ "input": { "actionId": action_id, "parameters": parameters } }),
        )
        .await
    }

    async fn query_docs(&self, prompt: &str) -> Result<Value, PlatformError> {
        let data = self
            .post("/v1/serviceAgent", json!({ "input": { "prompt": prompt } }))
            .await?;
        Ok(data.get("output").cloned().unwrap_or(Value::Null))
    }
}
