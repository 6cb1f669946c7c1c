use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::CompletionConfig;
use crate::error::CompletionError;
use crate::registry::FunctionTool;
use crate::transcript::{FunctionCallRequest, TranscriptItem};

/// Body of a `/responses` call. The full transcript goes out every time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRequest {
    pub model: String,
    pub input: Vec<TranscriptItem>,
    pub tools: Vec<FunctionTool>,
    pub parallel_tool_calls: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub output: Vec<OutputItem>,

    #[serde(default)]
    pub status: Option<String>,

    // Set by the endpoint when generation failed even though HTTP said 200.
    #[serde(default)]
    pub error: Option<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<OutputItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<OutputItem>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    FunctionCall(FunctionCallRequest),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

impl ResponseReply {
    /// Rejects replies that report a failure in their body.
    pub fn check(self) -> Result<Self, CompletionError> {
        if let Some(error) = self.error.as_ref().filter(|e| !e.is_null()) {
            return Err(CompletionError::Failed(error.to_string()));
        }
        if self.status.as_deref() == Some("failed") {
            return Err(CompletionError::Failed("response status is failed".to_string()));
        }
        Ok(self)
    }

    /// Function calls in the order the model emitted them.
    pub fn function_calls(&self) -> Vec<&FunctionCallRequest> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// Every `output_text` part of every message, concatenated. Empty when there are none.
    pub fn output_text(&self) -> String {
        let mut text = String::new();
        for item in &self.output {
            if let OutputItem::Message { content } = item {
                for part in content {
                    if let ContentPart::OutputText { text: chunk } = part {
                        text.push_str(chunk);
                    }
                }
            }
        }
        text
    }
}

/// The language model that decides between answering and calling a tool.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn respond(&self, request: &ResponseRequest) -> Result<ResponseReply, CompletionError>;
}

pub struct Brain {
    client: Client,
    config: CompletionConfig,
}

impl Brain {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        info!("Brain connected. Model: {}", config.model);
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl CompletionService for Brain {
    async fn respond(&self, request: &ResponseRequest) -> Result<ResponseReply, CompletionError> {
        let url = format!("{}/responses", self.config.base_url.trim_end_matches('/'));
        debug!(
            "Submitting {} transcript items and {} tools",
            request.input.len(),
            request.tools.len()
        );

        let resp = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Completion endpoint returned {}: {}", status.as_u16(), body);
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let reply: ResponseReply =
            serde_json::from_slice(&bytes).map_err(|e| CompletionError::Decode(e.to_string()))?;
        reply.check().map_err(|e| {
            error!("Completion endpoint reported a failure: {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn reply(value: serde_json::Value) -> ResponseReply {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn output_text_concatenates_in_order() {
        let reply = reply(json!({
            "output": [
                { "type": "reasoning", "summary": [] },
                { "type": "message", "role": "assistant", "content": [
                    { "type": "output_text", "text": "Created " },
                    { "type": "refusal", "refusal": "n/a" },
                    { "type": "output_text", "text": "the doc" }
                ]},
                { "type": "message", "content": [ { "type": "output_text", "text": "." } ] }
            ]
        }));
        assert!(reply.function_calls().is_empty());
        assert_eq!(reply.output_text(), "Created the doc.");
    }

    #[test]
    fn empty_output_gives_empty_text() {
        assert_eq!(reply(json!({ "output": [] })).output_text(), "");
        assert_eq!(reply(json!({})).output_text(), "");
    }

    #[test]
    fn null_output_reads_as_empty() {
        let reply = reply(json!({ "output": null, "status": "completed" }));
        assert!(reply.output.is_empty());
        assert_eq!(reply.check().unwrap().output_text(), "");
    }

    #[test]
    fn check_rejects_failed_bodies() {
        let failed = reply(json!({
            "status": "failed",
            "error": { "code": "server_error", "message": "The model crashed" },
            "output": []
        }));
        assert!(matches!(failed.check(), Err(CompletionError::Failed(m)) if m.contains("server_error")));

        let status_only = reply(json!({ "status": "failed", "output": [] }));
        assert!(matches!(status_only.check(), Err(CompletionError::Failed(_))));

        let ok = reply(json!({ "status": "completed", "error": null, "output": [] }));
        assert!(ok.check().is_ok());
    }

    #[test]
    fn function_calls_preserve_order() {
        let reply = reply(json!({
            "output": [
                { "type": "function_call", "call_id": "c1", "name": "A", "arguments": "{}" },
                { "type": "message", "content": [] },
                { "type": "function_call", "call_id": "c2", "name": "B", "arguments": "" }
            ]
        }));
        let names: Vec<&str> = reply.function_calls().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn request_serialises_wire_shape() {
        let request = ResponseRequest {
            model: "gpt-5-mini".into(),
            input: vec![TranscriptItem::user("hi")],
            tools: vec![],
            parallel_tool_calls: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["parallel_tool_calls"], false);
        assert_eq!(value["input"][0]["type"], "message");
        assert!(value["tools"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn respond_posts_with_bearer_auth() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/responses")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-5-mini",
                "parallel_tool_calls": false
            })))
            .with_status(200)
            .with_body(
                json!({ "output": [ { "type": "message", "content": [
                    { "type": "output_text", "text": "hello" }
                ]}]})
                .to_string(),
            )
            .create_async()
            .await;

        let brain = Brain::new(CompletionConfig::new("sk-test").with_base_url(server.url())).unwrap();
        let request = ResponseRequest {
            model: brain.model().to_string(),
            input: vec![TranscriptItem::user("hi")],
            tools: vec![],
            parallel_tool_calls: false,
        };
        let reply = brain.respond(&request).await.unwrap();
        mock.assert_async().await;
        assert_eq!(reply.output_text(), "hello");
    }

    #[tokio::test]
    async fn respond_rejects_failed_body_with_ok_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/responses")
            .with_status(200)
            .with_body(
                json!({
                    "status": "failed",
                    "error": { "code": "server_error", "message": "boom" },
                    "output": []
                })
                .to_string(),
            )
            .create_async()
            .await;

        let brain = Brain::new(CompletionConfig::new("sk-test").with_base_url(server.url())).unwrap();
        let request = ResponseRequest {
            model: "m".into(),
            input: vec![],
            tools: vec![],
            parallel_tool_calls: false,
        };
        let err = brain.respond(&request).await.unwrap_err();
        assert!(matches!(err, CompletionError::Failed(_)));
    }

    #[tokio::test]
    async fn respond_maps_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/responses")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let brain = Brain::new(CompletionConfig::new("sk-test").with_base_url(server.url())).unwrap();
        let request = ResponseRequest {
            model: "m".into(),
            input: vec![],
            tools: vec![],
            parallel_tool_calls: false,
        };
        let err = brain.respond(&request).await.unwrap_err();
        assert!(matches!(err, CompletionError::Status { status: 429, .. }));
    }
}
