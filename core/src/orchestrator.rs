//! The tool-calling loop: fetch the catalog, let the model pick tools, run
//! them on the platform, feed results back, repeat until the model answers.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::llm::{CompletionService, ResponseReply, ResponseRequest};
use crate::platform::ToolPlatform;
use crate::prompt;
use crate::registry::Catalog;
use crate::transcript::{FunctionCallRequest, Transcript};

/// Receives progress notes while a run is in flight.
pub trait Breadcrumbs: Send + Sync {
    fn add(&self, title: &str, data: &Value);
}

impl<F> Breadcrumbs for F
where
    F: Fn(&str, &Value) + Send + Sync,
{
    fn add(&self, title: &str, data: &Value) {
        self(title, data)
    }
}

/// Discards every breadcrumb.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBreadcrumbs;

impl Breadcrumbs for NoBreadcrumbs {
    fn add(&self, _title: &str, _data: &Value) {}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breadcrumb {
    pub title: String,
    pub data: Value,
}

/// Collects breadcrumbs so they can be returned alongside the outcome.
#[derive(Debug, Default)]
pub struct BreadcrumbLog {
    entries: Mutex<Vec<Breadcrumb>>,
}

impl BreadcrumbLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_entries(self) -> Vec<Breadcrumb> {
        self.entries.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Breadcrumbs for BreadcrumbLog {
    fn add(&self, title: &str, data: &Value) {
        info!("{}", title);
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push(Breadcrumb {
            title: title.to_string(),
            data: data.clone(),
        });
    }
}

/// What callers see: `{"result": ..}` or `{"error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentOutcome {
    Result(String),
    Error(String),
}

/// Where a run is. `Done` and `Failed` are terminal and carry the run's result.
#[derive(Debug)]
pub enum LoopState {
    FetchingCatalog,
    AwaitingCompletion,
    DispatchingCalls,
    Done(String),
    Failed(AgentError),
}

impl LoopState {
    fn label(&self) -> &'static str {
        match self {
            LoopState::FetchingCatalog => "FetchingCatalog",
            LoopState::AwaitingCompletion => "AwaitingCompletion",
            LoopState::DispatchingCalls => "DispatchingCalls",
            LoopState::Done(_) => "Done",
            LoopState::Failed(_) => "Failed",
        }
    }
}

/// Locally scoped data for one query. Nothing here outlives the run.
struct Run {
    catalog: Catalog,
    transcript: Transcript,
    reply: ResponseReply,
    rounds: u32,
}

pub struct Orchestrator {
    platform: Arc<dyn ToolPlatform>,
    brain: Arc<dyn CompletionService>,
    model: String,
    config: AgentConfig,
}

impl Orchestrator {
    pub fn new(
        platform: Arc<dyn ToolPlatform>,
        brain: Arc<dyn CompletionService>,
        model: impl Into<String>,
        config: AgentConfig,
    ) -> Self {
        Self {
            platform,
            brain,
            model: model.into(),
            config,
        }
    }

    /// Drives one query to a final answer. Any failure aborts the whole run.
    pub async fn run(&self, query: &str, crumbs: &dyn Breadcrumbs) -> Result<String, AgentError> {
        let mut run = Run {
            catalog: Catalog::default(),
            transcript: Transcript::default(),
            reply: ResponseReply::default(),
            rounds: 0,
        };
        let mut state = LoopState::FetchingCatalog;

        loop {
            let from = state.label();
            state = match state {
                LoopState::FetchingCatalog => self.fetch_catalog(query, &mut run, crumbs).await,
                LoopState::AwaitingCompletion => self.await_completion(&mut run).await,
                LoopState::DispatchingCalls => self.dispatch_calls(&mut run, crumbs).await,
                LoopState::Done(text) => return Ok(text),
                LoopState::Failed(e) => return Err(e),
            }
            .unwrap_or_else(LoopState::Failed);
            debug!("{} -> {}", from, state.label());
        }
    }

    /// Same as [`Orchestrator::run`], with failures logged and reduced to a user message.
    pub async fn run_outcome(&self, query: &str, crumbs: &dyn Breadcrumbs) -> AgentOutcome {
        match self.run(query, crumbs).await {
            Ok(text) => AgentOutcome::Result(text),
            Err(e) => {
                error!("Agent run failed: {}", e);
                AgentOutcome::Error(e.user_message())
            }
        }
    }

    async fn fetch_catalog(
        &self,
        query: &str,
        run: &mut Run,
        crumbs: &dyn Breadcrumbs,
    ) -> Result<LoopState, AgentError> {
        let tools = self
            .platform
            .fetch_tools()
            .await
            .map_err(AgentError::CatalogFetch)?;
        run.catalog = Catalog::new(tools);
        if run.catalog.is_empty() {
            warn!("Platform returned no tools; the model can only answer in text");
        } else {
            info!("Fetched {} tools", run.catalog.len());
        }
        crumbs.add("Fetched Fastn Tools", &json!(run.catalog.names()));

        run.transcript = Transcript::new(
            prompt::system_instructions(&run.catalog, Utc::now()),
            prompt::user_message(query),
        );
        Ok(LoopState::AwaitingCompletion)
    }

    async fn await_completion(&self, run: &mut Run) -> Result<LoopState, AgentError> {
        run.rounds += 1;
        let request = ResponseRequest {
            model: self.model.clone(),
            input: run.transcript.items().to_vec(),
            tools: run.catalog.function_definitions(),
            parallel_tool_calls: false,
        };
        run.reply = self
            .brain
            .respond(&request)
            .await
            .and_then(ResponseReply::check)
            .map_err(AgentError::CompletionRequest)?;

        if run.reply.function_calls().is_empty() {
            return Ok(LoopState::Done(run.reply.output_text()));
        }
        // Tools have side effects: never run a batch whose results can't be fed back.
        if run.rounds >= self.config.max_iterations {
            return Err(AgentError::LoopLimitExceeded {
                limit: self.config.max_iterations,
            });
        }
        Ok(LoopState::DispatchingCalls)
    }

    async fn dispatch_calls(
        &self,
        run: &mut Run,
        crumbs: &dyn Breadcrumbs,
    ) -> Result<LoopState, AgentError> {
        let calls: Vec<FunctionCallRequest> =
            run.reply.function_calls().into_iter().cloned().collect();
        if calls.len() > 1 {
            warn!("Model proposed {} calls in one turn; running them in order", calls.len());
        }
        for call in &calls {
            let result = self.dispatch(&run.catalog, call, crumbs).await?;
            run.transcript.record_call(call, &result);
        }
        Ok(LoopState::AwaitingCompletion)
    }

    async fn dispatch(
        &self,
        catalog: &Catalog,
        call: &FunctionCallRequest,
        crumbs: &dyn Breadcrumbs,
    ) -> Result<Value, AgentError> {
        let tool = catalog.resolve(&call.name).ok_or_else(|| {
            error!("Action ID not found for tool: {}", call.name);
            AgentError::UnresolvedTool {
                name: call.name.clone(),
            }
        })?;
        let args = parse_arguments(call)?;

        info!("Executing tool '{}' (action {})", tool.name, tool.action_id);
        crumbs.add(&format!("[Fastn Agent] Executing tool: {}", call.name), &args);

        let result = self
            .platform
            .execute_tool(&tool.action_id, args)
            .await
            .map_err(|source| AgentError::ToolExecution {
                name: call.name.clone(),
                source,
            })?;
        crumbs.add(&format!("[Fastn Agent] Tool result: {}", call.name), &result);
        Ok(result)
    }

    /// Asks the platform's documentation agent a question.
    pub async fn docs_query(&self, question: &str, crumbs: &dyn Breadcrumbs) -> AgentOutcome {
        crumbs.add("Querying Fastn Documentation", &json!({ "question": question }));

        match self.platform.query_docs(question).await {
            Ok(output) => {
                let text = match output {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                let preview: String = text.chars().take(100).collect();
                crumbs.add(
                    "Fastn Documentation Response",
                    &json!({ "response": format!("{}...", preview) }),
                );
                AgentOutcome::Result(text)
            }
            Err(e) => {
                error!("Error querying Fastn documentation: {}", e);
                AgentOutcome::Error(
                    "Failed to query Fastn documentation. Please try again or rephrase your question."
                        .to_string(),
                )
            }
        }
    }
}

/// An empty argument string means "no arguments".
fn parse_arguments(call: &FunctionCallRequest) -> Result<Value, AgentError> {
    if call.arguments.trim().is_empty() {
        return Ok(json!({}));
    }
    let value: Value =
        serde_json::from_str(&call.arguments).map_err(|e| AgentError::InvalidArguments {
            name: call.name.clone(),
            reason: e.to_string(),
        })?;
    if !value.is_object() {
        return Err(AgentError::InvalidArguments {
            name: call.name.clone(),
            reason: "expected a JSON object".to_string(),
        });
    }
    Ok(value)
}
