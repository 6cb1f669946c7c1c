use thiserror::Error;

/// Failure talking to the automation platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("platform transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed platform response: {0}")]
    Decode(String),
}

impl PlatformError {
    pub fn status(&self) -> Option<u16> {
        match self {
            PlatformError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure talking to the completion endpoint.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed completion response: {0}")]
    Decode(String),

    #[error("completion reported failure: {0}")]
    Failed(String),
}

/// Every way a single agent run can fail. All of them abort the run.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to fetch tool catalog: {0}")]
    CatalogFetch(#[source] PlatformError),

    #[error("completion request failed: {0}")]
    CompletionRequest(#[source] CompletionError),

    #[error("model requested unknown tool '{name}'")]
    UnresolvedTool { name: String },

    #[error("model sent invalid arguments for '{name}': {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("tool '{name}' failed: {source}")]
    ToolExecution {
        name: String,
        #[source]
        source: PlatformError,
    },

    #[error("no final answer after {limit} completion rounds")]
    LoopLimitExceeded { limit: u32 },
}

impl AgentError {
    /// Short text safe to show the end user. Diagnostics go to the log instead.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::CatalogFetch(_) => {
                "Failed to fetch available tools from Fastn.ai.".to_string()
            }
            AgentError::CompletionRequest(_) => {
                "Something went wrong with OpenAI response.".to_string()
            }
            AgentError::UnresolvedTool { name } => {
                format!("Tool {} not found or missing action ID.", name)
            }
            AgentError::InvalidArguments { name, .. } => {
                format!("Tool {} was called with invalid arguments.", name)
            }
            AgentError::ToolExecution { name, .. } => format!("Failed to execute tool {}.", name),
            AgentError::LoopLimitExceeded { limit } => format!(
                "Stopped after {} tool-calling rounds without a final answer.",
                limit
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_hide_upstream_detail() {
        let err = AgentError::CatalogFetch(PlatformError::Status {
            status: 401,
            body: "bad key abc123".to_string(),
        });
        assert_eq!(err.user_message(), "Failed to fetch available tools from Fastn.ai.");
        assert!(err.to_string().contains("bad key abc123"));

        let err = AgentError::ToolExecution {
            name: "createDoc".to_string(),
            source: PlatformError::Decode("oops".to_string()),
        };
        assert_eq!(err.user_message(), "Failed to execute tool createDoc.");
    }

    #[test]
    fn status_only_for_http_failures() {
        let err = PlatformError::Status { status: 503, body: String::new() };
        assert_eq!(err.status(), Some(503));
        assert_eq!(PlatformError::Decode("x".into()).status(), None);
    }
}
