//! Declarative agent definitions served to voice clients.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

pub const DEFAULT_SCENARIO: &str = "fastn";
pub const COMPANY_NAME: &str = "Fastn.ai";

/// A tool as the voice session sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPersona {
    pub name: String,
    pub voice: String,
    pub instructions: String,
    pub tools: Vec<ToolSpec>,
    pub handoffs: Vec<String>,
    pub handoff_description: String,
}

pub fn fastn_agent() -> AgentPersona {
    AgentPersona {
        name: "fastnAgent".to_string(),
        voice: "sage".to_string(),
        instructions: "You are a helpful assistant that can interact with various external systems via Fastn.ai tools.\n\
            Your primary function is to understand the user's request and use the 'callFastnAPI' tool to fulfill it.\n\
            When the user asks you to perform an action or retrieve information that might involve an external system, always use the 'callFastnAPI' tool.\n\
            Provide clear and concise responses to the user based on the results of the tool calls.\n"
            .to_string(),
        tools: vec![ToolSpec {
            name: "callFastnAPI".to_string(),
            description: "A tool to interact with the Fastn.ai platform to dynamically fetch and execute various tools. \
                Use this tool whenever you need to perform an action that might involve external systems or data retrieval."
                .to_string(),
            parameters: string_param(
                "user_query",
                "The user's full query or intent that needs to be addressed by a Fastn tool. \
                 Provide as much detail as possible from the user's request.",
            ),
        }],
        handoffs: Vec::new(),
        handoff_description:
            "An agent capable of interacting with external systems via dynamically fetched Fastn.ai tools."
                .to_string(),
    }
}

pub fn fastn_docs_agent() -> AgentPersona {
    AgentPersona {
        name: "fastnDocsAgent".to_string(),
        voice: "sage".to_string(),
        instructions: "You are a helpful Fastn Documentation Assistant with access to comprehensive Fastn documentation and knowledge base.\n\
            \n\
            Your primary function is to help users understand and work with Fastn by:\n\
            - Answering questions about Fastn features and capabilities\n\
            - Providing guidance on getting started with Fastn\n\
            - Explaining best practices and usage patterns\n\
            - Helping troubleshoot common issues\n\
            - Offering examples and code snippets when relevant\n\
            \n\
            When a user asks about Fastn, always use the 'queryFastnDocs' tool to get the most accurate and up-to-date information from the official documentation.\n\
            \n\
            Provide clear, concise, and helpful responses based on the documentation. If the user needs more specific help or wants to perform actions beyond documentation queries, you should guide them appropriately."
            .to_string(),
        tools: vec![ToolSpec {
            name: "queryFastnDocs".to_string(),
            description: "Query the Fastn documentation to get information about Fastn features, usage, and best practices. \
                This agent has access to comprehensive Fastn documentation and can answer questions about getting started, advanced features, and troubleshooting."
                .to_string(),
            parameters: string_param(
                "question",
                "The user's question about Fastn. Be specific and include as much context as possible \
                 to get the most relevant documentation response.",
            ),
        }],
        handoffs: Vec::new(),
        handoff_description:
            "A specialized agent for answering questions about Fastn using the official documentation and knowledge base."
                .to_string(),
    }
}

/// Scenario key to the agents that make it up.
pub fn scenarios() -> BTreeMap<&'static str, Vec<AgentPersona>> {
    let mut map = BTreeMap::new();
    map.insert("fastn", vec![fastn_agent()]);
    map.insert("fastnDocs", vec![fastn_docs_agent()]);
    map
}

pub fn scenario(key: &str) -> Option<Vec<AgentPersona>> {
    scenarios().remove(key)
}

fn string_param(name: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            name: { "type": "string", "description": description }
        },
        "required": [name],
        "additionalProperties": false
    })
}
