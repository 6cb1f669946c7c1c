use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use switchboard_core::{AgentOutcome, Breadcrumb};
use switchboard_core::persona::AgentPersona;

// Input: direct execution of a platform action
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    #[serde(rename = "actionId", default)]
    pub action_id: Option<String>,
    #[serde(default = "empty_object")]
    pub parameters: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

// Input: a request for the tool-calling agent
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub user_query: String,
}

#[derive(Debug, Deserialize)]
pub struct DocsRequest {
    pub question: String,
}

// Output: the outcome plus what happened along the way
#[derive(Debug, Serialize)]
pub struct RunResponse {
    #[serde(flatten)]
    pub outcome: AgentOutcome,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioList {
    pub company_name: &'static str,
    pub default_scenario: &'static str,
    pub scenarios: BTreeMap<&'static str, Vec<AgentPersona>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
