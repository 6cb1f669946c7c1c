use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A callable action exposed by the automation platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "function")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,

    // Opaque JSON Schema, forwarded untouched to the completion endpoint.
    pub parameters: Value,

    #[serde(rename = "actionId")]
    pub action_id: String,
}

/// Raw catalog entry as returned by the platform.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTool {
    function: RawFunction,
    #[serde(rename = "actionId", default)]
    action_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<Value>,
}

impl From<RawTool> for ToolDescriptor {
    fn from(raw: RawTool) -> Self {
        Self {
            name: raw.function.name,
            description: raw.function.description.unwrap_or_default(),
            parameters: raw
                .function
                .parameters
                .filter(|p| !p.is_null())
                .unwrap_or_else(empty_schema),
            action_id: raw.action_id.unwrap_or_default(),
        }
    }
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// The tool definition handed to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "function")]
pub struct FunctionTool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Snapshot of the platform's tools, fetched once per query.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: Vec<ToolDescriptor>,
}

impl Catalog {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Finds the tool the model asked for. Tools without an action id never resolve.
    pub fn resolve(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools
            .iter()
            .find(|t| t.name == name)
            .filter(|t| !t.action_id.is_empty())
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }

    pub fn function_definitions(&self) -> Vec<FunctionTool> {
        self.tools
            .iter()
            .map(|t| FunctionTool {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect()
    }

    /// `[{name, description, parameters}]`, embedded in the system instructions.
    pub fn summary(&self) -> Value {
        Value::Array(
            self.tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, action_id: &str) -> ToolDescriptor {
        ToolDescriptor {
            name: name.to_string(),
            description: format!("{} description", name),
            parameters: json!({"type": "object", "properties": {"title": {"type": "string"}}}),
            action_id: action_id.to_string(),
        }
    }

    #[test]
    fn normalises_upstream_shape() {
        let raw: Vec<RawTool> = serde_json::from_value(json!([
            {
                "function": {
                    "name": "createDoc",
                    "description": "Create a document",
                    "parameters": {"type": "object", "properties": {"title": {"type": "string"}}}
                },
                "actionId": "a1"
            },
            { "function": { "name": "bare" } }
        ]))
        .unwrap();
        let tools: Vec<ToolDescriptor> = raw.into_iter().map(Into::into).collect();

        assert_eq!(tools[0].name, "createDoc");
        assert_eq!(tools[0].action_id, "a1");
        assert_eq!(tools[0].parameters["properties"]["title"]["type"], "string");
        assert_eq!(tools[1].description, "");
        assert_eq!(tools[1].parameters, empty_schema());
        assert_eq!(tools[1].action_id, "");
    }

    #[test]
    fn descriptor_serialises_for_passthrough() {
        let value = serde_json::to_value(descriptor("createDoc", "a1")).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["actionId"], "a1");
        assert_eq!(value["name"], "createDoc");
    }

    #[test]
    fn resolve_requires_action_id() {
        let catalog = Catalog::new(vec![descriptor("createDoc", "a1"), descriptor("orphan", "")]);
        assert_eq!(catalog.resolve("createDoc").map(|t| t.action_id.as_str()), Some("a1"));
        assert!(catalog.resolve("orphan").is_none());
        assert!(catalog.resolve("missing").is_none());
    }

    #[test]
    fn function_definitions_mirror_catalog_without_action_id() {
        let catalog = Catalog::new(vec![descriptor("a", "1"), descriptor("b", "2")]);
        let defs = serde_json::to_value(catalog.function_definitions()).unwrap();

        assert_eq!(defs.as_array().unwrap().len(), 2);
        assert_eq!(defs[0]["type"], "function");
        assert_eq!(defs[1]["name"], "b");
        assert_eq!(defs[1]["parameters"], catalog.tools()[1].parameters);
        assert!(defs[0].get("actionId").is_none());
    }

    #[test]
    fn summary_lists_name_description_parameters() {
        let catalog = Catalog::new(vec![descriptor("a", "1")]);
        let summary = catalog.summary();
        assert_eq!(summary[0]["name"], "a");
        assert!(summary[0].get("actionId").is_none());
        assert!(Catalog::default().summary().as_array().unwrap().is_empty());
    }
}
