use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One entry of the conversation resubmitted on every completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptItem {
    Message {
        role: Role,
        content: String,
    },
    FunctionCall {
        call_id: String,
        name: String,
        arguments: String,
    },
    FunctionCallOutput {
        call_id: String,
        output: String,
    },
}

impl TranscriptItem {
    pub fn system(content: impl Into<String>) -> Self {
        TranscriptItem::Message {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        TranscriptItem::Message {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A function invocation proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallRequest {
    pub call_id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// Ordered conversation history. Tool traffic can only be added as a call
/// immediately followed by its output, so no call is ever left unmatched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    items: Vec<TranscriptItem>,
}

impl Transcript {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            items: vec![TranscriptItem::system(system), TranscriptItem::user(user)],
        }
    }

    pub fn record_call(&mut self, call: &FunctionCallRequest, result: &Value) {
        self.items.push(TranscriptItem::FunctionCall {
            call_id: call.call_id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        });
        self.items.push(TranscriptItem::FunctionCallOutput {
            call_id: call.call_id.clone(),
            output: result.to_string(),
        });
    }

    pub fn items(&self) -> &[TranscriptItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn items_serialise_with_type_tags() {
        let mut transcript = Transcript::new("sys", "User's request: hi");
        transcript.record_call(
            &FunctionCallRequest {
                call_id: "call_1".into(),
                name: "createDoc".into(),
                arguments: r#"{"title":"x"}"#.into(),
            },
            &json!({ "id": "doc123" }),
        );

        let value = serde_json::to_value(transcript.items()).unwrap();
        assert_eq!(value[0], json!({ "type": "message", "role": "system", "content": "sys" }));
        assert_eq!(value[1]["role"], "user");
        assert_eq!(
            value[2],
            json!({
                "type": "function_call",
                "call_id": "call_1",
                "name": "createDoc",
                "arguments": "{\"title\":\"x\"}"
            })
        );
        assert_eq!(value[3]["type"], "function_call_output");
        assert_eq!(value[3]["call_id"], "call_1");

        let output: Value = serde_json::from_str(value[3]["output"].as_str().unwrap()).unwrap();
        assert_eq!(output, json!({ "id": "doc123" }));
    }

    #[test]
    fn record_call_keeps_pairs_adjacent() {
        let mut transcript = Transcript::new("sys", "user");
        for id in ["a", "b"] {
            transcript.record_call(
                &FunctionCallRequest {
                    call_id: id.into(),
                    name: "t".into(),
                    arguments: "{}".into(),
                },
                &Value::Null,
            );
        }

        assert_eq!(transcript.items().len(), 6);
        let ids: Vec<&str> = transcript.items()[2..]
            .iter()
            .map(|item| match item {
                TranscriptItem::FunctionCall { call_id, .. } => call_id.as_str(),
                TranscriptItem::FunctionCallOutput { call_id, .. } => call_id.as_str(),
                TranscriptItem::Message { .. } => panic!("unexpected message"),
            })
            .collect();
        assert_eq!(ids, ["a", "a", "b", "b"]);
    }
}
