//! Conversation transcript
//!
//! Append-only record of one session's dialogue, including the tool calls
//! the model requested and their results.

use crate::llm::{ContentBlock, LlmMessage, MessageRole, ToolCall};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// Outcome of one tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub name: String,
    pub output: String,
    pub is_error: bool,
    /// Structured data for the client, never sent to the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_data: Option<Value>,
}

impl ToolResult {
    pub fn success(call: &ToolCall, output: impl Into<String>) -> Self {
        Self {
            tool_use_id: call.id.clone(),
            name: call.name.clone(),
            output: output.into(),
            is_error: false,
            display_data: None,
        }
    }

    pub fn error(call: &ToolCall, output: impl Into<String>) -> Self {
        Self {
            tool_use_id: call.id.clone(),
            name: call.name.clone(),
            output: output.into(),
            is_error: true,
            display_data: None,
        }
    }

    pub fn with_display(mut self, data: Option<Value>) -> Self {
        self.display_data = data;
        self
    }

    /// Result recorded for a call that never ran because an earlier one failed
    pub fn skipped(call: &ToolCall) -> Self {
        Self::error(call, "Skipped: an earlier tool call in this step failed")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_results: Vec<ToolResult>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            tool_calls: calls,
            tool_results: Vec::new(),
        }
    }

    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        let content = results
            .iter()
            .map(|r| r.output.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            role: Role::Tool,
            content,
            tool_calls: Vec::new(),
            tool_results: results,
        }
    }

    /// Provider-neutral form sent to the model.
    ///
    /// Tool results travel in the user role, as the providers expect.
    pub fn to_llm_message(&self) -> LlmMessage {
        match self.role {
            Role::User => LlmMessage {
                role: MessageRole::User,
                content: vec![ContentBlock::text(self.content.clone())],
            },
            Role::Assistant => {
                let mut content = Vec::with_capacity(1 + self.tool_calls.len());
                if !self.content.is_empty() {
                    content.push(ContentBlock::text(self.content.clone()));
                }
                content.extend(self.tool_calls.iter().map(|call| ContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.input.clone(),
                }));
                LlmMessage {
                    role: MessageRole::Assistant,
                    content,
                }
            }
            Role::Tool => LlmMessage {
                role: MessageRole::User,
                content: self
                    .tool_results
                    .iter()
                    .map(|r| ContentBlock::ToolResult {
                        tool_use_id: r.tool_use_id.clone(),
                        name: r.name.clone(),
                        content: r.output.clone(),
                        is_error: r.is_error,
                    })
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_results_message() {
        let call = ToolCall::new("call_0_get_order", "get_order", json!({}));
        let msg = Message::tool_results(vec![
            ToolResult::success(&call, "Your order is empty."),
            ToolResult::skipped(&call),
        ]);
        assert_eq!(msg.role, Role::Tool);
        assert!(msg.content.starts_with("Your order is empty.\nSkipped"));

        let llm = msg.to_llm_message();
        assert_eq!(llm.role, MessageRole::User);
        assert_eq!(llm.content.len(), 2);
        assert!(matches!(
            &llm.content[1],
            ContentBlock::ToolResult { is_error: true, name, .. } if name == "get_order"
        ));
    }

    #[test]
    fn test_assistant_tool_calls_message() {
        let call = ToolCall::new("call_0_get_menu", "get_menu", json!({}));
        let llm = Message::tool_calls(vec![call]).to_llm_message();
        assert_eq!(llm.role, MessageRole::Assistant);
        assert_eq!(llm.content.len(), 1);
        assert!(matches!(&llm.content[0], ContentBlock::ToolUse { name, .. } if name == "get_menu"));
    }

    #[test]
    fn test_plain_messages() {
        let llm = Message::user("hi").to_llm_message();
        assert_eq!(llm.role, MessageRole::User);
        assert_eq!(llm.content, vec![ContentBlock::text("hi")]);

        let llm = Message::assistant("hello").to_llm_message();
        assert_eq!(llm.role, MessageRole::Assistant);
        assert_eq!(llm.content, vec![ContentBlock::text("hello")]);
    }
}
