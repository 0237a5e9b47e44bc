//! Effects produced by state transitions

use crate::llm::ToolCall;
use crate::transcript::{Message, ToolResult};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the session transcript
    AppendMessage(Message),

    /// Send the transcript to the model
    RequestModel { round: u32 },

    /// Run tool calls serially against the order
    ExecuteTools { calls: Vec<ToolCall> },

    /// The order is placed; close the session to further chat
    MarkFinished,

    /// End the turn with this text for the customer
    Reply { text: String },
}

impl Effect {
    pub fn user_message(text: impl Into<String>) -> Self {
        Effect::AppendMessage(Message::user(text))
    }

    pub fn assistant_message(text: impl Into<String>) -> Self {
        Effect::AppendMessage(Message::assistant(text))
    }

    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Effect::AppendMessage(Message::tool_results(results))
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }
}
