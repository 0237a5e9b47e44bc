//! Events that drive a turn

use crate::llm::ModelReply;
use crate::transcript::ToolResult;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum TurnEvent {
    // Customer events
    UserMessage {
        text: String,
    },

    // Model events
    ModelReply {
        reply: ModelReply,
    },

    // Tool events
    /// Every call in the batch succeeded
    ToolsComplete {
        results: Vec<ToolResult>,
        /// This batch moved the order to placed
        order_placed: bool,
    },
    /// A call failed with an order error; later calls were skipped
    ToolRejected {
        results: Vec<ToolResult>,
        apology: String,
        /// A call earlier in this batch moved the order to placed
        order_placed: bool,
    },
    /// A call's arguments did not match its schema
    ToolInputInvalid {
        tool: String,
        message: String,
    },
}

impl TurnEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TurnEvent::UserMessage { .. } => "user_message",
            TurnEvent::ModelReply { .. } => "model_reply",
            TurnEvent::ToolsComplete { .. } => "tools_complete",
            TurnEvent::ToolRejected { .. } => "tool_rejected",
            TurnEvent::ToolInputInvalid { .. } => "tool_input_invalid",
        }
    }
}
