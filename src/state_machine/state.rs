//! Turn state types

use serde::Serialize;
use std::sync::Arc;

/// Where a session is within its current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnState {
    /// Waiting for the customer
    #[default]
    Idle,

    /// Model request `round` of the current turn is in flight
    AwaitingModel {
        round: u32,
        /// The order was placed earlier in this turn
        order_placed: bool,
    },

    /// Running the tool calls returned by model request `round`
    ExecutingTools { round: u32, order_placed: bool },

    /// Order placed; the conversation is over (terminal)
    Finished,
}

impl TurnState {
    pub fn is_finished(self) -> bool {
        matches!(self, TurnState::Finished)
    }
}

/// Immutable inputs to every transition of a turn
#[derive(Debug, Clone)]
pub struct TurnContext {
    /// Upper bound on model requests per turn
    pub max_rounds: u32,
    /// Names the model is allowed to call
    pub tool_names: Arc<[&'static str]>,
}

impl TurnContext {
    pub fn new(max_rounds: u32, tool_names: impl Into<Arc<[&'static str]>>) -> Self {
        Self {
            max_rounds: max_rounds.max(1),
            tool_names: tool_names.into(),
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.tool_names.iter().any(|t| *t == name)
    }
}
