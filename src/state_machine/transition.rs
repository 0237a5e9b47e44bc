//! Pure state transition function

use super::{Effect, TurnContext, TurnEvent, TurnState};
use crate::llm::{ModelReply, ToolCall};
use crate::transcript::Message;
use thiserror::Error;

/// Sent when the model ends a round with no text at all
pub const EMPTY_REPLY_FALLBACK: &str =
    "Sorry, I didn't quite catch that. What can I get started for you?";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effect_if(self, condition: bool, effect: Effect) -> Self {
        if condition {
            self.with_effect(effect)
        } else {
            self
        }
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("This order has already been placed")]
    OrderFinished,
    #[error("A reply is still being prepared for this session")]
    AgentBusy,
    #[error("Model kept calling tools for {rounds} rounds without replying")]
    ToolLoopExceeded { rounds: u32 },
    #[error("Invalid tool call: {0}")]
    InvalidToolCall(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs this always produces the same outputs, with no I/O.
pub fn transition(
    state: &TurnState,
    context: &TurnContext,
    event: TurnEvent,
) -> Result<TransitionResult, TransitionError> {
    match (*state, event) {
        // ============================================================
        // Customer messages
        // ============================================================
        (TurnState::Idle, TurnEvent::UserMessage { text }) => Ok(TransitionResult::new(
            TurnState::AwaitingModel {
                round: 1,
                order_placed: false,
            },
        )
        .with_effect(Effect::user_message(text))
        .with_effect(Effect::RequestModel { round: 1 })),

        (TurnState::Finished, TurnEvent::UserMessage { .. }) => {
            Err(TransitionError::OrderFinished)
        }

        (
            TurnState::AwaitingModel { .. } | TurnState::ExecutingTools { .. },
            TurnEvent::UserMessage { .. },
        ) => Err(TransitionError::AgentBusy),

        // ============================================================
        // Model replies
        // ============================================================
        (
            TurnState::AwaitingModel { order_placed, .. },
            TurnEvent::ModelReply {
                reply: ModelReply::Text(text),
            },
        ) => {
            let text = if text.trim().is_empty() {
                EMPTY_REPLY_FALLBACK.to_string()
            } else {
                text
            };
            Ok(TransitionResult::new(end_of_turn(order_placed))
                .with_effect(Effect::assistant_message(text.clone()))
                .with_effect_if(order_placed, Effect::MarkFinished)
                .with_effect(Effect::reply(text)))
        }

        (
            TurnState::AwaitingModel {
                round,
                order_placed,
            },
            TurnEvent::ModelReply {
                reply: ModelReply::ToolUse(calls),
            },
        ) => {
            validate_calls(context, &calls)?;
            // Results of these calls would need another model request
            if round >= context.max_rounds {
                return Err(TransitionError::ToolLoopExceeded {
                    rounds: context.max_rounds,
                });
            }
            Ok(TransitionResult::new(TurnState::ExecutingTools {
                round,
                order_placed,
            })
            .with_effect(Effect::AppendMessage(Message::tool_calls(calls.clone())))
            .with_effect(Effect::ExecuteTools { calls }))
        }

        // ============================================================
        // Tool outcomes
        // ============================================================
        (
            TurnState::ExecutingTools {
                round,
                order_placed,
            },
            TurnEvent::ToolsComplete {
                results,
                order_placed: placed_now,
            },
        ) => {
            let next = round + 1;
            Ok(TransitionResult::new(TurnState::AwaitingModel {
                round: next,
                order_placed: order_placed || placed_now,
            })
            .with_effect(Effect::tool_results(results))
            .with_effect(Effect::RequestModel { round: next }))
        }

        (
            TurnState::ExecutingTools { order_placed, .. },
            TurnEvent::ToolRejected {
                results,
                apology,
                order_placed: placed_now,
            },
        ) => {
            let placed = order_placed || placed_now;
            Ok(TransitionResult::new(end_of_turn(placed))
                .with_effect(Effect::tool_results(results))
                .with_effect(Effect::assistant_message(apology.clone()))
                .with_effect_if(placed, Effect::MarkFinished)
                .with_effect(Effect::reply(apology)))
        }

        (TurnState::ExecutingTools { .. }, TurnEvent::ToolInputInvalid { tool, message }) => Err(
            TransitionError::InvalidToolCall(format!("invalid input for {tool}: {message}")),
        ),

        // ============================================================
        // Everything else
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} while {state:?}",
            event.kind()
        ))),
    }
}

fn end_of_turn(order_placed: bool) -> TurnState {
    if order_placed {
        TurnState::Finished
    } else {
        TurnState::Idle
    }
}

fn validate_calls(context: &TurnContext, calls: &[ToolCall]) -> Result<(), TransitionError> {
    if calls.is_empty() {
        return Err(TransitionError::InvalidToolCall(
            "tool use reply without any calls".to_string(),
        ));
    }
    if let Some(call) = calls.iter().find(|c| !context.is_registered(&c.name)) {
        return Err(TransitionError::InvalidToolCall(format!(
            "unknown tool {}",
            call.name
        )));
    }
    Ok(())
}
