//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::transition::*;
use super::*;
use crate::llm::{ModelReply, ToolCall};
use crate::transcript::ToolResult;
use proptest::prelude::*;
use serde_json::json;

const TOOL_NAMES: [&str; 3] = ["get_menu", "add_to_order", "place_order"];

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context(max_rounds: u32) -> TurnContext {
    TurnContext::new(max_rounds, TOOL_NAMES.to_vec())
}

fn result_for(call: &ToolCall) -> ToolResult {
    ToolResult::success(call, "ok")
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_tool_call() -> impl Strategy<Value = ToolCall> {
    (0usize..TOOL_NAMES.len(), "[a-z]{4}")
        .prop_map(|(i, id)| ToolCall::new(id, TOOL_NAMES[i], json!({})))
}

fn arb_reply() -> impl Strategy<Value = ModelReply> {
    prop_oneof![
        "[a-zA-Z !]{0,20}".prop_map(ModelReply::Text),
        prop::collection::vec(arb_tool_call(), 1..4).prop_map(ModelReply::ToolUse),
    ]
}

/// What the outside world does when the machine asks for something
#[derive(Debug, Clone)]
enum Step {
    User(String),
    Model(ModelReply),
    ToolsOk { placed: bool },
    ToolsRejected { placed: bool },
    BadInput,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        "[a-z ]{1,10}".prop_map(Step::User),
        arb_reply().prop_map(Step::Model),
        any::<bool>().prop_map(|placed| Step::ToolsOk { placed }),
        any::<bool>().prop_map(|placed| Step::ToolsRejected { placed }),
        Just(Step::BadInput),
    ]
}

fn to_event(step: Step, pending_calls: &[ToolCall]) -> TurnEvent {
    match step {
        Step::User(text) => TurnEvent::UserMessage { text },
        Step::Model(reply) => TurnEvent::ModelReply { reply },
        Step::ToolsOk { placed } => TurnEvent::ToolsComplete {
            results: pending_calls.iter().map(result_for).collect(),
            order_placed: placed,
        },
        Step::ToolsRejected { placed } => TurnEvent::ToolRejected {
            results: pending_calls.iter().map(result_for).collect(),
            apology: "Sorry about that.".to_string(),
            order_placed: placed,
        },
        Step::BadInput => TurnEvent::ToolInputInvalid {
            tool: "add_to_order".to_string(),
            message: "bad".to_string(),
        },
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// No turn ever asks the model more than `max_rounds` times
    #[test]
    fn prop_rounds_never_exceed_bound(
        max_rounds in 1u32..6,
        steps in prop::collection::vec(arb_step(), 1..60),
    ) {
        let ctx = test_context(max_rounds);
        let mut state = TurnState::Idle;
        let mut requests_this_turn = 0u32;
        let mut pending_calls: Vec<ToolCall> = Vec::new();

        for step in steps {
            let Ok(result) = transition(&state, &ctx, to_event(step, &pending_calls)) else {
                continue;
            };
            if matches!(state, TurnState::Idle) {
                requests_this_turn = 0;
            }
            for effect in &result.effects {
                match effect {
                    Effect::RequestModel { round } => {
                        requests_this_turn += 1;
                        prop_assert!(*round <= max_rounds);
                        prop_assert_eq!(*round, requests_this_turn);
                    }
                    Effect::ExecuteTools { calls } => pending_calls.clone_from(calls),
                    _ => {}
                }
            }
            prop_assert!(requests_this_turn <= max_rounds);
            state = result.new_state;
        }
    }

    /// Finishing requires that a tool batch reported a placed order
    #[test]
    fn prop_finished_only_after_placement(
        steps in prop::collection::vec(arb_step(), 1..60),
    ) {
        let ctx = test_context(4);
        let mut state = TurnState::Idle;
        let mut placed_this_turn = false;

        for step in steps {
            let placed_now = matches!(
                step,
                Step::ToolsOk { placed: true } | Step::ToolsRejected { placed: true }
            );
            let Ok(result) = transition(&state, &ctx, to_event(step, &[])) else {
                continue;
            };
            if matches!(state, TurnState::ExecutingTools { .. }) && placed_now {
                placed_this_turn = true;
            }

            let marks_finished = result.effects.contains(&Effect::MarkFinished);
            prop_assert_eq!(marks_finished, result.new_state == TurnState::Finished);
            if marks_finished {
                prop_assert!(placed_this_turn);
            }
            if result.new_state == TurnState::Idle {
                placed_this_turn = false;
            }
            state = result.new_state;
        }
    }

    /// Once finished, the machine never leaves the terminal state
    #[test]
    fn prop_finished_is_terminal(step in arb_step()) {
        let result = transition(&TurnState::Finished, &test_context(4), to_event(step, &[]));
        prop_assert!(result.is_err());
    }

    /// Every successful turn ends with exactly one reply effect
    #[test]
    fn prop_reply_only_when_turn_ends(
        steps in prop::collection::vec(arb_step(), 1..40),
    ) {
        let ctx = test_context(4);
        let mut state = TurnState::Idle;

        for step in steps {
            let Ok(result) = transition(&state, &ctx, to_event(step, &[])) else {
                continue;
            };
            let replies = result
                .effects
                .iter()
                .filter(|e| matches!(e, Effect::Reply { .. }))
                .count();
            let ends_turn = matches!(result.new_state, TurnState::Idle | TurnState::Finished);
            prop_assert_eq!(replies, usize::from(ends_turn));
            state = result.new_state;
        }
    }
}
