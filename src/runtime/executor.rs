//! Drives the state machine through one turn
//!
//! Effects are executed in order against the working copy of the session.
//! Events produced by effects (model replies, tool outcomes) are fed back
//! into the transition function until the turn ends with a reply or fails.

use super::{Barista, TurnError};
use crate::llm::{LlmErrorKind, LlmRequest, ModelReply, SystemContent, ToolCall};
use crate::order::{OrderError, OrderStatus};
use crate::session::Session;
use crate::state_machine::{transition, Effect, TurnEvent};
use crate::tools::{ToolContext, ToolError};
use crate::transcript::ToolResult;
use std::collections::VecDeque;
use std::time::Instant;

/// Output budget for a single model reply
const MAX_REPLY_TOKENS: u32 = 1024;

pub(super) struct TurnExecutor<'a> {
    barista: &'a Barista,
    session: &'a mut Session,
    reply: Option<String>,
}

impl<'a> TurnExecutor<'a> {
    pub(super) fn new(barista: &'a Barista, session: &'a mut Session) -> Self {
        Self {
            barista,
            session,
            reply: None,
        }
    }

    /// Run the turn started by `text` and return the reply for the customer
    pub(super) async fn run(mut self, text: String) -> Result<String, TurnError> {
        let mut events = VecDeque::from([TurnEvent::UserMessage { text }]);

        while let Some(event) = events.pop_front() {
            let result = transition(&self.session.phase, &self.barista.context, event)?;
            self.session.phase = result.new_state;

            for effect in result.effects {
                if let Some(next) = self.execute_effect(effect).await? {
                    events.push_back(next);
                }
            }
        }

        self.reply
            .ok_or_else(|| TurnError::Internal("turn ended without a reply".to_string()))
    }

    async fn execute_effect(&mut self, effect: Effect) -> Result<Option<TurnEvent>, TurnError> {
        match effect {
            Effect::AppendMessage(message) => {
                self.session.transcript.push(message);
                Ok(None)
            }

            Effect::RequestModel { round } => {
                let reply = self.request_model(round).await?;
                Ok(Some(TurnEvent::ModelReply { reply }))
            }

            Effect::ExecuteTools { calls } => Ok(Some(self.execute_tools(&calls))),

            Effect::MarkFinished => {
                tracing::info!(session_id = %self.session.id, "Order placed, session finished");
                self.session.finished = true;
                Ok(None)
            }

            Effect::Reply { text } => {
                self.reply = Some(text);
                Ok(None)
            }
        }
    }

    async fn request_model(&self, round: u32) -> Result<ModelReply, TurnError> {
        let request = LlmRequest {
            system: vec![SystemContent::new(self.barista.system_prompt.clone())],
            messages: self
                .session
                .transcript
                .iter()
                .map(crate::transcript::Message::to_llm_message)
                .collect(),
            tools: self.barista.tool_definitions.clone(),
            max_tokens: Some(MAX_REPLY_TOKENS),
        };

        let timeout = self.barista.config.model_timeout;
        let response = match tokio::time::timeout(timeout, self.barista.llm.complete(&request)).await
        {
            Err(_elapsed) => {
                tracing::warn!(
                    session_id = %self.session.id,
                    round,
                    timeout_ms = %timeout.as_millis(),
                    "Model request timed out"
                );
                return Err(TurnError::ModelTimeout(timeout));
            }
            Ok(Err(e)) if e.kind == LlmErrorKind::Timeout => {
                return Err(TurnError::ModelTimeout(timeout));
            }
            Ok(Err(e)) => return Err(TurnError::Model(e)),
            Ok(Ok(response)) => response,
        };

        let reply = response.into_reply();
        match &reply {
            ModelReply::Text(text) if text.is_empty() => {
                tracing::warn!(session_id = %self.session.id, round, "Model returned an empty reply");
            }
            ModelReply::Text(_) => {}
            ModelReply::ToolUse(calls) => {
                tracing::debug!(
                    session_id = %self.session.id,
                    round,
                    tools = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                    "Model requested tools"
                );
            }
        }
        Ok(reply)
    }

    /// Run calls in order; the first order error stops the batch
    fn execute_tools(&mut self, calls: &[ToolCall]) -> TurnEvent {
        let was_placed = self.session.order.status() == OrderStatus::Placed;
        let mut results = Vec::with_capacity(calls.len());

        for (index, call) in calls.iter().enumerate() {
            let start = Instant::now();
            let ctx = ToolContext {
                menu: &self.barista.menu,
                order: &mut self.session.order,
                tax_rate_bps: self.barista.config.tax_rate_bps,
            };
            let outcome = self
                .barista
                .tools
                .execute(&call.name, call.input.clone(), ctx);

            match outcome {
                Ok(output) => {
                    tracing::info!(
                        session_id = %self.session.id,
                        tool = %call.name,
                        duration_ms = %start.elapsed().as_millis(),
                        "Tool completed"
                    );
                    results.push(ToolResult::success(call, output.output).with_display(output.display_data));
                }
                Err(ToolError::Order(e)) => {
                    tracing::info!(
                        session_id = %self.session.id,
                        tool = %call.name,
                        error = %e,
                        "Tool rejected by order rules"
                    );
                    results.push(ToolResult::error(call, e.to_string()));
                    results.extend(calls.iter().skip(index + 1).map(ToolResult::skipped));
                    return TurnEvent::ToolRejected {
                        results,
                        apology: apology_for(&e),
                        order_placed: !was_placed
                            && self.session.order.status() == OrderStatus::Placed,
                    };
                }
                Err(ToolError::InvalidInput { tool, message }) => {
                    tracing::warn!(
                        session_id = %self.session.id,
                        tool = %tool,
                        error = %message,
                        "Tool called with invalid input"
                    );
                    return TurnEvent::ToolInputInvalid { tool, message };
                }
                Err(ToolError::UnknownTool(name)) => {
                    return TurnEvent::ToolInputInvalid {
                        tool: name,
                        message: "tool is not registered".to_string(),
                    };
                }
            }
        }

        TurnEvent::ToolsComplete {
            results,
            order_placed: !was_placed && self.session.order.status() == OrderStatus::Placed,
        }
    }
}

fn apology_for(error: &OrderError) -> String {
    match error {
        OrderError::UnknownItem(_) | OrderError::UnknownModifier { .. } => {
            format!("{error} Would you like to hear what we do have?")
        }
        OrderError::EmptyOrder => format!("{error} What can I get started for you?"),
        OrderError::NotConfirmed => {
            format!("{error} Let me read it back to you first; just say when you're ready.")
        }
        OrderError::InvalidQuantity(_) | OrderError::AlreadyPlaced => error.to_string(),
    }
}
