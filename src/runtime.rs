//! Turn controller
//!
//! Owns the shared pieces of the service (model client, tool catalog, menu,
//! session store) and runs one turn at a time per session. A turn works on a
//! copy of the session; the copy replaces the stored session only when the
//! turn succeeds.

mod executor;

#[cfg(test)]
pub mod testing;

use crate::llm::{LlmError, LlmErrorKind, LlmService, ToolDefinition};
use crate::menu::Menu;
use crate::session::{Session, SessionStore};
use crate::state_machine::{TransitionError, TurnContext};
use crate::system_prompt::build_system_prompt;
use crate::tools::ToolRegistry;
use executor::TurnExecutor;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// First user message of every session; the model answers it with a greeting
pub const KICKOFF_MESSAGE: &str = "Hello!";

/// Per-turn limits
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Model requests allowed per turn
    pub max_tool_rounds: u32,
    /// Deadline for a single model request
    pub model_timeout: Duration,
    pub tax_rate_bps: u32,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: 8,
            model_timeout: Duration::from_secs(30),
            tax_rate_bps: 800,
        }
    }
}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Order already placed for this session")]
    OrderAlreadyFinished,
    #[error("Message must not be empty")]
    EmptyMessage,
    #[error("Model made an invalid tool call: {0}")]
    InvalidToolCall(String),
    #[error("Model requested tools for {rounds} rounds without replying")]
    ToolLoopExceeded { rounds: u32 },
    #[error("Model did not respond within {0:?}")]
    ModelTimeout(Duration),
    #[error("Model request failed: {0}")]
    Model(#[from] LlmError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TurnError {
    /// Text safe to show the customer
    pub fn user_message(&self) -> String {
        match self {
            TurnError::SessionNotFound(_) => {
                "Session not found. Please start a new conversation.".to_string()
            }
            TurnError::OrderAlreadyFinished => {
                "Your order has already been placed. Start a new conversation to order again."
                    .to_string()
            }
            TurnError::EmptyMessage => "Please type a message.".to_string(),
            TurnError::InvalidToolCall(_) => {
                "Sorry, I got a bit mixed up there. Could you say that again?".to_string()
            }
            TurnError::ToolLoopExceeded { .. } => {
                "Sorry, I'm having trouble with that request. Could you rephrase it?".to_string()
            }
            TurnError::ModelTimeout(_) => {
                "Sorry, that took too long. Please try again.".to_string()
            }
            TurnError::Model(e) if e.kind == LlmErrorKind::Auth => {
                format!("The barista is unavailable: {}", e.message)
            }
            TurnError::Model(_) => {
                "Sorry, I'm having trouble right now. Please try again.".to_string()
            }
            TurnError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<TransitionError> for TurnError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::OrderFinished => TurnError::OrderAlreadyFinished,
            TransitionError::ToolLoopExceeded { rounds } => TurnError::ToolLoopExceeded { rounds },
            TransitionError::InvalidToolCall(message) => TurnError::InvalidToolCall(message),
            TransitionError::AgentBusy | TransitionError::InvalidTransition(_) => {
                TurnError::Internal(e.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StartOutcome {
    pub session_id: String,
    pub response: String,
    pub finished: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub response: String,
    pub finished: bool,
}

/// The ordering assistant
pub struct Barista {
    llm: Arc<dyn LlmService>,
    tools: ToolRegistry,
    tool_definitions: Vec<ToolDefinition>,
    menu: Arc<Menu>,
    sessions: Arc<SessionStore>,
    config: TurnConfig,
    system_prompt: String,
    context: TurnContext,
}

impl Barista {
    pub fn new(
        llm: Arc<dyn LlmService>,
        menu: Arc<Menu>,
        sessions: Arc<SessionStore>,
        config: TurnConfig,
    ) -> Self {
        let tools = ToolRegistry::standard();
        let tool_definitions = tools.definitions();
        let context = TurnContext::new(config.max_tool_rounds, tools.names());
        let system_prompt = build_system_prompt(&menu, config.tax_rate_bps);
        Self {
            llm,
            tools,
            tool_definitions,
            menu,
            sessions,
            config,
            system_prompt,
            context,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Open a session and produce the assistant's greeting.
    ///
    /// The session is discarded if the greeting fails.
    pub async fn start(&self) -> Result<StartOutcome, TurnError> {
        let (session_id, handle) = self.sessions.create().await;
        tracing::info!(session_id = %session_id, "Session created");

        let result = {
            let mut session = handle.lock().await;
            self.run_turn(&mut session, KICKOFF_MESSAGE.to_string())
                .await
        };

        match result {
            Ok(outcome) => Ok(StartOutcome {
                session_id,
                response: outcome.response,
                finished: outcome.finished,
            }),
            Err(e) => {
                self.sessions.remove(&session_id).await;
                tracing::warn!(session_id = %session_id, error = %e, "Greeting failed, session discarded");
                Err(e)
            }
        }
    }

    /// Run one customer turn
    pub async fn chat(&self, session_id: &str, message: &str) -> Result<ChatOutcome, TurnError> {
        let text = message.trim();
        if text.is_empty() {
            return Err(TurnError::EmptyMessage);
        }

        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or_else(|| TurnError::SessionNotFound(session_id.to_string()))?;

        // Held for the whole turn; concurrent calls for this session queue here
        let mut session = handle.lock().await;
        // Evicted or removed while we waited for the lock
        if !self.sessions.is_current(session_id, &handle).await {
            return Err(TurnError::SessionNotFound(session_id.to_string()));
        }
        if session.finished || session.phase.is_finished() {
            return Err(TurnError::OrderAlreadyFinished);
        }

        self.run_turn(&mut session, text.to_string()).await
    }

    async fn run_turn(&self, session: &mut Session, text: String) -> Result<ChatOutcome, TurnError> {
        let start = Instant::now();
        let mut working = session.clone();

        let result = TurnExecutor::new(self, &mut working).run(text).await;
        let duration_ms = start.elapsed().as_millis();

        match result {
            Ok(response) => {
                working.touch();
                *session = working;
                tracing::info!(
                    session_id = %session.id,
                    duration_ms = %duration_ms,
                    messages = session.transcript.len(),
                    session_age_secs = session.created_at.elapsed().as_secs(),
                    finished = session.finished,
                    "Turn completed"
                );
                Ok(ChatOutcome {
                    response,
                    finished: session.finished,
                })
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %session.id,
                    duration_ms = %duration_ms,
                    error = %e,
                    "Turn failed, session left unchanged"
                );
                Err(e)
            }
        }
    }
}
