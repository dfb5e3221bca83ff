//! The reasoning loop: one state machine for every session.
//!
//! ```text
//! Thinking ──Invoke──▶ Dispatching ──observation──▶ Thinking
//!    │                     │
//!    │ Finish              │ FinalResponse lane
//!    ▼                     ▼
//!   Done ◀─────────────────┘
//!
//! Thinking ──(steps ≥ max_iterations | parse failure | model failure)──▶ Aborted
//! ```
//!
//! The loop owns the transcript. Tools and the decision step are injected,
//! so the same loop runs against Bedrock in production and a script in tests.

use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use stratus_config::{AgentConfig, ParseErrorPolicy};
use stratus_core::action::{Action, ActionSource, Observation, ToolInvocation, Transcript};
use stratus_core::error::DecideError;
use stratus_core::tool::{Lane, ToolRegistry};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Shown to the user whenever a session aborts.
pub const GENERIC_FAILURE: &str = "Sorry, I could not process your request.";

/// Per-session limits.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub max_iterations: u32,
    pub on_parse_error: ParseErrorPolicy,
    pub max_parse_retries: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

impl From<&AgentConfig> for SessionConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            on_parse_error: config.on_parse_error,
            max_parse_retries: config.max_parse_retries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum AbortReason {
    /// The step budget ran out.
    RecursionLimit,
    ParseFailure(String),
    ModelUnavailable(String),
    Internal(String),
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecursionLimit => f.write_str("recursion limit exceeded"),
            Self::ParseFailure(reason) => write!(f, "could not parse model output: {reason}"),
            Self::ModelUnavailable(reason) => write!(f, "model unavailable: {reason}"),
            Self::Internal(reason) => write!(f, "internal error: {reason}"),
        }
    }
}

#[derive(Debug)]
enum LoopState {
    Thinking,
    Dispatching(ToolInvocation),
    Done(String),
    Aborted(AbortReason),
}

impl LoopState {
    fn name(&self) -> &'static str {
        match self {
            Self::Thinking => "thinking",
            Self::Dispatching(_) => "dispatching",
            Self::Done(_) => "done",
            Self::Aborted(_) => "aborted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    Done { output: String },
    Aborted { reason: AbortReason },
}

/// How a session ended, with everything it did.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub status: SessionStatus,
    pub transcript: Transcript,
    /// Dispatched invocations, including one that finished the session.
    pub steps: u32,
}

impl SessionOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self.status, SessionStatus::Done { .. })
    }

    /// What the user gets to see.
    pub fn reply(&self) -> &str {
        match &self.status {
            SessionStatus::Done { output } => output,
            SessionStatus::Aborted { .. } => GENERIC_FAILURE,
        }
    }
}

pub struct ReasoningLoop {
    registry: Arc<ToolRegistry>,
    source: Arc<dyn ActionSource>,
    config: SessionConfig,
}

impl ReasoningLoop {
    pub fn new(registry: Arc<ToolRegistry>, source: Arc<dyn ActionSource>) -> Self {
        Self {
            registry,
            source,
            config: SessionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one session to completion. Never fails; see [`SessionOutcome`].
    pub async fn run(&self, input: &str) -> SessionOutcome {
        let session_id = Uuid::new_v4();
        info!(session_id = %session_id, input_chars = input.len(), "Starting session");

        let mut transcript = Transcript::new(input);
        let mut steps: u32 = 0;
        let mut state = LoopState::Thinking;

        loop {
            state = match state {
                LoopState::Thinking if steps >= self.config.max_iterations => {
                    LoopState::Aborted(AbortReason::RecursionLimit)
                }
                LoopState::Thinking => self.think(input, &mut transcript).await,
                LoopState::Dispatching(call) => {
                    steps += 1;
                    self.dispatch(call, &mut transcript).await
                }
                LoopState::Done(output) => {
                    info!(session_id = %session_id, steps, "Session finished");
                    return SessionOutcome {
                        status: SessionStatus::Done { output },
                        transcript,
                        steps,
                    };
                }
                LoopState::Aborted(reason) => {
                    warn!(session_id = %session_id, steps, reason = %reason, "Session aborted");
                    return SessionOutcome {
                        status: SessionStatus::Aborted { reason },
                        transcript,
                        steps,
                    };
                }
            };
            debug!(session_id = %session_id, state = state.name(), steps, "Transition");
        }
    }

    async fn think(&self, input: &str, transcript: &mut Transcript) -> LoopState {
        match self.source.next_action(input, transcript).await {
            Ok(Action::Invoke(call)) => LoopState::Dispatching(call),
            Ok(Action::Finish { output }) => finish(transcript, output),
            Err(DecideError::Parse { raw, reason }) => match self.config.on_parse_error {
                ParseErrorPolicy::Retry
                    if transcript.corrections() < self.config.max_parse_retries as usize =>
                {
                    debug!(reason = %reason, "Asking the model to correct its output");
                    match transcript.record_correction(raw, reason) {
                        Ok(()) => LoopState::Thinking,
                        Err(e) => LoopState::Aborted(AbortReason::Internal(e.to_string())),
                    }
                }
                _ => LoopState::Aborted(AbortReason::ParseFailure(reason)),
            },
            Err(e) => LoopState::Aborted(AbortReason::ModelUnavailable(e.to_string())),
        }
    }

    async fn dispatch(&self, call: ToolInvocation, transcript: &mut Transcript) -> LoopState {
        let lane = self.registry.lane_of(&call.tool);
        match lane {
            Lane::CodeExecution => {
                warn!(tool = %call.tool, lane = %lane, "Executing generated code")
            }
            _ => info!(tool = %call.tool, lane = %lane, "Dispatching"),
        }

        let Some(tool) = self.registry.get(&call.tool) else {
            warn!(tool = %call.tool, "Model asked for an unknown tool");
            let observation = Observation::error(
                &call.tool,
                serde_json::json!({
                    "error": format!("tool `{}` not found", call.tool),
                    "available": self.registry.names(),
                }),
            );
            return record(transcript, call, lane, observation);
        };

        if lane == Lane::FinalResponse {
            return finish(transcript, call.input_text());
        }

        let outcome = AssertUnwindSafe(tool.execute(call.input.clone()))
            .catch_unwind()
            .await;
        let observation = match outcome {
            Ok(Ok(result)) if result.success => Observation::success(&call.tool, result.content()),
            Ok(Ok(result)) => Observation::error(&call.tool, result.content()),
            Ok(Err(e)) => {
                warn!(tool = %call.tool, error = %e, "Tool failed");
                Observation::error(&call.tool, serde_json::json!({ "error": e.to_string() }))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(tool = %call.tool, panic = %message, "Tool panicked");
                Observation::error(
                    &call.tool,
                    serde_json::json!({ "error": format!("tool panicked: {message}") }),
                )
            }
        };
        record(transcript, call, lane, observation)
    }
}

fn record(
    transcript: &mut Transcript,
    call: ToolInvocation,
    lane: Lane,
    observation: Observation,
) -> LoopState {
    match transcript.record_step(call, lane, observation) {
        Ok(()) => LoopState::Thinking,
        Err(e) => LoopState::Aborted(AbortReason::Internal(e.to_string())),
    }
}

fn finish(transcript: &mut Transcript, output: String) -> LoopState {
    match transcript.finish(output.clone()) {
        Ok(()) => LoopState::Done(output),
        Err(e) => LoopState::Aborted(AbortReason::Internal(e.to_string())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedActionSource;
    use crate::test_helpers::{EchoTool, FailingTool, PanickingTool};
    use stratus_core::action::TranscriptEntry;
    use stratus_core::error::ProviderError;
    use stratus_core::tool::Tool;

    fn registry() -> Arc<ToolRegistry> {
        let tools: Vec<Box<dyn Tool>> = vec![
            Box::new(EchoTool { name: "a", lane: Lane::DocumentLookup }),
            Box::new(EchoTool { name: "b", lane: Lane::CommandExecution }),
            Box::new(EchoTool { name: "response_tool", lane: Lane::FinalResponse }),
            Box::new(FailingTool),
            Box::new(PanickingTool),
        ];
        Arc::new(ToolRegistry::from_tools(tools).unwrap())
    }

    fn run_loop(script: Vec<Action>) -> ReasoningLoop {
        ReasoningLoop::new(registry(), Arc::new(ScriptedActionSource::new(script)))
    }

    fn parse_err(reason: &str) -> Result<Action, DecideError> {
        Err(DecideError::Parse { raw: "bad".into(), reason: reason.into() })
    }

    #[tokio::test]
    async fn two_invocations_then_finish() {
        let outcome = run_loop(vec![
            Action::invoke("a", "x"),
            Action::invoke("b", "y"),
            Action::finish("done"),
        ])
        .run("question")
        .await;

        assert_eq!(outcome.status, SessionStatus::Done { output: "done".into() });
        assert_eq!(outcome.reply(), "done");
        assert_eq!(outcome.steps, 2);

        let entries = outcome.transcript.entries();
        assert_eq!(entries.len(), 3);
        match (&entries[0], &entries[1]) {
            (
                TranscriptEntry::Step { action: first, lane: first_lane, observation: o1 },
                TranscriptEntry::Step { action: second, observation: o2, .. },
            ) => {
                assert_eq!(first.tool, "a");
                assert_eq!(*first_lane, Lane::DocumentLookup);
                assert_eq!(o1.content, serde_json::json!({"echo": "x"}));
                assert_eq!(second.tool, "b");
                assert_eq!(o2.content, serde_json::json!({"echo": "y"}));
            }
            other => panic!("unexpected entries {other:?}"),
        }
        assert!(matches!(&entries[2], TranscriptEntry::Finish { output } if output == "done"));
    }

    #[tokio::test]
    async fn unknown_tool_is_error_observation_and_loop_continues() {
        let outcome = run_loop(vec![Action::invoke("nope", "x"), Action::finish("ok")])
            .run("q")
            .await;
        assert!(outcome.is_done());
        let observation = outcome.transcript.observations().next().unwrap();
        assert!(observation.is_error());
        assert_eq!(observation.content["error"], "tool `nope` not found");
        assert!(
            observation.content["available"]
                .as_array()
                .unwrap()
                .contains(&serde_json::json!("a"))
        );
    }

    #[tokio::test]
    async fn tool_failure_and_panic_become_observations() {
        let outcome = run_loop(vec![
            Action::invoke("failing", "x"),
            Action::invoke("panicking", "x"),
            Action::finish("recovered"),
        ])
        .run("q")
        .await;
        assert_eq!(outcome.reply(), "recovered");
        let observations: Vec<_> = outcome.transcript.observations().collect();
        assert_eq!(observations.len(), 2);
        assert!(observations.iter().all(|o| o.is_error()));
        assert!(observations[1].content["error"].as_str().unwrap().contains("tool blew up"));
    }

    #[tokio::test]
    async fn response_tool_finishes_with_its_input() {
        let outcome = run_loop(vec![
            Action::invoke("response_tool", "Use CloudFront in front of S3."),
            Action::invoke("a", "never dispatched"),
        ])
        .run("q")
        .await;
        assert_eq!(outcome.reply(), "Use CloudFront in front of S3.");
        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.transcript.entries().len(), 1);
        assert!(outcome.transcript.is_finished());
    }

    #[tokio::test]
    async fn aborts_exactly_at_iteration_limit() {
        let script = (0..10).map(|i| Action::invoke("a", format!("{i}"))).collect();
        let outcome = run_loop(script)
            .with_config(SessionConfig { max_iterations: 3, ..SessionConfig::default() })
            .run("q")
            .await;
        assert_eq!(outcome.status, SessionStatus::Aborted { reason: AbortReason::RecursionLimit });
        assert_eq!(outcome.steps, 3);
        assert_eq!(outcome.transcript.steps(), 3);
        assert!(!outcome.transcript.is_finished());
        assert_eq!(outcome.reply(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn finish_on_last_allowed_step_is_not_aborted() {
        let outcome = run_loop(vec![Action::invoke("a", "x"), Action::finish("done")])
            .with_config(SessionConfig { max_iterations: 2, ..SessionConfig::default() })
            .run("q")
            .await;
        assert!(outcome.is_done());
    }

    #[tokio::test]
    async fn parse_failure_retried_with_correction() {
        let source = ScriptedActionSource::from_results([
            parse_err("Invalid Format: Missing 'Action:' after 'Thought:'"),
            Ok(Action::finish("fixed")),
        ]);
        let outcome = ReasoningLoop::new(registry(), Arc::new(source)).run("q").await;
        assert_eq!(outcome.reply(), "fixed");
        assert_eq!(outcome.transcript.corrections(), 1);
        assert_eq!(outcome.steps, 0);
    }

    #[tokio::test]
    async fn parse_retries_are_bounded() {
        let source = ScriptedActionSource::from_results((0..5).map(|_| parse_err("bad format")));
        let config = SessionConfig { max_parse_retries: 2, ..SessionConfig::default() };
        let outcome = ReasoningLoop::new(registry(), Arc::new(source))
            .with_config(config)
            .run("q")
            .await;
        assert_eq!(
            outcome.status,
            SessionStatus::Aborted { reason: AbortReason::ParseFailure("bad format".into()) }
        );
        assert_eq!(outcome.transcript.corrections(), 2);
    }

    #[tokio::test]
    async fn abort_policy_stops_on_first_parse_failure() {
        let source =
            ScriptedActionSource::from_results([parse_err("bad"), Ok(Action::finish("x"))]);
        let config = SessionConfig {
            on_parse_error: ParseErrorPolicy::Abort,
            ..SessionConfig::default()
        };
        let outcome = ReasoningLoop::new(registry(), Arc::new(source))
            .with_config(config)
            .run("q")
            .await;
        assert!(matches!(
            outcome.status,
            SessionStatus::Aborted { reason: AbortReason::ParseFailure(_) }
        ));
        assert_eq!(outcome.transcript.corrections(), 0);
    }

    #[tokio::test]
    async fn model_failure_aborts() {
        let source = ScriptedActionSource::from_results([Err(DecideError::Provider(
            ProviderError::AuthenticationFailed("expired token".into()),
        ))]);
        let outcome = ReasoningLoop::new(registry(), Arc::new(source)).run("q").await;
        assert!(matches!(
            outcome.status,
            SessionStatus::Aborted { reason: AbortReason::ModelUnavailable(_) }
        ));
        assert_eq!(outcome.reply(), GENERIC_FAILURE);
    }

    #[test]
    fn default_session_config_matches_agent_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.on_parse_error, ParseErrorPolicy::Retry);
        assert_eq!(config.max_parse_retries, 3);
    }
}
