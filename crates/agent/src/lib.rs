//! The reasoning loop for Stratus.
//!
//! A session alternates between asking an [`ActionSource`] what to do next
//! and dispatching the chosen tool, until the source finishes or a limit
//! trips:
//!
//! 1. **Think**: the action source sees the question and the transcript so far
//! 2. **Dispatch**: the tool runs; its result is appended as an observation
//! 3. **Repeat** until `Finish`, the final-response tool, or an abort
//!
//! [`ReactActionSource`] drives the loop with a chat model using the ReAct
//! text format; [`ScriptedActionSource`] replays fixed decisions.
//!
//! [`ActionSource`]: stratus_core::action::ActionSource

pub mod loop_runner;
pub mod parser;
pub mod prompt;
pub mod react;
pub mod scripted;

#[cfg(test)]
mod test_helpers;

pub use loop_runner::{
    AbortReason, GENERIC_FAILURE, ReasoningLoop, SessionConfig, SessionOutcome, SessionStatus,
};
pub use react::ReactActionSource;
pub use scripted::ScriptedActionSource;
