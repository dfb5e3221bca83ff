//! The reasoning loop's vocabulary: actions, observations and the transcript.
//!
//! A session is a sequence of `Invoke` actions, each paired with the
//! observation its tool produced, closed by exactly one `Finish`. The
//! [`ActionSource`] decides what comes next given everything so far.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::{DecideError, TranscriptError};
use crate::tool::Lane;

/// A request to run one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    /// Free text (a JSON string) or a structured object.
    pub input: serde_json::Value,
}

impl ToolInvocation {
    /// The input as plain text, unquoted when it is a JSON string.
    pub fn input_text(&self) -> String {
        match &self.input {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// What the decision step asks for next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Invoke(ToolInvocation),
    Finish { output: String },
}

impl Action {
    pub fn invoke(tool: impl Into<String>, input: impl Into<serde_json::Value>) -> Self {
        Self::Invoke(ToolInvocation {
            tool: tool.into(),
            input: input.into(),
        })
    }

    pub fn finish(output: impl Into<String>) -> Self {
        Self::Finish {
            output: output.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationStatus {
    Success,
    Error,
}

/// The result of one tool invocation, as fed back to the decision step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub tool: String,
    pub status: ObservationStatus,
    pub content: serde_json::Value,
}

impl Observation {
    pub fn success(tool: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            status: ObservationStatus::Success,
            content,
        }
    }

    pub fn error(tool: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            status: ObservationStatus::Error,
            content,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ObservationStatus::Error
    }

    /// The content as prompt text: strings verbatim, everything else as JSON.
    pub fn render(&self) -> String {
        match &self.content {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// A dispatched invocation and what it produced.
    Step {
        action: ToolInvocation,
        lane: Lane,
        observation: Observation,
    },
    /// Unparseable model output, kept so the next prompt can correct it.
    Correction { raw: String, hint: String },
    Finish { output: String },
}

/// Everything that happened in one session, in order.
///
/// Append-only. Once `Finish` is recorded nothing else can be added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    input: String,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            entries: Vec::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.entries.last(), Some(TranscriptEntry::Finish { .. }))
    }

    fn push(&mut self, entry: TranscriptEntry) -> Result<(), TranscriptError> {
        if self.is_finished() {
            return Err(TranscriptError::Closed);
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn record_step(
        &mut self,
        action: ToolInvocation,
        lane: Lane,
        observation: Observation,
    ) -> Result<(), TranscriptError> {
        self.push(TranscriptEntry::Step {
            action,
            lane,
            observation,
        })
    }

    pub fn record_correction(
        &mut self,
        raw: impl Into<String>,
        hint: impl Into<String>,
    ) -> Result<(), TranscriptError> {
        self.push(TranscriptEntry::Correction {
            raw: raw.into(),
            hint: hint.into(),
        })
    }

    pub fn finish(&mut self, output: impl Into<String>) -> Result<(), TranscriptError> {
        self.push(TranscriptEntry::Finish {
            output: output.into(),
        })
    }

    /// Number of dispatched invocations.
    pub fn steps(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, TranscriptEntry::Step { .. }))
            .count()
    }

    pub fn corrections(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, TranscriptEntry::Correction { .. }))
            .count()
    }

    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.entries.iter().filter_map(|e| match e {
            TranscriptEntry::Step { observation, .. } => Some(observation),
            _ => None,
        })
    }

    pub fn final_output(&self) -> Option<&str> {
        match self.entries.last() {
            Some(TranscriptEntry::Finish { output }) => Some(output),
            _ => None,
        }
    }
}

/// The decision step of the reasoning loop.
///
/// Implementations: a model-backed ReAct decider and a scripted one for tests.
#[async_trait]
pub trait ActionSource: Send + Sync {
    async fn next_action(
        &self,
        input: &str,
        transcript: &Transcript,
    ) -> std::result::Result<Action, DecideError>;
}
