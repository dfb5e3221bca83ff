//! Parser for ReAct-formatted model output.
//!
//! The model is expected to reply with either
//!
//! ```text
//! Thought: ...
//! Action: <tool name>
//! Action Input: <input>
//! ```
//!
//! or
//!
//! ```text
//! Thought: I now know the final answer
//! Final Answer: <answer>
//! ```
//!
//! Anything else is a parse error whose reason is written so it can be fed
//! back to the model as a correction.

use regex_lite::Regex;
use std::sync::LazyLock;
use stratus_core::action::Action;
use stratus_core::error::DecideError;

pub const FINAL_ANSWER: &str = "Final Answer:";
pub const OBSERVATION_STOP: &str = "\nObservation";

pub const MISSING_ACTION: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
pub const MISSING_ACTION_INPUT: &str = "Invalid Format: Missing 'Action Input:' after 'Action:'";
pub const ACTION_AND_ANSWER: &str =
    "Invalid Format: Output contains both a final answer and an action. Reply with only one.";

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action pattern compiles")
});
static ACTION_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)")
        .expect("action pattern compiles")
});
static ACTION_INPUT_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action pattern compiles")
});

/// Turn one model reply into an [`Action`].
pub fn parse(text: &str) -> Result<Action, DecideError> {
    let has_answer = text.contains(FINAL_ANSWER);

    if let Some(caps) = ACTION.captures(text) {
        if has_answer {
            return Err(parse_error(text, ACTION_AND_ANSWER));
        }
        let tool = caps.get(1).map_or("", |m| m.as_str()).trim();
        let input = caps.get(2).map_or("", |m| m.as_str());
        return Ok(Action::invoke(tool, action_input(input)));
    }

    if has_answer {
        let answer = text.rsplit(FINAL_ANSWER).next().unwrap_or_default();
        return Ok(Action::finish(answer.trim()));
    }

    if !ACTION_ONLY.is_match(text) {
        Err(parse_error(text, MISSING_ACTION))
    } else if !ACTION_INPUT_ONLY.is_match(text) {
        Err(parse_error(text, MISSING_ACTION_INPUT))
    } else {
        Err(parse_error(text, "Invalid Format: Could not parse model output"))
    }
}

/// Clean up the text after `Action Input:`.
///
/// Drops anything from a hallucinated observation on, trims spaces and
/// surrounding double quotes. A JSON object stays structured.
fn action_input(raw: &str) -> serde_json::Value {
    let raw = raw.split(OBSERVATION_STOP).next().unwrap_or_default();
    let cleaned = raw.trim().trim_matches(|c| c == ' ' || c == '"');
    if cleaned.starts_with('{')
        && let Ok(value @ serde_json::Value::Object(_)) = serde_json::from_str(cleaned)
    {
        return value;
    }
    serde_json::Value::String(cleaned.to_string())
}

fn parse_error(raw: &str, reason: &str) -> DecideError {
    DecideError::Parse {
        raw: raw.to_string(),
        reason: reason.to_string(),
    }
}
