//! ReAct prompt construction.
//!
//! The system message carries the architect persona, the tool catalogue and
//! the reply format. The user message carries the question and a scratchpad
//! replaying every step so far, ending on an open `Thought:` for the model
//! to continue.

use stratus_core::action::{Transcript, TranscriptEntry};
use stratus_core::message::Message;
use stratus_core::tool::ToolRegistry;

const PREAMBLE: &str = "\
You are an AWS solutions architect. You help people design, review and document \
architectures on AWS. Ground recommendations in the AWS Well-Architected Framework, \
check service capabilities before recommending them, and when asked for a diagram, \
generate the diagram code, run it, and tell the user the image file name.";

const FORMAT: &str = "\
Reply using exactly this format:

Question: the question you must answer
Thought: what you should do next
Action: the tool to use, one of [{tool_names}]
Action Input: the input for the tool
Observation: the tool's result
... (Thought/Action/Action Input/Observation may repeat)
Thought: I now know the final answer
Final Answer: the answer to the original question

Write only one Action per reply and stop after Action Input.";

/// The system message for a registry.
pub fn system_prompt(registry: &ToolRegistry) -> String {
    let names = registry.names().join(", ");
    format!(
        "{PREAMBLE}\n\nYou have access to the following tools:\n\n{}\n\n{}",
        registry.describe(),
        FORMAT.replace("{tool_names}", &names)
    )
}

/// Replay the transcript in the reply format.
pub fn scratchpad(transcript: &Transcript) -> String {
    let mut pad = String::new();
    for entry in transcript.entries() {
        match entry {
            TranscriptEntry::Step {
                action,
                observation,
                ..
            } => {
                pad.push_str(&format!(
                    " \nAction: {}\nAction Input: {}\nObservation: {}\nThought:",
                    action.tool,
                    action.input_text(),
                    observation.render()
                ));
            }
            TranscriptEntry::Correction { raw, hint } => {
                pad.push_str(&format!(" {}\nObservation: {hint}\nThought:", raw.trim()));
            }
            TranscriptEntry::Finish { .. } => {}
        }
    }
    pad
}

/// Messages for the next decision.
pub fn messages(system: &str, input: &str, transcript: &Transcript) -> Vec<Message> {
    vec![
        Message::system(system),
        Message::user(format!(
            "Begin!\n\nQuestion: {input}\nThought:{}",
            scratchpad(transcript)
        )),
    ]
}
