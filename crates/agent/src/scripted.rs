//! Scripted decision step: replays a fixed list of decisions.
//!
//! Used by tests and dry runs. Once the script runs out every further call
//! fails with [`DecideError::Exhausted`].

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use stratus_core::action::{Action, ActionSource, Transcript};
use stratus_core::error::DecideError;

pub struct ScriptedActionSource {
    script: Mutex<VecDeque<Result<Action, DecideError>>>,
    served: Mutex<usize>,
}

impl ScriptedActionSource {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self::from_results(actions.into_iter().map(Ok))
    }

    /// A script that may also contain failures.
    pub fn from_results(results: impl IntoIterator<Item = Result<Action, DecideError>>) -> Self {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            served: Mutex::new(0),
        }
    }

    /// How many decisions have been handed out.
    pub fn served(&self) -> usize {
        self.served.lock().map(|n| *n).unwrap_or_default()
    }
}

#[async_trait]
impl ActionSource for ScriptedActionSource {
    async fn next_action(
        &self,
        _input: &str,
        _transcript: &Transcript,
    ) -> Result<Action, DecideError> {
        let next = match self.script.lock() {
            Ok(mut script) => script.pop_front(),
            Err(_) => None,
        };
        let mut served = match self.served.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match next {
            Some(result) => {
                *served += 1;
                result
            }
            None => Err(DecideError::Exhausted(*served)),
        }
    }
}
