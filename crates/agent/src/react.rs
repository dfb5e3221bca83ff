//! Model-backed decision step.
//!
//! Each call renders the ReAct prompt for the transcript so far, asks the
//! provider for one completion (stopping before `Observation`), and parses
//! the reply into an [`Action`].

use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::action::{Action, ActionSource, Transcript};
use stratus_core::error::DecideError;
use stratus_core::provider::{Provider, ProviderRequest};
use stratus_core::tool::ToolRegistry;
use tracing::debug;

use crate::parser::{self, OBSERVATION_STOP};
use crate::prompt;

pub struct ReactActionSource {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system_prompt: String,
}

impl ReactActionSource {
    /// The tool catalogue is rendered once, from `registry`.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        registry: &ToolRegistry,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            system_prompt: prompt::system_prompt(registry),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl ActionSource for ReactActionSource {
    async fn next_action(
        &self,
        input: &str,
        transcript: &Transcript,
    ) -> Result<Action, DecideError> {
        let request = ProviderRequest::new(
            &self.model,
            prompt::messages(&self.system_prompt, input, transcript),
        )
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens)
        .with_stop(vec![OBSERVATION_STOP.to_string()]);

        let response = self.provider.complete(request).await?;
        debug!(
            model = %response.model,
            chars = response.message.content.len(),
            "Model replied"
        );
        parser::parse(&response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::SequentialMockProvider;
    use stratus_core::error::ProviderError;

    #[tokio::test]
    async fn parses_model_reply_into_action() {
        let provider = Arc::new(SequentialMockProvider::texts(&[
            "Thought: check the docs\nAction: well_arch_tool\nAction Input: security pillar",
        ]));
        let source =
            ReactActionSource::new(provider.clone(), "anthropic.claude-v2", &ToolRegistry::new());

        let action = source.next_action("q", &Transcript::new("q")).await.unwrap();
        assert_eq!(action, Action::invoke("well_arch_tool", "security pillar"));

        assert_eq!(provider.call_count(), 1);
        let request = provider.last_request().unwrap();
        assert_eq!(request.stop, vec!["\nObservation".to_string()]);
        assert_eq!(request.model, "anthropic.claude-v2");
        assert!(request.system_prompt().unwrap().contains("AWS solutions architect"));
    }

    #[tokio::test]
    async fn provider_failure_surfaces_as_provider_error() {
        let provider = Arc::new(SequentialMockProvider::failing(ProviderError::Timeout(
            "converse".into(),
        )));
        let source = ReactActionSource::new(provider, "m", &ToolRegistry::new());
        let err = source.next_action("q", &Transcript::new("q")).await.unwrap_err();
        assert!(matches!(err, DecideError::Provider(ProviderError::Timeout(_))));
    }

    #[tokio::test]
    async fn unparseable_reply_is_parse_error() {
        let provider = Arc::new(SequentialMockProvider::texts(&["I think S3 is good."]));
        let source = ReactActionSource::new(provider, "m", &ToolRegistry::new());
        let err = source.next_action("q", &Transcript::new("q")).await.unwrap_err();
        assert!(matches!(err, DecideError::Parse { .. }));
    }
}
