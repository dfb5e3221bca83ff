//! Tools for the Stratus architecture assistant.
//!
//! Six tools, one per lane the reasoning loop knows about:
//! document lookup over the Well-Architected Framework and the AWS services
//! overview, AWS CLI execution, diagram code generation, Python execution,
//! and the final response.
//!
//! Every external effect goes through an injected dependency
//! ([`ToolDeps`]), so the whole registry can be built against fakes.

pub mod aws_cli;
pub mod executor;
pub mod knowledge_lookup;
pub mod prompts;
pub mod python_interpreter;
pub mod response;
pub mod retrieval_qa;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use stratus_config::{AppConfig, KnowledgeMode};
use stratus_core::embedding::Embedder;
use stratus_core::error::ToolError;
use stratus_core::executor::{CodeInterpreter, CommandExecutor};
use stratus_core::provider::Provider;
use stratus_core::store::DocumentStore;
use stratus_core::tool::ToolRegistry;

pub use aws_cli::AwsCliTool;
pub use executor::{PythonInterpreter, ShellExecutor};
pub use knowledge_lookup::KnowledgeLookupTool;
pub use python_interpreter::{PythonInterpreterTool, strip_code_fences};
pub use response::ResponseTool;
pub use retrieval_qa::{QaBackend, RetrievalQaTool};

pub const WELL_ARCH: &str = "well_arch_tool";
pub(crate) const WELL_ARCH_DESCRIPTION: &str = "Looks up guidance in the AWS Well-Architected \
    Framework. Input is a question about design principles or best practices.";

/// Everything the tools reach outside the process through.
#[derive(Clone)]
pub struct ToolDeps {
    pub provider: Arc<dyn Provider>,
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn DocumentStore>,
    pub commands: Arc<dyn CommandExecutor>,
    pub interpreter: Arc<dyn CodeInterpreter>,
}

impl ToolDeps {
    /// Process-backed executors from config, with the given model stack.
    pub fn with_local_executors(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let mut interpreter = PythonInterpreter::new(&config.interpreter.python);
        if config.interpreter.bootstrap {
            interpreter = interpreter.with_bootstrap(config.interpreter.bootstrap_packages.clone());
        }
        Self {
            provider,
            embedder,
            store,
            commands: Arc::new(ShellExecutor::new()),
            interpreter: Arc::new(interpreter),
        }
    }
}

/// Build the architect tool registry.
pub fn architect_registry(config: &AppConfig, deps: &ToolDeps) -> Result<ToolRegistry, ToolError> {
    let collections = &config.store.collections;
    let backend = QaBackend {
        embedder: deps.embedder.clone(),
        store: deps.store.clone(),
        provider: deps.provider.clone(),
        model: config.default_model.clone(),
        temperature: config.default_temperature,
        max_tokens: Some(config.default_max_tokens),
        top_k: config.store.top_k,
    };

    let well_arch: Box<dyn stratus_core::tool::Tool> = match config.tools.well_architected_mode {
        KnowledgeMode::Raw => Box::new(
            KnowledgeLookupTool::new(
                WELL_ARCH,
                WELL_ARCH_DESCRIPTION,
                &collections.well_architected,
                deps.embedder.clone(),
                deps.store.clone(),
            )
            .with_top_k(config.store.top_k),
        ),
        KnowledgeMode::Rag => Box::new(RetrievalQaTool::well_architected(
            backend.clone(),
            &collections.well_architected,
        )),
    };

    ToolRegistry::from_tools([
        well_arch,
        Box::new(RetrievalQaTool::web_services(backend.clone(), &collections.web_services)),
        Box::new(
            AwsCliTool::new(deps.commands.clone())
                .with_allowlist(config.tools.cli_allowlist.clone()),
        ),
        Box::new(RetrievalQaTool::diagram_code(backend, &collections.diagrams)),
        Box::new(PythonInterpreterTool::new(deps.interpreter.clone())),
        Box::new(ResponseTool),
    ])
}
