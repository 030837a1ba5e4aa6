pub mod analyzer;
pub mod gemini;
pub mod improver;
pub mod invoker;
pub mod prompts;
pub mod reporter;
pub mod success_searcher;

pub use analyzer::AnalyzerAgent;
pub use gemini::{GeminiClient, GeminiConfig};
pub use improver::ImproverAgent;
pub use invoker::{
    AgentError, AgentInvoker, ConversationRegistry, EventStream, LlmProvider, ProviderError,
    ResponseEvent,
};
pub use reporter::ReporterAgent;
pub use success_searcher::SuccessSearcherAgent;

// Agent names, also used as the conversation suffix for each run
pub const ANALYZER_AGENT: &str = "agente_analisador";
pub const IMPROVER_AGENT: &str = "agente_melhorias";
pub const SUCCESS_SEARCHER_AGENT: &str = "agente_buscador_sucesso";
pub const REPORTER_AGENT: &str = "agente_relatorio";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    WebSearch,
}

/// Which configured model a stage runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Faster and cheaper.
    Fast,
    /// More capable; used where search quality matters.
    Robust,
}

/// Model identifiers for each tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTiers {
    pub fast: String,
    pub robust: String,
}

impl ModelTiers {
    pub fn new(fast: impl Into<String>, robust: impl Into<String>) -> Self {
        Self {
            fast: fast.into(),
            robust: robust.into(),
        }
    }

    pub fn resolve(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Robust => &self.robust,
        }
    }
}

/// Immutable configuration for one agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub name: String,
    pub model: String,
    pub instruction: String,
    pub capabilities: Vec<Capability>,
}

impl AgentSpec {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            instruction: instruction.into(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    pub fn has_web_search(&self) -> bool {
        self.capabilities.contains(&Capability::WebSearch)
    }
}
