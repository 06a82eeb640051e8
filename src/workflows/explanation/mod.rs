//! Natural-language explanations of match scores behind a resilient provider layer.

pub mod cache;
pub mod consistency;
pub mod domain;
pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod resilience;
pub mod service;

#[cfg(test)]
mod tests;

pub use cache::{cache_key, CacheError, ExplanationCache, InMemoryExplanationCache};
pub use consistency::{ConsistencyChecker, ConsistencyRule, RuleScope, Violation, ViolationKind};
pub use domain::{
    Explanation, ExplanationContent, ExplanationSource, FallbackReason, OrganizationSummary,
    ProgramSummary,
};
pub use fallback::{fallback_content, fallback_explanation};
pub use parser::{parse_explanation, ResponseParseError};
pub use prompt::build_request;
pub use provider::{
    AnthropicProvider, ExplanationProvider, GenerationRequest, ProviderError, ProviderResponse,
    TokenPricing,
};
pub use resilience::{
    CircuitState, ResilienceController, ResilienceError, ResilienceSettings, Unavailable,
};
pub use service::{BatchItem, BatchReport, BatchRequest, ExplanationError, ExplanationService};
