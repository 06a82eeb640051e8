use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::matching::{FundingProgram, Organization, OrganizationId, ProgramId};

/// The slice of an organization an explanation is allowed to mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: OrganizationId,
    pub name: String,
    pub industry_sector: String,
    pub trl_level: u8,
}

impl From<&Organization> for OrganizationSummary {
    fn from(organization: &Organization) -> Self {
        Self {
            id: organization.id.clone(),
            name: organization.name.clone(),
            industry_sector: organization.industry_sector.clone(),
            trl_level: organization.trl_level,
        }
    }
}

/// The slice of a program an explanation is allowed to mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub id: ProgramId,
    pub title: String,
    pub agency: String,
    pub deadline: Option<NaiveDate>,
}

impl From<&FundingProgram> for ProgramSummary {
    fn from(program: &FundingProgram) -> Self {
        Self {
            id: program.id.clone(),
            title: program.title.clone(),
            agency: program.agency.clone(),
            deadline: program.deadline,
        }
    }
}

/// Body of an explanation, as generated or templated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationContent {
    pub summary: String,
    pub reasons: Vec<String>,
    pub cautions: Vec<String>,
    pub recommendation: String,
}

impl ExplanationContent {
    /// Every text field, for phrase checks.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.summary.as_str())
            .chain(self.reasons.iter().map(String::as_str))
            .chain(self.cautions.iter().map(String::as_str))
            .chain(std::iter::once(self.recommendation.as_str()))
    }
}

/// Why templated content was served instead of a generated explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallbackReason {
    ProviderError,
    CircuitOpen,
    BudgetExhausted,
    RateLimited,
    Timeout,
    MalformedResponse,
}

impl FallbackReason {
    pub const fn label(self) -> &'static str {
        match self {
            FallbackReason::ProviderError => "PROVIDER_ERROR",
            FallbackReason::CircuitOpen => "CIRCUIT_OPEN",
            FallbackReason::BudgetExhausted => "BUDGET_EXHAUSTED",
            FallbackReason::RateLimited => "RATE_LIMITED",
            FallbackReason::Timeout => "TIMEOUT",
            FallbackReason::MalformedResponse => "MALFORMED_RESPONSE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExplanationSource {
    Generated,
    Cache,
    Fallback,
}

/// Explanation returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(flatten)]
    pub content: ExplanationContent,
    pub cached: bool,
    pub cost_usd: f64,
    pub latency_ms: u64,
    pub source: ExplanationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}
