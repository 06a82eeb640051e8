//! Organization/program match scoring.
//!
//! Scores are fully recomputed on every call; the engine is stateless and deterministic for a
//! fixed `as_of` date.

pub mod domain;
pub mod repository;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    format_krw, FundingProgram, InvestmentRound, Organization, OrganizationId, OrganizationType,
    ProgramId, ProgramStatus, ScoringInputError,
};
pub use repository::MatchRepository;
pub use scoring::{
    rank_matches, Criterion, EligibilityLevel, FailedCriterion, MatchScore, MatchScoringEngine,
    MetCriterion, ScoreComponent, ScoreDimension, ScoringConfig, ScoringWeights, Severity,
    TrlAssessment,
};
pub use service::{MatchingService, MatchingServiceError};
