use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::domain::{FundingProgram, Organization, OrganizationId, ScoringInputError};
use super::repository::{MatchRepository, RepositoryError};
use super::scoring::{rank_matches, MatchScore, MatchScoringEngine};
use crate::workflows::eligibility::VerificationRepository;

/// Service composing stored verifications, the scoring engine, and match storage.
pub struct MatchingService<M, V> {
    matches: Arc<M>,
    verifications: Arc<V>,
    engine: Arc<MatchScoringEngine>,
}

impl<M, V> MatchingService<M, V>
where
    M: MatchRepository + 'static,
    V: VerificationRepository + 'static,
{
    pub fn new(matches: Arc<M>, verifications: Arc<V>, engine: MatchScoringEngine) -> Self {
        Self {
            matches,
            verifications,
            engine: Arc::new(engine),
        }
    }

    /// Recompute a match from scratch and replace any stored score for the pair.
    pub fn score(
        &self,
        organization: &Organization,
        program: &FundingProgram,
        as_of: NaiveDate,
    ) -> Result<MatchScore, MatchingServiceError> {
        let verification = self.verifications.fetch(&program.id.0)?;
        let score = self
            .engine
            .score(organization, program, verification.as_ref(), as_of)?;
        self.matches.upsert(score.clone())?;

        info!(
            organization_id = %score.organization_id,
            program_id = %score.program_id,
            total_score = score.total_score,
            level = score.eligibility_level.label(),
            "match stored"
        );
        Ok(score)
    }

    /// Score every program and return the results best first.
    pub fn score_all(
        &self,
        organization: &Organization,
        programs: &[FundingProgram],
        as_of: NaiveDate,
    ) -> Result<Vec<MatchScore>, MatchingServiceError> {
        let mut scores = programs
            .iter()
            .map(|program| self.score(organization, program, as_of))
            .collect::<Result<Vec<_>, _>>()?;
        rank_matches(&mut scores);
        Ok(scores)
    }

    /// Stored matches for an organization, best first.
    pub fn ranked(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<MatchScore>, MatchingServiceError> {
        let mut scores = self.matches.for_organization(organization_id)?;
        rank_matches(&mut scores);
        Ok(scores)
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringInputError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
