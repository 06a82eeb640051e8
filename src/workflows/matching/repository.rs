use super::domain::{OrganizationId, ProgramId};
use super::scoring::MatchScore;

pub use crate::workflows::eligibility::RepositoryError;

/// Storage for the latest score of each organization/program pair.
pub trait MatchRepository: Send + Sync {
    fn upsert(&self, score: MatchScore) -> Result<(), RepositoryError>;
    fn fetch(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
    ) -> Result<Option<MatchScore>, RepositoryError>;
    fn for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<MatchScore>, RepositoryError>;
}
