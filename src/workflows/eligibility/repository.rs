use super::domain::EligibilityVerification;

/// Storage for one verification per program; writes replace any previous row.
pub trait VerificationRepository: Send + Sync {
    fn upsert(&self, verification: EligibilityVerification) -> Result<(), RepositoryError>;
    fn fetch(&self, program_id: &str) -> Result<Option<EligibilityVerification>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
