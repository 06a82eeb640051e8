use std::sync::Arc;

use tracing::info;

use super::domain::{AttachmentText, EligibilityVerification};
use super::extraction::extract_eligibility;
use super::repository::{RepositoryError, VerificationRepository};

/// Service running extraction for a program and persisting the result.
pub struct EligibilityExtractionService<R> {
    repository: Arc<R>,
}

impl<R> EligibilityExtractionService<R>
where
    R: VerificationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Extract constraints and upsert them, replacing any earlier verification for the program.
    pub fn ingest(
        &self,
        program_id: &str,
        raw_text: &str,
        attachments: &[AttachmentText],
    ) -> Result<EligibilityVerification, ExtractionServiceError> {
        let verification = extract_eligibility(program_id, raw_text, attachments);
        self.repository.upsert(verification.clone())?;
        info!(program_id, "eligibility verification stored");
        Ok(verification)
    }

    pub fn get(&self, program_id: &str) -> Result<EligibilityVerification, ExtractionServiceError> {
        let verification = self
            .repository
            .fetch(program_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(verification)
    }
}

/// Error raised by the extraction service.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
