//! Eligibility extraction: turns Korean announcement text into structured constraints.
//!
//! Text flows through the section locator, the per-dimension extractors and the confidence
//! scorer. Every stage is a pure function; only the service touches storage.

mod confidence;
pub mod domain;
mod extraction;
pub mod extractors;
pub mod repository;
pub mod rules;
pub mod sections;
pub mod service;

#[cfg(test)]
mod tests;

pub use confidence::{determine_method, grade};
pub use domain::{
    AttachmentText, Certification, ConfidenceGrade, EligibilityVerification, ExtractionMethod,
    TrlConfidence, TrlRange,
};
pub use extraction::extract_eligibility;
pub use repository::{RepositoryError, VerificationRepository};
pub use service::{EligibilityExtractionService, ExtractionServiceError};
