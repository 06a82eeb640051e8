use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::eligibility::RepositoryError;
use crate::workflows::explanation::{ExplanationError, ProviderError};
use crate::workflows::matching::ScoringInputError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Scoring(ScoringInputError),
    Repository(RepositoryError),
    Provider(ProviderError),
    Explanation(ExplanationError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
            AppError::Scoring(err) => write!(f, "invalid scoring input: {}", err),
            AppError::Repository(err) => write!(f, "repository error: {}", err),
            AppError::Provider(err) => write!(f, "explanation provider error: {}", err),
            AppError::Explanation(err) => write!(f, "explanation error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Provider(err) => Some(err),
            AppError::Explanation(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ScoringInputError> for AppError {
    fn from(value: ScoringInputError) -> Self {
        Self::Scoring(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<ProviderError> for AppError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<ExplanationError> for AppError {
    fn from(value: ExplanationError) -> Self {
        Self::Explanation(value)
    }
}
