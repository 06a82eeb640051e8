use serde::{Deserialize, Serialize};

use super::config::ScoringConfig;
use crate::workflows::eligibility::{TrlConfidence, TrlRange};

/// Audit record of how the TRL dimension was scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrlAssessment {
    pub organization_level: u8,
    pub program_range: Option<TrlRange>,
    pub confidence: Option<TrlConfidence>,
    /// Share of the TRL signal trusted, from 0 (ignored) to 1 (fully trusted).
    pub weight: f64,
    pub in_range: bool,
    pub distance: u8,
}

/// Fraction of the TRL weight earned, plus the audit record.
///
/// The raw fit is pulled toward the neutral midpoint by the confidence weight, so an inferred
/// range moves the score less than an explicit one in either direction.
pub(crate) fn assess(
    level: u8,
    range: Option<TrlRange>,
    config: &ScoringConfig,
) -> (f64, TrlAssessment) {
    let Some(range) = range else {
        return (
            0.5,
            TrlAssessment {
                organization_level: level,
                program_range: None,
                confidence: None,
                weight: 0.0,
                in_range: false,
                distance: 0,
            },
        );
    };

    let distance = range.distance(level);
    let in_range = distance == 0;
    let raw = if in_range {
        1.0
    } else {
        (1.0 - config.trl_distance_penalty * f64::from(distance)).max(0.0)
    };
    let weight = match range.confidence {
        TrlConfidence::Explicit => config.explicit_trl_weight,
        TrlConfidence::Inferred => config.inferred_trl_weight,
    };

    (
        0.5 + (raw - 0.5) * weight,
        TrlAssessment {
            organization_level: level,
            program_range: Some(range),
            confidence: Some(range.confidence),
            weight,
            in_range,
            distance,
        },
    )
}
