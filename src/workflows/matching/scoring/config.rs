use serde::{Deserialize, Serialize};

/// Maximum points per scoring dimension; the maxima must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub industry: u8,
    pub trl: u8,
    pub certifications: u8,
    pub budget: u8,
    pub experience: u8,
    pub deadline: u8,
    pub stage: u8,
}

impl ScoringWeights {
    pub fn total(&self) -> u16 {
        [
            self.industry,
            self.trl,
            self.certifications,
            self.budget,
            self.experience,
            self.deadline,
            self.stage,
        ]
        .iter()
        .map(|weight| u16::from(*weight))
        .sum()
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            industry: 30,
            trl: 20,
            certifications: 15,
            budget: 15,
            experience: 10,
            deadline: 5,
            stage: 5,
        }
    }
}

/// Rubric configuration for the match scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    /// How much of the TRL signal is trusted when the range was stated outright.
    pub explicit_trl_weight: f64,
    /// Same, for ranges inferred from stage vocabulary.
    pub inferred_trl_weight: f64,
    /// Fraction of the TRL score lost per level outside the range.
    pub trl_distance_penalty: f64,
    /// Deadlines closer than this many days score as rushed.
    pub urgent_deadline_days: i64,
    /// Deadlines up to this many days away score as ideal.
    pub comfortable_deadline_days: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            explicit_trl_weight: 1.0,
            inferred_trl_weight: 0.6,
            trl_distance_penalty: 0.3,
            urgent_deadline_days: 7,
            comfortable_deadline_days: 30,
        }
    }
}
