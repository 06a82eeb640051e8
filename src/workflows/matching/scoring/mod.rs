mod config;
mod policy;
mod rules;
mod trl;

pub use config::{ScoringConfig, ScoringWeights};
pub use policy::{Criterion, EligibilityLevel, FailedCriterion, MetCriterion, Severity};
pub use trl::TrlAssessment;

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    validate_trl_range, FundingProgram, Organization, OrganizationId, ProgramId, ProgramStatus,
    ScoringInputError,
};
use crate::workflows::eligibility::{ConfidenceGrade, EligibilityVerification};
use policy::{decide_level, evaluate_criteria};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDimension {
    Industry,
    Trl,
    Certifications,
    Budget,
    Experience,
    Deadline,
    Stage,
}

impl ScoreDimension {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreDimension::Industry => "industry",
            ScoreDimension::Trl => "trl",
            ScoreDimension::Certifications => "certifications",
            ScoreDimension::Budget => "budget",
            ScoreDimension::Experience => "experience",
            ScoreDimension::Deadline => "deadline",
            ScoreDimension::Stage => "stage",
        }
    }
}

/// Discrete contribution to a match score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub dimension: ScoreDimension,
    pub score: u8,
    pub max: u8,
    pub notes: String,
}

/// Scoring output for one organization/program pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub organization_id: OrganizationId,
    pub program_id: ProgramId,
    pub program_status: ProgramStatus,
    pub deadline: Option<NaiveDate>,
    pub total_score: u8,
    pub breakdown: Vec<ScoreComponent>,
    pub trl_assessment: TrlAssessment,
    pub eligibility_level: EligibilityLevel,
    pub eligibility_confidence: Option<ConfidenceGrade>,
    pub met_criteria: Vec<MetCriterion>,
    pub failed_criteria: Vec<FailedCriterion>,
    pub scored_on: NaiveDate,
}

impl MatchScore {
    pub fn component(&self, dimension: ScoreDimension) -> Option<&ScoreComponent> {
        self.breakdown
            .iter()
            .find(|component| component.dimension == dimension)
    }

    pub fn has_hard_failure(&self) -> bool {
        self.failed_criteria
            .iter()
            .any(|criterion| criterion.severity == Severity::Hard)
    }
}

/// Stateless scorer applying the rubric configuration to an organization/program pair.
#[derive(Debug, Clone)]
pub struct MatchScoringEngine {
    config: ScoringConfig,
}

impl Default for MatchScoringEngine {
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }
}

impl MatchScoringEngine {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringInputError> {
        let total = config.weights.total();
        if total != 100 {
            return Err(ScoringInputError::InvalidWeights { total });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a pair as of the given date. The result is a pure function of the inputs.
    ///
    /// The program's own TRL range takes precedence over one extracted from its text.
    pub fn score(
        &self,
        organization: &Organization,
        program: &FundingProgram,
        eligibility: Option<&EligibilityVerification>,
        as_of: NaiveDate,
    ) -> Result<MatchScore, ScoringInputError> {
        organization.validate()?;
        program.validate()?;

        if let Some(verification) = eligibility {
            if verification.program_id != program.id.0 {
                return Err(ScoringInputError::MismatchedEligibility {
                    program: program.id.clone(),
                    verification: verification.program_id.clone(),
                });
            }
        }

        let trl_range = program
            .trl_range
            .or_else(|| eligibility.and_then(|verification| verification.trl_requirement));
        if let Some(range) = &trl_range {
            validate_trl_range(range)?;
        }

        let (breakdown, trl_assessment) = rules::score_dimensions(
            organization,
            program,
            eligibility,
            trl_range,
            as_of,
            &self.config,
        );
        let total_score = breakdown
            .iter()
            .map(|component| u16::from(component.score))
            .sum::<u16>()
            .min(100) as u8;

        let (met_criteria, failed_criteria) =
            evaluate_criteria(organization, program, eligibility, as_of);
        let eligibility_level = decide_level(&failed_criteria);

        debug!(
            organization_id = %organization.id,
            program_id = %program.id,
            total_score,
            level = eligibility_level.label(),
            "match scored"
        );

        Ok(MatchScore {
            organization_id: organization.id.clone(),
            program_id: program.id.clone(),
            program_status: program.status,
            deadline: program.deadline,
            total_score,
            breakdown,
            trl_assessment,
            eligibility_level,
            eligibility_confidence: eligibility.map(|verification| verification.confidence),
            met_criteria,
            failed_criteria,
            scored_on: as_of,
        })
    }
}

fn ranking_order(a: &MatchScore, b: &MatchScore) -> Ordering {
    let by_deadline = match (a.deadline, b.deadline) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    b.total_score
        .cmp(&a.total_score)
        .then(by_deadline)
        .then_with(|| a.program_id.cmp(&b.program_id))
}

/// Order matches best first: higher total, then earlier deadline, then program id.
pub fn rank_matches(scores: &mut [MatchScore]) {
    scores.sort_by(ranking_order);
}
