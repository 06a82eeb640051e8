use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::eligibility::{Certification, TrlRange};

pub const MIN_TRL: u8 = 1;
pub const MAX_TRL: u8 = 9;

const EOK: u64 = 100_000_000;

/// Identifier wrapper for organizations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(pub String);

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for funding programs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub String);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationType {
    Company,
    ResearchInstitute,
    University,
}

/// A closed funding round reported by the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentRound {
    pub round: String,
    /// KRW.
    pub amount: u64,
    pub closed_on: Option<NaiveDate>,
}

/// Applicant profile scored against funding programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub organization_type: OrganizationType,
    pub industry_sector: String,
    #[serde(default)]
    pub industry_keywords: Vec<String>,
    pub trl_level: u8,
    /// Annual revenue in KRW.
    pub revenue: u64,
    pub employee_count: u32,
    #[serde(default)]
    pub certifications: BTreeSet<Certification>,
    pub rd_experience_years: u32,
    #[serde(default)]
    pub investment_history: Vec<InvestmentRound>,
    pub operating_years: u32,
}

impl Organization {
    pub fn validate(&self) -> Result<(), ScoringInputError> {
        if self.id.0.trim().is_empty() {
            return Err(ScoringInputError::MissingField("organization.id"));
        }
        if self.industry_sector.trim().is_empty() {
            return Err(ScoringInputError::MissingField(
                "organization.industry_sector",
            ));
        }
        check_trl("organization.trl_level", self.trl_level)
    }

    pub fn holds(&self, certification: Certification) -> bool {
        self.certifications.contains(&certification)
    }

    pub fn total_investment(&self) -> u64 {
        self.investment_history
            .iter()
            .map(|round| round.amount)
            .fold(0u64, u64::saturating_add)
    }
}

/// Lifecycle state of a program announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgramStatus {
    Active,
    Expired,
    Archived,
}

impl ProgramStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProgramStatus::Active => "ACTIVE",
            ProgramStatus::Expired => "EXPIRED",
            ProgramStatus::Archived => "ARCHIVED",
        }
    }

    pub fn is_closed(self) -> bool {
        !matches!(self, ProgramStatus::Active)
    }
}

impl fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Government R&D funding announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingProgram {
    pub id: ProgramId,
    pub title: String,
    pub agency: String,
    /// Per-project funding ceiling in KRW.
    pub budget_ceiling: Option<u64>,
    pub trl_range: Option<TrlRange>,
    #[serde(default)]
    pub industry_tags: Vec<String>,
    pub deadline: Option<NaiveDate>,
    pub status: ProgramStatus,
    #[serde(default)]
    pub requirement_text: String,
    pub attachment_text: Option<String>,
}

impl FundingProgram {
    pub fn validate(&self) -> Result<(), ScoringInputError> {
        if self.id.0.trim().is_empty() {
            return Err(ScoringInputError::MissingField("program.id"));
        }
        if self.title.trim().is_empty() {
            return Err(ScoringInputError::MissingField("program.title"));
        }
        match self.trl_range {
            Some(range) => validate_trl_range(&range),
            None => Ok(()),
        }
    }
}

fn check_trl(field: &'static str, value: u8) -> Result<(), ScoringInputError> {
    if (MIN_TRL..=MAX_TRL).contains(&value) {
        Ok(())
    } else {
        Err(ScoringInputError::TrlOutOfRange { field, value })
    }
}

pub(crate) fn validate_trl_range(range: &TrlRange) -> Result<(), ScoringInputError> {
    check_trl("trl_range.min", range.min)?;
    check_trl("trl_range.max", range.max)?;
    if range.min > range.max {
        return Err(ScoringInputError::InvertedTrlRange {
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

/// Render KRW the way announcements do ("12.5억원", "3,000만원").
pub fn format_krw(amount: u64) -> String {
    if amount >= EOK {
        let eok = amount as f64 / EOK as f64;
        if amount % EOK == 0 {
            format!("{}억원", amount / EOK)
        } else {
            format!("{:.1}억원", eok)
        }
    } else if amount >= 10_000 {
        format!("{}만원", amount / 10_000)
    } else {
        format!("{amount}원")
    }
}

/// Caller-side input error; scoring never guesses defaults for invalid data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringInputError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("`{field}` must be between 1 and 9, got {value}")]
    TrlOutOfRange { field: &'static str, value: u8 },
    #[error("TRL range is inverted ({min} > {max})")]
    InvertedTrlRange { min: u8, max: u8 },
    #[error("eligibility verification belongs to program {verification} but program {program} was scored")]
    MismatchedEligibility {
        program: ProgramId,
        verification: String,
    },
    #[error("scoring weights must sum to 100, got {total}")]
    InvalidWeights { total: u16 },
}
