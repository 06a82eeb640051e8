use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::eligibility::{Certification, EligibilityVerification};
use crate::workflows::matching::domain::{format_krw, FundingProgram, Organization, ProgramStatus};

/// Eligibility classification of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityLevel {
    FullyEligible,
    ConditionallyEligible,
    Ineligible,
}

impl EligibilityLevel {
    pub const fn label(self) -> &'static str {
        match self {
            EligibilityLevel::FullyEligible => "FULLY_ELIGIBLE",
            EligibilityLevel::ConditionallyEligible => "CONDITIONALLY_ELIGIBLE",
            EligibilityLevel::Ineligible => "INELIGIBLE",
        }
    }
}

/// Requirement a criterion check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criterion {
    ProgramStatus,
    Deadline,
    Certification(Certification),
    ResearchInstitute,
    MinEmployees,
    MaxEmployees,
    MinRevenue,
    MaxRevenue,
    MinOperatingYears,
    MaxOperatingYears,
    MinInvestment,
    SmeStatus,
}

/// Hard failures disqualify; soft gaps need confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Hard,
    Soft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetCriterion {
    pub criterion: Criterion,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCriterion {
    pub criterion: Criterion,
    pub severity: Severity,
    pub detail: String,
}

#[derive(Default)]
struct CriteriaLedger {
    met: Vec<MetCriterion>,
    failed: Vec<FailedCriterion>,
}

impl CriteriaLedger {
    fn check(&mut self, criterion: Criterion, satisfied: bool, severity: Severity, detail: String) {
        if satisfied {
            self.met.push(MetCriterion { criterion, detail });
        } else {
            self.failed.push(FailedCriterion {
                criterion,
                severity,
                detail,
            });
        }
    }
}

fn check_bounds<T: PartialOrd + Copy>(
    ledger: &mut CriteriaLedger,
    actual: T,
    (min_criterion, min): (Criterion, Option<T>),
    (max_criterion, max): (Criterion, Option<T>),
    render: impl Fn(T) -> String,
) {
    if let Some(min) = min {
        let satisfied = actual >= min;
        let relation = if satisfied { "meets" } else { "below" };
        ledger.check(
            min_criterion,
            satisfied,
            Severity::Hard,
            format!("{} {relation} minimum {}", render(actual), render(min)),
        );
    }
    if let Some(max) = max {
        let satisfied = actual <= max;
        let relation = if satisfied { "within" } else { "exceeds" };
        ledger.check(
            max_criterion,
            satisfied,
            Severity::Hard,
            format!("{} {relation} maximum {}", render(actual), render(max)),
        );
    }
}

fn check_verification(
    ledger: &mut CriteriaLedger,
    organization: &Organization,
    verification: &EligibilityVerification,
) {
    for certification in &verification.required_certifications {
        let held = organization.holds(*certification);
        ledger.check(
            Criterion::Certification(*certification),
            held,
            Severity::Hard,
            if held {
                format!("holds required {}", certification.label())
            } else {
                format!("missing required {}", certification.label())
            },
        );
    }

    let institute_listed = verification.required_certifications.iter().any(|c| {
        matches!(
            c,
            Certification::ResearchInstitute | Certification::ResearchDepartment
        )
    });
    if verification.research_institute_required && !institute_listed {
        let held = organization.holds(Certification::ResearchInstitute)
            || organization.holds(Certification::ResearchDepartment);
        ledger.check(
            Criterion::ResearchInstitute,
            held,
            Severity::Hard,
            if held {
                "corporate research institute or R&D department on record".to_string()
            } else {
                "no corporate research institute or R&D department on record".to_string()
            },
        );
    }

    check_bounds(
        ledger,
        organization.employee_count,
        (Criterion::MinEmployees, verification.min_employees),
        (Criterion::MaxEmployees, verification.max_employees),
        |count| format!("{count} employee(s)"),
    );
    check_bounds(
        ledger,
        organization.revenue,
        (Criterion::MinRevenue, verification.min_revenue),
        (Criterion::MaxRevenue, verification.max_revenue),
        |amount| format!("revenue {}", format_krw(amount)),
    );
    check_bounds(
        ledger,
        organization.operating_years,
        (Criterion::MinOperatingYears, verification.min_operating_years),
        (Criterion::MaxOperatingYears, verification.max_operating_years),
        |years| format!("{years} operating year(s)"),
    );

    if let Some(min_investment) = verification.min_investment {
        let invested = organization.total_investment();
        ledger.check(
            Criterion::MinInvestment,
            invested >= min_investment,
            Severity::Soft,
            format!(
                "reported investment {} against expected {}; confirm with the agency",
                format_krw(invested),
                format_krw(min_investment)
            ),
        );
    }

    if verification.sme_requirement_inferred {
        let confirmed = organization.holds(Certification::SmeConfirmation);
        ledger.check(
            Criterion::SmeStatus,
            confirmed,
            Severity::Soft,
            if confirmed {
                "SME confirmation on record".to_string()
            } else {
                "program appears to target SMEs; SME confirmation not on record".to_string()
            },
        );
    }
}

/// Evaluate lifecycle, deadline and extracted constraints against the organization.
pub(crate) fn evaluate_criteria(
    organization: &Organization,
    program: &FundingProgram,
    eligibility: Option<&EligibilityVerification>,
    as_of: NaiveDate,
) -> (Vec<MetCriterion>, Vec<FailedCriterion>) {
    let mut ledger = CriteriaLedger::default();

    ledger.check(
        Criterion::ProgramStatus,
        program.status == ProgramStatus::Active,
        Severity::Hard,
        format!("program status {}", program.status),
    );

    if let Some(deadline) = program.deadline {
        let open = deadline >= as_of;
        ledger.check(
            Criterion::Deadline,
            open,
            Severity::Hard,
            if open {
                format!("applications open until {deadline}")
            } else {
                format!("deadline {deadline} has passed")
            },
        );
    }

    if let Some(verification) = eligibility {
        check_verification(&mut ledger, organization, verification);
    }

    (ledger.met, ledger.failed)
}

/// Any hard failure disqualifies; soft gaps cap the level at conditional.
pub(crate) fn decide_level(failed: &[FailedCriterion]) -> EligibilityLevel {
    if failed
        .iter()
        .any(|criterion| criterion.severity == Severity::Hard)
    {
        EligibilityLevel::Ineligible
    } else if failed.is_empty() {
        EligibilityLevel::FullyEligible
    } else {
        EligibilityLevel::ConditionallyEligible
    }
}
