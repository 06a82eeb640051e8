use chrono::NaiveDate;

use super::config::ScoringConfig;
use super::trl::{assess, TrlAssessment};
use super::{ScoreComponent, ScoreDimension};
use crate::workflows::eligibility::{Certification, EligibilityVerification, TrlRange};
use crate::workflows::matching::domain::{format_krw, FundingProgram, Organization};

const EOK: u64 = 100_000_000;

fn component(dimension: ScoreDimension, max: u8, fraction: f64, notes: String) -> ScoreComponent {
    let earned = (f64::from(max) * fraction.clamp(0.0, 1.0)).round() as u8;
    ScoreComponent {
        dimension,
        score: earned.min(max),
        max,
        notes,
    }
}

fn normalized_terms(organization: &Organization) -> Vec<String> {
    std::iter::once(&organization.industry_sector)
        .chain(organization.industry_keywords.iter())
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

fn industry_fit(organization: &Organization, program: &FundingProgram) -> (f64, String) {
    let tags: Vec<String> = program
        .industry_tags
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();
    if tags.is_empty() {
        return (0.5, "program lists no industry tags".to_string());
    }

    let terms = normalized_terms(organization);
    if let Some(tag) = tags.iter().find(|tag| terms.contains(*tag)) {
        return (1.0, format!("industry matches program tag '{tag}'"));
    }
    let overlaps = |tag: &String| {
        terms
            .iter()
            .any(|term| term.contains(tag.as_str()) || tag.contains(term.as_str()))
    };
    if let Some(tag) = tags.iter().find(|tag| overlaps(*tag)) {
        return (0.7, format!("industry partially matches program tag '{tag}'"));
    }
    (
        0.0,
        format!("industry '{}' not among program tags", organization.industry_sector),
    )
}

fn held_share(organization: &Organization, list: &[Certification]) -> (usize, f64) {
    let held = list
        .iter()
        .filter(|certification| organization.holds(**certification))
        .count();
    if list.is_empty() {
        (held, 1.0)
    } else {
        (held, held as f64 / list.len() as f64)
    }
}

fn certification_fit(
    organization: &Organization,
    eligibility: Option<&EligibilityVerification>,
) -> (f64, String) {
    let Some(verification) = eligibility else {
        return (0.5, "no eligibility verification available".to_string());
    };

    let required = &verification.required_certifications;
    let preferred = &verification.preferred_certifications;
    if required.is_empty() && preferred.is_empty() {
        return (1.0, "no certifications requested".to_string());
    }

    let (required_held, required_share) = held_share(organization, required);
    let (preferred_held, preferred_share) = held_share(organization, preferred);

    (
        (2.0 * required_share + preferred_share) / 3.0,
        format!(
            "holds {required_held}/{} required and {preferred_held}/{} preferred certifications",
            required.len(),
            preferred.len()
        ),
    )
}

fn budget_fit(organization: &Organization, program: &FundingProgram) -> (f64, String) {
    let Some(budget) = program.budget_ceiling else {
        return (0.5, "budget ceiling not announced".to_string());
    };

    if organization.revenue > 0 {
        let ratio = budget as f64 / organization.revenue as f64;
        let fraction = if ratio <= 0.5 {
            1.0
        } else if ratio <= 1.0 {
            0.8
        } else if ratio <= 3.0 {
            0.5
        } else {
            0.25
        };
        return (
            fraction,
            format!(
                "budget {} is {:.2}x annual revenue {}",
                format_krw(budget),
                ratio,
                format_krw(organization.revenue)
            ),
        );
    }

    if organization.employee_count == 0 {
        return (
            0.3,
            format!("budget {} with no revenue or staff on record", format_krw(budget)),
        );
    }

    let per_employee = budget / u64::from(organization.employee_count);
    let fraction = if per_employee <= EOK { 0.7 } else { 0.4 };
    (
        fraction,
        format!(
            "pre-revenue; budget {} per employee",
            format_krw(per_employee)
        ),
    )
}

fn experience_fit(organization: &Organization) -> (f64, String) {
    let years = organization.rd_experience_years;
    let fraction = match years {
        0 => 0.2,
        1..=2 => 0.5,
        3..=4 => 0.8,
        _ => 1.0,
    };
    (fraction, format!("{years} year(s) of R&D experience"))
}

fn deadline_fit(
    program: &FundingProgram,
    as_of: NaiveDate,
    config: &ScoringConfig,
) -> (f64, String) {
    let Some(deadline) = program.deadline else {
        return (0.6, "no deadline announced".to_string());
    };

    let days = (deadline - as_of).num_days();
    let fraction = if days < 0 {
        0.0
    } else if days < config.urgent_deadline_days {
        0.4
    } else if days <= config.comfortable_deadline_days {
        1.0
    } else {
        0.8
    };
    let notes = if days < 0 {
        format!("deadline {deadline} has passed")
    } else {
        format!("{days} day(s) until deadline {deadline}")
    };
    (fraction, notes)
}

fn stage_fit(
    organization: &Organization,
    eligibility: Option<&EligibilityVerification>,
) -> (f64, String) {
    let Some(verification) = eligibility.filter(|v| v.has_operating_year_bounds()) else {
        return (0.6, "no business-age window stated".to_string());
    };

    let years = organization.operating_years;
    let above_min = verification
        .min_operating_years
        .map_or(true, |min| years >= min);
    let below_max = verification
        .max_operating_years
        .map_or(true, |max| years <= max);

    if above_min && below_max {
        (1.0, format!("{years} operating year(s) within program window"))
    } else {
        (0.0, format!("{years} operating year(s) outside program window"))
    }
}

/// Score every dimension; returns the breakdown and the TRL audit record.
pub(crate) fn score_dimensions(
    organization: &Organization,
    program: &FundingProgram,
    eligibility: Option<&EligibilityVerification>,
    trl_range: Option<TrlRange>,
    as_of: NaiveDate,
    config: &ScoringConfig,
) -> (Vec<ScoreComponent>, TrlAssessment) {
    let weights = &config.weights;
    let (trl_fraction, trl_assessment) = assess(organization.trl_level, trl_range, config);
    let trl_notes = match trl_assessment.program_range {
        Some(range) => format!(
            "TRL {} against {}-{} (distance {})",
            organization.trl_level, range.min, range.max, trl_assessment.distance
        ),
        None => "program states no TRL range".to_string(),
    };

    let (industry, industry_notes) = industry_fit(organization, program);
    let (certifications, certification_notes) = certification_fit(organization, eligibility);
    let (budget, budget_notes) = budget_fit(organization, program);
    let (experience, experience_notes) = experience_fit(organization);
    let (deadline, deadline_notes) = deadline_fit(program, as_of, config);
    let (stage, stage_notes) = stage_fit(organization, eligibility);

    let components = vec![
        component(ScoreDimension::Industry, weights.industry, industry, industry_notes),
        component(ScoreDimension::Trl, weights.trl, trl_fraction, trl_notes),
        component(
            ScoreDimension::Certifications,
            weights.certifications,
            certifications,
            certification_notes,
        ),
        component(ScoreDimension::Budget, weights.budget, budget, budget_notes),
        component(
            ScoreDimension::Experience,
            weights.experience,
            experience,
            experience_notes,
        ),
        component(ScoreDimension::Deadline, weights.deadline, deadline, deadline_notes),
        component(ScoreDimension::Stage, weights.stage, stage, stage_notes),
    ];

    (components, trl_assessment)
}
