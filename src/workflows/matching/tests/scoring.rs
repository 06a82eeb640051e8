use super::common::*;
use crate::workflows::eligibility::{Certification, TrlConfidence, TrlRange};
use crate::workflows::matching::{
    EligibilityLevel, MatchScore, MatchScoringEngine, ScoreDimension, ScoringConfig,
    ScoringInputError, ScoringWeights,
};

#[test]
fn breakdown_sums_to_total_and_respects_maxima() {
    let score = engine()
        .score(&organization(), &program(), Some(&verification()), as_of())
        .expect("valid input");

    let sum: u16 = score.breakdown.iter().map(|c| u16::from(c.score)).sum();
    assert_eq!(sum, u16::from(score.total_score));
    assert!(score.total_score <= 100);
    assert!(score.breakdown.iter().all(|c| c.score <= c.max));
    assert_eq!(
        score.breakdown.iter().map(|c| u16::from(c.max)).sum::<u16>(),
        100
    );
}

#[test]
fn strong_match_scores_high_and_is_fully_eligible() {
    let score = engine()
        .score(&organization(), &program(), Some(&verification()), as_of())
        .expect("valid input");

    assert_eq!(score.total_score, 98);
    assert_eq!(score.eligibility_level, EligibilityLevel::FullyEligible);
    assert!(score.failed_criteria.is_empty());
    assert_eq!(
        score.component(ScoreDimension::Stage).map(|c| c.score),
        Some(3)
    );
}

#[test]
fn explicit_trl_ranges_outscore_inferred_ones() {
    let explicit = engine()
        .score(&organization(), &program(), None, as_of())
        .expect("valid input");

    let mut inferred_program = program();
    inferred_program.trl_range = Some(TrlRange::new(7, 9, TrlConfidence::Inferred));
    let inferred = engine()
        .score(&organization(), &inferred_program, None, as_of())
        .expect("valid input");

    let trl_points = |score: &MatchScore| {
        score
            .component(ScoreDimension::Trl)
            .map(|c| c.score)
            .unwrap_or_default()
    };
    assert_eq!(trl_points(&explicit), 20);
    assert_eq!(trl_points(&inferred), 16);
    assert!(explicit.trl_assessment.in_range);
    assert_eq!(explicit.trl_assessment.distance, 0);
    assert_eq!(inferred.trl_assessment.weight, 0.6);
    assert_eq!(
        inferred.trl_assessment.confidence,
        Some(TrlConfidence::Inferred)
    );
}

#[test]
fn trl_distance_is_recorded_outside_the_range() {
    let mut early = organization();
    early.trl_level = 4;

    let score = engine()
        .score(&early, &program(), None, as_of())
        .expect("valid input");

    assert!(!score.trl_assessment.in_range);
    assert_eq!(score.trl_assessment.distance, 3);
    assert_eq!(score.component(ScoreDimension::Trl).map(|c| c.score), Some(2));
}

#[test]
fn extracted_trl_is_used_when_program_has_none() {
    let mut bare = program();
    bare.trl_range = None;
    let mut extracted = verification();
    extracted.trl_requirement = Some(TrlRange::new(4, 6, TrlConfidence::Explicit));

    let score = engine()
        .score(&organization(), &bare, Some(&extracted), as_of())
        .expect("valid input");

    assert_eq!(
        score.trl_assessment.program_range,
        Some(TrlRange::new(4, 6, TrlConfidence::Explicit))
    );
    assert_eq!(score.trl_assessment.distance, 2);
}

#[test]
fn partial_industry_overlap_earns_partial_credit() {
    let mut adjacent = program();
    adjacent.industry_tags = vec!["AI 반도체".to_string()];

    let score = engine()
        .score(&organization(), &adjacent, None, as_of())
        .expect("valid input");

    assert_eq!(
        score.component(ScoreDimension::Industry).map(|c| c.score),
        Some(21)
    );
}

#[test]
fn certification_share_weights_required_over_preferred() {
    let mut requested = verification();
    requested.required_certifications = vec![Certification::VentureCompany];
    requested.preferred_certifications = vec![Certification::InnoBiz];

    let score = engine()
        .score(&organization(), &program(), Some(&requested), as_of())
        .expect("valid input");

    assert_eq!(
        score.component(ScoreDimension::Certifications).map(|c| c.score),
        Some(10)
    );
}

#[test]
fn pre_revenue_organizations_are_scored_per_employee() {
    let mut startup = organization();
    startup.revenue = 0;
    startup.employee_count = 5;

    let score = engine()
        .score(&startup, &program(), None, as_of())
        .expect("valid input");

    assert_eq!(
        score.component(ScoreDimension::Budget).map(|c| c.score),
        Some(6)
    );
}

#[test]
fn identical_input_produces_identical_scores() {
    let first = engine()
        .score(&organization(), &program(), Some(&verification()), as_of())
        .expect("valid input");
    let second = engine()
        .score(&organization(), &program(), Some(&verification()), as_of())
        .expect("valid input");

    assert_eq!(
        serde_json::to_vec(&first).expect("serialize"),
        serde_json::to_vec(&second).expect("serialize")
    );
}

#[test]
fn invalid_input_is_rejected_without_defaults() {
    let mut bad_org = organization();
    bad_org.trl_level = 0;
    match engine().score(&bad_org, &program(), None, as_of()) {
        Err(ScoringInputError::TrlOutOfRange { value: 0, .. }) => {}
        other => panic!("expected TRL range error, got {other:?}"),
    }

    let mut inverted = program();
    inverted.trl_range = Some(TrlRange::new(7, 5, TrlConfidence::Explicit));
    match engine().score(&organization(), &inverted, None, as_of()) {
        Err(ScoringInputError::InvertedTrlRange { min: 7, max: 5 }) => {}
        other => panic!("expected inverted range error, got {other:?}"),
    }

    let mut foreign = verification();
    foreign.program_id = "PRG-OTHER".to_string();
    match engine().score(&organization(), &program(), Some(&foreign), as_of()) {
        Err(ScoringInputError::MismatchedEligibility { .. }) => {}
        other => panic!("expected mismatch error, got {other:?}"),
    }

    let mut blank = organization();
    blank.industry_sector = " ".to_string();
    match engine().score(&blank, &program(), None, as_of()) {
        Err(ScoringInputError::MissingField("organization.industry_sector")) => {}
        other => panic!("expected missing field error, got {other:?}"),
    }
}

#[test]
fn weights_must_sum_to_one_hundred() {
    let config = ScoringConfig {
        weights: ScoringWeights {
            industry: 40,
            ..ScoringWeights::default()
        },
        ..ScoringConfig::default()
    };

    match MatchScoringEngine::new(config) {
        Err(ScoringInputError::InvalidWeights { total: 110 }) => {}
        other => panic!("expected invalid weights, got {other:?}"),
    }
    assert!(MatchScoringEngine::new(ScoringConfig::default()).is_ok());
}
