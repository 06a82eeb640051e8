use super::common::*;
use crate::workflows::explanation::consistency::ConsistencyChecker;
use crate::workflows::explanation::domain::FallbackReason;
use crate::workflows::explanation::fallback::fallback_content;
use crate::workflows::matching::{EligibilityLevel, ProgramStatus};

const REASONS: [FallbackReason; 6] = [
    FallbackReason::ProviderError,
    FallbackReason::CircuitOpen,
    FallbackReason::BudgetExhausted,
    FallbackReason::RateLimited,
    FallbackReason::Timeout,
    FallbackReason::MalformedResponse,
];

#[test]
fn summary_names_both_parties_and_the_score() {
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);

    let content = fallback_content(
        FallbackReason::Timeout,
        &org_summary(),
        &summary_of(&program),
        &score,
        ProgramStatus::Active,
    );

    assert!(content.summary.contains("한빛시큐리티"));
    assert!(content.summary.contains("정보보안 핵심기술개발 지원사업"));
    assert!(content.summary.contains(&format!("{}점", score.total_score)));
    assert!(!content.reasons.is_empty());
    assert!(content.reasons.len() <= 3);
}

#[test]
fn fallback_is_deterministic() {
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);
    let build = || {
        fallback_content(
            FallbackReason::CircuitOpen,
            &org_summary(),
            &summary_of(&program),
            &score,
            ProgramStatus::Active,
        )
    };

    assert_eq!(build(), build());
}

#[test]
fn closed_programs_get_reference_only_wording() {
    let checker = ConsistencyChecker::default();

    for status in [ProgramStatus::Expired, ProgramStatus::Archived] {
        let program = program("PRG-1", status);
        let score = score_for(&program);
        assert_eq!(score.eligibility_level, EligibilityLevel::Ineligible);

        for reason in REASONS {
            let content =
                fallback_content(reason, &org_summary(), &summary_of(&program), &score, status);

            assert!(checker.check(&content, status).is_empty(), "{status:?} {reason:?}");
            assert!(content.cautions.iter().any(|caution| caution.starts_with("미충족 요건")));
        }
    }
}

#[test]
fn active_fallback_never_apologises() {
    let checker = ConsistencyChecker::default();
    let program = program("PRG-1", ProgramStatus::Active);
    let score = score_for(&program);

    for reason in REASONS {
        let content = fallback_content(
            reason,
            &org_summary(),
            &summary_of(&program),
            &score,
            ProgramStatus::Active,
        );
        assert!(checker.check(&content, ProgramStatus::Active).is_empty());
    }
}
