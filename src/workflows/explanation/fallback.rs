//! Templated explanations served whenever a generated one cannot be.

use super::domain::{
    Explanation, ExplanationContent, ExplanationSource, FallbackReason, OrganizationSummary,
    ProgramSummary,
};
use crate::workflows::matching::{EligibilityLevel, MatchScore, ProgramStatus, ScoreDimension};

struct FallbackTemplate {
    reason: FallbackReason,
    notice: &'static str,
}

static TEMPLATES: &[FallbackTemplate] = &[
    FallbackTemplate {
        reason: FallbackReason::ProviderError,
        notice: "점수 구성 요소를 기준으로 작성된 기본 요약입니다.",
    },
    FallbackTemplate {
        reason: FallbackReason::CircuitOpen,
        notice: "상세 분석은 잠시 후 다시 제공됩니다. 아래는 점수 기준 기본 요약입니다.",
    },
    FallbackTemplate {
        reason: FallbackReason::BudgetExhausted,
        notice: "오늘 제공 가능한 상세 분석이 모두 소진되어 점수 기준 기본 요약을 제공합니다.",
    },
    FallbackTemplate {
        reason: FallbackReason::RateLimited,
        notice: "요청이 많아 점수 기준 기본 요약을 먼저 제공합니다.",
    },
    FallbackTemplate {
        reason: FallbackReason::Timeout,
        notice: "상세 분석 준비가 지연되어 점수 기준 기본 요약을 제공합니다.",
    },
    FallbackTemplate {
        reason: FallbackReason::MalformedResponse,
        notice: "점수 구성 요소를 기준으로 작성된 기본 요약입니다.",
    },
];

const DEFAULT_NOTICE: &str = "점수 구성 요소를 기준으로 작성된 기본 요약입니다.";

fn notice_for(reason: FallbackReason) -> &'static str {
    TEMPLATES
        .iter()
        .find(|template| template.reason == reason)
        .map_or(DEFAULT_NOTICE, |template| template.notice)
}

fn dimension_label(dimension: ScoreDimension) -> &'static str {
    match dimension {
        ScoreDimension::Industry => "산업 분야 적합도",
        ScoreDimension::Trl => "기술성숙도(TRL) 적합도",
        ScoreDimension::Certifications => "인증 보유 현황",
        ScoreDimension::Budget => "사업 규모 적합도",
        ScoreDimension::Experience => "연구개발 경험",
        ScoreDimension::Deadline => "접수 일정",
        ScoreDimension::Stage => "기업 성장 단계",
    }
}

fn level_label(level: EligibilityLevel) -> &'static str {
    match level {
        EligibilityLevel::FullyEligible => "자격 요건 충족",
        EligibilityLevel::ConditionallyEligible => "조건부 충족",
        EligibilityLevel::Ineligible => "자격 요건 미충족",
    }
}

fn recommendation(level: EligibilityLevel, status: ProgramStatus) -> String {
    match (status, level) {
        (ProgramStatus::Expired, _) => {
            "본 공고는 마감되었습니다. 향후 유사 공고가 게시되면 참고 자료로 활용할 수 있습니다."
                .to_string()
        }
        (ProgramStatus::Archived, _) => {
            "본 공고는 보관된 과거 공고로, 참고용 분석입니다.".to_string()
        }
        (ProgramStatus::Active, EligibilityLevel::FullyEligible) => {
            "주요 자격 요건을 충족합니다. 공고문의 세부 제출 서류를 확인해 보시기 바랍니다."
                .to_string()
        }
        (ProgramStatus::Active, EligibilityLevel::ConditionallyEligible) => {
            "일부 요건은 추가 확인이 필요합니다. 주관 기관 문의를 통해 충족 여부를 확인해 보시기 바랍니다."
                .to_string()
        }
        (ProgramStatus::Active, EligibilityLevel::Ineligible) => {
            "현재 기준으로는 필수 요건을 충족하지 않습니다. 미충족 항목을 참고해 다른 공고를 검토해 보시기 바랍니다."
                .to_string()
        }
    }
}

/// Build templated content from the score alone. Pure and deterministic.
pub fn fallback_content(
    reason: FallbackReason,
    organization: &OrganizationSummary,
    program: &ProgramSummary,
    score: &MatchScore,
    status: ProgramStatus,
) -> ExplanationContent {
    let summary = format!(
        "{} 기업과 '{}' 공고의 매칭 점수는 {}점이며, {}으로 평가되었습니다.",
        organization.name,
        program.title,
        score.total_score,
        level_label(score.eligibility_level)
    );

    let mut strongest: Vec<_> = score
        .breakdown
        .iter()
        .filter(|component| component.max > 0 && component.score > 0)
        .collect();
    strongest.sort_by(|a, b| {
        let left = u32::from(a.score) * u32::from(b.max);
        let right = u32::from(b.score) * u32::from(a.max);
        right.cmp(&left).then(b.max.cmp(&a.max))
    });
    let reasons = strongest
        .into_iter()
        .take(3)
        .map(|component| {
            format!(
                "{}: {}/{}점",
                dimension_label(component.dimension),
                component.score,
                component.max
            )
        })
        .collect();

    let mut cautions: Vec<String> = score
        .failed_criteria
        .iter()
        .map(|failed| format!("미충족 요건: {}", failed.detail))
        .collect();
    cautions.push(notice_for(reason).to_string());

    ExplanationContent {
        summary,
        reasons,
        cautions,
        recommendation: recommendation(score.eligibility_level, status),
    }
}

/// A complete fallback explanation, for callers that never reach a provider.
pub fn fallback_explanation(
    reason: FallbackReason,
    organization: &OrganizationSummary,
    program: &ProgramSummary,
    score: &MatchScore,
    status: ProgramStatus,
    latency_ms: u64,
) -> Explanation {
    Explanation {
        content: fallback_content(reason, organization, program, score, status),
        cached: false,
        cost_usd: 0.0,
        latency_ms,
        source: ExplanationSource::Fallback,
        fallback_reason: Some(reason),
    }
}
