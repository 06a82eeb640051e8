use std::fmt::Write as _;

use super::domain::{OrganizationSummary, ProgramSummary};
use super::provider::GenerationRequest;
use crate::workflows::matching::{MatchScore, ProgramStatus};

const MAX_TOKENS: u32 = 800;

const SYSTEM_PROMPT: &str = "당신은 한국 정부 R&D 지원사업 매칭 결과를 설명하는 컨설턴트입니다. \
주어진 점수와 요건 판정만 근거로 설명하고, 제공되지 않은 사실은 추측하지 마세요. \
응답은 반드시 JSON 객체 하나로만 작성하세요: \
{\"summary\": string, \"reasons\": [string], \"cautions\": [string], \"recommendation\": string}";

fn status_instruction(status: ProgramStatus) -> &'static str {
    match status {
        ProgramStatus::Active => {
            "이 공고는 현재 진행 중입니다. 신청 준비에 도움이 되는 관점으로 설명하세요."
        }
        ProgramStatus::Expired => {
            "이 공고는 이미 마감되었습니다. 신청을 권유하거나 신청 가능하다고 표현하지 말고, \
향후 유사 공고 준비를 위한 참고 분석으로 설명하세요."
        }
        ProgramStatus::Archived => {
            "이 공고는 보관된 과거 공고입니다. 신청을 권유하지 말고 참고용 분석으로만 설명하세요."
        }
    }
}

/// Assemble the provider request for one match. Only summary fields and score data are sent.
pub fn build_request(
    organization: &OrganizationSummary,
    program: &ProgramSummary,
    score: &MatchScore,
    status: ProgramStatus,
) -> GenerationRequest {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "[기업] {} (산업: {}, TRL {})",
        organization.name, organization.industry_sector, organization.trl_level
    );
    let _ = writeln!(prompt, "[공고] {} / {}", program.title, program.agency);
    if let Some(deadline) = program.deadline {
        let _ = writeln!(prompt, "[마감일] {deadline}");
    }
    let _ = writeln!(prompt, "[공고 상태] {}", status.label());
    let _ = writeln!(
        prompt,
        "[매칭 점수] {}점 / 자격 판정 {}",
        score.total_score,
        score.eligibility_level.label()
    );

    prompt.push_str("[점수 구성]\n");
    for component in &score.breakdown {
        let _ = writeln!(
            prompt,
            "- {:?}: {}/{} ({})",
            component.dimension, component.score, component.max, component.notes
        );
    }

    if !score.met_criteria.is_empty() {
        prompt.push_str("[충족 요건]\n");
        for met in &score.met_criteria {
            let _ = writeln!(prompt, "- {}", met.detail);
        }
    }
    if !score.failed_criteria.is_empty() {
        prompt.push_str("[미충족 요건]\n");
        for failed in &score.failed_criteria {
            let _ = writeln!(prompt, "- ({:?}) {}", failed.severity, failed.detail);
        }
    }

    prompt.push('\n');
    prompt.push_str(status_instruction(status));

    GenerationRequest {
        system: SYSTEM_PROMPT.to_string(),
        prompt,
        max_tokens: MAX_TOKENS,
    }
}
