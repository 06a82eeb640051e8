use crate::workflows::eligibility::sections::{
    locate_sections, normalize, SectionHeader, SECTION_WINDOW_CHARS,
};

#[test]
fn normalize_collapses_spacing_and_folds_full_width() {
    let normalized = normalize("지원  대상\r\n\r\n  중소기업 ～ ３명");
    assert_eq!(normalized, "지원 대상\n중소기업 ~ 3명");
}

#[test]
fn missing_headers_fall_back_to_full_text() {
    let located = locate_sections("본 과제는 TRL 4-6 수준의 기술개발을 목표로 합니다.");

    assert!(!located.structured);
    assert_eq!(located.spans.len(), 1);
    assert!(located.spans[0].header.is_none());
    assert!(located.extraction_input().contains("TRL 4-6"));
}

#[test]
fn headers_are_whitespace_tolerant_and_sorted_by_position() {
    let text = "사업 개요\n1. 지원대상: 중소기업\n2. 신청 자격: 벤처기업 인증 보유";
    let located = locate_sections(text);

    assert!(located.structured);
    assert_eq!(located.spans.len(), 2);
    assert_eq!(located.spans[0].header, Some(SectionHeader::SupportTarget));
    assert_eq!(
        located.spans[1].header,
        Some(SectionHeader::ApplicationQualification)
    );
    assert!(located.spans[0].position < located.spans[1].position);
    assert!(located.spans[0].text.starts_with("지원대상"));
    assert_eq!(
        located.headers(),
        vec![
            SectionHeader::SupportTarget,
            SectionHeader::ApplicationQualification
        ]
    );
}

#[test]
fn section_window_is_bounded() {
    let text = format!("지원요건{}", "가".repeat(SECTION_WINDOW_CHARS * 2));
    let located = locate_sections(&text);

    assert_eq!(
        located.spans[0].text.chars().count(),
        "지원요건".chars().count() + SECTION_WINDOW_CHARS
    );
}
