use super::{clause_after, Extracted};
use crate::workflows::eligibility::rules::{rules_of, Dimension, RequirementKind};

/// True when a corporate research institute or dedicated R&D department must be held.
///
/// Mentions whose clause turns into a preference ("보유 기업 우대") are not requirements.
pub fn extract_research_institute(text: &str) -> Extracted<bool> {
    let preference: Vec<_> =
        rules_of(Dimension::Certifications, RequirementKind::Preferred).collect();

    for compiled in rules_of(Dimension::ResearchInstitute, RequirementKind::Presence) {
        for found in compiled.regex.find_iter(text) {
            let tail = clause_after(text, found.end(), 20);
            if preference.iter().any(|rule| rule.regex.is_match(tail)) {
                continue;
            }
            return Extracted::found(true, found.as_str().trim(), vec![compiled.rule.name]);
        }
    }

    Extracted::none()
}
