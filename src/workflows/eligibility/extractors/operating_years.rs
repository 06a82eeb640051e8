use super::{collect_bounds, parse_count, Bounds, Extracted};
use crate::workflows::eligibility::rules::{rules_of, Dimension, RequirementKind, RulePayload};

/// Business-age bounds in years.
///
/// Explicit phrasing ("설립 3년 이상", "창업 7년 이내") takes precedence. Without it, startup-stage
/// vocabulary maps to the conventional windows used by Korean startup programs, checked from the
/// most specific stage to the general "창업기업" (founded within seven years).
pub fn extract_operating_years(text: &str) -> Extracted<Bounds<u32>> {
    let explicit = collect_bounds(text, Dimension::OperatingYears, |raw, _unit| {
        parse_count::<u32>(raw)
    })
    .finish();
    if explicit.is_found() {
        return explicit;
    }

    for compiled in rules_of(Dimension::OperatingYears, RequirementKind::Convention) {
        let RulePayload::YearBounds { min, max } = compiled.rule.payload else {
            continue;
        };
        if let Some(found) = compiled.regex.find(text) {
            return Extracted::found(
                Bounds { min, max },
                found.as_str().trim(),
                vec![compiled.rule.name],
            );
        }
    }

    Extracted::none()
}
