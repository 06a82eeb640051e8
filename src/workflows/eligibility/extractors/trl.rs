use super::{collect_bounds, parse_count, Extracted};
use crate::workflows::eligibility::domain::{TrlConfidence, TrlRange};
use crate::workflows::eligibility::rules::{rules_of, Dimension, RequirementKind, RulePayload};

const MIN_TRL: u8 = 1;
const MAX_TRL: u8 = 9;

fn parse_level(raw: &str, _unit: Option<&str>) -> Option<u8> {
    parse_count::<u8>(raw).filter(|level| (MIN_TRL..=MAX_TRL).contains(level))
}

/// Target TRL window.
///
/// Stated levels ("TRL 4-6", "TRL 7 이상", "TRL 5") are `Explicit`; stage vocabulary such as
/// 기초연구 or 상용화 only yields an `Inferred` band.
pub fn extract_trl(text: &str) -> Extracted<TrlRange> {
    let explicit = collect_bounds(text, Dimension::Trl, parse_level).finish();
    if let (Some(bounds), Some(snippet)) = (explicit.value, explicit.snippet) {
        let min = bounds.min.unwrap_or(MIN_TRL).clamp(MIN_TRL, MAX_TRL);
        let max = bounds.max.unwrap_or(MAX_TRL).clamp(MIN_TRL, MAX_TRL);
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        return Extracted::found(
            TrlRange::new(min, max, TrlConfidence::Explicit),
            snippet,
            explicit.rules,
        );
    }

    for compiled in rules_of(Dimension::Trl, RequirementKind::Exact) {
        let Some(captures) = compiled.regex.captures(text) else {
            continue;
        };
        let level = captures
            .name("value")
            .and_then(|raw| parse_level(raw.as_str(), None));
        if let (Some(level), Some(whole)) = (level, captures.get(0)) {
            return Extracted::found(
                TrlRange::new(level, level, TrlConfidence::Explicit),
                whole.as_str().trim(),
                vec![compiled.rule.name],
            );
        }
    }

    rules_of(Dimension::Trl, RequirementKind::Convention)
        .filter_map(|compiled| {
            let found = compiled.regex.find(text)?;
            match compiled.rule.payload {
                RulePayload::TrlBand { min, max } => Some((found, compiled.rule.name, min, max)),
                _ => None,
            }
        })
        .min_by_key(|(found, ..)| found.start())
        .map(|(found, name, min, max)| {
            Extracted::found(
                TrlRange::new(min, max, TrlConfidence::Inferred),
                found.as_str().trim(),
                vec![name],
            )
        })
        .unwrap_or_else(Extracted::none)
}
