use super::{collect_bounds, parse_krw, Bounds, Extracted};
use crate::workflows::eligibility::rules::{rules_of, Dimension, RequirementKind, RulePayload};

/// Revenue bounds in KRW; amounts are written in 억 (10^8) or 조 (10^12).
pub fn extract_revenue(text: &str) -> Extracted<Bounds<u64>> {
    collect_bounds(text, Dimension::Revenue, parse_krw).finish()
}

/// Minimum cumulative investment in KRW.
///
/// An explicit amount wins; otherwise the earliest mention of a common funding round supplies
/// its conventional amount.
pub fn extract_investment(text: &str) -> Extracted<u64> {
    for compiled in rules_of(Dimension::Investment, RequirementKind::Minimum) {
        let Some(captures) = compiled.regex.captures(text) else {
            continue;
        };
        let Some(raw) = captures.name("min") else {
            continue;
        };
        let unit = captures.name("min_unit").map(|m| m.as_str());
        if let Some(amount) = parse_krw(raw.as_str(), unit) {
            let snippet = captures
                .get(0)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            return Extracted::found(amount, snippet, vec![compiled.rule.name]);
        }
    }

    rules_of(Dimension::Investment, RequirementKind::Convention)
        .filter_map(|compiled| {
            let found = compiled.regex.find(text)?;
            match compiled.rule.payload {
                RulePayload::Amount(amount) => Some((found.start(), compiled, found, amount)),
                _ => None,
            }
        })
        .min_by_key(|(start, ..)| *start)
        .map(|(_, compiled, found, amount)| {
            Extracted::found(amount, found.as_str().trim(), vec![compiled.rule.name])
        })
        .unwrap_or_else(Extracted::none)
}
