//! Pure constraint extractors, one per eligibility dimension.
//!
//! Every extractor takes normalized text and returns an [`Extracted`] value: the structured
//! constraint when a rule fired, the matched snippet for auditing, and the rule names that
//! contributed. None of them fail; "nothing found" is an ordinary result.

mod certifications;
mod headcount;
mod money;
mod operating_years;
mod research_institute;
mod trl;

pub use certifications::{extract_certifications, CertificationRequirements};
pub use headcount::extract_headcount;
pub use money::{extract_investment, extract_revenue};
pub use operating_years::extract_operating_years;
pub use research_institute::extract_research_institute;
pub use trl::extract_trl;

use regex::Captures;
use serde::{Deserialize, Serialize};

use super::rules::{rules_of, Dimension, RequirementKind};

/// Result of a single extractor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<T> {
    pub value: Option<T>,
    pub snippet: Option<String>,
    pub rules: Vec<&'static str>,
}

impl<T> Extracted<T> {
    pub fn none() -> Self {
        Self {
            value: None,
            snippet: None,
            rules: Vec::new(),
        }
    }

    pub fn found(value: T, snippet: impl Into<String>, rules: Vec<&'static str>) -> Self {
        Self {
            value: Some(value),
            snippet: Some(snippet.into()),
            rules,
        }
    }

    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

/// Inclusive lower/upper bounds; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Bounds<T> {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Integer bound types that can be tightened by one unit for exclusive qualifiers.
pub(crate) trait BoundValue: Copy {
    fn step_up(self) -> Self;
    fn step_down(self) -> Self;
}

impl BoundValue for u8 {
    fn step_up(self) -> Self {
        self.saturating_add(1)
    }
    fn step_down(self) -> Self {
        self.saturating_sub(1)
    }
}

impl BoundValue for u32 {
    fn step_up(self) -> Self {
        self.saturating_add(1)
    }
    fn step_down(self) -> Self {
        self.saturating_sub(1)
    }
}

impl BoundValue for u64 {
    fn step_up(self) -> Self {
        self.saturating_add(1)
    }
    fn step_down(self) -> Self {
        self.saturating_sub(1)
    }
}

const CLAUSE_TERMINATORS: [char; 5] = ['.', '。', '\n', ';', '※'];

/// Up to `max_chars` characters after byte offset `end`, cut at the end of the clause.
pub(crate) fn clause_after(text: &str, end: usize, max_chars: usize) -> &str {
    let rest = &text[end..];
    let mut cut = rest.len();
    for (count, (index, ch)) in rest.char_indices().enumerate() {
        if count >= max_chars || CLAUSE_TERMINATORS.contains(&ch) {
            cut = index;
            break;
        }
    }
    &rest[..cut]
}

/// Up to `max_chars` characters before byte offset `start`, cut at the start of the clause.
pub(crate) fn clause_before(text: &str, start: usize, max_chars: usize) -> &str {
    let head = &text[..start];
    let mut begin = 0;
    for (count, (index, ch)) in head.char_indices().rev().enumerate() {
        if count >= max_chars || CLAUSE_TERMINATORS.contains(&ch) {
            begin = index + ch.len_utf8();
            break;
        }
    }
    &head[begin..]
}

pub(crate) fn parse_count<T: std::str::FromStr>(raw: &str) -> Option<T> {
    raw.replace(',', "").parse().ok()
}

/// Convert a Korean money expression ("12.5" + "억") into KRW.
pub(crate) fn parse_krw(number: &str, unit: Option<&str>) -> Option<u64> {
    let multiplier = match unit? {
        "조" => 1_000_000_000_000f64,
        "억" => 100_000_000f64,
        _ => return None,
    };
    let value: f64 = number.replace(',', "").parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as u64)
}

fn exclusive(qualifier: Option<&str>) -> bool {
    matches!(qualifier, Some("초과") | Some("미만"))
}

/// Accumulates bounds from several rules; the first rule to supply a side wins.
pub(crate) struct BoundsCollector<T> {
    bounds: Bounds<T>,
    snippets: Vec<String>,
    rules: Vec<&'static str>,
}

impl<T: BoundValue> BoundsCollector<T> {
    pub(crate) fn new() -> Self {
        Self {
            bounds: Bounds {
                min: None,
                max: None,
            },
            snippets: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Offer a match; `parse` turns the number capture and its unit capture into a value.
    pub(crate) fn offer(
        &mut self,
        rule: &'static str,
        captures: &Captures<'_>,
        parse: impl Fn(&str, Option<&str>) -> Option<T>,
    ) {
        let unit_of = |name: &str| captures.name(name).map(|m| m.as_str());
        let mut contributed = false;

        if self.bounds.min.is_none() {
            if let Some(raw) = captures.name("min") {
                let unit = unit_of("min_unit").or_else(|| unit_of("max_unit"));
                if let Some(value) = parse(raw.as_str(), unit) {
                    let value = if exclusive(unit_of("min_qual")) {
                        value.step_up()
                    } else {
                        value
                    };
                    self.bounds.min = Some(value);
                    contributed = true;
                }
            }
        }

        if self.bounds.max.is_none() {
            if let Some(raw) = captures.name("max") {
                if let Some(value) = parse(raw.as_str(), unit_of("max_unit")) {
                    let value = if exclusive(unit_of("max_qual")) {
                        value.step_down()
                    } else {
                        value
                    };
                    self.bounds.max = Some(value);
                    contributed = true;
                }
            }
        }

        if contributed {
            if let Some(whole) = captures.get(0) {
                self.snippets.push(whole.as_str().trim().to_string());
            }
            self.rules.push(rule);
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.bounds.min.is_some() && self.bounds.max.is_some()
    }

    pub(crate) fn finish(self) -> Extracted<Bounds<T>> {
        if self.bounds.is_empty() {
            return Extracted::none();
        }
        Extracted::found(self.bounds, self.snippets.join(" | "), self.rules)
    }
}

/// Run the range, minimum and maximum rules of a dimension through a collector.
pub(crate) fn collect_bounds<T: BoundValue>(
    text: &str,
    dimension: Dimension,
    parse: impl Fn(&str, Option<&str>) -> Option<T> + Copy,
) -> BoundsCollector<T> {
    let mut collector = BoundsCollector::new();
    for kind in [
        RequirementKind::Range,
        RequirementKind::Minimum,
        RequirementKind::Maximum,
    ] {
        for compiled in rules_of(dimension, kind) {
            if collector.is_complete() {
                return collector;
            }
            if let Some(captures) = compiled.regex.captures(text) {
                collector.offer(compiled.rule.name, &captures, parse);
            }
        }
    }
    collector
}
