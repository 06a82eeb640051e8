use super::{collect_bounds, parse_count, Bounds, Extracted};
use crate::workflows::eligibility::rules::Dimension;

/// Employee-count bounds such as "상시근로자 10인 이상" or "5~299명".
pub fn extract_headcount(text: &str) -> Extracted<Bounds<u32>> {
    collect_bounds(text, Dimension::Headcount, |raw, _unit| parse_count::<u32>(raw)).finish()
}
