pub mod eligibility;
pub mod explanation;
pub mod matching;
