//! Heuristics that flag explanations contradicting the program's lifecycle state.
//!
//! Violations are reported for logging only; content is never rejected.

use regex::Regex;
use serde::Serialize;
use tracing::error;

use super::domain::ExplanationContent;
use crate::workflows::matching::ProgramStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    ActiveApplicationLanguage,
    ApologeticErrorLanguage,
    ActionSolicitation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    AnyStatus,
    ClosedPrograms,
}

#[derive(Debug, Clone, Copy)]
pub struct ConsistencyRule {
    pub kind: ViolationKind,
    pub scope: RuleScope,
    pub pattern: &'static str,
}

pub static DEFAULT_RULES: &[ConsistencyRule] = &[
    ConsistencyRule {
        kind: ViolationKind::ActiveApplicationLanguage,
        scope: RuleScope::ClosedPrograms,
        pattern: r"접수\s*중|모집\s*중|신청\s*가능|지원\s*가능|마감\s*전|진행\s*중인\s*공고",
    },
    ConsistencyRule {
        kind: ViolationKind::ApologeticErrorLanguage,
        scope: RuleScope::AnyStatus,
        pattern: r"(?i)죄송|오류|장애|에러|문제가\s*발생|sorry|error",
    },
    ConsistencyRule {
        kind: ViolationKind::ActionSolicitation,
        scope: RuleScope::ClosedPrograms,
        pattern: r"지금\s*(?:바로\s*)?신청|신청하세요|지원하세요|서둘러|신청\s*바랍니다|지원\s*바랍니다",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub phrase: String,
}

pub struct ConsistencyChecker {
    rules: Vec<(ConsistencyRule, Regex)>,
}

impl Default for ConsistencyChecker {
    fn default() -> Self {
        Self::new(DEFAULT_RULES)
    }
}

impl ConsistencyChecker {
    pub fn new(rules: &[ConsistencyRule]) -> Self {
        let rules = rules
            .iter()
            .filter_map(|rule| match Regex::new(rule.pattern) {
                Ok(regex) => Some((*rule, regex)),
                Err(err) => {
                    error!(kind = ?rule.kind, %err, "consistency rule failed to compile; skipping");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    pub fn check(&self, content: &ExplanationContent, status: ProgramStatus) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (rule, regex) in &self.rules {
            if rule.scope == RuleScope::ClosedPrograms && !status.is_closed() {
                continue;
            }
            if let Some(found) = content.texts().find_map(|text| regex.find(text)) {
                violations.push(Violation {
                    kind: rule.kind,
                    phrase: found.as_str().to_string(),
                });
            }
        }
        violations
    }
}
