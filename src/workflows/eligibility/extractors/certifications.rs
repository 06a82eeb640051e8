use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{clause_after, clause_before, Extracted};
use crate::workflows::eligibility::domain::Certification;
use crate::workflows::eligibility::rules::{
    rule_named, rules_of, CompiledRule, Dimension, RequirementKind, RulePayload,
};

/// Window after a certification mention in which its verb form is looked for.
const VERB_WINDOW_CHARS: usize = 40;
/// Window before a mention searched for a leading preference phrase ("우대 대상: ...").
const LEADING_WINDOW_CHARS: usize = 20;
/// How far past a possession verb a trailing preference ("보유기업 우대") still applies.
const TRAILING_PREFERENCE_CHARS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CertificationRequirements {
    pub required: Vec<Certification>,
    pub preferred: Vec<Certification>,
    /// No catalogue entry matched, but the text targets SMEs in general.
    pub sme_inferred: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Mandatory,
    Preference,
}

fn earliest(rules: &[&'static CompiledRule], text: &str) -> Option<(usize, usize)> {
    rules
        .iter()
        .filter_map(|rule| rule.regex.find(text))
        .map(|found| (found.start(), found.end()))
        .min()
}

/// Decide how the clause following a mention qualifies it. Returns the form and the byte
/// length of the clause prefix that justified the decision.
fn classify_clause(
    after: &str,
    mandatory: &[&'static CompiledRule],
    preference: &[&'static CompiledRule],
) -> Option<(Form, usize)> {
    let first_mandatory = earliest(mandatory, after);
    let first_preference = earliest(preference, after);

    match (first_mandatory, first_preference) {
        (Some((m_start, _)), Some((p_start, p_end))) if p_start < m_start => {
            Some((Form::Preference, p_end))
        }
        (Some((_, m_end)), _) => {
            let trailing = clause_after(after, m_end, TRAILING_PREFERENCE_CHARS);
            let trailing = trailing.split(',').next().unwrap_or_default();
            match earliest(preference, trailing) {
                Some((_, p_end)) => Some((Form::Preference, m_end + p_end)),
                None => Some((Form::Mandatory, m_end)),
            }
        }
        (None, Some((_, p_end))) => Some((Form::Preference, p_end)),
        (None, None) => None,
    }
}

/// Required and preferred certifications, tested against the catalogue in the rule registry.
///
/// A certification is required when its clause carries a possession/recognition verb and
/// preferred when it carries a preference form (우대, 가점). When nothing in the catalogue
/// matches, a general "중소기업" target is reported through `sme_inferred` instead of being
/// folded into the required list. Mentions that exclude SMEs ("중소기업 제외") never count.
pub fn extract_certifications(text: &str) -> Extracted<CertificationRequirements> {
    let mandatory: Vec<_> = rules_of(Dimension::Certifications, RequirementKind::Required).collect();
    let preference: Vec<_> =
        rules_of(Dimension::Certifications, RequirementKind::Preferred).collect();

    let mut required = BTreeSet::new();
    let mut preferred = BTreeSet::new();
    let mut snippets = Vec::new();
    let mut rules = Vec::new();

    for compiled in rules_of(Dimension::Certifications, RequirementKind::Mention) {
        let RulePayload::Certification(certification) = compiled.rule.payload else {
            continue;
        };

        for found in compiled.regex.find_iter(text) {
            let after = clause_after(text, found.end(), VERB_WINDOW_CHARS);
            let decision = classify_clause(after, &mandatory, &preference).or_else(|| {
                let before = clause_before(text, found.start(), LEADING_WINDOW_CHARS);
                earliest(&preference, before).map(|_| (Form::Preference, 0))
            });

            let Some((form, evidence_len)) = decision else {
                continue;
            };

            match form {
                Form::Mandatory => required.insert(certification),
                Form::Preference => preferred.insert(certification),
            };
            snippets.push(format!(
                "{}{}",
                found.as_str().trim_start(),
                after[..evidence_len].trim_end()
            ));
            if !rules.contains(&compiled.rule.name) {
                rules.push(compiled.rule.name);
            }
        }
    }

    preferred.retain(|certification| !required.contains(certification));

    if !required.is_empty() || !preferred.is_empty() {
        return Extracted::found(
            CertificationRequirements {
                required: required.into_iter().collect(),
                preferred: preferred.into_iter().collect(),
                sme_inferred: false,
            },
            snippets.join(" | "),
            rules,
        );
    }

    infer_sme_requirement(text)
}

fn infer_sme_requirement(text: &str) -> Extracted<CertificationRequirements> {
    let (Some(sme), Some(target)) = (
        rule_named("sme_general_target"),
        rule_named("eligible_target_phrase"),
    ) else {
        return Extracted::none();
    };

    let excluded: Vec<usize> = rule_named("sme_excluded")
        .map(|rule| rule.regex.find_iter(text).map(|found| found.start()).collect())
        .unwrap_or_default();
    let mention = sme
        .regex
        .find_iter(text)
        .find(|found| !excluded.contains(&found.start()));

    let (Some(mention), true) = (mention, target.regex.is_match(text)) else {
        return Extracted::none();
    };

    let snippet = format!(
        "{}{}{}",
        clause_before(text, mention.start(), 10),
        mention.as_str(),
        clause_after(text, mention.end(), 10)
    );

    Extracted::found(
        CertificationRequirements {
            required: Vec::new(),
            preferred: Vec::new(),
            sme_inferred: true,
        },
        snippet.trim(),
        vec![sme.rule.name, target.rule.name],
    )
}
