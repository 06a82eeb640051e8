//! Registry of named extraction rules.
//!
//! Patterns are plain data so the rule set can be extended and audited without touching the
//! extractors. Value-bearing captures use named groups: `min`/`max` for bounds, `min_unit`/
//! `max_unit` for Korean money units, `min_qual`/`max_qual` for inclusive/exclusive qualifiers
//! and `value` for single values.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::domain::Certification;

/// Constraint dimension a rule contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Certifications,
    Headcount,
    Revenue,
    Investment,
    OperatingYears,
    ResearchInstitute,
    Trl,
}

impl Dimension {
    /// The six dimensions counted by the confidence scorer.
    pub const CONSTRAINTS: [Dimension; 6] = [
        Dimension::Certifications,
        Dimension::Headcount,
        Dimension::Revenue,
        Dimension::Investment,
        Dimension::OperatingYears,
        Dimension::ResearchInstitute,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Dimension::Certifications => "certifications",
            Dimension::Headcount => "headcount",
            Dimension::Revenue => "revenue",
            Dimension::Investment => "investment",
            Dimension::OperatingYears => "operating_years",
            Dimension::ResearchInstitute => "research_institute",
            Dimension::Trl => "trl",
        }
    }
}

/// What a match of the rule means for its dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    /// Names a catalogue entry; the surrounding clause decides required vs preferred.
    Mention,
    Required,
    Preferred,
    Minimum,
    Maximum,
    Range,
    Exact,
    Presence,
    /// Heuristic evidence that only counts in combination with other rules.
    Inferred,
    /// Fallback table entry carrying a conventional value.
    Convention,
}

/// Value attached to a rule whose match implies a value without capturing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePayload {
    None,
    Certification(Certification),
    Amount(u64),
    YearBounds {
        min: Option<u32>,
        max: Option<u32>,
    },
    TrlBand {
        min: u8,
        max: u8,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub name: &'static str,
    pub dimension: Dimension,
    pub kind: RequirementKind,
    pub pattern: &'static str,
    pub payload: RulePayload,
}

const EOK: u64 = 100_000_000;

const fn rule(
    name: &'static str,
    dimension: Dimension,
    kind: RequirementKind,
    pattern: &'static str,
) -> PatternRule {
    PatternRule {
        name,
        dimension,
        kind,
        pattern,
        payload: RulePayload::None,
    }
}

const fn certification(
    name: &'static str,
    certification: Certification,
    pattern: &'static str,
) -> PatternRule {
    PatternRule {
        name,
        dimension: Dimension::Certifications,
        kind: RequirementKind::Mention,
        pattern,
        payload: RulePayload::Certification(certification),
    }
}

const fn convention(
    name: &'static str,
    dimension: Dimension,
    pattern: &'static str,
    payload: RulePayload,
) -> PatternRule {
    PatternRule {
        name,
        dimension,
        kind: RequirementKind::Convention,
        pattern,
        payload,
    }
}

use self::Dimension as D;
use self::RequirementKind as K;

/// Every extraction rule, in evaluation order within each dimension and kind.
pub static PATTERN_RULES: &[PatternRule] = &[
    // Certification catalogue. `[^소]` keeps the ministry name 중소벤처기업부 from reading as a venture certification.
    certification(
        "venture_company",
        Certification::VentureCompany,
        r"(?:^|[^소])벤처\s*기업(?:\s*(?:인증|확인))?",
    ),
    certification(
        "innobiz",
        Certification::InnoBiz,
        r"(?i)이노비즈|inno-?biz|기술\s*혁신형\s*중소\s*기업",
    ),
    certification(
        "mainbiz",
        Certification::MainBiz,
        r"(?i)메인비즈|main-?biz|경영\s*혁신형\s*중소\s*기업",
    ),
    certification(
        "research_department",
        Certification::ResearchDepartment,
        r"연구\s*개발\s*전담\s*부서",
    ),
    certification(
        "research_institute",
        Certification::ResearchInstitute,
        r"(?:기업\s*)?부설\s*연구소",
    ),
    certification(
        "sme_confirmation",
        Certification::SmeConfirmation,
        r"중소\s*기업\s*확인\s*(?:서)?",
    ),
    certification(
        "direct_production",
        Certification::DirectProduction,
        r"직접\s*생산\s*확인\s*(?:증명\s*)?(?:서)?",
    ),
    certification("iso_9001", Certification::Iso9001, r"(?i)ISO\s*9001"),
    certification("iso_14001", Certification::Iso14001, r"(?i)ISO\s*14001"),
    certification(
        "iso_27001",
        Certification::Iso27001,
        r"(?i)ISO\s*/?\s*(?:IEC\s*)?27001",
    ),
    certification(
        "isms_p",
        Certification::IsmsP,
        r"(?i)ISMS\s*-\s*P|정보\s*보호\s*및\s*개인\s*정보\s*보호\s*관리\s*체계",
    ),
    rule(
        "certification_mandatory_form",
        D::Certifications,
        K::Required,
        r"보유|소지|인정|취득|갖춘|갖추|등록|지정|필수|요구|의무|인증\s*(?:을|를)?\s*받|확인\s*(?:을|를)?\s*받|확인된|확인서를?\s*(?:제출|발급)|해당하는|있는",
    ),
    rule(
        "certification_preference_form",
        D::Certifications,
        K::Preferred,
        r"우대|가점|가산점|우선\s*(?:선정|지원|고려|배정)|인센티브",
    ),
    rule("sme_general_target", D::Certifications, K::Inferred, r"중소\s*기업"),
    rule(
        "sme_excluded",
        D::Certifications,
        K::Inferred,
        r"중소\s*기업\s*(?:은|는)?\s*(?:제외|불가|해당\s*없)",
    ),
    rule(
        "eligible_target_phrase",
        D::Certifications,
        K::Inferred,
        r"지원\s*대상|신청\s*자격|참여\s*자격|신청\s*가능|지원\s*가능|대상\s*기업|지원\s*자격",
    ),
    // Headcount.
    rule(
        "headcount_range",
        D::Headcount,
        K::Range,
        r"(?:근로자|종업원|직원|임직원|고용\s*인원|상시\s*인원)[^.\n\d]{0,12}?(?P<min>\d[\d,]*)\s*(?:명|인)?\s*(?:~|-|에서)\s*(?P<max>\d[\d,]*)\s*(?:명|인)",
    ),
    rule(
        "headcount_minimum",
        D::Headcount,
        K::Minimum,
        r"(?:근로자|종업원|직원|임직원|고용\s*인원|상시\s*인원)[^.\n\d]{0,12}?(?P<min>\d[\d,]*)\s*(?:명|인)\s*(?P<min_qual>이상|초과)(?:\s*(?:~|,|및|이고|이면서|에서)?\s*(?P<max>\d[\d,]*)\s*(?:명|인)\s*(?P<max_qual>이하|미만))?",
    ),
    rule(
        "headcount_maximum",
        D::Headcount,
        K::Maximum,
        r"(?:근로자|종업원|직원|임직원|고용\s*인원|상시\s*인원)[^.\n\d]{0,12}?(?P<max>\d[\d,]*)\s*(?:명|인)\s*(?P<max_qual>이하|미만)",
    ),
    // Revenue.
    rule(
        "revenue_range",
        D::Revenue,
        K::Range,
        r"매출\s*(?:액|규모)?[^.\n\d]{0,15}?(?P<min>\d[\d,]*(?:\.\d+)?)\s*(?P<min_unit>조|억)?\s*원?\s*(?:~|-|에서)\s*(?P<max>\d[\d,]*(?:\.\d+)?)\s*(?P<max_unit>조|억)\s*원?",
    ),
    rule(
        "revenue_minimum",
        D::Revenue,
        K::Minimum,
        r"매출\s*(?:액|규모)?[^.\n\d]{0,15}?(?P<min>\d[\d,]*(?:\.\d+)?)\s*(?P<min_unit>조|억)\s*원?\s*(?P<min_qual>이상|초과)(?:\s*(?:~|,|및|이고|이면서|에서)?\s*(?P<max>\d[\d,]*(?:\.\d+)?)\s*(?P<max_unit>조|억)\s*원?\s*(?P<max_qual>이하|미만))?",
    ),
    rule(
        "revenue_maximum",
        D::Revenue,
        K::Maximum,
        r"매출\s*(?:액|규모)?[^.\n\d]{0,15}?(?P<max>\d[\d,]*(?:\.\d+)?)\s*(?P<max_unit>조|억)\s*원?\s*(?P<max_qual>이하|미만)",
    ),
    // Investment.
    rule(
        "investment_explicit",
        D::Investment,
        K::Minimum,
        r"투자\s*(?:유치)?\s*(?:실적|금액|액|규모)?[^.\n\d]{0,15}?(?P<min>\d[\d,]*(?:\.\d+)?)\s*(?P<min_unit>조|억)\s*원?",
    ),
    rule(
        "investment_explicit_leading",
        D::Investment,
        K::Minimum,
        r"(?P<min>\d[\d,]*(?:\.\d+)?)\s*(?P<min_unit>조|억)\s*원?\s*이상[^.\n\d]{0,8}?투자",
    ),
    convention(
        "investment_round_tips",
        D::Investment,
        r"(?i)(?:TIPS|팁스)\s*(?:운영사\s*)?(?:투자|선정)",
        RulePayload::Amount(EOK),
    ),
    convention(
        "investment_round_seed",
        D::Investment,
        r"(?i)(?:시드|엔젤|seed|angel)\s*(?:단계\s*)?(?:이상\s*)?(?:투자|라운드)",
        RulePayload::Amount(3 * EOK),
    ),
    convention(
        "investment_round_pre_a",
        D::Investment,
        r"(?i)(?:프리\s*-?\s*A|pre\s*-?\s*a)\s*(?:단계\s*)?(?:이상\s*)?(?:투자|라운드)",
        RulePayload::Amount(10 * EOK),
    ),
    convention(
        "investment_round_series_a",
        D::Investment,
        r"(?i)(?:시리즈\s*A|series\s*a)\s*(?:단계\s*)?(?:이상\s*)?(?:투자|라운드)",
        RulePayload::Amount(30 * EOK),
    ),
    convention(
        "investment_round_series_b",
        D::Investment,
        r"(?i)(?:시리즈\s*B|series\s*b)\s*(?:단계\s*)?(?:이상\s*)?(?:투자|라운드)",
        RulePayload::Amount(100 * EOK),
    ),
    // Operating years.
    rule(
        "operating_years_minimum",
        D::OperatingYears,
        K::Minimum,
        r"(?:설립|창업|개업|사업\s*개시)\s*(?:일\s*)?(?:로부터|후|이후|기준)?\s*(?P<min>\d+)\s*년\s*(?P<min_qual>이상|경과|초과)",
    ),
    rule(
        "business_age_minimum",
        D::OperatingYears,
        K::Minimum,
        r"업력\s*(?:이\s*)?(?P<min>\d+)\s*년\s*(?P<min_qual>이상|초과)",
    ),
    rule(
        "operating_years_maximum",
        D::OperatingYears,
        K::Maximum,
        r"(?:설립|창업|개업|사업\s*개시)\s*(?:일\s*)?(?:로부터|후|이후|기준)?\s*(?P<max>\d+)\s*년\s*(?P<max_qual>이내|미만|이하)",
    ),
    rule(
        "business_age_maximum",
        D::OperatingYears,
        K::Maximum,
        r"업력\s*(?:이\s*)?(?P<max>\d+)\s*년\s*(?P<max_qual>이내|미만|이하)",
    ),
    convention(
        "early_stage_startup",
        D::OperatingYears,
        r"초기\s*창업\s*(?:기업|자)",
        RulePayload::YearBounds {
            min: None,
            max: Some(3),
        },
    ),
    convention(
        "growth_stage_startup",
        D::OperatingYears,
        r"창업\s*도약|도약기\s*창업",
        RulePayload::YearBounds {
            min: Some(3),
            max: Some(7),
        },
    ),
    convention(
        "startup_company",
        D::OperatingYears,
        r"창업\s*기업",
        RulePayload::YearBounds {
            min: None,
            max: Some(7),
        },
    ),
    // Research institute.
    rule(
        "research_institute_possession",
        D::ResearchInstitute,
        K::Presence,
        r"(?:기업\s*부설\s*연구소|부설\s*연구소|연구\s*개발\s*전담\s*부서)[^.\n]{0,30}?(?:보유|인정|설립|등록|확인|필수|갖춘|갖추|있는)",
    ),
    // TRL.
    rule(
        "trl_range",
        D::Trl,
        K::Range,
        r"(?i)TRL\s*:?\s*(?P<min>[1-9])\s*(?:단계)?\s*(?:~|-|에서)\s*(?:TRL\s*)?(?P<max>[1-9])",
    ),
    rule(
        "trl_minimum",
        D::Trl,
        K::Minimum,
        r"(?i)TRL\s*:?\s*(?P<min>[1-9])\s*(?:단계)?\s*(?P<min_qual>이상|초과)",
    ),
    rule(
        "trl_maximum",
        D::Trl,
        K::Maximum,
        r"(?i)TRL\s*:?\s*(?P<max>[1-9])\s*(?:단계)?\s*(?P<max_qual>이하|미만)",
    ),
    rule(
        "trl_exact",
        D::Trl,
        K::Exact,
        r"(?i)TRL\s*:?\s*(?P<value>[1-9])",
    ),
    convention(
        "trl_stage_basic_research",
        D::Trl,
        r"기초\s*연구|원천\s*기술",
        RulePayload::TrlBand { min: 1, max: 3 },
    ),
    convention(
        "trl_stage_applied_development",
        D::Trl,
        r"응용\s*연구|시제품|시작품|실용화",
        RulePayload::TrlBand { min: 4, max: 6 },
    ),
    convention(
        "trl_stage_commercialization",
        D::Trl,
        r"사업화|상용화|양산|제품화",
        RulePayload::TrlBand { min: 7, max: 9 },
    ),
];

/// A registry rule with its compiled pattern.
#[derive(Debug)]
pub struct CompiledRule {
    pub rule: &'static PatternRule,
    pub regex: Regex,
}

static COMPILED_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    PATTERN_RULES
        .iter()
        .filter_map(|rule| match Regex::new(rule.pattern) {
            Ok(regex) => Some(CompiledRule { rule, regex }),
            Err(err) => {
                error!(rule = rule.name, %err, "extraction rule failed to compile; skipping");
                None
            }
        })
        .collect()
});

/// Compiled rules for a dimension and kind, in registry order.
pub fn rules_of(
    dimension: Dimension,
    kind: RequirementKind,
) -> impl Iterator<Item = &'static CompiledRule> {
    COMPILED_RULES
        .iter()
        .filter(move |compiled| compiled.rule.dimension == dimension && compiled.rule.kind == kind)
}

/// Look up a compiled rule by name.
pub fn rule_named(name: &str) -> Option<&'static CompiledRule> {
    COMPILED_RULES
        .iter()
        .find(|compiled| compiled.rule.name == name)
}

/// Names of registry rules whose pattern does not compile.
pub fn invalid_rules() -> Vec<&'static str> {
    PATTERN_RULES
        .iter()
        .filter(|rule| Regex::new(rule.pattern).is_err())
        .map(|rule| rule.name)
        .collect()
}
