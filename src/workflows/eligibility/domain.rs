use std::fmt;

use serde::{Deserialize, Serialize};

/// Certifications recognised in Korean government R&D announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Certification {
    VentureCompany,
    InnoBiz,
    MainBiz,
    ResearchDepartment,
    ResearchInstitute,
    SmeConfirmation,
    DirectProduction,
    Iso9001,
    Iso14001,
    Iso27001,
    IsmsP,
}

impl Certification {
    pub const fn code(self) -> &'static str {
        match self {
            Certification::VentureCompany => "VENTURE_COMPANY",
            Certification::InnoBiz => "INNO_BIZ",
            Certification::MainBiz => "MAIN_BIZ",
            Certification::ResearchDepartment => "RESEARCH_DEPARTMENT",
            Certification::ResearchInstitute => "RESEARCH_INSTITUTE",
            Certification::SmeConfirmation => "SME_CONFIRMATION",
            Certification::DirectProduction => "DIRECT_PRODUCTION",
            Certification::Iso9001 => "ISO_9001",
            Certification::Iso14001 => "ISO_14001",
            Certification::Iso27001 => "ISO_27001",
            Certification::IsmsP => "ISMS_P",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Certification::VentureCompany => "벤처기업 인증",
            Certification::InnoBiz => "이노비즈(기술혁신형 중소기업) 인증",
            Certification::MainBiz => "메인비즈(경영혁신형 중소기업) 인증",
            Certification::ResearchDepartment => "연구개발전담부서",
            Certification::ResearchInstitute => "기업부설연구소",
            Certification::SmeConfirmation => "중소기업 확인서",
            Certification::DirectProduction => "직접생산 확인",
            Certification::Iso9001 => "ISO 9001",
            Certification::Iso14001 => "ISO 14001",
            Certification::Iso27001 => "ISO 27001",
            Certification::IsmsP => "ISMS-P",
        }
    }
}

impl fmt::Display for Certification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How trustworthy an automatically extracted set of constraints is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceGrade {
    High,
    Medium,
    Low,
}

impl ConfidenceGrade {
    pub const fn label(self) -> &'static str {
        match self {
            ConfidenceGrade::High => "HIGH",
            ConfidenceGrade::Medium => "MEDIUM",
            ConfidenceGrade::Low => "LOW",
        }
    }
}

/// Which source text the extractors ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionMethod {
    AnnouncementFile,
    TitleOnly,
    None,
}

impl ExtractionMethod {
    pub const fn label(self) -> &'static str {
        match self {
            ExtractionMethod::AnnouncementFile => "ANNOUNCEMENT_FILE",
            ExtractionMethod::TitleOnly => "TITLE_ONLY",
            ExtractionMethod::None => "NONE",
        }
    }
}

/// Whether a TRL range was stated in the text or inferred from stage vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrlConfidence {
    Explicit,
    Inferred,
}

/// Inclusive TRL window a program targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrlRange {
    pub min: u8,
    pub max: u8,
    pub confidence: TrlConfidence,
}

impl TrlRange {
    pub fn new(min: u8, max: u8, confidence: TrlConfidence) -> Self {
        Self {
            min,
            max,
            confidence,
        }
    }

    pub fn contains(&self, level: u8) -> bool {
        (self.min..=self.max).contains(&level)
    }

    /// Absolute distance from `level` to the nearest bound; zero when inside the range.
    pub fn distance(&self, level: u8) -> u8 {
        if level < self.min {
            self.min - level
        } else if level > self.max {
            level - self.max
        } else {
            0
        }
    }
}

/// Plain text handed over by the document pipeline for one attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentText {
    pub file_name: String,
    pub text: String,
}

impl AttachmentText {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Structured eligibility constraints extracted for a single program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerification {
    pub program_id: String,
    pub required_certifications: Vec<Certification>,
    pub preferred_certifications: Vec<Certification>,
    /// Set when no catalogue certification matched but the text targets SMEs in general.
    pub sme_requirement_inferred: bool,
    pub min_employees: Option<u32>,
    pub max_employees: Option<u32>,
    pub min_revenue: Option<u64>,
    pub max_revenue: Option<u64>,
    pub min_investment: Option<u64>,
    pub min_operating_years: Option<u32>,
    pub max_operating_years: Option<u32>,
    pub research_institute_required: bool,
    pub trl_requirement: Option<TrlRange>,
    pub confidence: ConfidenceGrade,
    pub extraction_method: ExtractionMethod,
    pub fields_extracted: u8,
    pub source_files: Vec<String>,
    pub extraction_notes: Vec<String>,
}

impl EligibilityVerification {
    pub fn has_operating_year_bounds(&self) -> bool {
        self.min_operating_years.is_some() || self.max_operating_years.is_some()
    }
}
