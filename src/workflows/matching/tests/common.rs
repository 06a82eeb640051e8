use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::workflows::eligibility::repository::{RepositoryError, VerificationRepository};
use crate::workflows::eligibility::{
    Certification, ConfidenceGrade, EligibilityVerification, ExtractionMethod, TrlConfidence,
    TrlRange,
};
use crate::workflows::matching::repository::MatchRepository;
use crate::workflows::matching::{
    FundingProgram, InvestmentRound, MatchScore, MatchScoringEngine, Organization, OrganizationId,
    OrganizationType, ProgramId, ProgramStatus,
};

pub(super) const EOK: u64 = 100_000_000;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn as_of() -> NaiveDate {
    date(2025, 3, 1)
}

pub(super) fn engine() -> MatchScoringEngine {
    MatchScoringEngine::default()
}

pub(super) fn organization() -> Organization {
    Organization {
        id: OrganizationId("ORG-1".to_string()),
        name: "한빛시큐리티".to_string(),
        organization_type: OrganizationType::Company,
        industry_sector: "정보보안".to_string(),
        industry_keywords: vec!["AI".to_string(), "클라우드".to_string()],
        trl_level: 8,
        revenue: 50 * EOK,
        employee_count: 40,
        certifications: BTreeSet::from([
            Certification::VentureCompany,
            Certification::ResearchInstitute,
            Certification::SmeConfirmation,
        ]),
        rd_experience_years: 6,
        investment_history: vec![InvestmentRound {
            round: "시리즈 A".to_string(),
            amount: 30 * EOK,
            closed_on: Some(date(2023, 5, 1)),
        }],
        operating_years: 6,
    }
}

pub(super) fn program() -> FundingProgram {
    FundingProgram {
        id: ProgramId("PRG-1".to_string()),
        title: "정보보안 핵심기술개발 지원사업".to_string(),
        agency: "과학기술정보통신부".to_string(),
        budget_ceiling: Some(10 * EOK),
        trl_range: Some(TrlRange::new(7, 9, TrlConfidence::Explicit)),
        industry_tags: vec!["정보보안".to_string(), "AI".to_string()],
        deadline: Some(date(2025, 3, 20)),
        status: ProgramStatus::Active,
        requirement_text: String::new(),
        attachment_text: None,
    }
}

pub(super) fn verification() -> EligibilityVerification {
    EligibilityVerification {
        program_id: "PRG-1".to_string(),
        required_certifications: Vec::new(),
        preferred_certifications: Vec::new(),
        sme_requirement_inferred: false,
        min_employees: None,
        max_employees: None,
        min_revenue: None,
        max_revenue: None,
        min_investment: None,
        min_operating_years: None,
        max_operating_years: None,
        research_institute_required: false,
        trl_requirement: None,
        confidence: ConfidenceGrade::High,
        extraction_method: ExtractionMethod::AnnouncementFile,
        fields_extracted: 0,
        source_files: vec!["announcement.hwp".to_string()],
        extraction_notes: Vec::new(),
    }
}

#[derive(Default)]
pub(super) struct MemoryMatches {
    rows: Mutex<BTreeMap<(OrganizationId, ProgramId), MatchScore>>,
}

impl MatchRepository for MemoryMatches {
    fn upsert(&self, score: MatchScore) -> Result<(), RepositoryError> {
        self.rows.lock().expect("lock").insert(
            (score.organization_id.clone(), score.program_id.clone()),
            score,
        );
        Ok(())
    }

    fn fetch(
        &self,
        organization_id: &OrganizationId,
        program_id: &ProgramId,
    ) -> Result<Option<MatchScore>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .get(&(organization_id.clone(), program_id.clone()))
            .cloned())
    }

    fn for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<MatchScore>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .values()
            .filter(|score| &score.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryVerifications {
    rows: Mutex<HashMap<String, EligibilityVerification>>,
}

impl VerificationRepository for MemoryVerifications {
    fn upsert(&self, verification: EligibilityVerification) -> Result<(), RepositoryError> {
        self.rows
            .lock()
            .expect("lock")
            .insert(verification.program_id.clone(), verification);
        Ok(())
    }

    fn fetch(&self, program_id: &str) -> Result<Option<EligibilityVerification>, RepositoryError> {
        Ok(self.rows.lock().expect("lock").get(program_id).cloned())
    }
}
