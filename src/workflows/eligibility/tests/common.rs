use std::collections::HashMap;
use std::sync::Mutex;

use crate::workflows::eligibility::domain::{AttachmentText, EligibilityVerification};
use crate::workflows::eligibility::repository::{RepositoryError, VerificationRepository};

pub(super) const STRUCTURED_ANNOUNCEMENT: &str = "2025년 기술혁신개발사업 공고
□ 지원대상
- 상시 근로자 수 10명 이상 300명 이하인 중소기업
- 매출액 100억원 이상 1,000억원 미만
- 기업부설연구소를 보유한 기업
- ISMS-P 인증을 받은 기업
□ 사업목적: TRL 4-6 수준의 기술개발";

pub(super) fn attachment(text: &str) -> Vec<AttachmentText> {
    vec![AttachmentText::new("announcement.hwp", text)]
}

#[derive(Default)]
pub(super) struct MemoryVerifications {
    rows: Mutex<HashMap<String, EligibilityVerification>>,
    pub(super) writes: Mutex<usize>,
}

impl VerificationRepository for MemoryVerifications {
    fn upsert(&self, verification: EligibilityVerification) -> Result<(), RepositoryError> {
        *self.writes.lock().expect("lock") += 1;
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
