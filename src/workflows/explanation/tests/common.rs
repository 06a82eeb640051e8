use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::config::ExplanationSettings;
use crate::workflows::eligibility::{Certification, TrlConfidence, TrlRange};
use crate::workflows::explanation::cache::{CacheError, ExplanationCache, InMemoryExplanationCache};
use crate::workflows::explanation::domain::{
    ExplanationContent, OrganizationSummary, ProgramSummary,
};
use crate::workflows::explanation::provider::{
    ExplanationProvider, GenerationRequest, ProviderError, ProviderResponse,
};
use crate::workflows::explanation::ExplanationService;
use crate::workflows::matching::{
    FundingProgram, MatchScore, MatchScoringEngine, Organization, OrganizationId,
    OrganizationType, ProgramId, ProgramStatus,
};

pub(super) const EOK: u64 = 100_000_000;

pub(super) const VALID_REPLY: &str = r#"분석 결과입니다.
```json
{
  "summary": "한빛시큐리티는 정보보안 핵심기술개발 지원사업과 잘 맞습니다.",
  "reasons": ["산업 분야가 일치합니다.", "TRL 수준이 목표 범위에 있습니다."],
  "cautions": "세부 제출 서류를 확인하세요.",
  "recommendation": "공고문을 검토해 보시기 바랍니다."
}
```"#;

pub(super) const REPLY_COST_USD: f64 = 0.002;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn organization() -> Organization {
    Organization {
        id: OrganizationId("ORG-1".to_string()),
        name: "한빛시큐리티".to_string(),
        organization_type: OrganizationType::Company,
        industry_sector: "정보보안".to_string(),
        industry_keywords: vec!["AI".to_string()],
        trl_level: 8,
        revenue: 50 * EOK,
        employee_count: 40,
        certifications: BTreeSet::from([
            Certification::VentureCompany,
            Certification::SmeConfirmation,
        ]),
        rd_experience_years: 6,
        investment_history: Vec::new(),
        operating_years: 6,
    }
}

pub(super) fn program(id: &str, status: ProgramStatus) -> FundingProgram {
    FundingProgram {
        id: ProgramId(id.to_string()),
        title: "정보보안 핵심기술개발 지원사업".to_string(),
        agency: "과학기술정보통신부".to_string(),
        budget_ceiling: Some(10 * EOK),
        trl_range: Some(TrlRange::new(7, 9, TrlConfidence::Explicit)),
        industry_tags: vec!["정보보안".to_string()],
        deadline: Some(date(2025, 3, 20)),
        status,
        requirement_text: String::new(),
        attachment_text: None,
    }
}

pub(super) fn score_for(program: &FundingProgram) -> MatchScore {
    MatchScoringEngine::default()
        .score(&organization(), program, None, date(2025, 3, 1))
        .expect("valid fixtures")
}

pub(super) fn org_summary() -> OrganizationSummary {
    OrganizationSummary::from(&organization())
}

pub(super) fn settings() -> ExplanationSettings {
    ExplanationSettings {
        requests_per_minute: 600,
        failure_threshold: 3,
        ..ExplanationSettings::default()
    }
}

/// One scripted provider behaviour.
#[derive(Debug, Clone)]
pub(super) enum Reply {
    Text(&'static str),
    Fail,
    Hang,
}

/// Provider that replays a script, then answers with [`VALID_REPLY`].
#[derive(Default)]
pub(super) struct ScriptedProvider {
    script: Mutex<VecDeque<Reply>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub(super) fn new(script: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    pub(super) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExplanationProvider for ScriptedProvider {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .script
            .lock()
            .pop_front()
            .unwrap_or(Reply::Text(VALID_REPLY));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match reply {
            Reply::Text(text) => Ok(response(text)),
            Reply::Fail => Err(ProviderError::Status {
                status: 503,
                body: "overloaded".to_string(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(response(VALID_REPLY))
            }
        }
    }
}

pub(super) fn response(text: &str) -> ProviderResponse {
    ProviderResponse {
        text: text.to_string(),
        input_tokens: 1200,
        output_tokens: 300,
        cost_usd: REPLY_COST_USD,
    }
}

/// Cache whose reads always fail.
pub(super) struct BrokenCache;

#[async_trait]
impl ExplanationCache for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<ExplanationContent>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn put(
        &self,
        _key: &str,
        _content: ExplanationContent,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

/// Cache that answers reads with what it held when the read started, after a delay.
pub(super) struct SlowReadCache {
    inner: InMemoryExplanationCache,
    read_delay: Duration,
}

impl SlowReadCache {
    pub(super) fn new(read_delay: Duration) -> Self {
        Self {
            inner: InMemoryExplanationCache::new(),
            read_delay,
        }
    }
}

#[async_trait]
impl ExplanationCache for SlowReadCache {
    async fn get(&self, key: &str) -> Result<Option<ExplanationContent>, CacheError> {
        let snapshot = self.inner.get(key).await?;
        tokio::time::sleep(self.read_delay).await;
        Ok(snapshot)
    }

    async fn put(
        &self,
        key: &str,
        content: ExplanationContent,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.inner.put(key, content, ttl).await
    }
}

/// Cache whose reads and writes never complete.
pub(super) struct HangingCache;

#[async_trait]
impl ExplanationCache for HangingCache {
    async fn get(&self, _key: &str) -> Result<Option<ExplanationContent>, CacheError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }

    async fn put(
        &self,
        _key: &str,
        _content: ExplanationContent,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

pub(super) type TestService = ExplanationService<ScriptedProvider, InMemoryExplanationCache>;

pub(super) fn service_with(
    provider: ScriptedProvider,
    settings: &ExplanationSettings,
) -> (TestService, Arc<ScriptedProvider>, Arc<InMemoryExplanationCache>) {
    let provider = Arc::new(provider);
    let cache = Arc::new(InMemoryExplanationCache::new());
    let service = ExplanationService::new(provider.clone(), cache.clone(), settings);
    (service, provider, cache)
}

pub(super) fn summary_of(program: &FundingProgram) -> ProgramSummary {
    ProgramSummary::from(program)
}
