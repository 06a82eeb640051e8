use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::cache::{cache_key, ExplanationCache};
use super::consistency::ConsistencyChecker;
use super::domain::{
    Explanation, ExplanationContent, ExplanationSource, FallbackReason, OrganizationSummary,
    ProgramSummary,
};

/// Bound on a single cache read or write before it is abandoned.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(2);
use super::fallback::fallback_explanation;
use super::parser::parse_explanation;
use super::prompt::build_request;
use super::provider::ExplanationProvider;
use super::resilience::{ResilienceController, ResilienceSettings};
use crate::config::ExplanationSettings;
use crate::workflows::matching::{MatchScore, OrganizationId, ProgramId, ProgramStatus};

#[derive(Debug, thiserror::Error)]
pub enum ExplanationError {
    #[error(
        "match score belongs to {score_organization}/{score_program}, not {organization}/{program}"
    )]
    ScoreMismatch {
        score_organization: OrganizationId,
        score_program: ProgramId,
        organization: OrganizationId,
        program: ProgramId,
    },
}

/// One program in a batch request.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub program: ProgramSummary,
    pub score: MatchScore,
    pub status: ProgramStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub program_id: ProgramId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    pub generated: usize,
    pub cached: usize,
    pub fallback: usize,
    pub failed: usize,
}

type InFlight = Mutex<HashMap<String, Arc<OnceCell<Explanation>>>>;

/// Produces natural-language explanations for match scores.
///
/// Cached content is reused per `(organization, program, status)`. Concurrent callers for the
/// same key share one provider call. Every provider-side failure degrades to templated content.
pub struct ExplanationService<P, C> {
    provider: Arc<P>,
    cache: Arc<C>,
    resilience: Arc<ResilienceController>,
    checker: ConsistencyChecker,
    cache_ttl: Duration,
    cache_timeout: Duration,
    batch_delay: Duration,
    in_flight: InFlight,
}

impl<P, C> ExplanationService<P, C>
where
    P: ExplanationProvider,
    C: ExplanationCache,
{
    pub fn new(provider: Arc<P>, cache: Arc<C>, settings: &ExplanationSettings) -> Self {
        let resilience = Arc::new(ResilienceController::new(ResilienceSettings::from(settings)));
        Self::with_resilience(
            provider,
            cache,
            resilience,
            settings.cache_ttl,
            settings.batch_delay,
        )
        .with_cache_timeout(settings.cache_timeout)
    }

    /// Build a service around an existing controller, so several services share one budget and
    /// one breaker.
    pub fn with_resilience(
        provider: Arc<P>,
        cache: Arc<C>,
        resilience: Arc<ResilienceController>,
        cache_ttl: Duration,
        batch_delay: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            resilience,
            checker: ConsistencyChecker::default(),
            cache_ttl,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            batch_delay,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_cache_timeout(mut self, cache_timeout: Duration) -> Self {
        self.cache_timeout = cache_timeout;
        self
    }

    pub fn with_checker(mut self, checker: ConsistencyChecker) -> Self {
        self.checker = checker;
        self
    }

    pub fn resilience(&self) -> &ResilienceController {
        &self.resilience
    }

    pub async fn explain(
        &self,
        organization: &OrganizationSummary,
        program: &ProgramSummary,
        score: &MatchScore,
        status: ProgramStatus,
    ) -> Result<Explanation, ExplanationError> {
        if score.organization_id != organization.id || score.program_id != program.id {
            return Err(ExplanationError::ScoreMismatch {
                score_organization: score.organization_id.clone(),
                score_program: score.program_id.clone(),
                organization: organization.id.clone(),
                program: program.id.clone(),
            });
        }

        let started = Instant::now();
        let key = cache_key(&organization.id, &program.id, status);

        if let Some(content) = self.cached(&key).await {
            debug!(key = %key, "explanation cache hit");
            return Ok(Explanation {
                content,
                cached: true,
                cost_usd: 0.0,
                latency_ms: elapsed_ms(started),
                source: ExplanationSource::Cache,
                fallback_reason: None,
            });
        }

        let cell = self.in_flight.lock().entry(key.clone()).or_default().clone();
        let explanation = cell
            .get_or_init(|| self.generate(&key, organization, program, score, status, started))
            .await
            .clone();

        {
            let mut in_flight = self.in_flight.lock();
            if in_flight
                .get(&key)
                .is_some_and(|current| Arc::ptr_eq(current, &cell))
            {
                in_flight.remove(&key);
            }
        }

        Ok(explanation)
    }

    /// Explain several programs for one organization, one after another.
    ///
    /// The configured delay separates items that went past the cache. A failing item is
    /// recorded in the report and the batch continues.
    pub async fn explain_batch(
        &self,
        organization: &OrganizationSummary,
        requests: &[BatchRequest],
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let mut pace_next = false;

        for request in requests {
            if pace_next && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }

            let outcome = self
                .explain(organization, &request.program, &request.score, request.status)
                .await;

            match outcome {
                Ok(explanation) => {
                    match explanation.source {
                        ExplanationSource::Generated => report.generated += 1,
                        ExplanationSource::Cache => report.cached += 1,
                        ExplanationSource::Fallback => report.fallback += 1,
                    }
                    pace_next = explanation.source != ExplanationSource::Cache;
                    report.items.push(BatchItem {
                        program_id: request.program.id.clone(),
                        explanation: Some(explanation),
                        error: None,
                    });
                }
                Err(err) => {
                    warn!(program_id = %request.program.id, %err, "batch item skipped");
                    pace_next = false;
                    report.failed += 1;
                    report.items.push(BatchItem {
                        program_id: request.program.id.clone(),
                        explanation: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        info!(
            organization_id = %organization.id,
            generated = report.generated,
            cached = report.cached,
            fallback = report.fallback,
            failed = report.failed,
            "explanation batch finished"
        );

        report
    }

    async fn cached(&self, key: &str) -> Option<ExplanationContent> {
        match tokio::time::timeout(self.cache_timeout, self.cache.get(key)).await {
            Ok(Ok(found)) => found,
            Ok(Err(err)) => {
                warn!(key, %err, "explanation cache read failed; treating as miss");
                None
            }
            Err(_) => {
                warn!(
                    key,
                    timeout_ms = self.cache_timeout.as_millis() as u64,
                    "explanation cache read timed out; treating as miss"
                );
                None
            }
        }
    }

    async fn store(&self, key: &str, content: ExplanationContent) {
        let write = self.cache.put(key, content, self.cache_ttl);
        match tokio::time::timeout(self.cache_timeout, write).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(key, %err, "explanation cache write failed"),
            Err(_) => warn!(
                key,
                timeout_ms = self.cache_timeout.as_millis() as u64,
                "explanation cache write timed out"
            ),
        }
    }

    async fn generate(
        &self,
        key: &str,
        organization: &OrganizationSummary,
        program: &ProgramSummary,
        score: &MatchScore,
        status: ProgramStatus,
        started: Instant,
    ) -> Explanation {
        // Another caller may have filled the cache between our miss and taking the cell.
        if let Some(content) = self.cached(key).await {
            debug!(key, "explanation cache filled while waiting");
            return Explanation {
                content,
                cached: true,
                cost_usd: 0.0,
                latency_ms: elapsed_ms(started),
                source: ExplanationSource::Cache,
                fallback_reason: None,
            };
        }

        let request = build_request(organization, program, score, status);

        let response = match self
            .resilience
            .execute(|| self.provider.generate(&request))
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let reason = err.fallback_reason();
                warn!(key, reason = reason.label(), %err, "serving fallback explanation");
                return fallback(reason, organization, program, score, status, started);
            }
        };

        let content = match parse_explanation(&response.text) {
            Ok(content) => content,
            Err(err) => {
                let reason = FallbackReason::MalformedResponse;
                warn!(key, reason = reason.label(), %err, "serving fallback explanation");
                return fallback(reason, organization, program, score, status, started);
            }
        };

        for violation in self.checker.check(&content, status) {
            warn!(
                key,
                status = status.label(),
                kind = ?violation.kind,
                phrase = %violation.phrase,
                "explanation is inconsistent with program status"
            );
        }

        self.store(key, content.clone()).await;

        info!(
            key,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            cost_usd = response.cost_usd,
            "explanation generated"
        );

        Explanation {
            content,
            cached: false,
            cost_usd: response.cost_usd,
            latency_ms: elapsed_ms(started),
            source: ExplanationSource::Generated,
            fallback_reason: None,
        }
    }
}

fn fallback(
    reason: FallbackReason,
    organization: &OrganizationSummary,
    program: &ProgramSummary,
    score: &MatchScore,
    status: ProgramStatus,
    started: Instant,
) -> Explanation {
    fallback_explanation(
        reason,
        organization,
        program,
        score,
        status,
        elapsed_ms(started),
    )
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
