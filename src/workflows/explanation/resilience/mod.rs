//! Guards around the generative provider: circuit breaker, token-bucket rate limiter, daily
//! spend ceiling and an overall timeout.

mod breaker;
mod spend;

pub use breaker::{BreakerSettings, CircuitBreaker, CircuitOpen, CircuitState};
pub use spend::SpendGuard;

use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use chrono::Utc;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::warn;

use super::domain::FallbackReason;
use super::provider::{ProviderError, ProviderResponse};
use crate::config::ExplanationSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResilienceSettings {
    pub breaker: BreakerSettings,
    pub requests_per_minute: u32,
    pub daily_budget_usd: f64,
    pub timeout: Duration,
}

impl From<&ExplanationSettings> for ResilienceSettings {
    fn from(settings: &ExplanationSettings) -> Self {
        Self {
            breaker: BreakerSettings {
                failure_threshold: settings.failure_threshold,
                failure_window: settings.failure_window,
                cool_down: settings.cool_down,
                half_open_probes: settings.half_open_probes,
            },
            requests_per_minute: settings.requests_per_minute,
            daily_budget_usd: settings.daily_budget_usd,
            timeout: settings.timeout,
        }
    }
}

/// Reason the provider was not usable; open circuit and exhausted budget look the same to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    CircuitOpen,
    BudgetExhausted,
}

#[derive(Debug, thiserror::Error)]
pub enum ResilienceError {
    #[error("provider unavailable ({0:?})")]
    Unavailable(Unavailable),
    #[error("request rate limit reached")]
    RateLimited,
    #[error("provider call timed out")]
    Timeout,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ResilienceError {
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            ResilienceError::Unavailable(Unavailable::CircuitOpen) => FallbackReason::CircuitOpen,
            ResilienceError::Unavailable(Unavailable::BudgetExhausted) => {
                FallbackReason::BudgetExhausted
            }
            ResilienceError::RateLimited | ResilienceError::Provider(ProviderError::RateLimited) => {
                FallbackReason::RateLimited
            }
            ResilienceError::Timeout => FallbackReason::Timeout,
            ResilienceError::Provider(ProviderError::Malformed(_)) => {
                FallbackReason::MalformedResponse
            }
            ResilienceError::Provider(_) => FallbackReason::ProviderError,
        }
    }
}

/// Shared guard state for every provider call made by the process.
pub struct ResilienceController {
    breaker: CircuitBreaker,
    limiter: DefaultDirectRateLimiter,
    spend: SpendGuard,
    timeout: Duration,
}

impl ResilienceController {
    pub fn new(settings: ResilienceSettings) -> Self {
        let per_minute = NonZeroU32::new(settings.requests_per_minute).unwrap_or_else(|| {
            warn!("requests per minute must be positive; limiting to one");
            NonZeroU32::MIN
        });

        Self {
            breaker: CircuitBreaker::new(settings.breaker),
            limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
            spend: SpendGuard::new(settings.daily_budget_usd),
            timeout: settings.timeout,
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn spent_today(&self) -> f64 {
        self.spend.spent_on(Utc::now().date_naive())
    }

    /// Run one provider call behind every guard.
    ///
    /// Budget and breaker refusals fail fast without invoking `call`. A timeout or provider error
    /// counts against the breaker; a response counts as success and its cost is recorded.
    pub async fn execute<F, Fut>(&self, call: F) -> Result<ProviderResponse, ResilienceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ProviderResponse, ProviderError>>,
    {
        let today = Utc::now().date_naive();
        if !self.spend.allows(today) {
            warn!(spent_usd = self.spend.spent_on(today), "daily provider budget exhausted");
            return Err(ResilienceError::Unavailable(Unavailable::BudgetExhausted));
        }

        if self.breaker.try_acquire().is_err() {
            return Err(ResilienceError::Unavailable(Unavailable::CircuitOpen));
        }

        if self.limiter.check().is_err() {
            self.breaker.release();
            return Err(ResilienceError::RateLimited);
        }

        match tokio::time::timeout(self.timeout, call()).await {
            Err(_) => {
                self.breaker.record_failure();
                Err(ResilienceError::Timeout)
            }
            Ok(Err(err)) => {
                self.breaker.record_failure();
                Err(ResilienceError::Provider(err))
            }
            Ok(Ok(response)) => {
                self.breaker.record_success();
                self.spend.record(today, response.cost_usd);
                Ok(response)
            }
        }
    }
}
