use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    /// Consecutive failures inside `failure_window` that open the circuit.
    pub failure_threshold: u32,
    pub failure_window: Duration,
    pub cool_down: Duration,
    /// Concurrent trial calls allowed while half-open.
    pub half_open_probes: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            failure_window: Duration::from_secs(60),
            cool_down: Duration::from_secs(30),
            half_open_probes: 1,
        }
    }
}

/// Returned when the breaker refuses a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitOpen;

struct BreakerState {
    state: CircuitState,
    failures: VecDeque<Instant>,
    opened_at: Option<Instant>,
    probes_in_flight: u32,
}

/// Three-state circuit breaker over a sliding failure window.
pub struct CircuitBreaker {
    settings: BreakerSettings,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Zero thresholds or trial counts are raised to one so a half-open circuit can always
    /// close again.
    pub fn new(settings: BreakerSettings) -> Self {
        let settings = BreakerSettings {
            failure_threshold: settings.failure_threshold.max(1),
            half_open_probes: settings.half_open_probes.max(1),
            ..settings
        };
        Self {
            settings,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failures: VecDeque::new(),
                opened_at: None,
                probes_in_flight: 0,
            }),
        }
    }

    /// Current state, after applying any cool-down that has elapsed.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.inner.lock();
        self.advance(&mut inner, Instant::now());
        inner.state
    }

    /// Ask permission for one call. Every granted permit must be settled with
    /// [`record_success`](Self::record_success), [`record_failure`](Self::record_failure) or
    /// [`release`](Self::release).
    pub fn try_acquire(&self) -> Result<(), CircuitOpen> {
        let mut inner = self.inner.lock();
        self.advance(&mut inner, Instant::now());

        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => Err(CircuitOpen),
            CircuitState::HalfOpen => {
                if inner.probes_in_flight < self.settings.half_open_probes {
                    inner.probes_in_flight += 1;
                    Ok(())
                } else {
                    Err(CircuitOpen)
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.failures.clear();
        if inner.state == CircuitState::HalfOpen {
            self.transition(&mut inner, CircuitState::Closed);
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        let now = Instant::now();

        match inner.state {
            CircuitState::HalfOpen => {
                inner.opened_at = Some(now);
                self.transition(&mut inner, CircuitState::Open);
            }
            CircuitState::Closed => {
                inner.failures.push_back(now);
                let window = self.settings.failure_window;
                while inner
                    .failures
                    .front()
                    .is_some_and(|at| now.duration_since(*at) > window)
                {
                    inner.failures.pop_front();
                }
                if inner.failures.len() >= self.settings.failure_threshold as usize {
                    inner.opened_at = Some(now);
                    self.transition(&mut inner, CircuitState::Open);
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Return a permit that was granted but never used.
    pub fn release(&self) {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::HalfOpen {
            inner.probes_in_flight = inner.probes_in_flight.saturating_sub(1);
        }
    }

    fn advance(&self, inner: &mut BreakerState, now: Instant) {
        if inner.state != CircuitState::Open {
            return;
        }
        let cooled = inner
            .opened_at
            .map_or(true, |opened| now.duration_since(opened) >= self.settings.cool_down);
        if cooled {
            self.transition(inner, CircuitState::HalfOpen);
        }
    }

    fn transition(&self, inner: &mut BreakerState, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        inner.probes_in_flight = 0;
        if to != CircuitState::Open {
            inner.opened_at = None;
        }
        if to == CircuitState::Closed {
            inner.failures.clear();
        }

        match to {
            CircuitState::Open => warn!(?from, ?to, "circuit breaker opened"),
            _ => info!(?from, ?to, "circuit breaker transition"),
        }
    }
}
