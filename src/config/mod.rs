use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub explanation: ExplanationSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            explanation: ExplanationSettings::from_env()?,
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Generative provider, resilience, and cache settings for match explanations.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub requests_per_minute: u32,
    pub failure_threshold: u32,
    pub failure_window: Duration,
    pub cool_down: Duration,
    pub half_open_probes: u32,
    pub daily_budget_usd: f64,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_timeout: Duration,
    pub batch_delay: Duration,
    pub input_price_per_mtok: f64,
    pub output_price_per_mtok: f64,
}

impl Default for ExplanationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "claude-3-5-haiku-latest".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            requests_per_minute: 50,
            failure_threshold: 5,
            failure_window: Duration::from_secs(60),
            cool_down: Duration::from_secs(30),
            half_open_probes: 1,
            daily_budget_usd: 50.0,
            timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            cache_timeout: Duration::from_secs(2),
            batch_delay: Duration::from_millis(1500),
            input_price_per_mtok: 0.8,
            output_price_per_mtok: 4.0,
        }
    }
}

impl ExplanationSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            api_key: env::var("AI_API_KEY").ok().filter(|key| !key.trim().is_empty()),
            model: env::var("AI_MODEL").unwrap_or(defaults.model),
            base_url: env::var("AI_BASE_URL").unwrap_or(defaults.base_url),
            requests_per_minute: positive("AI_REQUESTS_PER_MINUTE", defaults.requests_per_minute)?,
            failure_threshold: positive("AI_FAILURE_THRESHOLD", defaults.failure_threshold)?,
            failure_window: Duration::from_secs(number(
                "AI_FAILURE_WINDOW_SECS",
                defaults.failure_window.as_secs(),
            )?),
            cool_down: Duration::from_secs(number(
                "AI_COOL_DOWN_SECS",
                defaults.cool_down.as_secs(),
            )?),
            half_open_probes: positive("AI_HALF_OPEN_PROBES", defaults.half_open_probes)?,
            daily_budget_usd: number("AI_DAILY_BUDGET_USD", defaults.daily_budget_usd)?,
            timeout: Duration::from_secs(number("AI_TIMEOUT_SECS", defaults.timeout.as_secs())?),
            cache_ttl: Duration::from_secs(
                number::<u64>("EXPLANATION_CACHE_TTL_HOURS", 24)?.saturating_mul(60 * 60),
            ),
            cache_timeout: Duration::from_millis(u64::from(positive(
                "EXPLANATION_CACHE_TIMEOUT_MS",
                defaults.cache_timeout.as_millis() as u32,
            )?)),
            batch_delay: Duration::from_millis(number(
                "EXPLANATION_BATCH_DELAY_MS",
                defaults.batch_delay.as_millis() as u64,
            )?),
            input_price_per_mtok: number("AI_INPUT_PRICE_PER_MTOK", defaults.input_price_per_mtok)?,
            output_price_per_mtok: number(
                "AI_OUTPUT_PRICE_PER_MTOK",
                defaults.output_price_per_mtok,
            )?,
        })
    }
}

fn number<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

fn positive(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    match number(key, default)? {
        0 => Err(ConfigError::InvalidNumber { key }),
        value => Ok(value),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a valid non-negative number")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
