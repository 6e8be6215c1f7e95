/// Client configuration module
use crate::errors::{SdaError, SdaResult};
use std::env;
use std::fmt;
use std::time::Duration;

pub const TOKEN_VAR: &str = "OURSKY_API_TOKEN";
pub const BASE_URL_VAR: &str = "OURSKY_API_URL";
pub const TIMEOUT_VAR: &str = "OURSKY_TIMEOUT_SECONDS";

pub const DEFAULT_BASE_URL: &str = "https://api.prod.oursky.ai";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Clone)]
pub struct SdaConfig {
    pub api_token: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl SdaConfig {
    pub fn new(api_token: impl Into<String>) -> SdaResult<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(SdaError::Configuration(format!("{} is empty", TOKEN_VAR)));
        }

        Ok(Self {
            api_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> SdaResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// The token is mandatory; base URL and timeout fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> SdaResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup(TOKEN_VAR)
            .ok_or_else(|| SdaError::Configuration(format!("{} is not set", TOKEN_VAR)))?;

        let base_url = lookup(BASE_URL_VAR)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_seconds = env_u64(&lookup, TIMEOUT_VAR, DEFAULT_TIMEOUT_SECONDS);

        Ok(Self::new(api_token)?
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(timeout_seconds)))
    }
}

// keep the token out of logs
impl fmt::Debug for SdaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdaConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn env_u64<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}
