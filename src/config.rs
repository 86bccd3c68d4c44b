use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::day_cache::CachePolicy;
use crate::fetch::{DAY_BATCH_SIZE, KnownDays};
use crate::policy::ScoringPolicy;

#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub api_base_url: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub fetch_parallelism: usize,
    pub batch_size: usize,
    pub known_days_path: Option<PathBuf>,
    pub scoring_policy_path: Option<PathBuf>,
    pub cache: CachePolicy,
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse::<T>().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    env_string(key).map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl ScoutConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env_string("SCOUT_API_BASE_URL"),
            api_key: env_string("SCOUT_API_KEY"),
            request_timeout: Duration::from_secs(
                env_parse::<u64>("SCOUT_HTTP_TIMEOUT_SECS")
                    .unwrap_or(10)
                    .max(1),
            ),
            fetch_parallelism: env_parse::<usize>("FETCH_PARALLELISM")
                .unwrap_or(DAY_BATCH_SIZE)
                .clamp(1, 64),
            batch_size: env_parse::<usize>("FETCH_BATCH_SIZE")
                .unwrap_or(DAY_BATCH_SIZE)
                .max(1),
            known_days_path: env_string("KNOWN_DATA_DAYS").map(PathBuf::from),
            scoring_policy_path: env_string("SCORING_POLICY_PATH").map(PathBuf::from),
            cache: CachePolicy {
                ttl: env_parse::<u64>("DAY_CACHE_TTL_SECS").map(Duration::from_secs),
                max_days: env_parse::<usize>("DAY_CACHE_MAX_DAYS"),
                cache_failures: env_flag("DAY_CACHE_FAILURES").unwrap_or(true),
            },
        }
    }

    pub fn require_base_url(&self) -> Result<&str> {
        self.api_base_url
            .as_deref()
            .ok_or_else(|| anyhow!("SCOUT_API_BASE_URL is not set"))
    }

    /// Empty allowlist when no path is configured.
    pub fn load_known_days(&self) -> Result<KnownDays> {
        match &self.known_days_path {
            Some(path) => KnownDays::load(path),
            None => Ok(KnownDays::default()),
        }
    }

    pub fn load_scoring_policy(&self) -> Result<ScoringPolicy> {
        match &self.scoring_policy_path {
            Some(path) => ScoringPolicy::load(path),
            None => Ok(ScoringPolicy::default()),
        }
    }
}
