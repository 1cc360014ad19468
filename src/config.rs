use crate::insights::ScoreFold;
use std::{env, time::Duration};
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "https://web-production-11f5.up.railway.app";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Where per-course records come from before aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CourseSource {
    /// Counted from the lead list.
    #[default]
    Leads,
    /// Upstream `/api/analytics/courses`.
    Analytics,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub api_token: Option<String>,
    pub refresh_interval: Duration,
    pub score_fold: ScoreFold,
    pub course_source: CourseSource,
    pub leads_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_token: None,
            refresh_interval: Duration::from_secs(30),
            score_fold: ScoreFold::default(),
            course_source: CourseSource::default(),
            leads_limit: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("PORT") {
            config.port = parse("PORT", value)?;
        }
        if let Some(value) = lookup("DIALOGIC_BACKEND_URL") {
            let trimmed = value.trim().trim_end_matches('/');
            if trimmed.is_empty() {
                return Err(invalid("DIALOGIC_BACKEND_URL", value));
            }
            config.backend_url = trimmed.to_string();
        }
        config.api_token = lookup("DIALOGIC_API_TOKEN").filter(|token| !token.trim().is_empty());
        if let Some(value) = lookup("DIALOGIC_REFRESH_SECS") {
            let secs: u64 = parse("DIALOGIC_REFRESH_SECS", value.clone())?;
            if secs == 0 {
                return Err(invalid("DIALOGIC_REFRESH_SECS", value));
            }
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(value) = lookup("DIALOGIC_SCORE_FOLD") {
            config.score_fold = match value.trim() {
                "pairwise" => ScoreFold::PairwiseRunning,
                "weighted" => ScoreFold::WeightedMean,
                _ => return Err(invalid("DIALOGIC_SCORE_FOLD", value)),
            };
        }
        if let Some(value) = lookup("DIALOGIC_COURSE_SOURCE") {
            config.course_source = match value.trim() {
                "leads" => CourseSource::Leads,
                "analytics" => CourseSource::Analytics,
                _ => return Err(invalid("DIALOGIC_COURSE_SOURCE", value)),
            };
        }
        if let Some(value) = lookup("DIALOGIC_LEADS_LIMIT") {
            config.leads_limit = parse("DIALOGIC_LEADS_LIMIT", value)?;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid { key, value }
}
