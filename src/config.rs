use std::env;
use std::time::Duration;

use chrono::NaiveTime;
use thiserror::Error;

use crate::models::trip::DEFAULT_MAX_TRIP_DAYS;
use crate::services::generation_client::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::services::place_search_service::DEFAULT_MAPS_BASE_URL;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_TRIP_DAYS_LIMIT: u32 = 30;
const DEFAULT_DAY_START: &str = "09:00";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} has invalid value \"{value}\": {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub max_trip_days: u32,
    pub day_start_time: NaiveTime,
    pub google_maps_api_key: Option<String>,
    pub google_maps_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse_or("PORT", get("PORT"), PORT)?;

        let timeout_secs = parse_or("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS)?;
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(ConfigError::Invalid {
                var: "LLM_TIMEOUT_SECS",
                value: timeout_secs.to_string(),
                reason: format!("must be between {} and {}", MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
            });
        }

        let max_trip_days = parse_or("MAX_TRIP_DAYS", get("MAX_TRIP_DAYS"), DEFAULT_MAX_TRIP_DAYS)?;
        if !(1..=MAX_TRIP_DAYS_LIMIT).contains(&max_trip_days) {
            return Err(ConfigError::Invalid {
                var: "MAX_TRIP_DAYS",
                value: max_trip_days.to_string(),
                reason: format!("must be between 1 and {}", MAX_TRIP_DAYS_LIMIT),
            });
        }

        let day_start_raw = get("DAY_START_TIME").unwrap_or_else(|| DEFAULT_DAY_START.to_string());
        let day_start_time = NaiveTime::parse_from_str(&day_start_raw, "%H:%M").map_err(|e| {
            ConfigError::Invalid {
                var: "DAY_START_TIME",
                value: day_start_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let llm_base_url = get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if let Err(e) = url::Url::parse(&llm_base_url) {
            return Err(ConfigError::Invalid {
                var: "LLM_BASE_URL",
                value: llm_base_url,
                reason: e.to_string(),
            });
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| HOST.to_string()),
            port,
            llm_base_url,
            llm_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_timeout: Duration::from_secs(timeout_secs),
            max_trip_days,
            day_start_time,
            google_maps_api_key: get("GOOGLE_MAPS_API_KEY"),
            google_maps_base_url: get("GOOGLE_MAPS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MAPS_BASE_URL.to_string()),
        })
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
