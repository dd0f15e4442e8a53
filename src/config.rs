//! Process-wide settings, read from the environment once at startup.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// No timeout when unset.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Shared secret expected in `X-API-KEY`. Requests are refused with a
    /// configuration error while it is unset.
    pub server_api_key: Option<String>,
    pub openai: OpenAiConfig,
    pub report_model: String,
    pub template_model: String,
    pub temperature: f32,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1807,
            server_api_key: None,
            openai: OpenAiConfig {
                api_key: None,
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                timeout: None,
            },
            report_model: "gpt-4o-mini".to_string(),
            template_model: "gpt-4.1".to_string(),
            temperature: 0.7,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT")?.unwrap_or(defaults.port),
            server_api_key: non_empty_env("SERVER_API_KEY"),
            openai: OpenAiConfig {
                api_key: non_empty_env("OPENAI_API_KEY"),
                base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai.base_url),
                timeout: timeout_from_secs(parse_env("MODEL_TIMEOUT_SECS")?)?,
            },
            report_model: env::var("REPORT_MODEL").unwrap_or(defaults.report_model),
            template_model: env::var("TEMPLATE_MODEL").unwrap_or(defaults.template_model),
            temperature: parse_env("MODEL_TEMPERATURE")?.unwrap_or(defaults.temperature),
            log_json: parse_env("LOG_JSON")?.unwrap_or(defaults.log_json),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn timeout_from_secs(secs: Option<u64>) -> Result<Option<Duration>, ConfigError> {
    match secs {
        Some(0) => Err(ConfigError::Invalid {
            key: "MODEL_TIMEOUT_SECS",
            value: "0".to_string(),
            reason: "must be greater than zero; leave unset for no timeout".to_string(),
        }),
        secs => Ok(secs.map(Duration::from_secs)),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_env(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            }),
    }
}
