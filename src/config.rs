// src/config.rs
use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::services::chat_session::FormatPromptPolicy;

pub const BACKEND_URL_ENV: &str = "LIONWELL_BACKEND_URL";
pub const BIND_ADDR_ENV: &str = "LIONWELL_BIND_ADDR";
pub const SESSION_TTL_ENV: &str = "LIONWELL_SESSION_TTL_SECS";
pub const REQUEST_TIMEOUT_ENV: &str = "LIONWELL_REQUEST_TIMEOUT_SECS";
pub const CAMPUS_ENV: &str = "LIONWELL_CAMPUS";
pub const FORMAT_PROMPT_DELAY_ENV: &str = "LIONWELL_FORMAT_PROMPT_DELAY_MS";

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5001";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
const DEFAULT_CAMPUS: &str = "Penn State";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be an absolute http(s) URL, got '{value}'")]
    InvalidUrl { key: &'static str, value: String },

    #[error("{key} must be a socket address like 0.0.0.0:3000, got '{value}'")]
    InvalidAddr { key: &'static str, value: String },

    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub bind_addr: SocketAddr,
    pub session_ttl: Duration,
    pub request_timeout: Option<Duration>,
    pub campus: String,
    pub format_prompt: FormatPromptPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            request_timeout: None,
            campus: DEFAULT_CAMPUS.to_string(),
            format_prompt: FormatPromptPolicy::AfterReply,
        }
    }
}

impl Config {
    /// Reads the process environment, honouring a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let backend_url = get(BACKEND_URL_ENV).unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        validate_url(BACKEND_URL_ENV, &backend_url)?;

        let raw_addr = get(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = raw_addr.parse().map_err(|_| ConfigError::InvalidAddr {
            key: BIND_ADDR_ENV,
            value: raw_addr.clone(),
        })?;

        let session_ttl = match get(SESSION_TTL_ENV) {
            Some(v) => Duration::from_secs(parse_positive(SESSION_TTL_ENV, &v)?),
            None => Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        };

        let request_timeout = get(REQUEST_TIMEOUT_ENV)
            .map(|v| parse_positive(REQUEST_TIMEOUT_ENV, &v).map(Duration::from_secs))
            .transpose()?;

        let campus = match get(CAMPUS_ENV) {
            Some(v) if v.is_empty() => return Err(ConfigError::Empty { key: CAMPUS_ENV }),
            Some(v) => v,
            None => DEFAULT_CAMPUS.to_string(),
        };

        let format_prompt = match get(FORMAT_PROMPT_DELAY_ENV) {
            Some(v) => FormatPromptPolicy::FixedDelay(Duration::from_millis(parse_positive(
                FORMAT_PROMPT_DELAY_ENV,
                &v,
            )?)),
            None => FormatPromptPolicy::AfterReply,
        };

        Ok(Self {
            backend_url,
            bind_addr,
            session_ttl,
            request_timeout,
            campus,
            format_prompt,
        })
    }
}

fn validate_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        key,
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(())
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        }),
    }
}
