use std::env;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            refresh_token: None,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            api_url: normalize_base_url(&api_url.into())?,
            ..Self::default()
        })
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        let api_url = env::var("INSTITUTE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let access_token = non_empty_var("INSTITUTE_ACCESS_TOKEN");
        let refresh_token = non_empty_var("INSTITUTE_REFRESH_TOKEN");
        let request_timeout = match non_empty_var("INSTITUTE_TIMEOUT_SECS") {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        Ok(Self {
            api_url: normalize_base_url(&api_url)?,
            access_token,
            refresh_token,
            request_timeout,
        })
    }

    pub fn with_tokens(mut self, access: Option<String>, refresh: Option<String>) -> Self {
        if access.is_some() {
            self.access_token = access;
        }
        if refresh.is_some() {
            self.refresh_token = refresh;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        if timeout.is_some() {
            self.request_timeout = timeout;
        }
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn parse_timeout(raw: &str) -> Result<Duration, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(AppError::Config(format!(
            "INSTITUTE_TIMEOUT_SECS must be a positive integer, got {raw:?}"
        ))),
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(AppError::Config(format!(
            "API url must start with http:// or https://, got {raw:?}"
        )));
    }
    Ok(trimmed.to_string())
}
