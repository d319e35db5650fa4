use std::str::FromStr;

use simplelog::LevelFilter;

use crate::api::err::ApiError;
use crate::api::student::Credentials;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Settings read from the environment (after `.env` has been loaded).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub log_level: LevelFilter,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("ADMIN_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        reqwest::Url::parse(&api_url)
            .map_err(|e| ApiError::Config(format!("ADMIN_API_URL {:?}: {}", api_url, e)))?;

        let log_level = match non_empty("ADMIN_LOG_LEVEL") {
            Some(level) => LevelFilter::from_str(level.trim())
                .map_err(|_| ApiError::Config(format!("ADMIN_LOG_LEVEL {:?}", level)))?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            api_url,
            log_level,
            email: non_empty("ADMIN_EMAIL"),
            password: lookup("ADMIN_PASSWORD"),
        })
    }

    /// Sign-in credentials, if both halves are configured.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some(Credentials {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}
