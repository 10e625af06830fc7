use crate::error::AppError;
use crate::services::fs_service::DEFAULT_MAX_UPLOAD_BYTES;
use crate::services::localization::Locale;
use crate::services::transport::AuthToken;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub auth_token: Option<AuthToken>,
    pub timeout: Duration,
    pub history_page_size: u32,
    pub search_debounce: Duration,
    pub max_upload_bytes: u64,
    pub locale: Locale,
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            auth_token: None,
            timeout: Duration::from_secs(30),
            history_page_size: 20,
            search_debounce: Duration::from_millis(500),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            locale: Locale::Ar,
            log_level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present; every variable has a default.
    pub fn from_env() -> Result<Self, AppError> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let locale = match env::var("INCIDENT_LOCALE") {
            Ok(raw) => Locale::parse(&raw)
                .ok_or_else(|| AppError::Config(format!("invalid INCIDENT_LOCALE: {raw}")))?,
            Err(_) => defaults.locale,
        };

        let page_size: u32 = parse_var("INCIDENT_HISTORY_PAGE_SIZE", defaults.history_page_size)?;
        if page_size == 0 {
            return Err(AppError::Config(
                "INCIDENT_HISTORY_PAGE_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_base_url: get_var_or("INCIDENT_API_BASE_URL", &defaults.api_base_url)
                .trim_end_matches('/')
                .to_string(),
            auth_token: env::var("INCIDENT_AUTH_TOKEN")
                .ok()
                .and_then(AuthToken::new),
            timeout: Duration::from_secs(parse_var(
                "INCIDENT_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            history_page_size: page_size,
            search_debounce: Duration::from_millis(parse_var(
                "INCIDENT_SEARCH_DEBOUNCE_MS",
                defaults.search_debounce.as_millis() as u64,
            )?),
            max_upload_bytes: parse_var("INCIDENT_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            locale,
            log_level: get_var_or("LOG_LEVEL", &defaults.log_level),
        })
    }
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_var<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
