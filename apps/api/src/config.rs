use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::workflow::dispatch::{
    DispatchPolicy, DEFAULT_DISPATCH_DELAY, DEFAULT_SANDBOX_DELAY, DEFAULT_SANDBOX_DOMAINS,
};

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Application configuration loaded from environment variables.
/// Every credential is optional: a missing Gemini key switches generation to
/// offline fallbacks, missing SMTP credentials must then arrive with the request.
#[derive(Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub sender_email: Option<String>,
    pub smtp_app_password: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub preferred_location: String,
    pub dispatch_delay: Duration,
    pub sandbox_delay: Duration,
    pub sandbox_domains: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            sender_email: optional_env("SENDER_EMAIL"),
            smtp_app_password: optional_env("SMTP_APP_PASSWORD"),
            smtp_host: optional_env("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port: parse_env("SMTP_PORT", 587)?,
            preferred_location: optional_env("PREFERRED_LOCATION")
                .unwrap_or_else(|| "Remote".to_string()),
            dispatch_delay: Duration::from_secs(parse_env(
                "DISPATCH_DELAY_SECS",
                DEFAULT_DISPATCH_DELAY.as_secs(),
            )?),
            sandbox_delay: Duration::from_secs(parse_env(
                "SANDBOX_DELAY_SECS",
                DEFAULT_SANDBOX_DELAY.as_secs(),
            )?),
            sandbox_domains: parse_domain_list(
                &optional_env("SANDBOX_DOMAINS")
                    .unwrap_or_else(|| DEFAULT_SANDBOX_DOMAINS.join(",")),
            ),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            dispatch_delay: self.dispatch_delay,
            sandbox_delay: self.sandbox_delay,
            sandbox_domains: self.sandbox_domains.clone(),
        }
    }
}

// Credentials never reach the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("sender_email", &self.sender_email)
            .field(
                "smtp_app_password",
                &self.smtp_app_password.as_ref().map(|_| "<redacted>"),
            )
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("preferred_location", &self.preferred_location)
            .field("dispatch_delay", &self.dispatch_delay)
            .field("sandbox_delay", &self.sandbox_delay)
            .field("sandbox_domains", &self.sandbox_domains)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

/// Returns the variable's value, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'"))
}

fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_config;

    #[test]
    fn test_parse_value_accepts_port() {
        let port: u16 = parse_value("SMTP_PORT", "2525").unwrap();
        assert_eq!(port, 2525);
    }

    #[test]
    fn test_parse_value_rejects_garbage_with_key_in_message() {
        let err = parse_value::<u64>("DISPATCH_DELAY_SECS", "soon").unwrap_err();
        assert!(err.to_string().contains("DISPATCH_DELAY_SECS"));
    }

    #[test]
    fn test_parse_domain_list_normalizes_entries() {
        let domains = parse_domain_list(" Example, test ,,INVALID");
        assert_eq!(domains, vec!["example", "test", "invalid"]);
    }

    #[test]
    fn test_debug_output_redacts_credentials() {
        let mut config = test_config();
        config.gemini_api_key = Some("AIza-secret".to_string());
        config.sender_email = Some("me@mail.com".to_string());
        config.smtp_app_password = Some("hunter2".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("AIza-secret"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("me@mail.com"));
    }

    #[test]
    fn test_dispatch_policy_mirrors_config() {
        let mut config = test_config();
        config.sandbox_delay = Duration::from_secs(1);
        let policy = config.dispatch_policy();
        assert_eq!(policy.sandbox_delay, Duration::from_secs(1));
        assert_eq!(policy.dispatch_delay, DEFAULT_DISPATCH_DELAY);
        assert_eq!(policy.sandbox_domains, config.sandbox_domains);
    }
}
