//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::Secret;

/// How the welcome notification is dispatched after the signup writes commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyMode {
    /// Spawn the delivery and answer immediately
    Background,
    /// Wait for delivery (bounded by the notify timeout) and report failures to the caller
    Await,
}

impl FromStr for NotifyMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" => Ok(Self::Background),
            "await" => Ok(Self::Await),
            _ => Err(()),
        }
    }
}

/// SMTP account used for the welcome email
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub from_name: String,
    pub support_contact: String,
}

/// Messaging API account used for the WhatsApp welcome message
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub api_base: String,
    pub account_sid: String,
    pub auth_token: Secret<String>,
    /// Sender number, without the `whatsapp:` prefix
    pub sender: String,
    pub country_code: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Emit JSON log lines instead of the human readable format
    pub log_json: bool,

    /// Upper bound for each directory store call
    pub store_timeout: Duration,

    /// Upper bound for a whole notification fan-out
    pub notify_timeout: Duration,

    pub notify_mode: NotifyMode,

    /// bcrypt work factor
    pub bcrypt_cost: u32,

    pub email: Option<EmailConfig>,

    pub whatsapp: Option<WhatsAppConfig>,

    /// Directory with the signup front-end, served as a fallback
    pub public_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10)?;

        let host = get("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = parse_or(&get, "PORT", 3000)?;

        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let log_json = match get("LOG_FORMAT").as_deref() {
            None | Some("pretty") => false,
            Some("json") => true,
            Some(_) => return Err(ConfigError::InvalidValue("LOG_FORMAT")),
        };

        let store_timeout = timeout_secs(&get, "STORE_TIMEOUT_SECS", 10)?;
        let notify_timeout = timeout_secs(&get, "NOTIFY_TIMEOUT_SECS", 15)?;

        let notify_mode = match get("NOTIFY_MODE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("NOTIFY_MODE"))?,
            None => NotifyMode::Background,
        };

        let bcrypt_cost: u32 = parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue("BCRYPT_COST"));
        }

        let email = match (get("EMAIL_USER"), get("EMAIL_PASS")) {
            (Some(username), Some(password)) => Some(EmailConfig {
                smtp_host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                smtp_port: parse_or(&get, "SMTP_PORT", 587)?,
                username,
                password: Secret::new(password),
                from_name: get("EMAIL_FROM_NAME").unwrap_or_else(|| "SynapseLab".to_string()),
                support_contact: get("SUPPORT_CONTACT")
                    .unwrap_or_else(|| "(61) 9331-4870".to_string()),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnv("EMAIL_PASS")),
            (None, Some(_)) => return Err(ConfigError::MissingEnv("EMAIL_USER")),
        };

        let whatsapp = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_WHATSAPP_FROM"),
        ) {
            (Some(account_sid), Some(auth_token), Some(sender)) => Some(WhatsAppConfig {
                api_base: get("TWILIO_API_BASE")
                    .unwrap_or_else(|| "https://api.twilio.com".to_string()),
                account_sid,
                auth_token: Secret::new(auth_token),
                sender: sender.trim_start_matches("whatsapp:").to_string(),
                country_code: get("WHATSAPP_COUNTRY_CODE").unwrap_or_else(|| "+55".to_string()),
            }),
            (None, None, None) => None,
            (None, _, _) => return Err(ConfigError::MissingEnv("TWILIO_ACCOUNT_SID")),
            (_, None, _) => return Err(ConfigError::MissingEnv("TWILIO_AUTH_TOKEN")),
            (_, _, None) => return Err(ConfigError::MissingEnv("TWILIO_WHATSAPP_FROM")),
        };

        let public_dir = get("PUBLIC_DIR").map(PathBuf::from);

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            log_json,
            store_timeout,
            notify_timeout,
            notify_mode,
            bcrypt_cost,
            email,
            whatsapp,
            public_dir,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

/// A zero timeout would fail every call, so it is refused
fn timeout_secs<G>(get: &G, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match parse_or(get, key, default)? {
        0 => Err(ConfigError::InvalidValue(key)),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/synapse")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert_eq!(config.notify_mode, NotifyMode::Background);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.email.is_none());
        assert!(config.whatsapp.is_none());
        assert!(!config.is_production());
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("DATABASE_URL")));
    }

    #[test]
    fn test_email_requires_both_credentials() {
        let err = load(&[("DATABASE_URL", "postgres://x"), ("EMAIL_USER", "a@b.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("EMAIL_PASS")));

        let config = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("EMAIL_USER", "a@b.com"),
            ("EMAIL_PASS", "app-password"),
        ])
        .unwrap();
        let email = config.email.unwrap();
        assert_eq!(email.smtp_host, "smtp.gmail.com");
        assert_eq!(email.smtp_port, 587);
        assert_eq!(email.password.expose_secret(), "app-password");
    }

    #[test]
    fn test_whatsapp_sender_prefix_is_stripped() {
        let config = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "token"),
            ("TWILIO_WHATSAPP_FROM", "whatsapp:+14155238886"),
        ])
        .unwrap();
        let whatsapp = config.whatsapp.unwrap();
        assert_eq!(whatsapp.sender, "+14155238886");
        assert_eq!(whatsapp.country_code, "+55");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("DATABASE_URL", "x"), ("NOTIFY_MODE", "later")]).unwrap_err(),
            ConfigError::InvalidValue("NOTIFY_MODE")
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "x"), ("BCRYPT_COST", "2")]).unwrap_err(),
            ConfigError::InvalidValue("BCRYPT_COST")
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "x"), ("PORT", "http")]).unwrap_err(),
            ConfigError::InvalidValue("PORT")
        ));
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        assert!(matches!(
            load(&[("DATABASE_URL", "x"), ("STORE_TIMEOUT_SECS", "0")]).unwrap_err(),
            ConfigError::InvalidValue("STORE_TIMEOUT_SECS")
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "x"), ("NOTIFY_TIMEOUT_SECS", "0")]).unwrap_err(),
            ConfigError::InvalidValue("NOTIFY_TIMEOUT_SECS")
        ));

        let config = load(&[("DATABASE_URL", "x"), ("STORE_TIMEOUT_SECS", "1")]).unwrap();
        assert_eq!(config.store_timeout, Duration::from_secs(1));
    }
}
