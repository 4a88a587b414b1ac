//! Configuration module
//!
//! Configuration is read once at startup and passed explicitly into the
//! components that need it (fetcher, mailer, pipeline). Nothing reads the
//! process environment after `Config::from_env` returns.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// Common constants
const SERVER_PORT: u16 = 4000;
const SMTP_HOST: &str = "smtp.gmail.com";
const SMTP_PORT: u16 = 465;
const SMTP_TIMEOUT_SECS: u64 = 30;
const SMTP_MAX_ATTEMPTS: u32 = 2;
const FETCH_TIMEOUT_SECS: u64 = 30;
const FETCH_MAX_ATTEMPTS: u32 = 2;
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Default direct-download template for Google Drive sharing links.
pub const DEFAULT_DIRECT_LINK_TEMPLATE: &str =
    "https://drive.google.com/uc?export=download&id={id}";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub max_body_bytes: usize,
    pub log_format: String,
}

/// Outbound mail submission settings
#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub email_from: String,
    pub email_password: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("email_from", &self.email_from)
            .field("email_password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

/// Image download settings
#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// Direct-download URL with an `{id}` placeholder for the file identifier
    pub direct_link_template: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub max_image_bytes: usize,
}

/// Report file placement
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Parent directory for per-request scratch directories (system temp dir when unset)
    pub work_dir: Option<PathBuf>,
    /// When set, every sent report is copied here before its scratch directory is removed
    pub retain_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub mail: MailConfig,
    pub fetch: FetchConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: parse_or(&get, "PORT", SERVER_PORT)?,
            cors_origins,
            environment,
            max_body_bytes: parse_or(&get, "MAX_BODY_BYTES", MAX_BODY_BYTES)?,
            log_format: get("LOG_FORMAT").unwrap_or_else(|| "compact".to_string()),
        };

        let mail = MailConfig {
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| SMTP_HOST.to_string()),
            smtp_port: parse_or(&get, "SMTP_PORT", SMTP_PORT)?,
            email_from: get("EMAIL_FROM")
                .ok_or_else(|| anyhow::anyhow!("EMAIL_FROM must be set"))?,
            email_password: get("EMAIL_PASSWORD")
                .ok_or_else(|| anyhow::anyhow!("EMAIL_PASSWORD must be set"))?,
            timeout_secs: parse_or(&get, "SMTP_TIMEOUT_SECS", SMTP_TIMEOUT_SECS)?,
            max_attempts: parse_or(&get, "SMTP_MAX_ATTEMPTS", SMTP_MAX_ATTEMPTS)?,
        };

        let fetch = FetchConfig {
            direct_link_template: get("DIRECT_LINK_TEMPLATE")
                .unwrap_or_else(|| DEFAULT_DIRECT_LINK_TEMPLATE.to_string()),
            timeout_secs: parse_or(&get, "FETCH_TIMEOUT_SECS", FETCH_TIMEOUT_SECS)?,
            max_attempts: parse_or(&get, "FETCH_MAX_ATTEMPTS", FETCH_MAX_ATTEMPTS)?,
            max_image_bytes: parse_or(&get, "MAX_IMAGE_BYTES", MAX_IMAGE_BYTES)?,
        };

        let report = ReportConfig {
            work_dir: get("WORK_DIR").map(PathBuf::from),
            retain_dir: get("REPORT_RETAIN_DIR").map(PathBuf::from),
        };

        Ok(Config {
            base,
            mail,
            fetch,
            report,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn max_body_bytes(&self) -> usize {
        self.base.max_body_bytes
    }

    pub fn log_format(&self) -> &str {
        &self.base.log_format
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number (got '{}')", key, raw)),
        None => Ok(default),
    }
}
