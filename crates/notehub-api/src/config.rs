//! Server configuration loaded from the environment.

use std::time::Duration;

use notehub_core::defaults;
use notehub_core::{Error, Result};

/// Runtime settings for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    /// Registration is limited to this email domain when set.
    pub institution_domain: Option<String>,
    /// `development` exposes internal error detail and allows the dev secret.
    pub app_env: String,
    pub allowed_origins: String,
    pub youtube_oembed_url: String,
    pub external_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: defaults::DATABASE_URL.to_string(),
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            jwt_secret: defaults::DEV_JWT_SECRET.to_string(),
            token_ttl_hours: defaults::TOKEN_TTL_HOURS,
            upload_dir: defaults::UPLOAD_DIR.to_string(),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            institution_domain: None,
            app_env: "development".to_string(),
            allowed_origins: defaults::ALLOWED_ORIGINS.to_string(),
            youtube_oembed_url: defaults::YOUTUBE_OEMBED_URL.to_string(),
            external_timeout: Duration::from_secs(defaults::EXTERNAL_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Read settings from environment variables, falling back to defaults.
    ///
    /// Outside development a `JWT_SECRET` must be provided.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with an explicit lookup,
    /// so tests do not have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let app_env = get("APP_ENV").unwrap_or_else(|| "production".to_string());
        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if app_env == "development" => base.jwt_secret.clone(),
            None => {
                return Err(Error::Config(
                    "JWT_SECRET must be set outside development".to_string(),
                ))
            }
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or(base.database_url),
            host: get("HOST").unwrap_or(base.host),
            port: parse_or("PORT", get("PORT"), base.port)?,
            jwt_secret,
            token_ttl_hours: parse_or("TOKEN_TTL_HOURS", get("TOKEN_TTL_HOURS"), base.token_ttl_hours)?,
            upload_dir: get("UPLOAD_DIR").unwrap_or(base.upload_dir),
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                get("MAX_UPLOAD_BYTES"),
                base.max_upload_bytes,
            )?,
            institution_domain: get("INSTITUTION_EMAIL_DOMAIN"),
            app_env,
            allowed_origins: get("ALLOWED_ORIGINS").unwrap_or(base.allowed_origins),
            youtube_oembed_url: get("YOUTUBE_OEMBED_URL").unwrap_or(base.youtube_oembed_url),
            external_timeout: Duration::from_secs(parse_or(
                "EXTERNAL_TIMEOUT_SECS",
                get("EXTERNAL_TIMEOUT_SECS"),
                defaults::EXTERNAL_TIMEOUT_SECS,
            )?),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }

    /// Request body ceiling: one file plus room for the text fields.
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes + defaults::FORM_OVERHEAD_BYTES
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, value))),
        None => Ok(default),
    }
}
