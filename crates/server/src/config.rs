//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `IQRA_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string,
//!   unless `IQRA_STORAGE=memory`
//!
//! ## Optional
//! - `IQRA_STORAGE` - `postgres` (default) or `memory`
//! - `IQRA_HOST` - Bind address (default: 127.0.0.1)
//! - `IQRA_PORT` - Listen port (default: 4000)
//! - `IQRA_BASE_URL` - Public URL; `https://` turns on secure cookies
//! - `IQRA_ENV` - `production` (default) or `development`
//! - `IQRA_SESSION_TTL_HOURS` - Absolute session lifetime (default: 24)
//! - `IQRA_ADMIN_ACCESS_KEY` - Enables key-based admin access (min 32 chars, high entropy)
//! - `IQRA_CORS_ORIGIN` - Front-end origin allowed to send credentials
//! - `IQRA_PASSWORD_MEMORY_KIB` / `IQRA_PASSWORD_ITERATIONS` / `IQRA_PASSWORD_PARALLELISM`
//!   - Argon2 work factor (default: 19456 / 2 / 1)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_TRACES_SAMPLE_RATE` - Fraction of requests traced (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ACCESS_KEY_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// One year.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Internal error text is returned to clients.
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected development or production, got {other}")),
        }
    }
}

/// Where domain records and sessions are kept.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// `PostgreSQL`, for every real deployment.
    Postgres {
        /// Connection string (contains password).
        database_url: SecretString,
    },
    /// Process memory; lost on restart. Used by tests and local demos.
    Memory,
}

/// Argon2 work factor for password hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AcademyConfig {
    pub storage: StorageBackend,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the API
    pub base_url: String,
    pub environment: Environment,
    /// Absolute lifetime of a login session, in hours.
    pub session_ttl_hours: i64,
    /// Shared key accepted by `POST /admin/auth {key}`; disabled when unset.
    pub admin_access_key: Option<SecretString>,
    /// Browser origin of the single-page front end.
    pub cors_origin: Option<String>,
    pub password_hashing: PasswordHashingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_traces_sample_rate: f32,
}

impl AcademyConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the admin access key fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage = match get_env_or_default("IQRA_STORAGE", "postgres").as_str() {
            "postgres" => StorageBackend::Postgres {
                database_url: get_database_url("IQRA_DATABASE_URL")?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "IQRA_STORAGE".to_string(),
                    format!("expected postgres or memory, got {other}"),
                ));
            }
        };

        let admin_access_key = match get_optional_env("IQRA_ADMIN_ACCESS_KEY") {
            Some(value) => {
                let key = SecretString::from(value);
                validate_access_key(&key, "IQRA_ADMIN_ACCESS_KEY")?;
                Some(key)
            }
            None => None,
        };

        let password_hashing = PasswordHashingConfig {
            memory_kib: parse_env("IQRA_PASSWORD_MEMORY_KIB", argon2::Params::DEFAULT_M_COST)?,
            iterations: parse_env("IQRA_PASSWORD_ITERATIONS", argon2::Params::DEFAULT_T_COST)?,
            parallelism: parse_env("IQRA_PASSWORD_PARALLELISM", argon2::Params::DEFAULT_P_COST)?,
        };

        let session_ttl_hours = parse_env("IQRA_SESSION_TTL_HOURS", 24_i64)?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            return Err(ConfigError::InvalidEnvVar(
                "IQRA_SESSION_TTL_HOURS".to_string(),
                format!("must be between 1 and {MAX_SESSION_TTL_HOURS}"),
            ));
        }

        Ok(Self {
            storage,
            host: parse_env("IQRA_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: parse_env("IQRA_PORT", 4000_u16)?,
            base_url: get_env_or_default("IQRA_BASE_URL", "http://localhost:4000"),
            environment: parse_env("IQRA_ENV", Environment::Production)?,
            session_ttl_hours,
            admin_access_key,
            cors_origin: get_optional_env("IQRA_CORS_ORIGIN"),
            password_hashing,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        })
    }

    /// Development defaults with in-memory storage.
    ///
    /// Nothing is read from the environment.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: StorageBackend::Memory,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 4000,
            base_url: "http://localhost:4000".to_string(),
            environment: Environment::Development,
            session_ttl_hours: 24,
            admin_access_key: None,
            cors_origin: None,
            password_hashing: PasswordHashingConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that the admin access key is long, not a placeholder, and random-looking.
fn validate_access_key(key: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = key.expose_secret();

    if value.len() < MIN_ACCESS_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_ACCESS_KEY_LENGTH} characters (got {})",
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_access_key_too_short() {
        let key = SecretString::from("aB3$xY9!");
        assert!(matches!(
            validate_access_key(&key, "KEY"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_access_key_placeholder() {
        let key = SecretString::from("changeme-aB3$xY9!mK2@nL5#pQ7&rT0*uW4");
        let err = validate_access_key(&key, "KEY").unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_access_key_low_entropy() {
        let key = SecretString::from("ab".repeat(20));
        let err = validate_access_key(&key, "KEY").unwrap_err();
        assert!(err.to_string().contains("entropy"));
    }

    #[test]
    fn test_access_key_valid() {
        let key = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6");
        assert!(validate_access_key(&key, "KEY").is_err());

        let key = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%");
        assert!(validate_access_key(&key, "KEY").is_ok());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_in_memory_defaults() {
        let config = AcademyConfig::in_memory();
        assert!(matches!(config.storage, StorageBackend::Memory));
        assert_eq!(config.session_ttl_hours, 24);
        assert!(!config.secure_cookies());
        assert_eq!(config.socket_addr().port(), 4000);
    }

    #[test]
    fn test_secure_cookies_follow_base_url() {
        let config = AcademyConfig {
            base_url: "https://api.iqra.academy".to_string(),
            ..AcademyConfig::in_memory()
        };
        assert!(config.secure_cookies());
    }
}
