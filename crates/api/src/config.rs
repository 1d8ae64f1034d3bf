//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use verdicomply_auth::MAX_TOKEN_TTL_SECONDS;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings for the API server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Token validity in seconds.
    pub jwt_expiration_seconds: i64,
    /// Header carrying the bearer token.
    pub jwt_header: String,
    /// Prefix stripped from the header value; also reported as the token type.
    pub jwt_prefix: String,
    /// When set, repositories are backed by Postgres; otherwise in-memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Create the default users, departments and norms when absent.
    pub seed_defaults: bool,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
}

pub const DEV_JWT_SECRET: &str = "verdicomply-dev-secret";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiration_seconds: 86_400,
            jwt_header: "Authorization".to_string(),
            jwt_prefix: "Bearer ".to_string(),
            database_url: None,
            database_max_connections: 5,
            seed_defaults: true,
            argon2_memory_kib: verdicomply_auth::PasswordHasher::DEFAULT_MEMORY_KIB,
            argon2_iterations: verdicomply_auth::PasswordHasher::DEFAULT_ITERATIONS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            jwt_secret,
            jwt_expiration_seconds: parse_bounded(
                &lookup,
                "JWT_EXPIRATION_SECONDS",
                defaults.jwt_expiration_seconds,
                MAX_TOKEN_TTL_SECONDS,
            )?,
            jwt_header: lookup("JWT_HEADER").unwrap_or(defaults.jwt_header),
            jwt_prefix: lookup("JWT_PREFIX").unwrap_or(defaults.jwt_prefix),
            database_url: lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.database_max_connections)?,
            seed_defaults: parse_bool(&lookup, "SEED_DEFAULTS", defaults.seed_defaults)?,
            argon2_memory_kib: parse_or(&lookup, "ARGON2_MEMORY_KIB", defaults.argon2_memory_kib)?,
            argon2_iterations: parse_or(&lookup, "ARGON2_ITERATIONS", defaults.argon2_iterations)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_bounded(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: i64,
    max: i64,
) -> Result<i64, ConfigError> {
    let value = parse_or(lookup, key, default)?;
    if !(1..=max).contains(&value) {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: format!("must be between 1 and {max}"),
        });
    }
    Ok(value)
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(ConfigError::Invalid {
            key,
            value: v,
            reason: "expected a boolean".to_string(),
        }),
    }
}
