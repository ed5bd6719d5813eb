/// Configuration management for Blog Service
///
/// Settings come from environment variables (optionally seeded from a `.env`
/// file by the binary). Production deployments must provide explicit values
/// for secrets, storage and CORS origins.
use actix_middleware::DEFAULT_TOKEN_HEADER;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token verification settings
    pub jwt: JwtConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL; `None` selects the in-memory store
    pub url: Option<String>,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Token verification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    /// Header carrying the token
    pub header: String,
    /// Seconds of tolerance on `exp`
    pub leeway_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: lookup("BLOG_SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or_default(&lookup, "BLOG_SERVICE_PORT", 8080)?,
            },
            cors: {
                let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
                    Some(value) => value,
                    None if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    None => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: {
                let url = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty());
                if production && url.is_none() {
                    return Err("DATABASE_URL must be set in production".to_string());
                }

                DatabaseConfig {
                    url,
                    max_connections: parse_or_default(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                }
            },
            jwt: {
                let secret = lookup("JWT_SECRET")
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| "JWT_SECRET must be set".to_string())?;
                if production {
                    crypto_core::jwt::validate_secret_length(&secret)
                        .map_err(|e| format!("JWT_SECRET rejected: {}", e))?;
                }

                JwtConfig {
                    secret,
                    header: lookup("JWT_HEADER")
                        .unwrap_or_else(|| DEFAULT_TOKEN_HEADER.to_string())
                        .to_ascii_lowercase(),
                    leeway_secs: parse_or_default(&lookup, "JWT_LEEWAY_SECS", 0)?,
                }
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }

    /// Allowed CORS origins, trimmed and without empty entries
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors
            .allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        None => Ok(default),
    }
}
