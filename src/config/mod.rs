use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Errors raised while assembling [`AppConfig`] from the environment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub init_schema: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub request_timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Work factor bounds accepted by bcrypt.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&|key: &str| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; tests pass a closure over a map.
    pub fn from_source<S>(source: &S) -> Result<Self, ConfigError>
    where
        S: Fn(&str) -> Option<String>,
    {
        let environment = match source("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let database_url = required(source, "DATABASE_URL")?;
        validate_database_url(&database_url)?;

        let port = required(source, "PORT")?
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?;

        let jwt_secret = required(source, "JWT_SECRET")?;

        // Set defaults based on environment, then override with specific env vars
        let mut config = Self::preset(environment, database_url, port, jwt_secret);
        config.apply_overrides(source)?;
        Ok(config)
    }

    fn apply_overrides<S>(&mut self, source: &S) -> Result<(), ConfigError>
    where
        S: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = source("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = source("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Some(v) = source("DATABASE_INIT_SCHEMA") {
            self.database.init_schema = parse("DATABASE_INIT_SCHEMA", &v)?;
        }

        // API overrides
        if let Some(v) = source("API_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = parse("API_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = source("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = parse("API_ENABLE_REQUEST_LOGGING", &v)?;
        }

        // Security overrides
        if let Some(v) = source("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse("SECURITY_ENABLE_CORS", &v)?;
        }
        if let Some(v) = source("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = source("SECURITY_JWT_EXPIRY_HOURS") {
            let hours: u64 = parse("SECURITY_JWT_EXPIRY_HOURS", &v)?;
            if hours == 0 {
                return Err(ConfigError::Invalid {
                    name: "SECURITY_JWT_EXPIRY_HOURS",
                    reason: "must be at least 1".to_string(),
                });
            }
            self.security.jwt_expiry_hours = hours;
        }
        if let Some(v) = source("SECURITY_BCRYPT_COST") {
            let cost: u32 = parse("SECURITY_BCRYPT_COST", &v)?;
            if !BCRYPT_COST_RANGE.contains(&cost) {
                return Err(ConfigError::Invalid {
                    name: "SECURITY_BCRYPT_COST",
                    reason: format!(
                        "must be between {} and {}",
                        BCRYPT_COST_RANGE.start(),
                        BCRYPT_COST_RANGE.end()
                    ),
                });
            }
            self.security.bcrypt_cost = cost;
        }

        Ok(())
    }

    fn preset(environment: Environment, url: String, port: u16, jwt_secret: String) -> Self {
        let (max_connections, connection_timeout, request_timeout_secs, logging) =
            match environment {
                Environment::Development => (10, 30, 30, true),
                Environment::Staging => (20, 10, 15, true),
                Environment::Production => (50, 5, 10, false),
            };

        let cors_origins = match environment {
            Environment::Development => vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            Environment::Staging | Environment::Production => Vec::new(),
        };

        Self {
            environment,
            port,
            database: DatabaseConfig {
                url,
                max_connections,
                connection_timeout,
                init_schema: true,
            },
            api: ApiConfig {
                request_timeout_secs,
                enable_request_logging: logging,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enable_cors: environment == Environment::Development,
                cors_origins,
            },
        }
    }

    /// Database URL with the password masked, for logging.
    pub fn redacted_database_url(&self) -> String {
        match url::Url::parse(&self.database.url) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.to_string()
            }
            Err(_) => "<invalid>".to_string(),
        }
    }
}

fn required<S>(source: &S, name: &'static str) -> Result<String, ConfigError>
where
    S: Fn(&str) -> Option<String>,
{
    source(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn validate_database_url(raw: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name: "DATABASE_URL",
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "postgres" | "postgresql" => Ok(()),
        other => Err(ConfigError::Invalid {
            name: "DATABASE_URL",
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
