//! Application configuration
//!
//! Loaded from environment variables (a `.env` file is honored when
//! present). Only the connection strings, the JWT secret, the gateway
//! credentials, and the port are required; every tuning knob has a default.

use std::env;
use std::str::FromStr;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn var_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub payment: PaymentConfig,
    pub quote: QuoteConfig,
    pub typing: TypingConfig,
    pub cors: CorsConfig,
    pub node: NodeConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| "oficio".to_string()),
                env: var_or("APP_ENV", Environment::Development),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: required("API_PORT")?
                    .parse()
                    .map_err(|_| ConfigError::MissingVar("API_PORT"))?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", 20),
                min_connections: var_or("DATABASE_MIN_CONNECTIONS", 5),
            },
            redis: RedisConfig {
                url: required("REDIS_URL")?,
                max_connections: var_or("REDIS_MAX_CONNECTIONS", 10),
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
            },
            payment: PaymentConfig {
                gateway_url: required("PIX_GATEWAY_URL")?,
                api_key: required("PIX_API_KEY")?,
                poll_interval_secs: var_or("PIX_POLL_INTERVAL_SECS", 5),
                reconcile_grace_secs: var_or("PIX_RECONCILE_GRACE_SECS", 120),
            },
            quote: QuoteConfig {
                pending_ttl_days: var_or("QUOTE_PENDING_TTL_DAYS", 7),
            },
            typing: TypingConfig {
                ttl_secs: var_or("TYPING_TTL_SECS", 8),
                refresh_floor_secs: var_or("TYPING_REFRESH_FLOOR_SECS", 3),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
            node: NodeConfig {
                node_id: var_or("NODE_ID", 0),
            },
        })
    }
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT verification configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

/// Payment gateway configuration
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub gateway_url: String,
    pub api_key: String,
    /// Seconds between status polls while a payment view is open
    pub poll_interval_secs: u64,
    /// Minimum age before a PENDING session is picked up by reconciliation
    pub reconcile_grace_secs: i64,
}

/// Quote lifecycle configuration
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    /// Days a quote may stay pending before the expiry sweep claims it
    pub pending_ttl_days: i64,
}

/// Typing indicator configuration
#[derive(Debug, Clone)]
pub struct TypingConfig {
    /// Seconds a typing key lives without a refresh
    pub ttl_secs: u64,
    /// Floor between accepted refreshes from the same user
    pub refresh_floor_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Snowflake node configuration
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub node_id: u8,
}
