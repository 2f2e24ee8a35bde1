use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
const DEFAULT_RATE_LIMIT_NAMESPACE: &str = "mes:rl";
const DEFAULT_API_KEY_PREFIX: &str = "mes_";
const DEFAULT_SESSION_COOKIE: &str = "mes_session";
const DEFAULT_SESSION_ISSUER: &str = "mes-auth";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// HMAC secret used to verify session tokens issued by the auth provider
    #[validate(length(min = 32))]
    pub session_secret: String,

    /// Expected `iss` claim on session tokens
    #[serde(default = "default_session_issuer")]
    pub session_issuer: String,

    /// Cookie consulted when no bearer token is present
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,

    /// Prefix for generated external API keys
    #[serde(default = "default_api_key_prefix")]
    #[validate(length(min = 1, max = 16))]
    pub api_key_prefix: String,

    /// Rate limiting: requests per window for each external API key
    #[serde(default = "default_rate_limit_requests")]
    #[validate(range(min = 1))]
    pub rate_limit_requests_per_window: u32,

    /// Rate limiting: window size (seconds)
    #[serde(default = "default_rate_limit_window_secs")]
    #[validate(range(min = 1))]
    pub rate_limit_window_seconds: u64,

    /// Enable Redis-backed rate limiter
    #[serde(default)]
    pub rate_limit_use_redis: bool,

    /// Redis connection URL (rate limiter only)
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Namespace for rate limiter keys when Redis is enabled
    #[serde(default = "default_rate_limit_namespace")]
    pub rate_limit_namespace: String,

    /// Directory holding downloadable files, named `<id>.<ext>`
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// CORS: comma-separated list of allowed origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,
}

impl AppConfig {
    /// Configuration with defaults for everything but the essentials
    pub fn new(database_url: String, session_secret: String, environment: String) -> Self {
        Self {
            database_url,
            host: "0.0.0.0".to_string(),
            port: default_port(),
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            session_secret,
            session_issuer: default_session_issuer(),
            session_cookie_name: default_session_cookie_name(),
            api_key_prefix: default_api_key_prefix(),
            rate_limit_requests_per_window: default_rate_limit_requests(),
            rate_limit_window_seconds: default_rate_limit_window_secs(),
            rate_limit_use_redis: false,
            redis_url: None,
            rate_limit_namespace: default_rate_limit_namespace(),
            upload_dir: default_upload_dir(),
            cors_allowed_origins: None,
            request_timeout_secs: default_request_timeout_secs(),
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    fn validate_additional_constraints(&self) -> Result<(), AppConfigError> {
        if self.rate_limit_use_redis && self.redis_url.is_none() {
            return Err(AppConfigError::Invalid(
                "rate_limit_use_redis requires redis_url".to_string(),
            ));
        }
        if self.is_production() && self.cors_allowed_origins.is_none() {
            return Err(AppConfigError::Invalid(
                "cors_allowed_origins must be set in production".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_session_issuer() -> String {
    DEFAULT_SESSION_ISSUER.to_string()
}

fn default_session_cookie_name() -> String {
    DEFAULT_SESSION_COOKIE.to_string()
}

fn default_api_key_prefix() -> String {
    DEFAULT_API_KEY_PREFIX.to_string()
}

fn default_rate_limit_requests() -> u32 {
    DEFAULT_RATE_LIMIT_REQUESTS
}

fn default_rate_limit_window_secs() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_SECS
}

fn default_rate_limit_namespace() -> String {
    DEFAULT_RATE_LIMIT_NAMESPACE.to_string()
}

fn default_upload_dir() -> String {
    DEFAULT_UPLOAD_DIR.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("mes_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let builder = fmt().with_env_filter(EnvFilter::new(filter_directive));
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. `config/default.toml`
/// 3. `config/{RUN_ENV}.toml`
/// 4. Environment variables (`APP__*`)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    // session_secret has no default; it must come from a file or APP__SESSION_SECRET
    let config = Config::builder()
        .set_default("database_url", "sqlite://mes.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT)?
        .set_default("environment", run_env.clone())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    if config.get_string("session_secret").is_err() {
        error!("Session secret is not configured. Set APP__SESSION_SECRET (minimum 32 characters).");
        return Err(AppConfigError::Load(ConfigError::NotFound(
            "session_secret".into(),
        )));
    }

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;
    app_config.validate_additional_constraints()?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
