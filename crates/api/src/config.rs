use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    pub jwt: JwtAuthConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub captcha: CaptchaConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Limit for JSON bodies. Uploads use `storage.max_upload_bytes`.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

/// Which repository implementation backs the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_store")]
    pub store: StoreBackend,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(c: &DatabaseConfig) -> Self {
        Self {
            url: c.url.clone(),
            max_connections: c.max_connections,
            min_connections: c.min_connections,
            connect_timeout_secs: c.connect_timeout_secs,
            idle_timeout_secs: c.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty allows any.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Per-client budget for login, captcha, contact and send-email. 0 disables.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    #[serde(default)]
    pub hsts_enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            rate_limit_per_minute: default_rate_limit(),
            hsts_enabled: false,
        }
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// HS256 signing secret, at least 32 bytes.
    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_session_expiry")]
    pub session_expiry_secs: i64,

    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    /// Log messages instead of sending them.
    Console,
    /// POST to an HTTP mail relay.
    Relay,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_email_provider")]
    pub provider: EmailProvider,

    #[serde(default)]
    pub relay_url: String,

    #[serde(default)]
    pub relay_api_key: String,

    /// Recipient when the `email.receivers` setting is absent.
    #[serde(default)]
    pub default_receiver: String,

    /// Public site URL used in invitation links.
    #[serde(default = "default_site_base_url")]
    pub site_base_url: String,

    #[serde(default = "default_sender_name")]
    pub sender_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_email_provider(),
            relay_url: String::new(),
            relay_api_key: String::new(),
            default_receiver: String::new(),
            site_base_url: default_site_base_url(),
            sender_name: default_sender_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Disabled,
    /// Authenticated `PUT` to an object storage endpoint.
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_provider")]
    pub provider: StorageProvider,

    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub token: String,

    /// Prefix of public URLs; defaults to the endpoint.
    #[serde(default)]
    pub public_base_url: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            endpoint: String::new(),
            token: String::new(),
            public_base_url: String::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    #[serde(default = "default_captcha_ttl")]
    pub ttl_secs: i64,

    #[serde(default = "default_captcha_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// `memory` keeps challenges in process even when the database is PostgreSQL.
    #[serde(default = "default_captcha_store")]
    pub store: StoreBackend,

    /// Adds the plaintext answer to `GET /api/captcha`. Test environments only.
    #[serde(default)]
    pub expose_code: bool,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_captcha_ttl(),
            sweep_interval_secs: default_captcha_sweep_interval(),
            store: default_captcha_store(),
            expose_code: false,
        }
    }
}

/// Account created at startup when no user with this email exists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_admin_name")]
    pub name: String,
}

impl AdminConfig {
    pub fn is_configured(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_store() -> StoreBackend {
    StoreBackend::Postgres
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_rate_limit() -> u32 {
    30
}
fn default_session_expiry() -> i64 {
    86_400
}
fn default_jwt_leeway() -> u64 {
    shared::jwt::DEFAULT_LEEWAY_SECS
}
fn default_email_provider() -> EmailProvider {
    EmailProvider::Console
}
fn default_site_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_sender_name() -> String {
    "Banglong".to_string()
}
fn default_storage_provider() -> StorageProvider {
    StorageProvider::Disabled
}
fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}
fn default_captcha_ttl() -> i64 {
    domain::services::captcha::DEFAULT_TTL_SECS
}
fn default_captcha_sweep_interval() -> u64 {
    300
}
fn default_captcha_store() -> StoreBackend {
    StoreBackend::Postgres
}
fn default_admin_name() -> String {
    "Administrator".to_string()
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with BL__ prefix, e.g. `BL__DATABASE__URL`
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("BL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Builds a configuration from embedded defaults plus overrides, without
    /// touching the file system. Validation is left to the caller.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            max_body_size = 1048576

            [database]
            url = ""
            store = "postgres"
            max_connections = 10
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            rate_limit_per_minute = 30

            [jwt]
            secret = "test-secret-that-is-at-least-32-bytes-long"
            session_expiry_secs = 86400
            leeway_secs = 30

            [email]
            enabled = false
            provider = "console"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.store == StoreBackend::Postgres && self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "BL__DATABASE__URL must be set when database.store is postgres".to_string(),
            ));
        }

        if self.captcha.store == StoreBackend::Postgres
            && self.database.store == StoreBackend::Memory
        {
            return Err(ConfigValidationError::InvalidValue(
                "captcha.store cannot be postgres when database.store is memory".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.jwt.secret.len() < shared::jwt::MIN_SECRET_LEN {
            return Err(ConfigValidationError::MissingRequired(format!(
                "BL__JWT__SECRET must be at least {} bytes",
                shared::jwt::MIN_SECRET_LEN
            )));
        }

        if self.jwt.session_expiry_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "jwt.session_expiry_secs must be positive".to_string(),
            ));
        }

        if self.email.enabled
            && self.email.provider == EmailProvider::Relay
            && self.email.relay_url.is_empty()
        {
            return Err(ConfigValidationError::MissingRequired(
                "email.relay_url is required for the relay provider".to_string(),
            ));
        }

        if self.storage.provider == StorageProvider::Http && self.storage.endpoint.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "storage.endpoint is required for the http provider".to_string(),
            ));
        }

        if self.storage.max_upload_bytes == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "storage.max_upload_bytes cannot be 0".to_string(),
            ));
        }

        if self.captcha.ttl_secs <= 0 || self.captcha.sweep_interval_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "captcha.ttl_secs and captcha.sweep_interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
