use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

/// Session secret used when neither the config nor `SESSION_SECRET` provide one.
pub const DEFAULT_SESSION_SECRET: &str = "123abc";

/// Environment variable consulted for the session secret.
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub datastore: DatastoreConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Externally reachable base URL, used to build OAuth callback URLs.
    #[serde(default)]
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatastoreConfig {
    #[serde(default = "default_dialect")]
    pub dialect: String,

    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Identity provider to register ("google"), empty for none.
    #[serde(default)]
    pub provider: String,

    /// OAuth client id
    #[serde(default)]
    pub key: String,

    /// OAuth client secret
    #[serde(default)]
    pub secret: String,

    /// Callback path appended to the public URL
    #[serde(default = "default_callback_url")]
    pub callback_url: String,

    #[serde(default)]
    pub session_secret: String,

    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,

    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,

    #[serde(default)]
    pub secure_cookies: bool,

    #[serde(default = "default_post_login_redirect")]
    pub post_login_redirect: String,

    /// Where `session_secret` came from. Filled in by [`Config::load`].
    #[serde(skip)]
    pub session_secret_source: SessionSecretSource,
}

/// Origin of the resolved session secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionSecretSource {
    Config,
    Environment,
    #[default]
    Default,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_dialect() -> String {
    "postgres".to_string()
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
fn default_callback_url() -> String {
    "/auth/google/callback".to_string()
}
fn default_session_cookie_name() -> String {
    "session".to_string()
}
fn default_session_ttl() -> i64 {
    86400 // 24 hours
}
fn default_post_login_redirect() -> String {
    "/profile".to_string()
}

/// Configuration validation error
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
    /// 3. Environment variables with IT__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("IT").separator("__"))
            .build()?;

        let mut cfg: Self = config.try_deserialize()?;
        cfg.auth
            .resolve_session_secret(std::env::var(SESSION_SECRET_ENV).ok());
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config from embedded defaults so tests do not depend on
    /// the working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [datastore]
            dialect = "postgres"
            url = ""
            max_connections = 10
            min_connections = 1

            [logging]
            level = "info"
            format = "json"

            [auth]
            provider = ""
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.datastore.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "IT__DATASTORE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.datastore.min_connections > self.datastore.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.auth.session_ttl_secs <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "session_ttl_secs must be positive".to_string(),
            ));
        }

        if !self.auth.provider.is_empty()
            && (self.auth.key.is_empty() || self.auth.secret.is_empty())
        {
            return Err(ConfigValidationError::MissingRequired(format!(
                "auth.key and auth.secret are required for provider '{}'",
                self.auth.provider
            )));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// Base URL the server is reachable at, without a trailing slash.
    pub fn public_url(&self) -> String {
        if self.server.public_url.is_empty() {
            format!("http://localhost:{}", self.server.port)
        } else {
            self.server.public_url.trim_end_matches('/').to_string()
        }
    }

    /// Absolute OAuth callback URL handed to the identity provider.
    pub fn oauth_callback_url(&self) -> String {
        format!("{}{}", self.public_url(), self.auth.callback_url)
    }
}

impl DatastoreConfig {
    pub fn to_pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            dialect: self.dialect.clone(),
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

impl AuthConfig {
    /// Picks the session secret: configured value, then the environment
    /// value, then [`DEFAULT_SESSION_SECRET`].
    pub fn resolve_session_secret(&mut self, env_value: Option<String>) -> SessionSecretSource {
        let source = if !self.session_secret.is_empty() {
            SessionSecretSource::Config
        } else if let Some(value) = env_value.filter(|v| !v.is_empty()) {
            self.session_secret = value;
            SessionSecretSource::Environment
        } else {
            self.session_secret = DEFAULT_SESSION_SECRET.to_string();
            SessionSecretSource::Default
        };
        self.session_secret_source = source;
        source
    }
}
