use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub analytics_api: AnalyticsApiConfig,
    /// JWT verification for dashboard users
    pub jwt: JwtAuthConfig,
    #[serde(default)]
    pub courses: CoursesConfig,
    #[serde(default)]
    pub permissions: PermissionsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Connection settings for the analytics data API.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsApiConfig {
    /// Base URL, e.g. https://analytics-api.example.com
    pub base_url: String,

    /// Token sent as `Authorization: Token <auth_token>`
    #[serde(default)]
    pub auth_token: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_analytics_timeout_ms")]
    pub timeout_ms: u64,

    /// How many days of history the trend pages request (0 = everything)
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// Shared secret used by the sign-on service to sign user tokens
    pub secret: String,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

/// Which course keys the dashboard serves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoursesConfig {
    /// When non-empty, only these course keys are considered valid.
    #[serde(default)]
    pub allowed: Vec<String>,
}

/// Initial course grants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionsConfig {
    #[serde(default)]
    pub grants: Vec<GrantConfig>,
}

/// Courses one user may view.
///
/// The username is a value rather than a table key because the config
/// loader lowercases keys, and usernames are case-sensitive.
#[derive(Debug, Clone, Deserialize)]
pub struct GrantConfig {
    pub username: String,
    #[serde(default)]
    pub courses: Vec<String>,
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
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_analytics_timeout_ms() -> u64 {
    5000
}
fn default_lookback_days() -> u32 {
    90
}
fn default_jwt_leeway() -> u64 {
    30
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
    /// 3. Environment variables with INSIGHTS__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("INSIGHTS").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config from embedded defaults so tests do not depend on
    /// the working directory. Validation is skipped.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        Self::load_for_test_with("", overrides)
    }

    /// Like [`Config::load_for_test`], with extra TOML layered over the
    /// embedded defaults.
    pub fn load_for_test_with(
        extra_toml: &str,
        overrides: &[(&str, &str)],
    ) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30

            [logging]
            level = "info"
            format = "pretty"

            [analytics_api]
            base_url = ""
            auth_token = ""
            timeout_ms = 5000
            lookback_days = 90

            [jwt]
            secret = "test-jwt-secret"
            leeway_secs = 0
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml))
            .add_source(config::File::from_str(extra_toml, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.analytics_api.base_url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "INSIGHTS__ANALYTICS_API__BASE_URL environment variable must be set".to_string(),
            ));
        }

        if reqwest::Url::parse(&self.analytics_api.base_url).is_err() {
            return Err(ConfigValidationError::InvalidValue(format!(
                "analytics_api.base_url is not a valid URL: {}",
                self.analytics_api.base_url
            )));
        }

        if self.jwt.secret.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "INSIGHTS__JWT__SECRET environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        for course_id in &self.courses.allowed {
            check_course_key("courses.allowed", course_id)?;
        }

        for grant in &self.permissions.grants {
            if grant.username.is_empty() {
                return Err(ConfigValidationError::InvalidValue(
                    "permissions.grants entry has an empty username".to_string(),
                ));
            }
            for course_id in &grant.courses {
                check_course_key("permissions.grants", course_id)?;
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

fn check_course_key(setting: &str, course_id: &str) -> Result<(), ConfigValidationError> {
    shared::validation::validate_course_id(course_id).map_err(|e| {
        ConfigValidationError::InvalidValue(format!(
            "{} contains an invalid course key {}: {}",
            setting,
            course_id,
            e.message.unwrap_or_default()
        ))
    })
}
