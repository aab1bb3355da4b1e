//! Configuration for riversd

use rivers_checkout::DEFAULT_STRIPE_API_BASE;
use rivers_conversation::{DEFAULT_COMPLETION_BASE_URL, DEFAULT_COMPLETION_MODEL};
use rivers_moderation::DEFAULT_MODERATION_BASE_URL;
use rivers_session::{DEFAULT_COOKIE_NAME, DEVELOPMENT_SECRET};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Main daemon configuration
///
/// Holds no secrets. API keys and the signing secret travel separately in
/// [`Credentials`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Deployment environment
    #[serde(default)]
    pub environment: DeploymentEnvironment,

    /// Public origin used to build checkout return URLs
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub moderation: ModerationConfig,

    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Outbound HTTP settings shared by every backend client
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            environment: DeploymentEnvironment::Development,
            public_base_url: default_public_base_url(),
            session: SessionConfig::default(),
            completion: CompletionConfig::default(),
            moderation: ModerationConfig::default(),
            checkout: CheckoutConfig::default(),
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentEnvironment {
    #[default]
    Development,
    Production,
}

impl DeploymentEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, DeploymentEnvironment::Production)
    }
}

impl fmt::Display for DeploymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentEnvironment::Development => f.write_str("development"),
            DeploymentEnvironment::Production => f.write_str("production"),
        }
    }
}

impl FromStr for DeploymentEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(DeploymentEnvironment::Development),
            "production" | "prod" => Ok(DeploymentEnvironment::Production),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            enable_cors: true,
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
        }
    }
}

/// Completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    #[serde(default = "default_completion_model")]
    pub model: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_completion_base_url(),
            model: default_completion_model(),
        }
    }
}

/// Moderation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    #[serde(default = "default_moderation_base_url")]
    pub base_url: String,

    /// Moderation model; the provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_moderation_base_url(),
            model: None,
        }
    }
}

/// Payment provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default = "default_checkout_api_base")]
    pub api_base: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            api_base: default_checkout_api_base(),
        }
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,

    /// Honour `HTTP(S)_PROXY` from the environment
    #[serde(default)]
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_upstream_timeout(),
            use_system_proxy: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_completion_base_url() -> String {
    DEFAULT_COMPLETION_BASE_URL.to_string()
}

fn default_completion_model() -> String {
    DEFAULT_COMPLETION_MODEL.to_string()
}

fn default_moderation_base_url() -> String {
    DEFAULT_MODERATION_BASE_URL.to_string()
}

fn default_checkout_api_base() -> String {
    DEFAULT_STRIPE_API_BASE.to_string()
}

fn default_upstream_timeout() -> u64 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `RIVERS__SECTION__KEY` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("RIVERS")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Whether the session cookie carries the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.environment.is_production()
    }
}

/// Secrets supplied through the process environment.
///
/// Empty values count as absent.
#[derive(Default)]
pub struct Credentials {
    pub session_secret: Option<SecretString>,
    pub completion_api_key: Option<SecretString>,
    pub moderation_api_key: Option<SecretString>,
    pub payment_secret_key: Option<SecretString>,
}

impl Credentials {
    /// Wrap a raw environment value, dropping empty ones.
    pub fn secret(value: Option<String>) -> Option<SecretString> {
        value
            .filter(|value| !value.trim().is_empty())
            .map(SecretString::from)
    }
}

/// Why the signing secret could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSigningSecret;

impl fmt::Display for MissingSigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SESSION_SECRET must be set in production")
    }
}

/// Outcome of resolving the token signing secret.
pub enum SigningSecret {
    Configured(SecretString),
    /// The built-in development secret. Tokens signed with it can be forged.
    DevelopmentDefault(SecretString),
}

impl SigningSecret {
    pub fn resolve(
        environment: DeploymentEnvironment,
        configured: Option<SecretString>,
    ) -> Result<Self, MissingSigningSecret> {
        match configured {
            Some(secret) if !secret.expose_secret().is_empty() => {
                Ok(SigningSecret::Configured(secret))
            }
            _ if environment.is_production() => Err(MissingSigningSecret),
            _ => Ok(SigningSecret::DevelopmentDefault(SecretString::from(
                DEVELOPMENT_SECRET,
            ))),
        }
    }

    pub fn is_development_default(&self) -> bool {
        matches!(self, SigningSecret::DevelopmentDefault(_))
    }

    pub fn into_secret(self) -> SecretString {
        match self {
            SigningSecret::Configured(secret) | SigningSecret::DevelopmentDefault(secret) => secret,
        }
    }
}
