//! Rivers Daemon - paid, moderated chat gateway
//!
//! The daemon provides:
//! - Hosted checkout and payment-to-session exchange
//! - Session cookie validation
//! - Moderated chat turns forwarded to a completion backend

use clap::Parser;
use rivers_daemon::config::{Credentials, DaemonConfig, DeploymentEnvironment};
use rivers_daemon::error::{DaemonError, DaemonResult};
use rivers_daemon::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Rivers Daemon CLI
#[derive(Parser)]
#[command(name = "riversd")]
#[command(about = "Rivers Daemon - paid, moderated chat gateway", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RIVERS_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "RIVERS_LISTEN_ADDR")]
    listen: Option<String>,

    /// Deployment environment (development or production)
    #[arg(short, long, env = "RIVERS_ENV")]
    environment: Option<String>,

    /// Public origin used in checkout return URLs
    #[arg(long, env = "NEXT_PUBLIC_BASE_URL")]
    public_base_url: Option<String>,

    /// Token signing secret
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    session_secret: Option<String>,

    /// Completion backend API key
    #[arg(long, env = "XAI_API_KEY", hide_env_values = true)]
    completion_api_key: Option<String>,

    /// Completion backend base URL
    #[arg(long, env = "XAI_BASE_URL")]
    completion_base_url: Option<String>,

    /// Completion model
    #[arg(long, env = "RIVERS_COMPLETION_MODEL")]
    completion_model: Option<String>,

    /// Moderation backend API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    moderation_api_key: Option<String>,

    /// Moderation backend base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    moderation_base_url: Option<String>,

    /// Payment provider secret key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    payment_secret_key: Option<String>,

    /// Payment provider API base
    #[arg(long, env = "STRIPE_API_BASE")]
    payment_api_base: Option<String>,

    /// Timeout for every outbound backend call, in seconds
    #[arg(long, env = "RIVERS_UPSTREAM_TIMEOUT_SECS")]
    upstream_timeout_secs: Option<u64>,

    /// Log level
    #[arg(long, env = "RIVERS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "RIVERS_LOG_JSON")]
    json: bool,
}

impl Cli {
    /// Apply flags and conventional environment variables over the
    /// loaded configuration.
    fn apply(&self, config: &mut DaemonConfig) -> DaemonResult<()> {
        if let Some(listen) = &self.listen {
            config.server.listen_addr = listen
                .parse()
                .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
        }
        if let Some(environment) = &self.environment {
            config.environment = environment
                .parse::<DeploymentEnvironment>()
                .map_err(DaemonError::Config)?;
        }
        if let Some(url) = &self.public_base_url {
            config.public_base_url = url.clone();
        }
        if let Some(url) = &self.completion_base_url {
            config.completion.base_url = url.clone();
        }
        if let Some(model) = &self.completion_model {
            config.completion.model = model.clone();
        }
        if let Some(url) = &self.moderation_base_url {
            config.moderation.base_url = url.clone();
        }
        if let Some(url) = &self.payment_api_base {
            config.checkout.api_base = url.clone();
        }
        if let Some(secs) = self.upstream_timeout_secs {
            config.upstream.timeout_secs = secs;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json {
            config.logging.json = true;
        }
        Ok(())
    }

    fn take_credentials(&mut self) -> Credentials {
        Credentials {
            session_secret: Credentials::secret(self.session_secret.take()),
            completion_api_key: Credentials::secret(self.completion_api_key.take()),
            moderation_api_key: Credentials::secret(self.moderation_api_key.take()),
            payment_secret_key: Credentials::secret(self.payment_secret_key.take()),
        }
    }
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let mut cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;
    cli.apply(&mut config)?;
    let credentials = cli.take_credentials();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Print startup banner
    println!(
        r#"
  ____  _
 |  _ \(_)_   _____ _ __ ___
 | |_) | \ \ / / _ \ '__/ __|
 |  _ <| |\ V /  __/ |  \__ \
 |_| \_\_| \_/ \___|_|  |___/

  Rivers - paid, moderated chat gateway
  Version: {}
  Environment: {}
  Listening: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.environment,
        config.server.listen_addr
    );

    // Create and run server
    let server = Server::new(config, credentials)?;
    server.run().await
}
