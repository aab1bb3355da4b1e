//! Server setup and lifecycle management

use crate::api::rest::router::{create_router, create_router_with_cors};
use crate::api::rest::state::AppState;
use crate::config::{Credentials, DaemonConfig, SigningSecret};
use crate::error::{DaemonError, DaemonResult};
use axum::Router;
use reqwest::Client;
use rivers_checkout::{CheckoutBridge, CheckoutOffer, StripeCheckoutProvider};
use rivers_conversation::{ConversationPipeline, OpenAiCompatibleCompletion};
use rivers_moderation::{ModerationFilter, OpenAiModeration};
use rivers_session::{CredentialCodec, SessionCookieConfig, SessionGate};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Rivers daemon server
pub struct Server {
    config: DaemonConfig,
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: DaemonConfig, credentials: Credentials) -> DaemonResult<Self> {
        let state = build_state(&config, credentials)?;
        Ok(Self { config, state })
    }

    pub fn router(&self) -> Router {
        if self.config.server.enable_cors {
            create_router_with_cors(self.state.clone())
        } else {
            create_router(self.state.clone())
        }
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;
        let app = self.router();

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Rivers daemon listening on {}", addr);
        tracing::info!("Environment: {}", self.config.environment);

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Rivers daemon shutting down");

        Ok(())
    }
}

/// Wire the backend clients and services described by `config`.
pub fn build_state(config: &DaemonConfig, credentials: Credentials) -> DaemonResult<AppState> {
    let secret = SigningSecret::resolve(config.environment, credentials.session_secret)
        .map_err(|e| DaemonError::Config(e.to_string()))?;
    if secret.is_development_default() {
        tracing::warn!(
            "SESSION_SECRET is not set; signing tokens with the built-in development secret. \
             Anyone can forge sessions, never deploy like this"
        );
    }
    let codec = Arc::new(CredentialCodec::new(&secret.into_secret()));

    let http = build_http_client(config)?;

    let gate = SessionGate::new(
        codec.clone(),
        SessionCookieConfig {
            name: config.session.cookie_name.clone(),
            secure: config.secure_cookies(),
        },
    );

    let provider = StripeCheckoutProvider::new(
        http.clone(),
        &config.checkout.api_base,
        required_key("STRIPE_SECRET_KEY", credentials.payment_secret_key),
    );
    let checkout = CheckoutBridge::new(
        Arc::new(provider),
        codec,
        CheckoutOffer::default(),
        config.public_base_url.clone(),
    );

    let mut moderation = OpenAiModeration::new(
        http.clone(),
        &config.moderation.base_url,
        required_key("OPENAI_API_KEY", credentials.moderation_api_key),
    );
    if let Some(model) = &config.moderation.model {
        moderation = moderation.with_model(model.clone());
    }

    let completion = OpenAiCompatibleCompletion::new(
        http,
        &config.completion.base_url,
        required_key("XAI_API_KEY", credentials.completion_api_key),
    );

    let pipeline = ConversationPipeline::new(
        ModerationFilter::new(Arc::new(moderation)),
        Arc::new(completion),
    )
    .with_model(config.completion.model.clone());

    Ok(AppState::new(
        Arc::new(gate),
        Arc::new(checkout),
        Arc::new(pipeline),
    ))
}

/// A missing key leaves the backend unconfigured: every call to it fails
/// with an invalid-config error instead of stopping the daemon.
fn required_key(name: &str, key: Option<SecretString>) -> SecretString {
    key.unwrap_or_else(|| {
        tracing::warn!("{} is not set; calls to that backend will fail", name);
        SecretString::from("")
    })
}

/// Shared outbound client; every backend call inherits its timeout.
fn build_http_client(config: &DaemonConfig) -> DaemonResult<Client> {
    let mut builder = Client::builder().timeout(Duration::from_secs(config.upstream.timeout_secs));

    if !config.upstream.use_system_proxy {
        builder = builder.no_proxy();
    }

    builder
        .build()
        .map_err(|e| DaemonError::HttpClient(format!("failed to build HTTP client: {}", e)))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentEnvironment;

    #[test]
    fn test_production_requires_signing_secret() {
        let config = DaemonConfig {
            environment: DeploymentEnvironment::Production,
            ..Default::default()
        };

        let err = build_state(&config, Credentials::default()).err().unwrap();
        assert!(matches!(err, DaemonError::Config(_)));
    }

    #[test]
    fn test_development_starts_without_credentials() {
        let state = build_state(&DaemonConfig::default(), Credentials::default()).unwrap();
        assert_eq!(state.gate.cookie_name(), "emily_session");
        assert_eq!(state.checkout.chat_url(), "http://localhost:3000/chat");
    }
}
