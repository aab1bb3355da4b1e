//! Rivers daemon library
//!
//! This module provides the core components for the Rivers daemon:
//! - REST API handlers for checkout, session and chat
//! - Layered configuration
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use api::create_router;
pub use api::rest::state::{AppState, Clock};
pub use config::{Credentials, DaemonConfig, DeploymentEnvironment};
pub use error::{ApiError, DaemonError, DaemonResult};
pub use server::Server;
