//! Client configuration

use clap::Args;

use crate::config::{api::ApiConfig, observability::LoggingConfig, state::StateConfig};

pub mod api;
pub mod observability;
pub mod state;

/// Settings shared by every command.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Backend connection settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Local state settings.
    #[command(flatten)]
    pub state: StateConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
