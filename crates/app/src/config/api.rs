//! Backend Config

use std::time::Duration;

use clap::Args;

use crate::api::BackendConfig;

/// Backend connection settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Storefront API base URL
    #[arg(
        long = "api-url",
        env = "SABZI_API_URL",
        default_value = "http://localhost:8000/api/"
    )]
    pub api_url: String,

    /// Bearer token for authenticated endpoints
    #[arg(long, env = "SABZI_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Validate coupons with the backend instead of the built-in rule table
    #[arg(long, env = "SABZI_SERVER_COUPONS", default_value_t = false)]
    pub server_coupons: bool,

    /// Canonical catalog timeout in seconds
    #[arg(long, env = "SABZI_CATALOG_TIMEOUT_SECONDS", default_value_t = 10u64)]
    pub catalog_timeout_seconds: u64,

    /// Legacy catalog timeout in seconds
    #[arg(
        long,
        env = "SABZI_LEGACY_CATALOG_TIMEOUT_SECONDS",
        default_value_t = 20u64
    )]
    pub legacy_catalog_timeout_seconds: u64,
}

impl ApiConfig {
    /// Client settings for [`crate::api::HttpBackend`].
    pub fn backend(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.api_url.clone(),
            token: self.token.clone().filter(|token| !token.trim().is_empty()),
            catalog_timeout: Duration::from_secs(self.catalog_timeout_seconds),
            legacy_catalog_timeout: Duration::from_secs(self.legacy_catalog_timeout_seconds),
        }
    }

    /// Origin that root-relative image paths are served from.
    pub fn asset_origin(&self) -> String {
        sabzi::pricing::asset_origin(&self.api_url)
    }
}
