//! Configuration module for the podbridge service

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub fulfillment: FulfillmentSettings,
    pub hosting: HostingSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Fulfillment provider configuration
///
/// The access token stays server-side; it is injected into upstream calls by
/// the proxy layer and never surfaces in any response.
#[derive(Debug, Clone, Deserialize)]
pub struct FulfillmentSettings {
    pub access_token: Option<String>,
    pub base_url: String,
    pub rate_limit_per_minute: u32,
}

/// Image hosting backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HostingSettings {
    pub upload_url: String,
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with PODBRIDGE_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    /// 4. Built-in defaults
    ///
    /// `PRINTFUL_ACCESS_TOKEN` is honored as a fallback for the fulfillment
    /// credential.
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("fulfillment.base_url", "https://api.printful.com")?
            .set_default("fulfillment.rate_limit_per_minute", 120_i64)?
            .set_default("hosting.upload_url", "https://images.podbridge.dev/upload")?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("PODBRIDGE")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if settings.fulfillment.access_token.is_none() {
            settings.fulfillment.access_token = std::env::var("PRINTFUL_ACCESS_TOKEN").ok();
        }

        Ok(settings)
    }
}
