use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::VoucherLayout;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
const ENV_PREFIX: &str = "POSTVOUCHER";

/// Reference-data cache configuration.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Validity of cached reference data in seconds. Zero disables caching
    /// (every access refreshes).
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    /// Enable cache debug logging.
    #[serde(default)]
    pub debug: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            debug: false,
        }
    }
}

/// Application configuration, layered from `config/default`, an optional
/// environment-specific file, and `POSTVOUCHER__`-prefixed environment
/// variables.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base URL of the gateway fronting the provider's purchasing, catalog,
    /// and account services.
    #[validate(url)]
    pub gateway_url: String,

    /// Application environment; anything other than "production" defaults
    /// checkouts to dry runs.
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging).
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Layout applied to items that do not specify one at add time.
    #[serde(default)]
    pub default_voucher_layout: Option<VoucherLayout>,

    /// Forces the dry-run preference regardless of environment; callers can
    /// still override per checkout.
    #[serde(default)]
    pub dry_run: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:8080".to_string(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            cache: CacheConfig::default(),
            default_voucher_layout: None,
            dry_run: None,
        }
    }
}

impl AppConfig {
    /// Loads and validates the configuration.
    pub fn load() -> Result<Self, ServiceError> {
        let environment =
            std::env::var(format!("{}__ENVIRONMENT", ENV_PREFIX)).unwrap_or_else(|_| {
                std::env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string())
            });

        let config: AppConfig = Config::builder()
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(
                File::with_name(&format!("{}/{}", CONFIG_DIR, environment)).required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
