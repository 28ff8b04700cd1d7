use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payment: PaymentConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

/// Gateway credentials. The key secret signs payment notifications and
/// is never sent to clients.
#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub gateway_key_secret: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Slot hold duration; also the checkout countdown, by construction.
    pub hold_seconds: i64,
    /// Slot-cache entries older than this many days are evicted.
    #[serde(default = "default_retention")]
    pub slot_retention_days: i64,
}

fn default_retention() -> i64 {
    7
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables with a TURFBOOK prefix,
            // e.g. TURFBOOK_PAYMENT__GATEWAY_KEY_SECRET
            .add_source(config::Environment::with_prefix("TURFBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
