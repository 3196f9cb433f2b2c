use std::time::Duration;

use log::*;
use prepaid_common::{helpers::parse_seconds, Secret};

pub const DEFAULT_API_BASE: &str = "https://api-m.sandbox.paypal.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PayPalConfig {
    pub client_id: String,
    pub secret: Secret<String>,
    /// Sandbox by default. Use `https://api-m.paypal.com` in production.
    pub api_base: String,
    /// HTTP timeout for each individual request.
    pub timeout: Duration,
}

impl Default for PayPalConfig {
    fn default() -> Self {
        Self {
            client_id: String::default(),
            secret: Secret::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PayPalConfig {
    pub fn new_from_env_or_default() -> Self {
        let client_id = std::env::var("PPG_PAYPAL_CLIENT_ID").unwrap_or_else(|_| {
            warn!("🪛️ PPG_PAYPAL_CLIENT_ID not set, using (probably useless) default");
            "client_id".to_string()
        });
        let secret = Secret::new(std::env::var("PPG_PAYPAL_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ PPG_PAYPAL_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let api_base = std::env::var("PPG_PAYPAL_API_BASE").unwrap_or_else(|_| {
            info!("🪛️ PPG_PAYPAL_API_BASE not set, using the sandbox at {DEFAULT_API_BASE}");
            DEFAULT_API_BASE.to_string()
        });
        let timeout =
            parse_seconds("PPG_PAYPAL_TIMEOUT_SECS", std::env::var("PPG_PAYPAL_TIMEOUT_SECS").ok(), DEFAULT_TIMEOUT);
        Self { client_id, secret, api_base: api_base.trim_end_matches('/').to_string(), timeout }
    }
}
