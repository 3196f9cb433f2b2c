use std::{env, net::IpAddr, time::Duration};

use log::*;
use paypal_tools::PayPalConfig;
use prepaid_common::helpers::{parse_boolean_flag, parse_seconds};
use prepaid_engine::EngineOptions;

const DEFAULT_PPG_HOST: &str = "127.0.0.1";
const DEFAULT_PPG_PORT: u16 = 8470;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/prepaid_orders.db";
const DEFAULT_INSTANCE_ID: &str = "default";
const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The externally reachable base URL of this server. The buyer-side checkout posts its result to
    /// `{callback_base}/paypal/{instance_id}/onClose`.
    pub callback_base: String,
    /// Distinguishes gateway instances that share a host. Callbacks for any other instance id are rejected.
    pub instance_id: String,
    /// Deadline for each call the engine makes to PayPal.
    pub remote_timeout: Duration,
    /// Only these addresses may call the `/api` routes.
    pub api_whitelist: Vec<IpAddr>,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// If set, every payment status change is POSTed to this URL as JSON.
    pub status_relay_url: Option<String>,
    pub paypal: PayPalConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PPG_HOST.to_string(),
            port: DEFAULT_PPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            callback_base: format!("http://{DEFAULT_PPG_HOST}:{DEFAULT_PPG_PORT}"),
            instance_id: DEFAULT_INSTANCE_ID.to_string(),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            api_whitelist: default_whitelist(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            status_relay_url: None,
            paypal: PayPalConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PPG_HOST").ok().unwrap_or_else(|| DEFAULT_PPG_HOST.into());
        let port = env::var("PPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PPG_PORT. {e} Using the default, {DEFAULT_PPG_PORT}, instead."
                    );
                    DEFAULT_PPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PPG_PORT);
        let database_url = env::var("PPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ PPG_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let callback_base = env::var("PPG_CALLBACK_BASE").ok().unwrap_or_else(|| {
            let base = format!("http://{host}:{port}");
            warn!(
                "🪛️ PPG_CALLBACK_BASE is not set. Buyers' browsers will be told to post checkout results to {base}, \
                 which is probably not reachable from the internet."
            );
            base
        });
        let instance_id = env::var("PPG_INSTANCE_ID")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INSTANCE_ID.to_string());
        let remote_timeout =
            parse_seconds("PPG_REMOTE_TIMEOUT_SECS", env::var("PPG_REMOTE_TIMEOUT_SECS").ok(), DEFAULT_REMOTE_TIMEOUT);
        let api_whitelist = env::var("PPG_API_WHITELIST").ok().map(|s| parse_whitelist(&s)).unwrap_or_else(|| {
            info!("🪛️ PPG_API_WHITELIST is not set. Only loopback addresses may call /api.");
            default_whitelist()
        });
        if api_whitelist.is_empty() {
            warn!(
                "🚨️ The API IP whitelist was configured, but is empty. The server will run, but won't authorise any \
                 /api requests."
            );
        }
        let use_x_forwarded_for = parse_boolean_flag(env::var("PPG_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("PPG_USE_FORWARDED").ok(), false);
        let status_relay_url = env::var("PPG_STATUS_RELAY_URL").ok().filter(|s| !s.trim().is_empty());
        match &status_relay_url {
            Some(url) => info!("🪛️ Payment status changes will be relayed to {url}"),
            None => info!("🪛️ PPG_STATUS_RELAY_URL is not set. Payment status changes will only be logged."),
        }
        let paypal = PayPalConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            callback_base,
            instance_id,
            remote_timeout,
            api_whitelist,
            use_x_forwarded_for,
            use_forwarded,
            status_relay_url,
            paypal,
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            remote_timeout: self.remote_timeout,
            callback_base: self.callback_base.clone(),
            instance_id: self.instance_id.clone(),
        }
    }
}

fn default_whitelist() -> Vec<IpAddr> {
    vec![IpAddr::from([127, 0, 0, 1]), IpAddr::from([0u16, 0, 0, 0, 0, 0, 0, 1])]
}

/// Parses a comma-separated list of IP addresses. Invalid entries are skipped with a warning.
pub fn parse_whitelist(s: &str) -> Vec<IpAddr> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            s.parse::<IpAddr>()
                .map_err(|e| warn!("🪛️ Ignoring invalid IP address ({s}) in PPG_API_WHITELIST: {e}"))
                .ok()
        })
        .collect()
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep this
/// as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
    pub instance_id: String,
    /// Public PayPal client id, used to build the SDK script URL for the buyer-side checkout.
    pub paypal_client_id: String,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
            instance_id: config.instance_id.clone(),
            paypal_client_id: config.paypal.client_id.clone(),
        }
    }

    pub fn sdk_url(&self, currency: &str) -> String {
        format!("https://www.paypal.com/sdk/js?client-id={}&currency={currency}", self.paypal_client_id)
    }
}
