use config::{ConfigError, Map, Source, Value, ValueKind};
use serde::Deserialize;
use std::path::PathBuf;

use coind_common::upstream::{SKY_EXPLORER_DEFAULT_URL, WAVES_NODE_DEFAULT_URL};

/// Prefix of the environment variables overriding the configuration
pub const ENVIRONMENT_PREFIX: &str = "COIND";

/// Node configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Configuration {
    /// JSON-RPC listen addresses, comma separated `host:port` values
    pub rpc_address: String,

    /// HTTP API listen address
    pub api_address: String,

    /// TLS key path, TLS is not served
    pub rpc_key: Option<PathBuf>,

    /// TLS certificate path, TLS is not served
    pub rpc_cert: Option<PathBuf>,

    /// Maximum number of JSON-RPC connections served at once
    pub max_concurrent_requests: usize,

    /// Answer JSON-RPC 1.0 requests without id instead of treating them as notifications
    pub rpc_quirks: bool,

    /// Coin type used by `getblockcount` when no coin type is given
    pub default_coin_type: String,

    /// Skycoin explorer API base url
    pub sky_explorer_url: String,

    /// Waves node API base url
    pub waves_node_url: String,
}

impl Configuration {
    /// Configuration built from the defaults only
    pub fn new_sample() -> Self {
        let defaults = DefaultConfiguration::default();

        Self {
            rpc_address: defaults.rpc_address,
            api_address: defaults.api_address,
            rpc_key: None,
            rpc_cert: None,
            max_concurrent_requests: defaults.max_concurrent_requests,
            rpc_quirks: defaults.rpc_quirks,
            default_coin_type: defaults.default_coin_type,
            sky_explorer_url: defaults.sky_explorer_url,
            waves_node_url: defaults.waves_node_url,
        }
    }
}

/// Default configuration with all the default values for configurations.
#[derive(Debug, Clone)]
pub struct DefaultConfiguration {
    /// JSON-RPC listen addresses
    pub rpc_address: String,

    /// HTTP API listen address
    pub api_address: String,

    /// JSON-RPC connection limit
    pub max_concurrent_requests: usize,

    /// JSON-RPC quirk mode
    pub rpc_quirks: bool,

    /// Coin type of legacy `getblockcount` calls
    pub default_coin_type: String,

    /// Skycoin upstream
    pub sky_explorer_url: String,

    /// Waves upstream
    pub waves_node_url: String,
}

impl Default for DefaultConfiguration {
    fn default() -> Self {
        Self {
            rpc_address: "127.0.0.1:8334".to_string(),
            api_address: "127.0.0.1:4122".to_string(),
            max_concurrent_requests: 10,
            rpc_quirks: true,
            default_coin_type: "SKY".to_string(),
            sky_explorer_url: SKY_EXPLORER_DEFAULT_URL.to_string(),
            waves_node_url: WAVES_NODE_DEFAULT_URL.to_string(),
        }
    }
}

impl Source for DefaultConfiguration {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let mut result = Map::new();
        let namespace = "default configuration".to_string();
        let myself = self.clone();
        result.insert(
            "rpc_address".to_string(),
            Value::new(Some(&namespace), ValueKind::from(myself.rpc_address)),
        );
        result.insert(
            "api_address".to_string(),
            Value::new(Some(&namespace), ValueKind::from(myself.api_address)),
        );
        result.insert(
            "max_concurrent_requests".to_string(),
            Value::new(
                Some(&namespace),
                ValueKind::from(myself.max_concurrent_requests as u64),
            ),
        );
        result.insert(
            "rpc_quirks".to_string(),
            Value::new(Some(&namespace), ValueKind::from(myself.rpc_quirks)),
        );
        result.insert(
            "default_coin_type".to_string(),
            Value::new(Some(&namespace), ValueKind::from(myself.default_coin_type)),
        );
        result.insert(
            "sky_explorer_url".to_string(),
            Value::new(Some(&namespace), ValueKind::from(myself.sky_explorer_url)),
        );
        result.insert(
            "waves_node_url".to_string(),
            Value::new(Some(&namespace), ValueKind::from(myself.waves_node_url)),
        );

        Ok(result)
    }
}
