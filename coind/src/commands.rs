use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use config::{Config, Environment, Map, Source, Value, ValueKind};
use tracing::{Level, debug};

use crate::StdResult;
use crate::configuration::{Configuration, DefaultConfiguration, ENVIRONMENT_PREFIX};

/// Fake cryptocurrency node serving synthetic blocks over JSON-RPC and HTTP
#[derive(Parser, Debug, Clone, Default)]
#[command(version)]
pub struct CliArguments {
    /// JSON-RPC listen addresses, comma separated (an empty host listens on IPv4 and IPv6)
    #[arg(long)]
    pub rpc_address: Option<String>,

    /// HTTP API listen address
    #[arg(long)]
    pub api_address: Option<String>,

    /// TLS key file, accepted for compatibility
    #[arg(long)]
    pub rpc_key: Option<PathBuf>,

    /// TLS certificate file, accepted for compatibility
    #[arg(long)]
    pub rpc_cert: Option<PathBuf>,

    /// Maximum number of JSON-RPC connections served at once
    #[arg(long)]
    pub max_concurrent_requests: Option<usize>,

    /// Coin type used by `getblockcount` without parameter
    #[arg(long)]
    pub default_coin_type: Option<String>,

    /// Treat JSON-RPC 1.0 requests without id as notifications
    #[arg(long)]
    pub disable_rpc_quirks: bool,

    /// Verbosity level (-v WARN, -vv INFO, -vvv DEBUG, etc)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode, no log will be emitted. Critical error messages will still pop on STDERR
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

impl CliArguments {
    /// converts the inner logging level to Tracing Level.
    pub fn get_verbosity_level(&self) -> Option<Level> {
        if self.quiet {
            None
        } else {
            match self.verbose {
                0 => Some(Level::ERROR),
                1 => Some(Level::WARN),
                2 => Some(Level::INFO),
                3 => Some(Level::DEBUG),
                _ => Some(Level::TRACE),
            }
        }
    }

    /// Layer the defaults, the `COIND_*` environment variables and the arguments.
    pub fn build_configuration(&self) -> StdResult<Configuration> {
        let configuration: Configuration = Config::builder()
            .add_source(DefaultConfiguration::default())
            .add_source(Environment::with_prefix(ENVIRONMENT_PREFIX))
            .add_source(self.clone())
            .build()
            .with_context(|| "configuration build error")?
            .try_deserialize()
            .with_context(|| "configuration deserialize error")?;
        debug!(config = ?configuration, "Configuration built");

        Ok(configuration)
    }
}

impl Source for CliArguments {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
        let mut result = Map::new();
        let namespace = "clap arguments".to_string();

        if let Some(rpc_address) = self.rpc_address.clone() {
            result.insert(
                "rpc_address".to_string(),
                Value::new(Some(&namespace), ValueKind::from(rpc_address)),
            );
        }
        if let Some(api_address) = self.api_address.clone() {
            result.insert(
                "api_address".to_string(),
                Value::new(Some(&namespace), ValueKind::from(api_address)),
            );
        }
        if let Some(rpc_key) = self.rpc_key.clone() {
            result.insert(
                "rpc_key".to_string(),
                Value::new(
                    Some(&namespace),
                    ValueKind::from(format!("{}", rpc_key.to_string_lossy())),
                ),
            );
        }
        if let Some(rpc_cert) = self.rpc_cert.clone() {
            result.insert(
                "rpc_cert".to_string(),
                Value::new(
                    Some(&namespace),
                    ValueKind::from(format!("{}", rpc_cert.to_string_lossy())),
                ),
            );
        }
        if let Some(max_concurrent_requests) = self.max_concurrent_requests {
            result.insert(
                "max_concurrent_requests".to_string(),
                Value::new(
                    Some(&namespace),
                    ValueKind::from(max_concurrent_requests as u64),
                ),
            );
        }
        if let Some(default_coin_type) = self.default_coin_type.clone() {
            result.insert(
                "default_coin_type".to_string(),
                Value::new(Some(&namespace), ValueKind::from(default_coin_type)),
            );
        }
        if self.disable_rpc_quirks {
            result.insert(
                "rpc_quirks".to_string(),
                Value::new(Some(&namespace), ValueKind::from(false)),
            );
        }

        Ok(result)
    }
}
