#![warn(missing_docs)]
//! # coind
//!
//! A fake cryptocurrency node daemon. Each deposit it receives is spliced into the latest real
//! block fetched from the coin network, and the resulting synthetic chain is served back over a
//! node compatible JSON-RPC endpoint and a plain HTTP/JSON API.

mod application;
mod commands;
mod configuration;
pub mod deposit_service;
pub mod http_api;
pub mod rpc;

pub use application::{Application, BoundServers, OsSignalHandler, build_provider_registry};
pub use commands::CliArguments;
pub use configuration::{Configuration, DefaultConfiguration, ENVIRONMENT_PREFIX};

pub use coind_common::{StdError, StdResult};
