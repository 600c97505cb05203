#![warn(missing_docs)]

//! Shared datatypes and traits used by the coind fake node daemon
//!
//! Provide:
//! - The [entities] exchanged with the node clients: deposits, best block summaries and the
//!   coin specific block shapes.
//! - A per coin [BlockStore][block_store::BlockStore] indexing the synthesized blocks by height,
//!   hash and transaction id.
//! - The [Provider][provider::Provider] capability contract, its implementations and the
//!   [ProviderRegistry][provider::ProviderRegistry].
//! - The [upstream] clients fetching the latest real block of a coin network.
//! - Test utilities: [fake data][test_utils::fake_data] and dumb doubles.

pub mod block_store;
pub mod entities;
pub mod provider;
pub mod upstream;

#[cfg(any(test, feature = "test_tools"))]
pub mod test_utils;

/// Generic error type
pub type StdError = anyhow::Error;

/// Generic result type
pub type StdResult<T> = anyhow::Result<T, StdError>;
