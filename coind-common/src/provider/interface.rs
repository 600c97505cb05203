use async_trait::async_trait;
use thiserror::Error;

use crate::StdError;
use crate::entities::{BestBlockSummary, Deposit};

/// [Provider] related errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The upstream block could not be fetched, the fetcher error is kept as is.
    #[error(transparent)]
    UpstreamFetchFailed(StdError),

    /// The upstream block lacks what is needed to inject a deposit.
    #[error("malformed upstream data: {0}")]
    MalformedUpstreamData(String),

    /// No block matches the lookup key.
    #[error("Block not found")]
    BlockNotFound,

    /// A synthesized block could not be serialized.
    #[error("could not serialize block: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A coin backend: synthesize blocks containing fake deposits and serve them back.
#[cfg_attr(any(test, feature = "test_tools"), mockall::automock)]
#[async_trait]
pub trait Provider: Sync + Send {
    /// Human readable identifier of the provider.
    fn name(&self) -> &str;

    /// Coin type served by the provider, unique per process.
    fn coin_type(&self) -> &str;

    /// Fetch the latest upstream block, inject the deposit in it and index the result.
    async fn create_fake_block(&self, deposit: &Deposit)
    -> Result<serde_json::Value, ProviderError>;

    /// Synthesized block with the given hash.
    async fn get_block(&self, hash: &str) -> Result<serde_json::Value, ProviderError>;

    /// Summary of the block at height `seq`, `0` meaning the current best block.
    async fn get_best_block(&self, seq: u64) -> Result<BestBlockSummary, ProviderError>;

    /// Synthesized block holding the given transaction.
    async fn get_transaction_block(&self, tx: &str) -> Result<serde_json::Value, ProviderError>;

    /// Height of the best synthesized block, `0` when none was synthesized yet.
    async fn get_block_count(&self) -> u64;
}
