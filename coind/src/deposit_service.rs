//! Routing of the deposit and lookup requests onto the registered providers.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use coind_common::entities::{BestBlockSummary, Deposit};
use coind_common::provider::{Provider, ProviderError, ProviderRegistry};

/// [DepositService] related errors.
#[derive(Debug, Error)]
pub enum DepositServiceError {
    /// A deposit of the batch targets a coin type without provider.
    #[error("CoinType ({coin_type}) not supported for deposit {deposit}")]
    UnsupportedDepositCoinType {
        /// Coin type of the rejected deposit
        coin_type: String,
        /// Rejected deposit
        deposit: Deposit,
    },

    /// A lookup targets a coin type without provider.
    #[error("CoinType ({0}) not supported")]
    UnsupportedCoinType(String),

    /// The deposit batch is empty.
    #[error("no deposit given")]
    NoDeposit,

    /// The provider failed to synthesize or find a block.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl DepositServiceError {
    /// True if the error is caused by a lookup key without block.
    pub fn is_block_not_found(&self) -> bool {
        matches!(self, Self::Provider(ProviderError::BlockNotFound))
    }
}

/// Translate deposit and query requests into provider calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepositService: Sync + Send {
    /// Synthesize one block per deposit, in order, and return the last synthesized block.
    ///
    /// The batch stops at the first failure, blocks synthesized before it are kept.
    async fn process_deposits(
        &self,
        deposits: &[Deposit],
    ) -> Result<serde_json::Value, DepositServiceError>;

    /// Synthesized block with the given hash.
    async fn get_block(
        &self,
        coin_type: &str,
        hash: &str,
    ) -> Result<serde_json::Value, DepositServiceError>;

    /// Summary of the block at height `seq`, `0` meaning the best block.
    async fn get_best_block(
        &self,
        coin_type: &str,
        seq: u64,
    ) -> Result<BestBlockSummary, DepositServiceError>;

    /// Synthesized block holding the given transaction.
    async fn get_transaction_block(
        &self,
        coin_type: &str,
        tx: &str,
    ) -> Result<serde_json::Value, DepositServiceError>;

    /// Height of the best synthesized block of the coin.
    async fn get_block_count(&self, coin_type: &str) -> Result<u64, DepositServiceError>;
}

/// [DepositService] backed by a [ProviderRegistry].
pub struct RegistryDepositService {
    registry: Arc<ProviderRegistry>,
}

impl RegistryDepositService {
    /// RegistryDepositService factory
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    fn provider(&self, coin_type: &str) -> Result<Arc<dyn Provider>, DepositServiceError> {
        self.registry.lookup(coin_type).map_err(|err| {
            debug!("{err}");
            DepositServiceError::UnsupportedCoinType(coin_type.to_string())
        })
    }
}

#[async_trait]
impl DepositService for RegistryDepositService {
    async fn process_deposits(
        &self,
        deposits: &[Deposit],
    ) -> Result<serde_json::Value, DepositServiceError> {
        let mut last_block = None;

        for deposit in deposits {
            let provider = self.registry.lookup(&deposit.coin_type).map_err(|_| {
                warn!(coin_type = %deposit.coin_type, "Rejected deposit {deposit}");
                DepositServiceError::UnsupportedDepositCoinType {
                    coin_type: deposit.coin_type.clone(),
                    deposit: deposit.clone(),
                }
            })?;

            last_block = Some(provider.create_fake_block(deposit).await?);
        }

        last_block.ok_or(DepositServiceError::NoDeposit)
    }

    async fn get_block(
        &self,
        coin_type: &str,
        hash: &str,
    ) -> Result<serde_json::Value, DepositServiceError> {
        Ok(self.provider(coin_type)?.get_block(hash).await?)
    }

    async fn get_best_block(
        &self,
        coin_type: &str,
        seq: u64,
    ) -> Result<BestBlockSummary, DepositServiceError> {
        Ok(self.provider(coin_type)?.get_best_block(seq).await?)
    }

    async fn get_transaction_block(
        &self,
        coin_type: &str,
        tx: &str,
    ) -> Result<serde_json::Value, DepositServiceError> {
        Ok(self.provider(coin_type)?.get_transaction_block(tx).await?)
    }

    async fn get_block_count(&self, coin_type: &str) -> Result<u64, DepositServiceError> {
        Ok(self.provider(coin_type)?.get_block_count().await)
    }
}
