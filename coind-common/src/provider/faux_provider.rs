use async_trait::async_trait;

use crate::entities::{BestBlockSummary, Deposit};
use crate::provider::{Provider, ProviderError};

/// A provider that synthesizes nothing, useful to test the request routing.
#[derive(Debug, Default)]
pub struct FauxProvider;

impl FauxProvider {
    /// Coin type served by the [FauxProvider]
    pub const COIN_TYPE: &'static str = "Faux";
}

#[async_trait]
impl Provider for FauxProvider {
    fn name(&self) -> &str {
        "faux"
    }

    fn coin_type(&self) -> &str {
        Self::COIN_TYPE
    }

    async fn create_fake_block(
        &self,
        _deposit: &Deposit,
    ) -> Result<serde_json::Value, ProviderError> {
        Ok(serde_json::Value::Null)
    }

    async fn get_block(&self, _hash: &str) -> Result<serde_json::Value, ProviderError> {
        Err(ProviderError::BlockNotFound)
    }

    async fn get_best_block(&self, _seq: u64) -> Result<BestBlockSummary, ProviderError> {
        Err(ProviderError::BlockNotFound)
    }

    async fn get_transaction_block(&self, _tx: &str) -> Result<serde_json::Value, ProviderError> {
        Err(ProviderError::BlockNotFound)
    }

    async fn get_block_count(&self) -> u64 {
        0
    }
}
