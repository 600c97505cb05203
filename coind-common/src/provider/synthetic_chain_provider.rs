use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::block_store::BlockStore;
use crate::entities::{BestBlockSummary, Deposit, SkyBlocks, SyntheticBlock, WavesBlock};
use crate::provider::{Provider, ProviderError};
use crate::upstream::UpstreamBlockFetcher;

/// Provider backed by the skycoin explorer
pub type SkyProvider = SyntheticChainProvider<SkyBlocks>;

/// Provider backed by a waves node
pub type WavesProvider = SyntheticChainProvider<WavesBlock>;

/// A [Provider] that splices deposits into the latest block of a real network and keeps the
/// result in a [BlockStore].
pub struct SyntheticChainProvider<B: SyntheticBlock> {
    fetcher: Arc<dyn UpstreamBlockFetcher<B>>,
    synthesis_lock: Mutex<()>,
    store: RwLock<BlockStore<B>>,
}

impl<B: SyntheticBlock> SyntheticChainProvider<B> {
    /// SyntheticChainProvider factory
    pub fn new(fetcher: Arc<dyn UpstreamBlockFetcher<B>>) -> Self {
        Self {
            fetcher,
            synthesis_lock: Mutex::new(()),
            store: RwLock::new(BlockStore::new()),
        }
    }
}

#[async_trait]
impl<B: SyntheticBlock> Provider for SyntheticChainProvider<B> {
    fn name(&self) -> &str {
        B::NAME
    }

    fn coin_type(&self) -> &str {
        B::COIN_TYPE
    }

    async fn create_fake_block(
        &self,
        deposit: &Deposit,
    ) -> Result<serde_json::Value, ProviderError> {
        // Held until the block is indexed so that syntheses of this coin never interleave.
        let _synthesis_guard = self.synthesis_lock.lock().await;

        let mut block = self
            .fetcher
            .fetch_latest_block()
            .await
            .map_err(ProviderError::UpstreamFetchFailed)?;
        let txid = block.inject_deposit(deposit)?;
        let json = serde_json::to_value(&block)?;

        let head = self.store.write().await.insert(block)?;
        info!(
            coin_type = B::COIN_TYPE,
            height = head.height,
            hash = %head.hash,
            txid = %txid,
            "Synthesized block with deposit {deposit}"
        );

        Ok(json)
    }

    async fn get_block(&self, hash: &str) -> Result<serde_json::Value, ProviderError> {
        let store = self.store.read().await;
        let block = store.get_block(hash).inspect_err(|_| {
            debug!(coin_type = B::COIN_TYPE, hash, "Block not found");
        })?;

        Ok(serde_json::to_value(block)?)
    }

    async fn get_best_block(&self, seq: u64) -> Result<BestBlockSummary, ProviderError> {
        self.store.read().await.get_best_block(seq)
    }

    async fn get_transaction_block(&self, tx: &str) -> Result<serde_json::Value, ProviderError> {
        let store = self.store.read().await;
        let block = store.get_transaction_block(tx).inspect_err(|_| {
            debug!(coin_type = B::COIN_TYPE, tx, "Transaction not found");
        })?;

        Ok(serde_json::to_value(block)?)
    }

    async fn get_block_count(&self) -> u64 {
        self.store.read().await.block_count()
    }
}
