//! The entities used by, and exchanged between, the providers and the node clients.

mod best_block;
mod deposit;
mod sky_block;
mod waves_block;

pub use best_block::{BestBlockSummary, BlockHead};
pub use deposit::Deposit;
pub use sky_block::{
    SkyBlock, SkyBlockBody, SkyBlockHeader, SkyBlocks, SkyTransaction, SkyTransactionOutput,
};
pub use waves_block::{WavesBlock, WavesTransaction};

use serde::{Serialize, de::DeserializeOwned};

use crate::provider::ProviderError;

/// A block shape that a deposit can be spliced into and indexed by a
/// [BlockStore][crate::block_store::BlockStore].
pub trait SyntheticBlock: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Coin type served by blocks of this shape.
    const COIN_TYPE: &'static str;

    /// Human readable name of the coin.
    const NAME: &'static str;

    /// Append a copy of the first template output with the deposit values.
    ///
    /// Returns the id of the transaction that received the output.
    fn inject_deposit(&mut self, deposit: &Deposit) -> Result<String, ProviderError>;

    /// Height and hash of the block.
    fn head(&self) -> Result<BlockHead, ProviderError>;

    /// Ids of every transaction of the block.
    fn transaction_ids(&self) -> Vec<String>;

    /// Point the forward link of this block to its successor.
    fn link_next(&mut self, next_hash: &str);
}
