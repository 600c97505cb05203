//! In memory index of the synthesized blocks of one coin.

use std::collections::{BTreeMap, HashMap};

use crate::entities::{BestBlockSummary, BlockHead, SyntheticBlock};
use crate::provider::ProviderError;

/// Index of the synthesized blocks by height, hash and transaction id.
///
/// Every hash referenced by a height is stored, a height is bound to exactly one hash and
/// `best_height` is the height of the last inserted block. Blocks are never evicted.
#[derive(Debug, Clone)]
pub struct BlockStore<B: SyntheticBlock> {
    block_hashes: BTreeMap<u64, String>,
    hash_blocks: HashMap<String, B>,
    block_transactions: HashMap<String, String>,
    best_height: Option<u64>,
}

impl<B: SyntheticBlock> Default for BlockStore<B> {
    fn default() -> Self {
        Self {
            block_hashes: BTreeMap::new(),
            hash_blocks: HashMap::new(),
            block_transactions: HashMap::new(),
            best_height: None,
        }
    }
}

impl<B: SyntheticBlock> BlockStore<B> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the block as the new best block and link the previous best block to it.
    ///
    /// Nothing is mutated if the block head can not be read.
    pub fn insert(&mut self, block: B) -> Result<BlockHead, ProviderError> {
        let head = block.head()?;
        let previous_best_hash = self
            .best_height
            .and_then(|height| self.block_hashes.get(&height))
            .cloned();

        self.block_hashes.insert(head.height, head.hash.clone());
        for txid in block.transaction_ids() {
            self.block_transactions.insert(txid, head.hash.clone());
        }
        self.block_transactions
            .insert(head.hash.clone(), head.hash.clone());
        self.hash_blocks.insert(head.hash.clone(), block);
        self.best_height = Some(head.height);

        if let Some(previous_block) = previous_best_hash
            .filter(|hash| *hash != head.hash)
            .and_then(|hash| self.hash_blocks.get_mut(&hash))
        {
            previous_block.link_next(&head.hash);
        }

        Ok(head)
    }

    /// Block with the given hash
    pub fn get_block(&self, hash: &str) -> Result<&B, ProviderError> {
        self.hash_blocks.get(hash).ok_or(ProviderError::BlockNotFound)
    }

    /// Summary of the block at height `seq`, `0` resolving to the best height.
    pub fn get_best_block(&self, seq: u64) -> Result<BestBlockSummary, ProviderError> {
        let height = match seq {
            0 => self.best_height.ok_or(ProviderError::BlockNotFound)?,
            seq => seq,
        };

        self.block_hashes
            .get(&height)
            .map(|hash| BestBlockSummary {
                hash: hash.clone(),
                height,
            })
            .ok_or(ProviderError::BlockNotFound)
    }

    /// Block holding the given transaction
    pub fn get_transaction_block(&self, txid: &str) -> Result<&B, ProviderError> {
        self.block_transactions
            .get(txid)
            .and_then(|hash| self.hash_blocks.get(hash))
            .ok_or(ProviderError::BlockNotFound)
    }

    /// Height of the best block, `0` if the store is empty
    pub fn block_count(&self) -> u64 {
        self.best_height.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use crate::entities::{SkyBlocks, WavesBlock};
    use crate::test_utils::fake_data;

    use super::*;

    #[test]
    fn empty_store_lookups_are_not_found() {
        let store = BlockStore::<SkyBlocks>::new();

        assert!(matches!(
            store.get_block("whatever"),
            Err(ProviderError::BlockNotFound)
        ));
        assert!(matches!(
            store.get_best_block(0),
            Err(ProviderError::BlockNotFound)
        ));
        assert!(matches!(
            store.get_best_block(12),
            Err(ProviderError::BlockNotFound)
        ));
        assert!(matches!(
            store.get_transaction_block("whatever"),
            Err(ProviderError::BlockNotFound)
        ));
        assert_eq!(0, store.block_count());
    }

    #[test]
    fn insert_indexes_by_height_hash_and_transactions() {
        let mut store = BlockStore::new();

        let head = store.insert(fake_data::sky_blocks(10, "hash-10")).unwrap();

        assert_eq!(10, head.height);
        assert_eq!("hash-10", head.hash);
        assert_eq!(
            BestBlockSummary {
                hash: "hash-10".to_string(),
                height: 10
            },
            store.get_best_block(10).unwrap()
        );
        assert!(store.get_block("hash-10").is_ok());
        assert!(store.get_transaction_block("txid-hash-10").is_ok());
        assert!(store.get_transaction_block("hash-10").is_ok());
        assert_eq!(10, store.block_count());
    }

    #[test]
    fn best_block_zero_resolves_to_the_current_best_height() {
        let mut store = BlockStore::new();
        store.insert(fake_data::sky_blocks(10, "hash-10")).unwrap();
        store.insert(fake_data::sky_blocks(11, "hash-11")).unwrap();

        assert_eq!(
            store.get_best_block(11).unwrap(),
            store.get_best_block(0).unwrap()
        );
        assert_eq!(11, store.block_count());
    }

    #[test]
    fn insert_links_the_previous_best_block() {
        let mut store = BlockStore::new();
        store.insert(fake_data::waves_block(10, "signature-10")).unwrap();
        store.insert(fake_data::waves_block(11, "signature-11")).unwrap();

        let previous: &WavesBlock = store.get_block("signature-10").unwrap();
        assert_eq!(Some("signature-11".to_string()), previous.next_signature);
        let best = store.get_block("signature-11").unwrap();
        assert_eq!(None, best.next_signature);
    }

    #[test]
    fn reinserting_the_best_block_does_not_link_it_to_itself() {
        let mut store = BlockStore::new();
        store.insert(fake_data::waves_block(10, "signature-10")).unwrap();
        store.insert(fake_data::waves_block(10, "signature-10")).unwrap();

        let block = store.get_block("signature-10").unwrap();
        assert_eq!(None, block.next_signature);
    }

    #[test]
    fn a_new_hash_at_a_known_height_becomes_canonical() {
        let mut store = BlockStore::new();
        store.insert(fake_data::waves_block(10, "signature-a")).unwrap();
        store.insert(fake_data::waves_block(10, "signature-b")).unwrap();

        assert_eq!("signature-b", store.get_best_block(10).unwrap().hash);
        let replaced = store.get_block("signature-a").unwrap();
        assert_eq!(Some("signature-b".to_string()), replaced.next_signature);
    }

    #[test]
    fn insert_of_a_malformed_block_leaves_the_store_untouched() {
        let mut store = BlockStore::new();
        store.insert(fake_data::sky_blocks(10, "hash-10")).unwrap();

        store
            .insert(SkyBlocks { blocks: vec![] })
            .expect_err("insert should fail on an empty block list");

        assert_eq!(10, store.block_count());
        assert_eq!("hash-10", store.get_best_block(0).unwrap().hash);
    }
}
