use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::StdResult;
use crate::entities::SyntheticBlock;
use crate::upstream::UpstreamBlockFetcher;

/// Dumb block fetcher
///
/// Serves the given blocks in order, the last one being repeated once the others are consumed.
pub struct DumbBlockFetcher<B: SyntheticBlock> {
    blocks: Mutex<VecDeque<B>>,
    fetch_delay: Option<Duration>,
    current_fetches: AtomicUsize,
    max_concurrent_fetches: AtomicUsize,
}

impl<B: SyntheticBlock> DumbBlockFetcher<B> {
    /// Factory
    pub fn new(blocks: Vec<B>) -> Self {
        Self {
            blocks: Mutex::new(blocks.into()),
            fetch_delay: None,
            current_fetches: AtomicUsize::new(0),
            max_concurrent_fetches: AtomicUsize::new(0),
        }
    }

    /// Wait the given delay in each fetch before answering.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Add a block at the end of the queue.
    pub fn push_block(&self, block: B) {
        self.blocks.lock().unwrap().push_back(block);
    }

    /// Highest number of fetches seen running at the same time.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches.load(Ordering::SeqCst)
    }

    fn next_block(&self) -> Option<B> {
        let mut blocks = self.blocks.lock().unwrap();
        if blocks.len() > 1 {
            blocks.pop_front()
        } else {
            blocks.front().cloned()
        }
    }
}

#[async_trait]
impl<B: SyntheticBlock> UpstreamBlockFetcher<B> for DumbBlockFetcher<B> {
    async fn fetch_latest_block(&self) -> StdResult<B> {
        let running = self.current_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_fetches
            .fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        let block = self.next_block();
        self.current_fetches.fetch_sub(1, Ordering::SeqCst);

        block.ok_or_else(|| anyhow!("no block available in the dumb block fetcher"))
    }
}
