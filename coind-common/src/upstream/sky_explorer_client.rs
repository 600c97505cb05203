use async_trait::async_trait;
use reqwest::IntoUrl;
use serde::Deserialize;
use tracing::debug;

use crate::StdResult;
use crate::entities::SkyBlocks;
use crate::upstream::UpstreamBlockFetcher;
use crate::upstream::http_client::UpstreamHttpClient;

/// Default skycoin explorer api
pub const SKY_EXPLORER_DEFAULT_URL: &str = "https://explorer.skycoin.net/api/";

#[derive(Debug, Deserialize)]
struct BlockchainMetadata {
    head: BlockchainHead,
}

#[derive(Debug, Deserialize)]
struct BlockchainHead {
    seq: u64,
}

/// Client of the skycoin explorer REST api.
pub struct SkyExplorerClient {
    http_client: UpstreamHttpClient,
}

impl SkyExplorerClient {
    /// SkyExplorerClient factory
    pub fn new<U: IntoUrl>(explorer_url: U) -> StdResult<Self> {
        Ok(Self {
            http_client: UpstreamHttpClient::new(explorer_url)?,
        })
    }
}

#[async_trait]
impl UpstreamBlockFetcher<SkyBlocks> for SkyExplorerClient {
    async fn fetch_latest_block(&self) -> StdResult<SkyBlocks> {
        let metadata: BlockchainMetadata = self.http_client.get_json("blockchain/metadata").await?;
        let seq = metadata.head.seq;
        debug!(explorer = %self.http_client.base_url(), seq, "Fetching skycoin head block");

        let blocks = self
            .http_client
            .get_json(&format!("blocks?start={seq}&end={seq}"))
            .await?;

        Ok(blocks)
    }
}
