use async_trait::async_trait;
use reqwest::IntoUrl;
use tracing::debug;

use crate::StdResult;
use crate::entities::WavesBlock;
use crate::upstream::UpstreamBlockFetcher;
use crate::upstream::http_client::UpstreamHttpClient;

/// Default waves node api
pub const WAVES_NODE_DEFAULT_URL: &str = "https://nodes.wavesnodes.com/";

/// Client of the waves node REST api.
pub struct WavesNodeClient {
    http_client: UpstreamHttpClient,
}

impl WavesNodeClient {
    /// WavesNodeClient factory
    pub fn new<U: IntoUrl>(node_url: U) -> StdResult<Self> {
        Ok(Self {
            http_client: UpstreamHttpClient::new(node_url)?,
        })
    }
}

#[async_trait]
impl UpstreamBlockFetcher<WavesBlock> for WavesNodeClient {
    async fn fetch_latest_block(&self) -> StdResult<WavesBlock> {
        debug!(node = %self.http_client.base_url(), "Fetching last waves block");
        let block = self.http_client.get_json("blocks/last").await?;

        Ok(block)
    }
}
