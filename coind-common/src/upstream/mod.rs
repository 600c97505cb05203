//! Clients fetching the latest block of the real coin networks.

#[cfg(any(test, feature = "test_tools"))]
mod dumb_block_fetcher;
mod http_client;
mod interface;
mod sky_explorer_client;
mod waves_node_client;

#[cfg(any(test, feature = "test_tools"))]
pub use dumb_block_fetcher::DumbBlockFetcher;
#[cfg(any(test, feature = "test_tools"))]
pub use interface::MockUpstreamBlockFetcher;
pub use interface::{UpstreamBlockFetcher, UpstreamClientError};
pub use sky_explorer_client::{SKY_EXPLORER_DEFAULT_URL, SkyExplorerClient};
pub use waves_node_client::{WAVES_NODE_DEFAULT_URL, WavesNodeClient};
