use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::StdResult;
use crate::entities::SyntheticBlock;

/// Errors raised by the upstream REST clients.
#[derive(Debug, Error)]
pub enum UpstreamClientError {
    /// The route could not be joined to the upstream base url.
    #[error("invalid upstream endpoint")]
    InvalidEndpoint(#[source] anyhow::Error),

    /// The upstream server could not be reached.
    #[error("upstream server unreachable")]
    RemoteServerUnreachable(#[source] anyhow::Error),

    /// The upstream server answered with an unexpected status code.
    #[error("unhandled status code: {0}, response text: {1}")]
    UnhandledStatusCode(StatusCode, String),

    /// The upstream answer is not the expected json document.
    #[error("json parsing failed")]
    JsonParseFailed(#[source] anyhow::Error),
}

/// Fetch the latest block of a coin network.
#[cfg_attr(any(test, feature = "test_tools"), mockall::automock)]
#[async_trait]
pub trait UpstreamBlockFetcher<B: SyntheticBlock>: Sync + Send {
    /// Fetch the latest block as reported by the upstream server.
    async fn fetch_latest_block(&self) -> StdResult<B>;
}
