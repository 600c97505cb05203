use anyhow::{Context, anyhow};
use reqwest::{IntoUrl, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::StdResult;
use crate::upstream::UpstreamClientError;

/// Json over HTTP client rooted at an upstream base url.
pub(crate) struct UpstreamHttpClient {
    base_url: Url,
    client: reqwest::Client,
}

impl UpstreamHttpClient {
    pub(crate) fn new<U: IntoUrl>(base_url: U) -> StdResult<Self> {
        let base_url = enforce_trailing_slash(
            base_url
                .into_url()
                .with_context(|| "Invalid upstream endpoint, it must be a correctly formed url")?,
        );

        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET the route, relative to the base url, and parse the json answer.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        route: &str,
    ) -> Result<T, UpstreamClientError> {
        let url = self.join_base_url(route)?;
        debug!(%url, "GET upstream");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| UpstreamClientError::RemoteServerUnreachable(anyhow!(err)))?;

        match response.status() {
            StatusCode::OK => response
                .json::<T>()
                .await
                .map_err(|err| UpstreamClientError::JsonParseFailed(anyhow!(err))),
            status_code => Err(UpstreamClientError::UnhandledStatusCode(
                status_code,
                response.text().await.unwrap_or_default(),
            )),
        }
    }

    fn join_base_url(&self, route: &str) -> Result<Url, UpstreamClientError> {
        self.base_url
            .join(route)
            .with_context(|| {
                format!(
                    "Invalid url when joining given route, '{route}', to upstream url '{}'",
                    self.base_url
                )
            })
            .map_err(UpstreamClientError::InvalidEndpoint)
    }
}

fn enforce_trailing_slash(url: Url) -> Url {
    // Url::join drops the last path segment of a base url without a trailing slash.
    if url.as_str().ends_with('/') {
        url
    } else {
        let mut url = url;
        url.set_path(&format!("{}/", url.path()));
        url
    }
}
