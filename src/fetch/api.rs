use bytes::Bytes;
use tracing::debug;
use url::Url;

use super::basic::BasicClient;
use super::client::HttpClient;
use super::fetch_bytes;
use crate::compose::{Params, join_target};
use crate::config::ClientConfig;
use crate::error::Error;

/// An [`HttpClient`] bound to a fixed [`ClientConfig`].
///
/// Holds no mutable state; every call composes its own target and issues a
/// single request.
#[derive(Debug, Clone)]
pub struct ApiClient<C = BasicClient> {
    config: ClientConfig,
    http: C,
}

impl ApiClient<BasicClient> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http(config, BasicClient::new())
    }
}

impl<C: HttpClient> ApiClient<C> {
    pub fn with_http(config: ClientConfig, http: C) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The target a call to [`Self::get`] with the same arguments would fetch.
    pub fn url(&self, path: &str, params: &Params) -> Url {
        join_target(self.config.base_url(), path, params)
    }

    /// Fetches `path` below the configured base endpoint.
    pub async fn get(&self, path: &str, params: &Params) -> Result<Bytes, Error> {
        let target = self.url(path, params);
        debug!(%target, "Issuing request");
        fetch_bytes(
            &self.http,
            &target,
            self.config.timeout(),
            self.config.user_agent(),
        )
        .await
    }
}
