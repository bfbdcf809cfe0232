use super::client::HttpClient;
use async_trait::async_trait;

/// Plain reqwest-backed [`HttpClient`].
///
/// Timeouts and headers are set per request by [`super::fetch_bytes`], so the
/// wrapped client carries no configuration of its own.
#[derive(Debug, Clone, Default)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
