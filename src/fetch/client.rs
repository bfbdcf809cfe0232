use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes one fully built request.
///
/// The seam between request construction and the network: tests and
/// wrappers implement this instead of talking to reqwest directly.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
