//! Transport client.
//!
//! [`fetch_bytes`] issues exactly one GET, reads the whole body and sorts the
//! outcome into a payload, a [`TransportFailure`] (non-2xx status) or a
//! network error. [`ApiClient`] binds it to a [`ClientConfig`].

mod api;
mod basic;
mod client;

pub use api::ApiClient;
pub use basic::BasicClient;
pub use client::HttpClient;

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT, HeaderValue, USER_AGENT};
use reqwest::{Method, Request};
use tracing::debug;
use url::Url;

use crate::config::DEFAULT_TIMEOUT;
use crate::error::{Error, TransportFailure};

/// Fetches `target` and returns the body of a 2xx response.
///
/// A zero `timeout` is replaced with [`DEFAULT_TIMEOUT`]. The timeout covers
/// the whole exchange including the body; when it expires the request is
/// dropped and reported as [`Error::Network`].
///
/// # Errors
///
/// - [`Error::Config`] if `user_agent` is not a valid header value
/// - [`Error::Network`] if no complete response was obtained
/// - [`Error::Transport`] if the status is outside 200..300
#[tracing::instrument(skip(client, target, user_agent), fields(target = %target))]
pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    target: &Url,
    timeout: Duration,
    user_agent: Option<&str>,
) -> Result<Bytes, Error> {
    let timeout = if timeout.is_zero() {
        DEFAULT_TIMEOUT
    } else {
        timeout
    };

    let mut req = Request::new(Method::GET, target.clone());
    *req.timeout_mut() = Some(timeout);
    req.headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(ua) = user_agent {
        let value = HeaderValue::from_str(ua)
            .map_err(|_| Error::Config(format!("invalid user agent {ua:?}")))?;
        req.headers_mut().insert(USER_AGENT, value);
    }

    let network = |source: reqwest::Error| Error::Network {
        target: target.to_string(),
        source,
    };

    let resp = client.execute(req).await.map_err(network)?;
    let status = resp.status();
    let body = resp.bytes().await.map_err(network)?;
    debug!(status = status.as_u16(), bytes = body.len(), "Response received");

    if !status.is_success() {
        return Err(TransportFailure::from_response(status.as_u16(), &body).into());
    }
    Ok(body)
}
