//! Request and rendering core of the `dbrest` CLI for the DB transport REST API.
//!
//! The pipeline is `compose` → `fetch` → `decode` → `render`; each stage is a
//! separate function so the CLI can sequence them and map outcomes to exit
//! codes.

pub mod compose;
pub mod config;
pub mod decode;
pub mod error;
pub mod fallback;
pub mod fetch;
pub mod output;

pub use compose::{Params, compose};
pub use config::ClientConfig;
pub use decode::{EndpointKind, Records, decode};
pub use error::{Error, TransportFailure};
pub use fetch::{ApiClient, BasicClient, HttpClient, fetch_bytes};
pub use output::render;
