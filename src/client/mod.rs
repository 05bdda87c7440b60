//! Blocking HTTP client.
//!
//! - [`ClientConfig`] - immutable settings built with chained setters
//! - [`HttpClient`] - verb methods (GET, POST, PUT, DELETE, HEAD, OPTIONS,
//!   multipart upload); downloads live in [`crate::download`]
//! - [`RefererChain`] - referer carried from one request to the next
//! - [`TlsPolicy`] - per-client certificate trust and minimum TLS version

mod config;
pub mod constants;
mod connection;
mod error;
mod http;
pub mod response;
mod tls;

pub use config::ClientConfig;
pub use connection::{ConnectionManager, RefererChain};
pub use error::HttpError;
pub use http::{DEFAULT_UPLOAD_FIELD, HttpClient};
pub(crate) use http::RequestBody;
pub use tls::TlsPolicy;
