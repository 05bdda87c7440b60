//! webfetch Core Library
//!
//! A blocking HTTP client: one stateful object per caller that builds and
//! executes requests, encodes form, raw and multipart bodies, streams
//! downloads under size bounds and shares a cookie store between requests.
//!
//! # Architecture
//!
//! - [`encoding`] - percent-encoding, query strings, form and multipart bodies
//! - [`client`] - configuration, transport, referer chain and verb methods
//! - [`download`] - streaming downloads, destination naming and progress
//! - [`cookies`] - shared cookie jar and Netscape cookie-file import
//! - [`user_agent`] - browser User-Agent presets

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod cookies;
pub mod download;
pub mod encoding;
pub mod user_agent;

// Re-export commonly used types
pub use client::{ClientConfig, HttpClient, HttpError, RefererChain, TlsPolicy};
pub use cookies::CookieJar;
pub use download::{
    DownloadFileResult, DownloadOptions, DownloadProgress, NameStrategy, ProgressObserver,
};
pub use encoding::{EncodeError, FormData, ParamValue, PercentCodec};
