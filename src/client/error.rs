//! Error types for the HTTP client.
//!
//! Every request, upload and download operation reports failures through
//! [`HttpError`], with the offending URL, path or bounds in the message.

use std::path::PathBuf;

use thiserror::Error;

use crate::encoding::EncodeError;

/// Errors that can occur while building, sending or consuming a request.
#[derive(Debug, Error)]
pub enum HttpError {
    /// A required argument was empty (URL, method, content, path, ...).
    ///
    /// Raised before any network I/O.
    #[error("{what} is empty")]
    EmptyArgument {
        /// Human-readable name of the missing argument.
        what: &'static str,
    },

    /// The client configuration is inconsistent or cannot be applied.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// Description of the problem.
        reason: String,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// A configured header name or value is not valid on the wire.
    #[error("invalid header {name}")]
    InvalidHeader {
        /// The header name as configured.
        name: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The connection failed while the response body was being read.
    #[error("connection lost reading body from {url}: {source}")]
    BodyRead {
        /// The URL being read.
        url: String,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// HTTP error response for a download (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The advertised download size falls outside the configured window.
    #[error("download size range [{min} - {max}], file size [{}]", display_size(.actual))]
    SizeRange {
        /// The URL being downloaded.
        url: String,
        /// Configured minimum size in bytes.
        min: u64,
        /// Configured maximum size in bytes.
        max: u64,
        /// Advertised content length, if the server sent one.
        actual: Option<u64>,
    },

    /// The destination path already exists.
    #[error("file already exists [{path}]")]
    FileExists {
        /// The destination path.
        path: PathBuf,
    },

    /// The stream finished cleanly but the destination file is missing.
    #[error("file download failed [{url}]: {path} was not written")]
    IncompleteDownload {
        /// The URL that was downloaded.
        url: String,
        /// The expected destination path.
        path: PathBuf,
    },

    /// File system error (create directories, create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Percent-encoding or body serialization failure.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

fn display_size(actual: &Option<u64>) -> String {
    actual.map_or_else(|| "unknown".to_string(), |size| size.to_string())
}

impl HttpError {
    /// Creates an empty-argument error.
    #[must_use]
    pub fn empty(what: &'static str) -> Self {
        Self::EmptyArgument { what }
    }

    /// Creates a configuration error.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>) -> Self {
        Self::InvalidHeader { name: name.into() }
    }

    /// Maps a transport error, separating timeouts from other failures.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a size-range error.
    pub fn size_range(url: impl Into<String>, min: u64, max: u64, actual: Option<u64>) -> Self {
        Self::SizeRange {
            url: url.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates a file-exists error.
    pub fn file_exists(path: impl Into<PathBuf>) -> Self {
        Self::FileExists { path: path.into() }
    }

    /// Creates an incomplete-download error.
    pub fn incomplete_download(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::IncompleteDownload {
            url: url.into(),
            path: path.into(),
        }
    }

    /// Maps a failed read of a response body to a connection error.
    ///
    /// Transport errors wrapped in the `io::Error` are unwrapped so timeouts
    /// become [`HttpError::Timeout`] and other failures [`HttpError::Network`].
    pub fn body_read(url: impl Into<String>, error: std::io::Error) -> Self {
        let url = url.into();
        let kind = error.kind();
        if kind == std::io::ErrorKind::TimedOut {
            return Self::Timeout { url };
        }
        if error.get_ref().is_none() {
            return Self::BodyRead { url, source: error };
        }
        match error
            .into_inner()
            .map(|inner| inner.downcast::<reqwest::Error>())
        {
            Some(Ok(source)) => Self::transport(url, *source),
            Some(Err(inner)) => Self::BodyRead {
                url,
                source: std::io::Error::new(kind, inner),
            },
            None => Self::BodyRead {
                url,
                source: kind.into(),
            },
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors raised before any network I/O was attempted.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::EmptyArgument { .. }
                | Self::Configuration { .. }
                | Self::InvalidHeader { .. }
                | Self::Encode(EncodeError::KeyValueMismatch { .. })
        )
    }
}

// No `From<reqwest::Error>` or `From<std::io::Error>`: both variants need the
// URL or path, which the source errors do not carry.
