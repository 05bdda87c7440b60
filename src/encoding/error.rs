//! Error types for the encoding module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by percent-encoding and body serialization primitives.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The configured text encoding has no codec in this crate.
    #[error("unsupported text encoding: {label}")]
    UnsupportedEncoding {
        /// The encoding label as configured (e.g. `GBK`).
        label: String,
    },

    /// Percent-decoding produced bytes that are not valid UTF-8.
    #[error("percent-decoded value is not valid UTF-8: {value}")]
    InvalidUtf8 {
        /// The raw value that failed to decode.
        value: String,
    },

    /// A flat `key, value, key, value` list had an odd number of items.
    #[error("parameter key/value count mismatch: {count} items")]
    KeyValueMismatch {
        /// Number of items supplied.
        count: usize,
    },

    /// An upload attachment exists but could not be opened or inspected.
    #[error("cannot read upload file {path}: {source}")]
    Attachment {
        /// The attachment path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl EncodeError {
    /// Creates an unsupported-encoding error.
    pub fn unsupported_encoding(label: impl Into<String>) -> Self {
        Self::UnsupportedEncoding {
            label: label.into(),
        }
    }

    /// Creates an attachment read error.
    pub fn attachment(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Attachment {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid UTF-8 decode error.
    pub fn invalid_utf8(value: impl Into<String>) -> Self {
        Self::InvalidUtf8 {
            value: value.into(),
        }
    }
}
