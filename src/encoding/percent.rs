//! Percent-encoding primitives bound to a configured text encoding.
//!
//! Only UTF-8 labels are supported. Any other label makes every encode and
//! decode fail with [`EncodeError::UnsupportedEncoding`]; the `*_or_empty`
//! helpers turn that failure into an empty string and a warning.

use tracing::warn;

use super::error::EncodeError;

/// Default text encoding label.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Percent codec for one text encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentCodec {
    label: String,
}

impl Default for PercentCodec {
    fn default() -> Self {
        Self::new(DEFAULT_ENCODING)
    }
}

impl PercentCodec {
    /// Creates a codec for the given encoding label. The label is checked lazily.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Returns the configured encoding label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns true when the label names UTF-8 (`UTF-8`, `utf8`, ...).
    #[must_use]
    pub fn is_supported(&self) -> bool {
        is_utf8_label(&self.label)
    }

    fn ensure_supported(&self) -> Result<(), EncodeError> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(EncodeError::unsupported_encoding(&self.label))
        }
    }

    /// Percent-encodes a single query/form component.
    ///
    /// Everything outside `A-Z a-z 0-9 - _ . ~` is escaped; spaces become `%20`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnsupportedEncoding`] for non-UTF-8 labels.
    pub fn encode(&self, value: &str) -> Result<String, EncodeError> {
        self.ensure_supported()?;
        Ok(urlencoding::encode(value).into_owned())
    }

    /// Decodes a percent-encoded component; `+` decodes to a space.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnsupportedEncoding`] for non-UTF-8 labels and
    /// [`EncodeError::InvalidUtf8`] when the escapes do not form UTF-8.
    pub fn decode(&self, value: &str) -> Result<String, EncodeError> {
        self.ensure_supported()?;
        let spaced = value.replace('+', " ");
        urlencoding::decode(&spaced)
            .map(std::borrow::Cow::into_owned)
            .map_err(|_| EncodeError::invalid_utf8(value))
    }

    /// Like [`encode`](Self::encode) but returns an empty string on failure.
    #[must_use]
    pub fn encode_or_empty(&self, value: &str) -> String {
        self.encode(value).unwrap_or_else(|error| {
            warn!(error = %error, "percent-encoding failed, substituting empty string");
            String::new()
        })
    }

    /// Like [`decode`](Self::decode) but returns an empty string on failure.
    #[must_use]
    pub fn decode_or_empty(&self, value: &str) -> String {
        self.decode(value).unwrap_or_else(|error| {
            warn!(error = %error, "percent-decoding failed, substituting empty string");
            String::new()
        })
    }
}

fn is_utf8_label(label: &str) -> bool {
    let normalized: String = label
        .trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect();
    normalized.eq_ignore_ascii_case("utf8")
}

/// Returns true when the value is empty or whitespace only.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
