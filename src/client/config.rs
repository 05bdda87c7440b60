//! Client configuration.
//!
//! [`ClientConfig`] is an immutable value assembled with chained `with_*`
//! setters and handed to [`HttpClient::new`](super::HttpClient::new).

use std::time::Duration;

use super::constants::{
    CONNECT_TIMEOUT, CONTENT_TYPE_FORM, DOWNLOAD_MAX_SIZE, DOWNLOAD_MIN_SIZE, HTTPS_PROTOCOL,
    READ_TIMEOUT,
};
use super::error::HttpError;
use crate::cookies::CookieJar;
use crate::encoding::PercentCodec;
use crate::encoding::percent::{DEFAULT_ENCODING, is_blank};
use crate::user_agent;

/// Per-client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Duration,
    pub(crate) encoding: String,
    pub(crate) content_type: String,
    pub(crate) referer: Option<String>,
    pub(crate) user_agent: String,
    pub(crate) gzip: bool,
    pub(crate) follow_redirects: bool,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) use_cookies: bool,
    pub(crate) cookie_jar: Option<CookieJar>,
    pub(crate) download_min_size: u64,
    pub(crate) download_max_size: u64,
    pub(crate) ignore_https: bool,
    pub(crate) https_protocol: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            encoding: DEFAULT_ENCODING.to_string(),
            content_type: CONTENT_TYPE_FORM.to_string(),
            referer: None,
            user_agent: user_agent::default_user_agent().to_string(),
            gzip: false,
            follow_redirects: false,
            headers: Vec::new(),
            use_cookies: true,
            cookie_jar: None,
            download_min_size: DOWNLOAD_MIN_SIZE,
            download_max_size: DOWNLOAD_MAX_SIZE,
            ignore_https: false,
            https_protocol: HTTPS_PROTOCOL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with every default applied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the text encoding label used for percent-encoding and response text.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Sets the default `Content-Type` injected into POST and PUT requests.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Sets the referer sent with the first request.
    #[must_use]
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        let referer = referer.into();
        self.referer = (!is_blank(&referer)).then_some(referer);
        self
    }

    /// Sets the `User-Agent` header value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Requests gzip responses (`Accept-Encoding: gzip`) with transparent
    /// decompression.
    #[must_use]
    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    /// Enables or disables following redirects.
    #[must_use]
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Replaces the configured header list.
    #[must_use]
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Appends one header. Blank names are ignored; a repeated name replaces
    /// the earlier value in place.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_header(name.into(), value.into());
        self
    }

    pub(crate) fn push_header(&mut self, name: String, value: String) {
        if is_blank(&name) {
            return;
        }
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Enables or disables the cookie store.
    #[must_use]
    pub fn with_cookies(mut self, use_cookies: bool) -> Self {
        self.use_cookies = use_cookies;
        self
    }

    /// Injects a cookie jar. Without one the process-wide jar is used.
    #[must_use]
    pub fn with_cookie_jar(mut self, jar: CookieJar) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Sets the smallest accepted download size in bytes.
    #[must_use]
    pub fn with_download_min_size(mut self, bytes: u64) -> Self {
        self.download_min_size = bytes;
        self
    }

    /// Sets the largest accepted download size in bytes.
    #[must_use]
    pub fn with_download_max_size(mut self, bytes: u64) -> Self {
        self.download_max_size = bytes;
        self
    }

    /// Accepts any server certificate and host name for this client.
    #[must_use]
    pub fn with_ignore_https(mut self, ignore: bool) -> Self {
        self.ignore_https = ignore;
        self
    }

    /// Sets the HTTPS protocol name (`TLS`, `TLSv1.2`, `TLSv1.3`, ...).
    #[must_use]
    pub fn with_https_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.https_protocol = protocol.into();
        self
    }

    /// Connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Default POST/PUT content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// User-Agent header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Configured headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Download size window `(min, max)`.
    #[must_use]
    pub fn download_bounds(&self) -> (u64, u64) {
        (self.download_min_size, self.download_max_size)
    }

    /// Percent codec for the configured encoding.
    #[must_use]
    pub fn codec(&self) -> PercentCodec {
        PercentCodec::new(self.encoding.clone())
    }

    /// Checks the settings that cannot be applied lazily.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Configuration`] when the download window is
    /// inverted, a timeout is zero, or the encoding is not supported.
    pub fn validate(&self) -> Result<(), HttpError> {
        if self.download_min_size > self.download_max_size {
            return Err(HttpError::configuration(format!(
                "download min size {} exceeds max size {}",
                self.download_min_size, self.download_max_size
            )));
        }
        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(HttpError::configuration("timeouts must be non-zero"));
        }
        if !self.codec().is_supported() {
            return Err(HttpError::configuration(format!(
                "unsupported encoding {}",
                self.encoding
            )));
        }
        Ok(())
    }
}
