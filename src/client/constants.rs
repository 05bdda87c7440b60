//! Constants for the client module (timeouts, content types, size bounds).

use std::time::Duration;

/// Default connect timeout (10 seconds).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read timeout (10 seconds).
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// `text/plain`
pub const CONTENT_TYPE_TEXT: &str = "text/plain";
/// `text/html`
pub const CONTENT_TYPE_HTML: &str = "text/html";
/// `text/xml`
pub const CONTENT_TYPE_XML: &str = "text/xml";
/// `application/x-www-form-urlencoded`, the default for POST and PUT.
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
/// `application/json`
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Downloads advertising fewer bytes than this are rejected by default.
pub const DOWNLOAD_MIN_SIZE: u64 = 100;

/// Downloads advertising more bytes than this are rejected by default (50 MiB).
pub const DOWNLOAD_MAX_SIZE: u64 = 50 * 1024 * 1024;

/// Default HTTPS protocol name.
pub const HTTPS_PROTOCOL: &str = "TLS";
