//! Netscape cookie file import.
//!
//! Parses the Netscape HTTP cookie file format (7 TAB-separated fields per
//! line, as exported by browsers and curl) into a [`CookieJar`].

use std::fmt;
use std::io::BufRead;
use std::time::{Duration, UNIX_EPOCH};

use tracing::{debug, instrument, warn};
use url::Url;

use super::jar::CookieJar;

/// One cookie parsed from a Netscape cookie file.
///
/// The value is redacted in `Debug` output.
#[derive(Clone)]
pub struct CookieLine {
    /// Domain the cookie belongs to (e.g. `.example.com`).
    pub domain: String,
    /// Whether subdomains match.
    pub include_subdomains: bool,
    /// URL path scope.
    pub path: String,
    /// Only sent over HTTPS.
    pub secure: bool,
    /// Unix expiry timestamp (0 = session cookie).
    pub expires: u64,
    /// Cookie name.
    pub name: String,
    value: String,
}

impl CookieLine {
    /// Returns the cookie value. Avoid logging it.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Renders the cookie as a `Set-Cookie` header value.
    #[must_use]
    pub fn to_set_cookie(&self) -> String {
        let mut parts = vec![
            format!("{}={}", self.name, self.value),
            format!("Domain={}", self.domain),
            format!("Path={}", self.path),
        ];
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.expires > 0 {
            match UNIX_EPOCH.checked_add(Duration::from_secs(self.expires)) {
                Some(when) => parts.push(format!("Expires={}", httpdate::fmt_http_date(when))),
                None => warn!(
                    domain = %self.domain,
                    name = %self.name,
                    "cookie expiry overflows; treating as session cookie"
                ),
            }
        }
        parts.join("; ")
    }

    fn origin(&self) -> Option<Url> {
        let host = self.domain.trim_start_matches('.');
        let scheme = if self.secure { "https" } else { "http" };
        Url::parse(&format!("{scheme}://{host}{}", self.path)).ok()
    }
}

impl fmt::Debug for CookieLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieLine")
            .field("domain", &self.domain)
            .field("include_subdomains", &self.include_subdomains)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("expires", &self.expires)
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Errors from reading a cookie file.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    /// A data line is malformed.
    #[error("line {line_number}: {reason}")]
    InvalidLine {
        /// 1-based line number.
        line_number: usize,
        /// What was wrong.
        reason: String,
    },

    /// The file could not be read.
    #[error("failed to read cookie file: {0}")]
    Io(#[from] std::io::Error),

    /// A non-empty file yielded no cookies.
    #[error("no valid cookies found ({malformed_count} malformed lines)")]
    NoCookiesFound {
        /// Number of malformed lines.
        malformed_count: usize,
    },
}

/// Parsed cookies plus the malformed lines that were skipped.
#[derive(Debug, Default)]
pub struct ParsedCookies {
    /// Successfully parsed cookies.
    pub cookies: Vec<CookieLine>,
    /// `(line number, reason)` for every skipped line.
    pub warnings: Vec<(usize, String)>,
}

/// Parses a Netscape cookie file.
///
/// Blank lines and `#` comments are skipped, except the `#HttpOnly_` prefix
/// which marks an HTTP-only cookie and is stripped.
///
/// # Errors
///
/// Returns [`CookieError::Io`] on read failure and
/// [`CookieError::NoCookiesFound`] when data lines exist but none parse.
#[instrument(level = "debug", skip(reader))]
pub fn parse_netscape_cookies(reader: impl BufRead) -> Result<ParsedCookies, CookieError> {
    let mut parsed = ParsedCookies::default();
    let mut data_lines = 0;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let line = line.trim_end();
        let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        data_lines += 1;

        match parse_line(line, line_number) {
            Ok(cookie) => parsed.cookies.push(cookie),
            Err(error) => {
                warn!(line = line_number, reason = %error, "skipping malformed cookie line");
                parsed.warnings.push((line_number, error.to_string()));
            }
        }
    }

    if parsed.cookies.is_empty() && data_lines > 0 {
        return Err(CookieError::NoCookiesFound {
            malformed_count: parsed.warnings.len(),
        });
    }
    Ok(parsed)
}

fn parse_line(line: &str, line_number: usize) -> Result<CookieLine, CookieError> {
    let invalid = |reason: String| CookieError::InvalidLine {
        line_number,
        reason,
    };

    let fields: Vec<&str> = line.split('\t').collect();
    let [domain, subdomains, path, secure, expires, name, value] = fields.as_slice() else {
        return Err(invalid(format!(
            "expected 7 TAB-separated fields, found {}",
            fields.len()
        )));
    };

    let flag = |raw: &str, field: &str| match raw {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(invalid(format!("{field} must be TRUE or FALSE, got '{raw}'"))),
    };

    if domain.is_empty() {
        return Err(invalid("domain field is empty".to_string()));
    }
    if name.is_empty() {
        return Err(invalid("cookie name field is empty".to_string()));
    }
    let expires = expires
        .parse::<u64>()
        .map_err(|_| invalid(format!("expires must be a non-negative integer, got '{expires}'")))?;

    Ok(CookieLine {
        domain: (*domain).to_string(),
        include_subdomains: flag(subdomains, "include_subdomains")?,
        path: (*path).to_string(),
        secure: flag(secure, "secure")?,
        expires,
        name: (*name).to_string(),
        value: (*value).to_string(),
    })
}

/// Adds parsed cookies to `jar`, returning how many were accepted.
pub fn load_into_jar(cookies: &[CookieLine], jar: &CookieJar) -> usize {
    let mut loaded = 0;
    for cookie in cookies {
        if let Some(origin) = cookie.origin() {
            jar.add_set_cookie(&cookie.to_set_cookie(), &origin);
            debug!(domain = %cookie.domain, name = %cookie.name, "loaded cookie");
            loaded += 1;
        } else {
            warn!(domain = %cookie.domain, name = %cookie.name, "skipping cookie with unparseable domain");
        }
    }
    loaded
}
