//! Shared cookie store.
//!
//! A [`CookieJar`] is a cheap handle around a `reqwest::cookie::Jar`; clones
//! share the same cookies. Clients either receive a jar explicitly or fall back
//! to [`CookieJar::process_default`], which is created on first use and lives
//! for the rest of the process.

use std::fmt;
use std::sync::{Arc, OnceLock};

use reqwest::cookie::{CookieStore, Jar};
use tracing::{debug, info};
use url::Url;

use crate::client::HttpError;
use crate::encoding::percent::is_blank;

static PROCESS_DEFAULT: OnceLock<CookieJar> = OnceLock::new();

/// Handle to a cookie store shared between requests and clients.
#[derive(Clone, Default)]
pub struct CookieJar {
    inner: Arc<Jar>,
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Cookie values are sensitive; never print the store contents.
        f.debug_struct("CookieJar").finish_non_exhaustive()
    }
}

impl CookieJar {
    /// Creates an empty, independent cookie jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide jar, creating it on first call.
    ///
    /// Every client with cookies enabled and no injected jar shares this store.
    #[must_use]
    pub fn process_default() -> Self {
        PROCESS_DEFAULT
            .get_or_init(|| {
                info!("installing process-wide cookie store");
                Self::new()
            })
            .clone()
    }

    /// Returns true when both handles point at the same store.
    #[must_use]
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Adds a cookie for `uri` with explicit domain and path attributes.
    ///
    /// Blank arguments make this a no-op, mirroring the lenient setter style of
    /// the rest of the client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] when `uri` cannot be parsed.
    pub fn add_cookie(
        &self,
        uri: &str,
        domain: &str,
        path: &str,
        name: &str,
        value: &str,
    ) -> Result<(), HttpError> {
        if [uri, domain, path, name, value].iter().any(|s| is_blank(s)) {
            return Ok(());
        }
        let url = Url::parse(uri.trim()).map_err(|_| HttpError::invalid_url(uri))?;
        let set_cookie = format!(
            "{}={}; Domain={}; Path={}",
            name.trim(),
            value.trim(),
            domain.trim(),
            path.trim()
        );
        self.inner.add_cookie_str(&set_cookie, &url);
        debug!(domain = %domain.trim(), name = %name.trim(), "added cookie");
        Ok(())
    }

    /// Adds a cookie from a raw `Set-Cookie` header value as if `url` sent it.
    pub fn add_set_cookie(&self, set_cookie: &str, url: &Url) {
        self.inner.add_cookie_str(set_cookie, url);
    }

    /// The `Cookie` header value that would be sent to `url`, if any.
    #[must_use]
    pub fn cookie_header(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        self.inner
            .cookies(&url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// The underlying store, for wiring into the transport.
    pub(crate) fn provider(&self) -> Arc<Jar> {
        Arc::clone(&self.inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_cookie_is_visible_for_matching_url() {
        let jar = CookieJar::new();
        jar.add_cookie("https://example.com/", "example.com", "/", "sid", "abc")
            .unwrap();
        assert_eq!(
            jar.cookie_header("https://example.com/account").as_deref(),
            Some("sid=abc")
        );
        assert_eq!(jar.cookie_header("https://other.org/"), None);
    }

    #[test]
    fn test_add_cookie_blank_argument_is_noop() {
        let jar = CookieJar::new();
        jar.add_cookie("https://example.com/", "", "/", "sid", "abc")
            .unwrap();
        assert_eq!(jar.cookie_header("https://example.com/"), None);
    }

    #[test]
    fn test_add_cookie_invalid_uri_is_error() {
        let jar = CookieJar::new();
        let result = jar.add_cookie("not a url", "example.com", "/", "a", "b");
        assert!(matches!(result, Err(HttpError::InvalidUrl { .. })));
    }

    #[test]
    fn test_clones_share_store() {
        let jar = CookieJar::new();
        let clone = jar.clone();
        let url = Url::parse("http://example.com/").unwrap();
        clone.add_set_cookie("k=v", &url);
        assert_eq!(jar.cookie_header("http://example.com/").as_deref(), Some("k=v"));
        assert!(jar.same_store(&clone));
        assert!(!jar.same_store(&CookieJar::new()));
    }

    #[test]
    fn test_process_default_is_singleton() {
        assert!(CookieJar::process_default().same_store(&CookieJar::process_default()));
    }
}
