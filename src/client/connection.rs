//! Transport construction and per-request preparation.

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT};
use reqwest::redirect::Policy;
use tracing::debug;
use url::Url;

use super::config::ClientConfig;
use super::error::HttpError;
use super::tls::TlsPolicy;
use crate::cookies::CookieJar;
use crate::encoding::PercentCodec;
use crate::encoding::percent::is_blank;
use crate::encoding::query::{encode_non_ascii_query, encode_non_ascii_runs};

/// The referer sent with the next request.
///
/// Unset until the first request, which then uses its own URL. After every
/// validated URL the chain remembers that URL for the following call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefererChain {
    current: Option<String>,
}

impl RefererChain {
    /// Starts a chain, optionally with an initial referer.
    #[must_use]
    pub fn new(initial: Option<String>) -> Self {
        Self { current: initial }
    }

    /// The referer that the next request will send, if already known.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Returns the referer for a request to `url` and records `url` as the
    /// referer of the next request.
    pub fn advance(&mut self, url: &str) -> String {
        let referer = self.current.take().unwrap_or_else(|| url.to_string());
        self.current = Some(url.to_string());
        referer
    }
}

/// Owns the transport and the mutable per-client request state.
#[derive(Debug)]
pub struct ConnectionManager {
    client: Client,
    config: ClientConfig,
    codec: PercentCodec,
    referer: RefererChain,
    cookie_jar: Option<CookieJar>,
}

impl ConnectionManager {
    /// Validates `config` and builds the underlying transport.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Configuration`] for invalid settings or when the
    /// transport cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        config.validate()?;

        let cookie_jar = config.use_cookies.then(|| {
            config
                .cookie_jar
                .clone()
                .unwrap_or_else(CookieJar::process_default)
        });
        let client = build_client(&config, cookie_jar.as_ref())?;
        debug!(
            gzip = config.gzip,
            follow_redirects = config.follow_redirects,
            cookies = cookie_jar.is_some(),
            ignore_https = config.ignore_https,
            "built HTTP transport"
        );

        Ok(Self {
            client,
            codec: config.codec(),
            referer: RefererChain::new(config.referer.clone()),
            config,
            cookie_jar,
        })
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub(crate) fn codec(&self) -> &PercentCodec {
        &self.codec
    }

    pub(crate) fn referer(&self) -> &RefererChain {
        &self.referer
    }

    pub(crate) fn cookie_jar(&self) -> Option<&CookieJar> {
        self.cookie_jar.as_ref()
    }

    /// Prepares a request: validates the URL, advances the referer chain and
    /// attaches the resolved headers.
    ///
    /// Returns the builder and the URL actually requested.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::EmptyArgument`] for a blank URL,
    /// [`HttpError::InvalidUrl`] when it does not parse and
    /// [`HttpError::InvalidHeader`] for unusable configured headers.
    pub fn open(
        &mut self,
        method: Method,
        url: &str,
        body_content_type: Option<&str>,
    ) -> Result<(RequestBuilder, String), HttpError> {
        if is_blank(url) {
            return Err(HttpError::empty("url"));
        }
        let target = encode_non_ascii_query(url.trim(), &self.codec);
        let parsed = Url::parse(&target).map_err(|_| HttpError::invalid_url(url))?;

        let referer = self.referer.advance(&target);
        let headers = resolve_headers(
            &self.config,
            &self.codec,
            &method,
            &referer,
            body_content_type,
        )?;
        debug!(method = %method, url = %target, referer = %referer, "opening request");

        Ok((self.client.request(method, parsed).headers(headers), target))
    }
}

fn build_client(config: &ClientConfig, cookie_jar: Option<&CookieJar>) -> Result<Client, HttpError> {
    let redirect = if config.follow_redirects {
        Policy::default()
    } else {
        Policy::none()
    };
    let mut builder = Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.read_timeout)
        .gzip(config.gzip)
        .redirect(redirect);
    if let Some(jar) = cookie_jar {
        builder = builder.cookie_provider(jar.provider());
    }
    builder = TlsPolicy::new(config.ignore_https, &config.https_protocol).apply(builder);

    builder
        .build()
        .map_err(|e| HttpError::configuration(format!("failed to build HTTP transport: {e}")))
}

/// Builds the header map for one request.
///
/// Configured headers override `User-Agent` and `Referer`; a body-specific
/// content type (multipart) overrides everything; otherwise POST and PUT get
/// the configured default when no `Content-Type` header is set.
pub(crate) fn resolve_headers(
    config: &ClientConfig,
    codec: &PercentCodec,
    method: &Method,
    referer: &str,
    body_content_type: Option<&str>,
) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, USER_AGENT.as_str(), &config.user_agent, codec)?;
    insert_header(&mut headers, REFERER.as_str(), referer, codec)?;

    for (name, value) in &config.headers {
        if is_blank(name) {
            continue;
        }
        insert_header(&mut headers, name.trim(), value, codec)?;
    }

    if let Some(content_type) = body_content_type {
        insert_header(&mut headers, CONTENT_TYPE.as_str(), content_type, codec)?;
    } else if (*method == Method::POST || *method == Method::PUT)
        && !headers.contains_key(CONTENT_TYPE)
        && !is_blank(&config.content_type)
    {
        insert_header(&mut headers, CONTENT_TYPE.as_str(), &config.content_type, codec)?;
    }
    Ok(headers)
}

fn insert_header(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    codec: &PercentCodec,
) -> Result<(), HttpError> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| HttpError::invalid_header(name))?;
    let value = if value.is_ascii() {
        value.to_string()
    } else {
        encode_non_ascii_runs(value, codec)
    };
    let header_value = HeaderValue::from_str(&value).map_err(|_| HttpError::invalid_header(name))?;
    headers.insert(header_name, header_value);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::constants::CONTENT_TYPE_JSON;

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_referer_chain_defaults_to_first_url() {
        let mut chain = RefererChain::default();
        assert_eq!(chain.advance("http://a/1"), "http://a/1");
        assert_eq!(chain.advance("http://a/2"), "http://a/1");
        assert_eq!(chain.current(), Some("http://a/2"));
    }

    #[test]
    fn test_referer_chain_uses_initial_value() {
        let mut chain = RefererChain::new(Some("http://start/".to_string()));
        assert_eq!(chain.advance("http://a/1"), "http://start/");
        assert_eq!(chain.current(), Some("http://a/1"));
    }

    #[test]
    fn test_post_gets_default_content_type() {
        let config = ClientConfig::default();
        let headers =
            resolve_headers(&config, &config.codec(), &Method::POST, "http://r/", None).unwrap();
        assert_eq!(
            header(&headers, "content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(header(&headers, "referer"), Some("http://r/"));
        assert_eq!(header(&headers, "user-agent"), Some(config.user_agent()));
        // The config itself is not touched.
        assert!(config.headers().is_empty());
    }

    #[test]
    fn test_get_has_no_content_type() {
        let config = ClientConfig::default();
        let headers =
            resolve_headers(&config, &config.codec(), &Method::GET, "http://r/", None).unwrap();
        assert!(!headers.contains_key(CONTENT_TYPE));
    }

    #[test]
    fn test_configured_content_type_wins_over_default() {
        let config = ClientConfig::default().with_header("Content-Type", CONTENT_TYPE_JSON);
        let headers =
            resolve_headers(&config, &config.codec(), &Method::PUT, "http://r/", None).unwrap();
        assert_eq!(header(&headers, "content-type"), Some(CONTENT_TYPE_JSON));
    }

    #[test]
    fn test_body_content_type_overrides_configured() {
        let config = ClientConfig::default().with_header("Content-Type", CONTENT_TYPE_JSON);
        let headers = resolve_headers(
            &config,
            &config.codec(),
            &Method::POST,
            "http://r/",
            Some("multipart/form-data;boundary=------1"),
        )
        .unwrap();
        assert_eq!(
            header(&headers, "content-type"),
            Some("multipart/form-data;boundary=------1")
        );
    }

    #[test]
    fn test_non_ascii_header_value_is_percent_encoded() {
        let config = ClientConfig::default().with_header("X-Name", "张 三");
        let headers =
            resolve_headers(&config, &config.codec(), &Method::GET, "http://r/", None).unwrap();
        assert_eq!(header(&headers, "x-name"), Some("%E5%BC%A0%20%E4%B8%89"));
    }

    #[test]
    fn test_invalid_header_name_is_error() {
        let config = ClientConfig::default().with_header("Bad Name", "v");
        let result = resolve_headers(&config, &config.codec(), &Method::GET, "http://r/", None);
        assert!(matches!(result, Err(HttpError::InvalidHeader { name }) if name == "Bad Name"));
    }

    #[test]
    fn test_open_rejects_blank_and_invalid_urls_without_advancing() {
        let mut manager =
            ConnectionManager::new(ClientConfig::default().with_cookies(false)).unwrap();
        assert!(matches!(
            manager.open(Method::GET, "  ", None),
            Err(HttpError::EmptyArgument { what: "url" })
        ));
        assert!(matches!(
            manager.open(Method::GET, "not a url", None),
            Err(HttpError::InvalidUrl { .. })
        ));
        assert_eq!(manager.referer().current(), None);
    }
}
