//! The stateful blocking HTTP client.

use std::path::PathBuf;

use reqwest::Method;
use reqwest::blocking::{Body, Response};
use tracing::{debug, instrument};

use super::config::ClientConfig;
use super::connection::ConnectionManager;
use super::error::HttpError;
use super::response::{read_text, serialize_headers};
use crate::cookies::CookieJar;
use crate::encoding::percent::is_blank;
use crate::encoding::{FormData, MultipartBody, build_url, build_url_sorted, encode_form};

/// Field name used by [`HttpClient::upload`].
pub const DEFAULT_UPLOAD_FIELD: &str = "file";

/// Outbound payload of one request.
pub(crate) enum RequestBody {
    Empty,
    Bytes(Vec<u8>),
    Multipart(MultipartBody),
}

/// Blocking HTTP client.
///
/// Every verb method takes `&mut self`: the referer chain advances with each
/// request, so one instance serves one caller at a time.
///
/// # Example
///
/// ```no_run
/// use webfetch_core::{ClientConfig, HttpClient};
///
/// # fn example() -> Result<(), webfetch_core::HttpError> {
/// let mut client = HttpClient::new(ClientConfig::new().with_gzip(true))?;
/// let page = client.get("https://example.com/")?;
/// println!("{page}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpClient {
    connection: ConnectionManager,
}

impl HttpClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Configuration`] when the configuration is invalid
    /// (for example min size above max size) or the transport cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, HttpError> {
        Ok(Self {
            connection: ConnectionManager::new(config)?,
        })
    }

    /// Creates a client with the default configuration.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_defaults() -> Result<Self, HttpError> {
        Self::new(ClientConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        self.connection.config()
    }

    /// The referer the next request will send, once known.
    #[must_use]
    pub fn referer(&self) -> Option<&str> {
        self.connection.referer().current()
    }

    /// The cookie jar in use, or `None` when cookies are disabled.
    #[must_use]
    pub fn cookie_jar(&self) -> Option<&CookieJar> {
        self.connection.cookie_jar()
    }

    /// Adds or replaces a header sent with every following request.
    /// Blank keys are ignored.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.connection
            .config_mut()
            .push_header(key.into(), value.into());
    }

    /// Sends a GET request and returns the body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::EmptyArgument`] or [`HttpError::InvalidUrl`] for a
    /// bad URL, and [`HttpError::Network`] or [`HttpError::Timeout`] when the
    /// exchange fails. HTTP error statuses are not errors; their body is
    /// returned.
    #[instrument(skip(self), fields(url = %url))]
    pub fn get(&mut self, url: &str) -> Result<String, HttpError> {
        self.execute(Method::GET, url, RequestBody::Empty)
    }

    /// Sends a GET request with a flat `key, value, key, value` parameter list,
    /// kept in caller order. Repeated keys are all sent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an odd number of items, otherwise the
    /// same errors as [`get`](Self::get).
    #[instrument(skip(self, pairs), fields(url = %url))]
    pub fn get_with_pairs<S: AsRef<str>>(
        &mut self,
        url: &str,
        pairs: &[S],
    ) -> Result<String, HttpError> {
        let params = FormData::from_flat_repeating(pairs)?;
        let target = build_url(url, &params, self.connection.codec());
        self.execute(Method::GET, &target, RequestBody::Empty)
    }

    /// Sends a GET request with keyword parameters, keys sorted
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    #[instrument(skip(self, params), fields(url = %url))]
    pub fn get_with_map(&mut self, url: &str, params: &FormData) -> Result<String, HttpError> {
        let target = build_url_sorted(url, params, self.connection.codec());
        self.execute(Method::GET, &target, RequestBody::Empty)
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    #[instrument(skip(self), fields(url = %url))]
    pub fn delete(&mut self, url: &str) -> Result<String, HttpError> {
        self.execute(Method::DELETE, url, RequestBody::Empty)
    }

    /// Sends a HEAD request and returns the serialized response headers.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    #[instrument(skip(self), fields(url = %url))]
    pub fn head(&mut self, url: &str) -> Result<String, HttpError> {
        self.execute(Method::HEAD, url, RequestBody::Empty)
    }

    /// Sends an OPTIONS request.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    #[instrument(skip(self), fields(url = %url))]
    pub fn options(&mut self, url: &str) -> Result<String, HttpError> {
        self.execute(Method::OPTIONS, url, RequestBody::Empty)
    }

    /// Sends a body-less request with an arbitrary method name.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::EmptyArgument`] for a blank method and
    /// [`HttpError::Configuration`] for a method name that is not a valid
    /// token, otherwise the same errors as [`get`](Self::get).
    #[instrument(skip(self), fields(url = %url, method = %method))]
    pub fn request(&mut self, url: &str, method: &str) -> Result<String, HttpError> {
        let method = parse_method(method)?;
        self.execute(method, url, RequestBody::Empty)
    }

    /// POSTs an `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    #[instrument(skip(self, form), fields(url = %url))]
    pub fn post_form(&mut self, url: &str, form: &FormData) -> Result<String, HttpError> {
        let body = encode_form(form, self.connection.codec());
        self.execute(Method::POST, url, RequestBody::Bytes(body.into_bytes()))
    }

    /// POSTs a form given as a flat `key, value, key, value` list.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an odd number of items, otherwise the
    /// same errors as [`get`](Self::get).
    #[instrument(skip(self, pairs), fields(url = %url))]
    pub fn post_pairs<S: AsRef<str>>(
        &mut self,
        url: &str,
        pairs: &[S],
    ) -> Result<String, HttpError> {
        let form = FormData::from_flat(pairs)?;
        self.post_form(url, &form)
    }

    /// POSTs a text payload verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::EmptyArgument`] for empty content, otherwise the
    /// same errors as [`get`](Self::get).
    #[instrument(skip(self, content), fields(url = %url, bytes = content.len()))]
    pub fn post_text(&mut self, url: &str, content: &str) -> Result<String, HttpError> {
        self.send_raw(Method::POST, url, content.as_bytes())
    }

    /// POSTs a byte payload verbatim.
    ///
    /// # Errors
    ///
    /// Same as [`post_text`](Self::post_text).
    #[instrument(skip(self, content), fields(url = %url, bytes = content.len()))]
    pub fn post_bytes(&mut self, url: &str, content: &[u8]) -> Result<String, HttpError> {
        self.send_raw(Method::POST, url, content)
    }

    /// PUTs a text payload verbatim.
    ///
    /// # Errors
    ///
    /// Same as [`post_text`](Self::post_text).
    #[instrument(skip(self, content), fields(url = %url, bytes = content.len()))]
    pub fn put_text(&mut self, url: &str, content: &str) -> Result<String, HttpError> {
        self.send_raw(Method::PUT, url, content.as_bytes())
    }

    /// PUTs an `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    #[instrument(skip(self, form), fields(url = %url))]
    pub fn put_form(&mut self, url: &str, form: &FormData) -> Result<String, HttpError> {
        let body = encode_form(form, self.connection.codec());
        self.execute(Method::PUT, url, RequestBody::Bytes(body.into_bytes()))
    }

    /// POSTs a `multipart/form-data` body of text fields and file attachments.
    ///
    /// Attachments whose path does not exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Encode`] when an existing attachment cannot be
    /// opened, otherwise the same errors as [`get`](Self::get).
    #[instrument(skip(self, fields, files), fields(url = %url, files = files.len()))]
    pub fn post_multipart(
        &mut self,
        url: &str,
        fields: &FormData,
        files: &[(String, PathBuf)],
    ) -> Result<String, HttpError> {
        let body = MultipartBody::new(fields, files)?;
        self.execute(Method::POST, url, RequestBody::Multipart(body))
    }

    /// Uploads one file under the field name `file`.
    ///
    /// # Errors
    ///
    /// Same as [`upload_as`](Self::upload_as).
    pub fn upload(&mut self, url: &str, path: impl Into<PathBuf>) -> Result<String, HttpError> {
        self.upload_as(url, DEFAULT_UPLOAD_FIELD, path)
    }

    /// Uploads one file under the given field name.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::EmptyArgument`] for a blank key or empty path,
    /// otherwise the same errors as [`post_multipart`](Self::post_multipart).
    pub fn upload_as(
        &mut self,
        url: &str,
        key: &str,
        path: impl Into<PathBuf>,
    ) -> Result<String, HttpError> {
        let path = path.into();
        if is_blank(key) {
            return Err(HttpError::empty("upload field name"));
        }
        if path.as_os_str().is_empty() {
            return Err(HttpError::empty("upload path"));
        }
        self.upload_files(url, &[(key.trim().to_string(), path)])
    }

    /// Uploads several files, each under its own field name.
    ///
    /// # Errors
    ///
    /// Same as [`post_multipart`](Self::post_multipart).
    pub fn upload_files(
        &mut self,
        url: &str,
        files: &[(String, PathBuf)],
    ) -> Result<String, HttpError> {
        self.post_multipart(url, &FormData::new(), files)
    }

    fn send_raw(&mut self, method: Method, url: &str, content: &[u8]) -> Result<String, HttpError> {
        if content.is_empty() {
            return Err(HttpError::empty("content"));
        }
        self.execute(method, url, RequestBody::Bytes(content.to_vec()))
    }

    fn execute(&mut self, method: Method, url: &str, body: RequestBody) -> Result<String, HttpError> {
        let is_head = method == Method::HEAD;
        let (response, target) = self.send(method, url, body)?;
        if is_head {
            return Ok(serialize_headers(response.headers()));
        }
        read_text(response, &target, self.connection.codec().label())
    }

    /// Opens the connection, writes the payload and returns the response with
    /// the URL actually requested.
    pub(crate) fn send(
        &mut self,
        method: Method,
        url: &str,
        body: RequestBody,
    ) -> Result<(Response, String), HttpError> {
        let content_type = match &body {
            RequestBody::Multipart(multipart) => Some(multipart.content_type()),
            RequestBody::Empty | RequestBody::Bytes(_) => None,
        };
        let (builder, target) = self
            .connection
            .open(method, url, content_type.as_deref())?;

        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Bytes(bytes) => builder.body(bytes),
            RequestBody::Multipart(multipart) => {
                let length = multipart.content_length();
                builder.body(Body::sized(multipart.into_reader(), length))
            }
        };

        let response = builder
            .send()
            .map_err(|e| HttpError::transport(&target, e))?;
        debug!(status = response.status().as_u16(), url = %target, "response received");
        Ok((response, target))
    }
}

fn parse_method(method: &str) -> Result<Method, HttpError> {
    if is_blank(method) {
        return Err(HttpError::empty("method"));
    }
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| HttpError::configuration(format!("invalid HTTP method {method}")))
}
