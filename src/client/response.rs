//! Turning responses into the strings returned by the verb methods.

use reqwest::blocking::Response;
use reqwest::header::HeaderMap;

use super::error::HttpError;

/// Reads the whole body, success or error status alike, and rebuilds it with
/// `\r\n` line terminators.
///
/// The response charset wins; `default_encoding` applies when none is given.
pub(crate) fn read_text(
    response: Response,
    url: &str,
    default_encoding: &str,
) -> Result<String, HttpError> {
    let text = response
        .text_with_charset(default_encoding)
        .map_err(|e| HttpError::transport(url, e))?;
    Ok(rebuild_lines(&text))
}

/// Splits on `\n`, `\r\n` or `\r` and terminates every line with `\r\n`.
#[must_use]
pub fn rebuild_lines(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(normalized.len() + normalized.len() / 16);
    for line in normalized.split_terminator('\n') {
        out.push_str(line);
        out.push_str("\r\n");
    }
    out
}

/// Serializes a header map as `\r\n<name>=[<v1>, <v2>]` entries, one per
/// header name.
#[must_use]
pub fn serialize_headers(headers: &HeaderMap) -> String {
    let mut out = String::new();
    for name in headers.keys() {
        let values: Vec<String> = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();
        out.push_str("\r\n");
        out.push_str(name.as_str());
        out.push_str("=[");
        out.push_str(&values.join(", "));
        out.push(']');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, SET_COOKIE};

    #[test]
    fn test_rebuild_lines_normalizes_terminators() {
        assert_eq!(rebuild_lines("a\nb\r\nc\rd"), "a\r\nb\r\nc\r\nd\r\n");
        assert_eq!(rebuild_lines("one\n"), "one\r\n");
        assert_eq!(rebuild_lines("\n\n"), "\r\n\r\n");
        assert_eq!(rebuild_lines(""), "");
    }

    #[test]
    fn test_rebuild_lines_keeps_whitespace() {
        assert_eq!(rebuild_lines("  indented  \n"), "  indented  \r\n");
    }

    #[test]
    fn test_serialize_headers_groups_values() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", HeaderValue::from_static("12"));
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        let out = serialize_headers(&headers);
        assert!(out.contains("\r\ncontent-length=[12]"), "got {out:?}");
        assert!(out.contains("\r\nset-cookie=[a=1, b=2]"), "got {out:?}");
        assert_eq!(out.matches("\r\n").count(), 2);
    }

    #[test]
    fn test_serialize_empty_map() {
        assert_eq!(serialize_headers(&HeaderMap::new()), "");
    }
}
