//! Query-string construction and the non-ASCII query guard.

use std::sync::LazyLock;

use regex::Regex;

use super::params::{FormData, ParamValue};
use super::percent::{PercentCodec, is_blank};

// Contiguous runs of anything outside 7-bit ASCII.
static NON_ASCII_RUN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[^\x00-\x7F]+"));

/// Encodes one `key=value` fragment set for a parameter.
///
/// Lists produce one pair per item, maps and nulls an empty value.
pub(crate) fn encode_pairs(key: &str, value: &ParamValue, codec: &PercentCodec) -> Vec<String> {
    let key = codec.encode_or_empty(key);
    match value {
        ParamValue::Text(text) => vec![format!("{key}={}", codec.encode_or_empty(text))],
        ParamValue::List(items) if !items.is_empty() => items
            .iter()
            .map(|item| format!("{key}={}", codec.encode_or_empty(item)))
            .collect(),
        ParamValue::List(_) | ParamValue::Map(_) | ParamValue::Null => vec![format!("{key}=")],
    }
}

fn append_query<'a>(
    base: &str,
    params: impl Iterator<Item = (&'a str, &'a ParamValue)>,
    codec: &PercentCodec,
) -> String {
    if is_blank(base) {
        return String::new();
    }
    let base = base.trim();
    let pairs: Vec<String> = params
        .filter(|(key, _)| !is_blank(key))
        .flat_map(|(key, value)| encode_pairs(key.trim(), value, codec))
        .collect();
    if pairs.is_empty() {
        return base.to_string();
    }

    let action = base.trim_end_matches('?');
    let separator = if action.contains('?') { '&' } else { '?' };
    format!("{action}{separator}{}", pairs.join("&"))
}

/// Appends parameters to `base` in insertion order.
///
/// A trailing `?` on the base is dropped; `&` is used when the base already has
/// a query. A blank base yields an empty string and an empty parameter set
/// returns the base unchanged.
#[must_use]
pub fn build_url(base: &str, params: &FormData, codec: &PercentCodec) -> String {
    append_query(base, params.iter(), codec)
}

/// Appends parameters to `base` with keys sorted case-insensitively.
#[must_use]
pub fn build_url_sorted(base: &str, params: &FormData, codec: &PercentCodec) -> String {
    append_query(base, params.sorted().into_iter(), codec)
}

/// Percent-encodes non-ASCII runs and literal spaces in the query part of
/// `url`, leaving every ASCII character (including `%XX` escapes) untouched.
///
/// Text before the first `?` and after the first `#` is returned as is.
#[must_use]
pub fn encode_non_ascii_query(url: &str, codec: &PercentCodec) -> String {
    let Some((head, rest)) = url.split_once('?') else {
        return url.to_string();
    };
    let (query, fragment) = match rest.split_once('#') {
        Some((query, fragment)) => (query, Some(fragment)),
        None => (rest, None),
    };
    if query.is_empty() {
        return url.to_string();
    }

    let query = encode_non_ascii_runs(query, codec);
    match fragment {
        Some(fragment) => format!("{head}?{query}#{fragment}"),
        None => format!("{head}?{query}"),
    }
}

/// Percent-encodes non-ASCII runs and spaces inside an arbitrary string.
#[must_use]
pub fn encode_non_ascii_runs(text: &str, codec: &PercentCodec) -> String {
    let encoded = match NON_ASCII_RUN.as_ref() {
        Ok(pattern) => pattern
            .replace_all(text, |caps: &regex::Captures<'_>| {
                codec.encode_or_empty(&caps[0])
            })
            .into_owned(),
        Err(_) => text.to_string(),
    };
    encoded.replace(' ', "%20")
}
