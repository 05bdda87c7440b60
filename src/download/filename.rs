//! Destination path resolution for downloads.
//!
//! A destination is `root[/yyyy/MMdd]/<name>.<suffix>`. The name and suffix
//! come from the caller, else from a recognised file name in the URL, else
//! from a time-based generated name and the `tmp` suffix.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use rand::Rng;
use regex::Regex;
use url::{Position, Url};

use super::constants::{FALLBACK_SUFFIX, KNOWN_SUFFIXES, RANDOM_NAME_BOUND};
use crate::client::HttpError;
use crate::encoding::PercentCodec;
use crate::encoding::percent::is_blank;

// `\b` keeps `doc` from matching the front of `docx`.
static FILE_NAME_PATTERN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)([A-Za-z0-9_]+)\.({})\b",
        KNOWN_SUFFIXES.join("|")
    ))
});

/// How a download's file name is chosen when none is given explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameStrategy {
    /// `HHmmss_<random>`.
    #[default]
    Generated,
    /// The file name recognised in the URL, else a generated one.
    FromUrl,
}

/// Where and under which name a download is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Root folder.
    pub root: PathBuf,
    /// Insert a `yyyy/MMdd` folder for the current date below the root.
    pub date_folder: bool,
    /// Explicit file name without suffix; always wins when non-blank.
    pub name: Option<String>,
    /// Explicit suffix; leading dots are ignored.
    pub suffix: Option<String>,
    /// Naming policy when `name` is absent.
    pub strategy: NameStrategy,
}

impl DownloadOptions {
    /// Options for `root` with no date folder and a generated name.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            date_folder: false,
            name: None,
            suffix: None,
            strategy: NameStrategy::default(),
        }
    }

    /// Enables or disables the date folder.
    #[must_use]
    pub fn with_date_folder(mut self, date_folder: bool) -> Self {
        self.date_folder = date_folder;
        self
    }

    /// Sets the explicit file name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the explicit suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Sets the naming strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: NameStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Computes the destination path for `url` under `options`.
///
/// # Errors
///
/// Returns [`HttpError::EmptyArgument`] when the root is blank.
pub fn resolve_target(
    url: &str,
    options: &DownloadOptions,
    codec: &PercentCodec,
) -> Result<PathBuf, HttpError> {
    resolve_target_at(url, options, codec, Local::now())
}

pub(crate) fn resolve_target_at(
    url: &str,
    options: &DownloadOptions,
    codec: &PercentCodec,
    now: DateTime<Local>,
) -> Result<PathBuf, HttpError> {
    let mut path = trim_root(&options.root)?;
    if options.date_folder {
        path.push(folder_path_at(now));
    }

    let from_url = url_file_name(url, codec);
    let name = match options.name.as_deref().filter(|name| !is_blank(name)) {
        Some(name) => sanitize_name(name),
        None => match (options.strategy, &from_url) {
            (NameStrategy::FromUrl, Some((stem, _))) => stem.clone(),
            _ => file_name_at(now),
        },
    };
    let suffix = options
        .suffix
        .as_deref()
        .map(|suffix| suffix.trim().trim_start_matches('.').to_string())
        .filter(|suffix| !suffix.is_empty())
        .or_else(|| from_url.map(|(_, suffix)| suffix))
        .unwrap_or_else(|| FALLBACK_SUFFIX.to_string());

    path.push(format!("{name}.{}", sanitize_name(&suffix)));
    Ok(path)
}

/// The `yyyy/MMdd` folder for today.
#[must_use]
pub fn create_folder_path() -> PathBuf {
    folder_path_at(Local::now())
}

/// A generated `HHmmss_<random>` file name for now.
#[must_use]
pub fn create_file_name() -> String {
    file_name_at(Local::now())
}

fn folder_path_at(now: DateTime<Local>) -> PathBuf {
    let mut path = PathBuf::from(now.format("%Y").to_string());
    path.push(now.format("%m%d").to_string());
    path
}

fn file_name_at(now: DateTime<Local>) -> String {
    let random = rand::thread_rng().gen_range(0..RANDOM_NAME_BOUND);
    format!("{}_{random}", now.format("%H%M%S"))
}

/// Returns `(stem, suffix)` of the first recognised file name in the URL's
/// path and query, after percent-decoding.
#[must_use]
pub fn url_file_name(url: &str, codec: &PercentCodec) -> Option<(String, String)> {
    let pattern = FILE_NAME_PATTERN.as_ref().ok()?;
    let tail = match Url::parse(url) {
        Ok(parsed) => parsed[Position::BeforePath..].to_string(),
        Err(_) => url.to_string(),
    };
    let decoded = codec.decode_or_empty(&tail);
    let caps = pattern.captures(&decoded)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

fn trim_root(root: &Path) -> Result<PathBuf, HttpError> {
    let raw = root.to_string_lossy();
    if is_blank(&raw) {
        return Err(HttpError::empty("download root"));
    }
    let trimmed = raw.trim().trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        // The root was nothing but separators, e.g. `/`.
        return Ok(PathBuf::from(raw.trim()));
    }
    Ok(PathBuf::from(trimmed))
}

fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
