//! Config-file defaults for the `webfetch` binary.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use webfetch_core::{ClientConfig, user_agent};

/// Values read from `config.toml`. Every field is optional; CLI flags win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    /// Literal User-Agent or preset name.
    pub user_agent: Option<String>,
    pub gzip: Option<bool>,
    pub follow_redirects: Option<bool>,
    pub use_cookies: Option<bool>,
    pub ignore_https: Option<bool>,
    pub https_protocol: Option<String>,
    pub download_min_size: Option<u64>,
    pub download_max_size: Option<u64>,
    pub encoding: Option<String>,
    pub content_type: Option<String>,
}

impl FileConfig {
    /// Validates values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if let (Some(min), Some(max)) = (self.download_min_size, self.download_max_size)
            && min > max
        {
            bail!(
                "Invalid config: `download_min_size` ({min}) exceeds `download_max_size` ({max})"
            );
        }
        Ok(())
    }

    /// Layers the file values over `config`.
    #[must_use]
    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(secs) = self.connect_timeout_secs {
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.read_timeout_secs {
            config = config.with_read_timeout(Duration::from_secs(secs));
        }
        if let Some(agent) = &self.user_agent {
            config = config.with_user_agent(user_agent::resolve(agent));
        }
        if let Some(gzip) = self.gzip {
            config = config.with_gzip(gzip);
        }
        if let Some(follow) = self.follow_redirects {
            config = config.with_follow_redirects(follow);
        }
        if let Some(use_cookies) = self.use_cookies {
            config = config.with_cookies(use_cookies);
        }
        if let Some(ignore) = self.ignore_https {
            config = config.with_ignore_https(ignore);
        }
        if let Some(protocol) = &self.https_protocol {
            config = config.with_https_protocol(protocol.clone());
        }
        if let Some(min) = self.download_min_size {
            config = config.with_download_min_size(min);
        }
        if let Some(max) = self.download_max_size {
            config = config.with_download_max_size(max);
        }
        if let Some(encoding) = &self.encoding {
            config = config.with_encoding(encoding.clone());
        }
        if let Some(content_type) = &self.content_type {
            config = config.with_content_type(content_type.clone());
        }
        config
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/webfetch/config.toml`
/// 2. `$HOME/.config/webfetch/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("webfetch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("webfetch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the explicit config file, or the default one when it exists.
///
/// A missing explicit path is an error; a missing default path is not.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return read_file_config(path).map(Some);
    }
    match resolve_default_config_path() {
        Some(path) if path.exists() => read_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "user_agent" => {
                cfg.user_agent = Some(parse_string_literal(value).with_context(context)?);
            }
            "gzip" => cfg.gzip = Some(parse_boolean(value).with_context(context)?),
            "follow_redirects" => {
                cfg.follow_redirects = Some(parse_boolean(value).with_context(context)?);
            }
            "use_cookies" => cfg.use_cookies = Some(parse_boolean(value).with_context(context)?),
            "ignore_https" => cfg.ignore_https = Some(parse_boolean(value).with_context(context)?),
            "https_protocol" => {
                cfg.https_protocol = Some(parse_string_literal(value).with_context(context)?);
            }
            "download_min_size" => {
                cfg.download_min_size = Some(parse_integer_u64(value).with_context(context)?);
            }
            "download_max_size" => {
                cfg.download_max_size = Some(parse_integer_u64(value).with_context(context)?);
            }
            "encoding" => cfg.encoding = Some(parse_string_literal(value).with_context(context)?),
            "content_type" => {
                cfg.content_type = Some(parse_string_literal(value).with_context(context)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}
