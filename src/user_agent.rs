//! Browser User-Agent presets.
//!
//! Requests default to [`MAC_CHROME`]; any literal string may be configured
//! instead, and [`preset`] maps short names (as used by the CLI) to presets.

/// Chrome on macOS (default).
pub const MAC_CHROME: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.67 Safari/537.36";

/// Safari on macOS.
pub const MAC_SAFARI: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/12.0.3 Safari/605.1.15";

/// Chrome on Windows.
pub const WIN_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/72.0.3626.121 Safari/537.36";

/// Legacy Edge on Windows.
pub const WIN_EDGE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/64.0.3282.140 Safari/537.36 Edge/18.17763";

/// Internet Explorer 11 on Windows.
pub const WIN_IE: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64; Trident/7.0; rv:11.0) like Gecko";

/// Default User-Agent for every request.
#[must_use]
pub fn default_user_agent() -> &'static str {
    MAC_CHROME
}

/// Looks up a preset by short name (`mac-chrome`, `mac-safari`, `win-chrome`,
/// `win-edge`, `win-ie`), case-insensitively.
#[must_use]
pub fn preset(name: &str) -> Option<&'static str> {
    match name.trim().to_ascii_lowercase().as_str() {
        "mac-chrome" => Some(MAC_CHROME),
        "mac-safari" => Some(MAC_SAFARI),
        "win-chrome" => Some(WIN_CHROME),
        "win-edge" => Some(WIN_EDGE),
        "win-ie" => Some(WIN_IE),
        _ => None,
    }
}

/// Resolves a CLI/config value: a preset name or a literal User-Agent.
#[must_use]
pub fn resolve(value: &str) -> String {
    preset(value).map_or_else(|| value.trim().to_string(), str::to_string)
}
