//! Cookie storage and Netscape cookie-file import.

mod jar;
mod netscape;

pub use jar::CookieJar;
pub use netscape::{CookieError, CookieLine, ParsedCookies, load_into_jar, parse_netscape_cookies};
