//! Constants for the download module (buffer size, naming).

/// Read buffer used while streaming a download to disk (4 KiB).
pub const DOWNLOAD_BUFFER_SIZE: usize = 4 * 1024;

/// Suffix used when neither the caller nor the URL supplies one.
pub const FALLBACK_SUFFIX: &str = "tmp";

/// Audio extensions recognised in URLs.
pub const SUFFIX_VOICE: &str = "mp3|wav|m4a|wma|mpg|mpeg";
/// Image extensions recognised in URLs.
pub const SUFFIX_IMAGE: &str = "bmp|jpg|jpeg|gif|png|psd";
/// Video extensions recognised in URLs.
pub const SUFFIX_MOVIE: &str = "avi|mp4|mkv|rm|rmvb|mov|ogg|mod|fla|flv|flc|swf";
/// Office document extensions recognised in URLs.
pub const SUFFIX_OFFICE: &str = "doc|docx|xls|xlsx|ppt|pptx|wps";
/// Archive and package extensions recognised in URLs.
pub const SUFFIX_COMPRESS: &str = "zip|rar|exe|apk|jar";
/// Text extensions recognised in URLs.
pub const SUFFIX_TEXT: &str = "txt|pdf|xml";

/// Every recognised extension group, in match priority order.
pub const KNOWN_SUFFIXES: [&str; 6] = [
    SUFFIX_VOICE,
    SUFFIX_IMAGE,
    SUFFIX_MOVIE,
    SUFFIX_OFFICE,
    SUFFIX_COMPRESS,
    SUFFIX_TEXT,
];

/// Upper bound (exclusive) of the random part of generated file names.
pub const RANDOM_NAME_BOUND: u32 = 1_000_000;
