//! Streaming file downloads with size bounds and progress reporting.
//!
//! Downloads are methods on [`HttpClient`](crate::HttpClient):
//!
//! - `download` / `download_into` - generated name, optional date folder
//! - `download_by_original` - name recognised in the URL
//! - `download_with` - fully specified [`DownloadOptions`]
//! - `download_file` - explicit destination path
//!
//! # Example
//!
//! ```no_run
//! use webfetch_core::HttpClient;
//!
//! # fn example() -> Result<(), webfetch_core::HttpError> {
//! let mut client = HttpClient::with_defaults()?;
//! let path = client.download("https://example.com/paper.pdf", "./downloads")?;
//! println!("Downloaded: {}", path.display());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod filename;
mod progress;

pub use client::DownloadFileResult;
pub use filename::{
    DownloadOptions, NameStrategy, create_file_name, create_folder_path, resolve_target,
    url_file_name,
};
pub use progress::{DownloadProgress, ProgressObserver, format_percent, format_size};
