//! Streaming downloads on [`HttpClient`].
//!
//! Every download validates the advertised size against the client's
//! `[min, max]` window before anything touches the disk, and never overwrites
//! an existing file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use reqwest::Method;
use reqwest::blocking::Response;
use serde::Serialize;
use tracing::{debug, info, instrument, trace};

use super::constants::DOWNLOAD_BUFFER_SIZE;
use super::filename::{DownloadOptions, NameStrategy, resolve_target};
use super::progress::{DownloadProgress, ProgressObserver, format_percent, format_size};
use crate::client::{HttpClient, HttpError, RequestBody};

/// Outcome of a completed download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadFileResult {
    /// Final output path.
    pub path: PathBuf,
    /// Bytes written to disk.
    pub bytes_downloaded: u64,
    /// Content length advertised by the server.
    pub content_length: u64,
}

impl HttpClient {
    /// Downloads into `root/yyyy/MMdd/` under a generated name.
    ///
    /// The suffix comes from the URL, else `tmp`.
    ///
    /// # Errors
    ///
    /// Same as [`download_file`](Self::download_file).
    pub fn download(&mut self, url: &str, root: impl AsRef<Path>) -> Result<PathBuf, HttpError> {
        self.download_into(url, root, true)
    }

    /// Downloads into `root` (optionally below a date folder) under a
    /// generated name.
    ///
    /// # Errors
    ///
    /// Same as [`download_file`](Self::download_file).
    pub fn download_into(
        &mut self,
        url: &str,
        root: impl AsRef<Path>,
        date_folder: bool,
    ) -> Result<PathBuf, HttpError> {
        let options = DownloadOptions::new(root.as_ref()).with_date_folder(date_folder);
        self.download_with(url, &options)
    }

    /// Downloads under the file name recognised in the URL, falling back to a
    /// generated one.
    ///
    /// # Errors
    ///
    /// Same as [`download_file`](Self::download_file).
    pub fn download_by_original(
        &mut self,
        url: &str,
        root: impl AsRef<Path>,
        date_folder: bool,
    ) -> Result<PathBuf, HttpError> {
        let options = DownloadOptions::new(root.as_ref())
            .with_date_folder(date_folder)
            .with_strategy(NameStrategy::FromUrl);
        self.download_with(url, &options)
    }

    /// Downloads to the destination described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::EmptyArgument`] for a blank root, otherwise the same
    /// errors as [`download_file`](Self::download_file).
    pub fn download_with(
        &mut self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<PathBuf, HttpError> {
        Ok(self.download_with_progress(url, options, None)?.path)
    }

    /// Like [`download_with`](Self::download_with), reporting progress to
    /// `observer` and returning the full result.
    ///
    /// # Errors
    ///
    /// Same as [`download_with`](Self::download_with).
    pub fn download_with_progress(
        &mut self,
        url: &str,
        options: &DownloadOptions,
        observer: Option<&mut dyn ProgressObserver>,
    ) -> Result<DownloadFileResult, HttpError> {
        let path = resolve_target(url, options, &self.config().codec())?;
        self.download_file_with_progress(url, &path, observer)
    }

    /// Downloads `url` to exactly `path`.
    ///
    /// # Errors
    ///
    /// - [`HttpError::FileExists`] when `path` exists (checked before
    ///   connecting and again when the file is created)
    /// - [`HttpError::HttpStatus`] for 4xx/5xx responses
    /// - [`HttpError::SizeRange`] when the content length is unknown or outside
    ///   the configured window; nothing is written. With gzip enabled a
    ///   compressed response has no known length and always fails here.
    /// - [`HttpError::Network`], [`HttpError::Timeout`] or
    ///   [`HttpError::BodyRead`] when the connection fails mid-stream; the
    ///   partial file is removed
    /// - [`HttpError::Io`] for local file-system failures
    /// - [`HttpError::IncompleteDownload`] when the file is missing afterwards
    /// - connection errors as for [`get`](Self::get)
    pub fn download_file(
        &mut self,
        url: &str,
        path: impl AsRef<Path>,
    ) -> Result<DownloadFileResult, HttpError> {
        self.download_file_with_progress(url, path.as_ref(), None)
    }

    /// Like [`download_file`](Self::download_file), reporting progress to
    /// `observer` after every chunk.
    ///
    /// # Errors
    ///
    /// Same as [`download_file`](Self::download_file).
    #[instrument(skip(self, observer), fields(url = %url, path = %path.display()))]
    pub fn download_file_with_progress(
        &mut self,
        url: &str,
        path: &Path,
        observer: Option<&mut dyn ProgressObserver>,
    ) -> Result<DownloadFileResult, HttpError> {
        if path.as_os_str().is_empty() {
            return Err(HttpError::empty("download path"));
        }
        if path.exists() {
            return Err(HttpError::file_exists(path));
        }
        debug!("starting download");

        let (response, target) = self.send(Method::GET, url, RequestBody::Empty)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(HttpError::http_status(&target, status.as_u16()));
        }

        let (min, max) = self.config().download_bounds();
        let total = match response.content_length() {
            Some(length) if (min..=max).contains(&length) => length,
            advertised => return Err(HttpError::size_range(&target, min, max, advertised)),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| HttpError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    HttpError::file_exists(path)
                } else {
                    HttpError::io(path, e)
                }
            })?;

        let stream_result = stream_to_file(file, response, &target, path, total, observer);
        if stream_result.is_err() {
            debug!(path = %path.display(), "cleaning up partial file after error");
            let _ = fs::remove_file(path);
        }
        let written = stream_result?;

        if !path.exists() {
            return Err(HttpError::incomplete_download(&target, path));
        }

        info!(
            path = %path.display(),
            bytes = written,
            size = %format_size(written),
            "download complete"
        );
        Ok(DownloadFileResult {
            path: path.to_path_buf(),
            bytes_downloaded: written,
            content_length: total,
        })
    }
}

/// Copies the body to `file` in 4 KiB chunks, returning the bytes written.
fn stream_to_file(
    file: File,
    mut response: Response,
    url: &str,
    path: &Path,
    total: u64,
    mut observer: Option<&mut dyn ProgressObserver>,
) -> Result<u64, HttpError> {
    let mut writer = BufWriter::new(file);
    let mut buffer = [0_u8; DOWNLOAD_BUFFER_SIZE];
    let mut written: u64 = 0;

    loop {
        let read = match response.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HttpError::body_read(url, e)),
        };
        writer
            .write_all(&buffer[..read])
            .map_err(|e| HttpError::io(path, e))?;
        written += read as u64;

        let progress = DownloadProgress { written, total };
        match observer.as_deref_mut() {
            Some(observer) => observer.on_progress(progress),
            None => trace!(
                written = %format_size(written),
                total = %format_size(total),
                percent = %format_percent(progress.percent()),
                "download progress"
            ),
        }
    }

    writer.flush().map_err(|e| HttpError::io(path, e))?;
    Ok(written)
}
