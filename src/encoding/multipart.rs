//! `multipart/form-data` body serialization.
//!
//! Wire layout, for boundary `B`:
//!
//! ```text
//! \r\n--B\r\nContent-Disposition: form-data; name="key"\r\n\r\nvalue
//! \r\n--B\r\nContent-Disposition: form-data; name="key"; filename="a.bin"\r\nContent-Type: application/octet-stream\r\n\r\n<bytes>
//! \r\n--B--\r\n
//! ```
//!
//! The body is produced by a chained reader so attachments are streamed from
//! disk rather than buffered in memory.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::EncodeError;
use super::params::{FormData, ParamValue};
use super::percent::is_blank;

/// Read buffer size used for file attachments (8 KiB).
pub const UPLOAD_BUFFER_SIZE: usize = 8 * 1024;

/// Boundary for the given Unix time in milliseconds: `------<millis>`.
#[must_use]
pub fn boundary_from_millis(millis: u128) -> String {
    format!("------{millis}")
}

/// Boundary derived from the current wall-clock time.
#[must_use]
pub fn current_boundary() -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    boundary_from_millis(millis)
}

enum Segment {
    Bytes(Cursor<Vec<u8>>),
    File(BufReader<File>),
}

/// A fully planned multipart body with attachments already opened.
pub struct MultipartBody {
    boundary: String,
    segments: Vec<Segment>,
    content_length: u64,
}

impl std::fmt::Debug for MultipartBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartBody")
            .field("boundary", &self.boundary)
            .field("segments", &self.segments.len())
            .field("content_length", &self.content_length)
            .finish()
    }
}

impl MultipartBody {
    /// Plans a body using a boundary derived from the current time.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Attachment`] when an existing attachment cannot be
    /// opened. Attachments whose path does not exist are skipped.
    pub fn new(fields: &FormData, files: &[(String, PathBuf)]) -> Result<Self, EncodeError> {
        Self::with_boundary(current_boundary(), fields, files)
    }

    /// Plans a body with an explicit boundary.
    ///
    /// Text fields are written in insertion order (lists as one part per item,
    /// nulls and maps skipped), followed by attachments in the given order.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_boundary(
        boundary: impl Into<String>,
        fields: &FormData,
        files: &[(String, PathBuf)],
    ) -> Result<Self, EncodeError> {
        let mut body = Self {
            boundary: boundary.into(),
            segments: Vec::new(),
            content_length: 0,
        };

        for (key, value) in fields.iter() {
            match value {
                ParamValue::Text(text) => body.push_field(key, text),
                ParamValue::List(items) => {
                    for item in items {
                        body.push_field(key, item);
                    }
                }
                ParamValue::Map(_) | ParamValue::Null => {}
            }
        }

        for (key, path) in files {
            if is_blank(key) || path.as_os_str().is_empty() {
                continue;
            }
            if !path.exists() {
                warn!(field = %key, path = %path.display(), "skipping missing upload file");
                continue;
            }
            body.push_file(key, path)?;
        }

        let terminator = format!("\r\n--{}--\r\n", body.boundary);
        body.push_bytes(terminator.into_bytes());
        Ok(body)
    }

    fn push_bytes(&mut self, bytes: Vec<u8>) {
        self.content_length += bytes.len() as u64;
        self.segments.push(Segment::Bytes(Cursor::new(bytes)));
    }

    fn push_field(&mut self, key: &str, value: &str) {
        let block = format!(
            "\r\n--{}\r\nContent-Disposition: form-data; name=\"{key}\"\r\n\r\n{value}",
            self.boundary
        );
        self.push_bytes(block.into_bytes());
    }

    fn push_file(&mut self, key: &str, path: &Path) -> Result<(), EncodeError> {
        let file = File::open(path).map_err(|e| EncodeError::attachment(path, e))?;
        let len = file
            .metadata()
            .map_err(|e| EncodeError::attachment(path, e))?
            .len();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let header = format!(
            "\r\n--{}\r\nContent-Disposition: form-data; name=\"{key}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            self.boundary
        );
        debug!(field = %key, path = %path.display(), bytes = len, "attaching upload file");
        self.push_bytes(header.into_bytes());
        self.content_length += len;
        self.segments.push(Segment::File(BufReader::with_capacity(
            UPLOAD_BUFFER_SIZE,
            file,
        )));
        Ok(())
    }

    /// The boundary string (without the leading `--`).
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data;boundary={}", self.boundary)
    }

    /// Total body length in bytes, including attachments.
    #[must_use]
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Converts the plan into a streaming reader.
    #[must_use]
    pub fn into_reader(self) -> MultipartReader {
        MultipartReader {
            segments: self.segments.into(),
        }
    }

    /// Writes the whole body to `writer`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Propagates read errors from attachments and write errors from `writer`.
    pub fn write_to<W: Write>(self, writer: &mut W) -> io::Result<u64> {
        io::copy(&mut self.into_reader(), writer)
    }
}

/// Streams the segments of a [`MultipartBody`] in order.
pub struct MultipartReader {
    segments: VecDeque<Segment>,
}

impl Read for MultipartReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while let Some(segment) = self.segments.front_mut() {
            let read = match segment {
                Segment::Bytes(cursor) => cursor.read(buf)?,
                Segment::File(file) => file.read(buf)?,
            };
            if read > 0 {
                return Ok(read);
            }
            self.segments.pop_front();
        }
        Ok(0)
    }
}
