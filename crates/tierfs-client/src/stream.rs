//! Stream factory seam.
//!
//! The file system dispatcher never moves bytes itself. After the master
//! has resolved a path it asks a [`StreamFactory`] for a [`FileInStream`] or
//! [`FileOutStream`] and hands that to the caller.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FsError, Result};
use crate::options::{ReadType, WriteType, DEFAULT_BLOCK_SIZE_BYTES};
use crate::status::UriStatus;
use crate::uri::TierUri;

/// Resolved options for reading one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InStreamOptions {
    /// Cache behavior of the read.
    pub read_type: ReadType,
}

/// Resolved options for writing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutStreamOptions {
    /// Block size of the new file.
    pub block_size_bytes: u64,
    /// Time to live in milliseconds.
    pub ttl: Option<u64>,
    /// Where the bytes are written.
    pub write_type: WriteType,
}

impl Default for OutStreamOptions {
    fn default() -> Self {
        Self {
            block_size_bytes: DEFAULT_BLOCK_SIZE_BYTES,
            ttl: None,
            write_type: WriteType::MustCache,
        }
    }
}

/// Builds byte streams for paths the master has already resolved.
pub trait StreamFactory: Send + Sync {
    /// Opens the bytes of a file the master resolved to `status`.
    fn open_in_stream(&self, status: UriStatus, options: InStreamOptions) -> Result<FileInStream>;

    /// Opens a writer for a file the master has just created.
    fn open_out_stream(&self, path: TierUri, options: OutStreamOptions) -> Result<FileOutStream>;
}

/// Readable stream over one file's bytes.
pub struct FileInStream {
    status: UriStatus,
    options: InStreamOptions,
    inner: Box<dyn Read + Send>,
}

impl FileInStream {
    /// Wraps a reader for `status`.
    pub fn new(status: UriStatus, options: InStreamOptions, inner: Box<dyn Read + Send>) -> Self {
        Self {
            status,
            options,
            inner,
        }
    }

    /// Status the stream was opened for.
    pub fn status(&self) -> &UriStatus {
        &self.status
    }

    /// Options the stream was opened with.
    pub fn options(&self) -> &InStreamOptions {
        &self.options
    }
}

impl Read for FileInStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Writable stream for a newly created file. Call [`FileOutStream::close`]
/// to flush; a dropped stream flushes best-effort and loses the error.
pub struct FileOutStream {
    uri: TierUri,
    options: OutStreamOptions,
    inner: Box<dyn Write + Send>,
    bytes_written: u64,
}

impl FileOutStream {
    /// Wraps a writer for `uri`.
    pub fn new(uri: TierUri, options: OutStreamOptions, inner: Box<dyn Write + Send>) -> Self {
        Self {
            uri,
            options,
            inner,
            bytes_written: 0,
        }
    }

    /// Path being written.
    pub fn uri(&self) -> &TierUri {
        &self.uri
    }

    /// Options the stream was opened with.
    pub fn options(&self) -> &OutStreamOptions {
        &self.options
    }

    /// Bytes accepted so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes everything written and finishes the file.
    pub fn close(mut self) -> io::Result<u64> {
        self.inner.flush()?;
        debug!(path = %self.uri, bytes = self.bytes_written, "closed out stream");
        Ok(self.bytes_written)
    }
}

impl Write for FileOutStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Stores file bytes under a local directory, one regular file per
/// namespace path.
#[derive(Debug, Clone)]
pub struct LocalTierStreamFactory {
    root: PathBuf,
}

impl LocalTierStreamFactory {
    /// Factory storing files under `root`; directories are created on write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the tier's files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local file for a normalized namespace path. `TierUri` has no `..`
    /// components, so the result always stays under `root`.
    fn local_path(&self, uri: &TierUri) -> PathBuf {
        self.root.join(uri.path().trim_start_matches('/'))
    }
}

fn io_failure(path: &str, e: io::Error) -> FsError {
    match e.kind() {
        io::ErrorKind::NotFound => FsError::PathNotFound {
            path: path.to_string(),
        },
        _ => FsError::Remote {
            path: path.to_string(),
            message: format!("local tier: {}", e),
        },
    }
}

impl StreamFactory for LocalTierStreamFactory {
    fn open_in_stream(&self, status: UriStatus, options: InStreamOptions) -> Result<FileInStream> {
        // The master's status path is untrusted until it parses.
        let uri = TierUri::parse(&status.path)?;
        let local = self.local_path(&uri);
        let file = File::open(&local).map_err(|e| io_failure(&status.path, e))?;
        debug!(path = %status.path, local = %local.display(), "opened in stream");
        Ok(FileInStream::new(
            status,
            options,
            Box::new(BufReader::new(file)),
        ))
    }

    fn open_out_stream(&self, path: TierUri, options: OutStreamOptions) -> Result<FileOutStream> {
        let local = self.local_path(&path);
        if let Some(parent) = local.parent() {
            fs::create_dir_all(parent).map_err(|e| io_failure(path.path(), e))?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&local)
            .map_err(|e| io_failure(path.path(), e))?;
        debug!(path = %path, local = %local.display(), "opened out stream");
        Ok(FileOutStream::new(
            path,
            options,
            Box::new(BufWriter::new(file)),
        ))
    }
}
