//! Error taxonomy for the client layer.
//!
//! Three layers of errors exist:
//! - [`TransportError`]: the channel to the master failed or could not be leased.
//! - [`MasterError`]: what a master call reported, before any translation.
//! - [`FsError`]: the caller-facing result of a file system operation. Every
//!   variant carries the path the operation was addressed to.
//!
//! [`translate`] is the only place a [`MasterError`] becomes an [`FsError`].
//! Which remote conditions are collapsed is decided per [`Operation`] by
//! [`Operation::narrowing`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uri::TierUri;

/// Failures of the channel to the master, including pool leasing.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The master refused the TCP connection.
    #[error("connection refused to {addr}")]
    ConnectionRefused {
        /// Master address that was dialed.
        addr: String,
    },

    /// The TCP connect did not finish in time.
    #[error("connection timeout after {timeout_ms}ms to {addr}")]
    ConnectionTimeout {
        /// Master address that was dialed.
        addr: String,
        /// Configured connect timeout.
        timeout_ms: u64,
    },

    /// The master closed the channel mid-call.
    #[error("connection reset by peer")]
    ConnectionReset,

    /// `acquire_timeout_ms` elapsed with every channel leased.
    #[error("no master client available after waiting {waited_ms}ms")]
    PoolExhausted {
        /// Time spent waiting for a free channel.
        waited_ms: u64,
    },

    /// The pool was closed by [`crate::FileSystemContext::shutdown`].
    #[error("master client pool is closed")]
    PoolClosed,

    /// A frame or response did not match the expected shape.
    #[error("protocol error: {reason}")]
    Protocol {
        /// What was wrong with the frame.
        reason: String,
    },

    /// bincode failed to encode or decode a message.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Socket-level I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure reported by a master call, as seen on the client side of the wire.
#[derive(Debug, Error)]
#[allow(missing_docs)] // `message` is the master's own text in every variant
pub enum MasterError {
    /// The path does not exist on the master.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The target path is already taken.
    #[error("already exists: {message}")]
    AlreadyExists { message: String },

    /// The master rejected the path itself.
    #[error("invalid path: {message}")]
    InvalidPath { message: String },

    /// Non-recursive delete of a directory with children.
    #[error("directory not empty: {message}")]
    DirectoryNotEmpty { message: String },

    /// The call never got an answer.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Any other master-side failure.
    #[error("{message}")]
    Remote { message: String },
}

impl MasterError {
    /// Builds a master error from a failure kind received over the wire.
    pub fn from_remote(kind: RemoteFailureKind, message: String) -> Self {
        match kind {
            RemoteFailureKind::NotFound => MasterError::NotFound { message },
            RemoteFailureKind::AlreadyExists => MasterError::AlreadyExists { message },
            RemoteFailureKind::InvalidPath => MasterError::InvalidPath { message },
            RemoteFailureKind::DirectoryNotEmpty => MasterError::DirectoryNotEmpty { message },
            RemoteFailureKind::Other => MasterError::Remote { message },
        }
    }

    /// Returns true if the channel that produced this error should not be reused.
    pub fn is_transport(&self) -> bool {
        matches!(self, MasterError::Transport(_))
    }
}

/// Failure classes the master can report in a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum RemoteFailureKind {
    NotFound,
    AlreadyExists,
    InvalidPath,
    DirectoryNotEmpty,
    Other,
}

/// Result of a single master call.
pub type MasterResult<T> = std::result::Result<T, MasterError>;

/// Caller-facing error of a file system operation.
///
/// `path` is always the path the operation was addressed to, see [`FsError::path`].
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum FsError {
    /// The path does not exist, or for status lookups could not be resolved.
    #[error("Path {path} does not exist")]
    PathNotFound { path: String },

    /// Create, mount or rename target already exists.
    #[error("Path {path} already exists")]
    PathAlreadyExists { path: String },

    /// Malformed path, with the parser's or master's reason.
    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Non-recursive delete of a non-empty directory.
    #[error("Directory {path} is not empty")]
    DirectoryNotEmpty { path: String },

    /// open_file on a directory.
    #[error("Cannot read from {path} because it is a directory")]
    IsDirectory { path: String },

    /// No channel could be leased or the call was cut off.
    #[error("Transport failure for {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: TransportError,
    },

    /// Any other master-side failure, with its message.
    #[error("Master failure for {path}: {message}")]
    Remote { path: String, message: String },
}

/// Flat classification of [`FsError`] for callers that only branch on the
/// kind. Variants mirror the [`FsError`] variant of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ErrorKind {
    PathNotFound,
    PathAlreadyExists,
    InvalidPath,
    DirectoryNotEmpty,
    IsDirectory,
    Transport,
    Remote,
}

impl FsError {
    /// The variant without its payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::PathNotFound { .. } => ErrorKind::PathNotFound,
            FsError::PathAlreadyExists { .. } => ErrorKind::PathAlreadyExists,
            FsError::InvalidPath { .. } => ErrorKind::InvalidPath,
            FsError::DirectoryNotEmpty { .. } => ErrorKind::DirectoryNotEmpty,
            FsError::IsDirectory { .. } => ErrorKind::IsDirectory,
            FsError::Transport { .. } => ErrorKind::Transport,
            FsError::Remote { .. } => ErrorKind::Remote,
        }
    }

    /// The path the failed operation was addressed to.
    pub fn path(&self) -> &str {
        match self {
            FsError::PathNotFound { path }
            | FsError::PathAlreadyExists { path }
            | FsError::InvalidPath { path, .. }
            | FsError::DirectoryNotEmpty { path }
            | FsError::IsDirectory { path }
            | FsError::Transport { path, .. }
            | FsError::Remote { path, .. } => path,
        }
    }

    pub(crate) fn transport(path: &TierUri, source: TransportError) -> Self {
        FsError::Transport {
            path: path.to_string(),
            source,
        }
    }
}

/// Result of a file system operation.
pub type Result<T> = std::result::Result<T, FsError>;

/// Logical file system operations, one per public entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operation {
    CreateDirectory,
    CreateFile,
    Delete,
    Exists,
    Free,
    GetStatus,
    ListStatus,
    LoadMetadata,
    Mount,
    OpenFile,
    Rename,
    SetAttribute,
    Unmount,
}

/// How remote failures of an operation are presented to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narrowing {
    /// Each remote condition keeps its own kind.
    Passthrough,
    /// Not-found and invalid-path both become [`FsError::PathNotFound`].
    MissingPath,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 13] = [
        Operation::CreateDirectory,
        Operation::CreateFile,
        Operation::Delete,
        Operation::Exists,
        Operation::Free,
        Operation::GetStatus,
        Operation::ListStatus,
        Operation::LoadMetadata,
        Operation::Mount,
        Operation::OpenFile,
        Operation::Rename,
        Operation::SetAttribute,
        Operation::Unmount,
    ];

    /// snake_case name used in log fields.
    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateDirectory => "create_directory",
            Operation::CreateFile => "create_file",
            Operation::Delete => "delete",
            Operation::Exists => "exists",
            Operation::Free => "free",
            Operation::GetStatus => "get_status",
            Operation::ListStatus => "list_status",
            Operation::LoadMetadata => "load_metadata",
            Operation::Mount => "mount",
            Operation::OpenFile => "open_file",
            Operation::Rename => "rename",
            Operation::SetAttribute => "set_attribute",
            Operation::Unmount => "unmount",
        }
    }

    /// Which remote failures this operation collapses.
    pub fn narrowing(self) -> Narrowing {
        match self {
            // open_file resolves its status through get_status
            Operation::Exists
            | Operation::GetStatus
            | Operation::ListStatus
            | Operation::OpenFile => Narrowing::MissingPath,
            _ => Narrowing::Passthrough,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a master failure of `op` on `path` to the caller-facing error.
pub fn translate(op: Operation, path: &TierUri, err: MasterError) -> FsError {
    let path_str = path.to_string();
    match (op.narrowing(), err) {
        (Narrowing::MissingPath, MasterError::NotFound { .. })
        | (Narrowing::MissingPath, MasterError::InvalidPath { .. }) => {
            FsError::PathNotFound { path: path_str }
        }
        (_, MasterError::NotFound { .. }) => FsError::PathNotFound { path: path_str },
        (_, MasterError::AlreadyExists { .. }) => FsError::PathAlreadyExists { path: path_str },
        (_, MasterError::InvalidPath { message }) => FsError::InvalidPath {
            path: path_str,
            reason: message,
        },
        (_, MasterError::DirectoryNotEmpty { .. }) => FsError::DirectoryNotEmpty { path: path_str },
        (_, MasterError::Transport(source)) => FsError::Transport {
            path: path_str,
            source,
        },
        (_, MasterError::Remote { message }) => FsError::Remote {
            path: path_str,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> TierUri {
        TierUri::parse(s).unwrap()
    }

    fn invalid() -> MasterError {
        MasterError::InvalidPath {
            message: "bad component".to_string(),
        }
    }

    fn not_found() -> MasterError {
        MasterError::NotFound {
            message: "no inode".to_string(),
        }
    }

    #[test]
    fn test_missing_path_ops() {
        let narrowed: Vec<Operation> = Operation::ALL
            .iter()
            .copied()
            .filter(|op| op.narrowing() == Narrowing::MissingPath)
            .collect();
        assert_eq!(
            narrowed,
            vec![
                Operation::Exists,
                Operation::GetStatus,
                Operation::ListStatus,
                Operation::OpenFile
            ]
        );
    }

    #[test]
    fn test_get_status_collapses_invalid_path() {
        let err = translate(Operation::GetStatus, &uri("/missing"), invalid());
        assert_eq!(err.kind(), ErrorKind::PathNotFound);
        assert_eq!(err.to_string(), "Path /missing does not exist");
    }

    #[test]
    fn test_list_status_collapses_both() {
        let a = translate(Operation::ListStatus, &uri("/d"), invalid());
        let b = translate(Operation::ListStatus, &uri("/d"), not_found());
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.kind(), ErrorKind::PathNotFound);
    }

    #[test]
    fn test_passthrough_keeps_invalid_path() {
        for op in Operation::ALL {
            if op.narrowing() != Narrowing::Passthrough {
                continue;
            }
            let err = translate(op, &uri("/x"), invalid());
            match err {
                FsError::InvalidPath { path, reason } => {
                    assert_eq!(path, "/x");
                    assert_eq!(reason, "bad component");
                }
                other => panic!("{op}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_every_kind_maps_once() {
        let cases = [
            (not_found(), ErrorKind::PathNotFound),
            (
                MasterError::AlreadyExists {
                    message: String::new(),
                },
                ErrorKind::PathAlreadyExists,
            ),
            (invalid(), ErrorKind::InvalidPath),
            (
                MasterError::DirectoryNotEmpty {
                    message: String::new(),
                },
                ErrorKind::DirectoryNotEmpty,
            ),
            (
                MasterError::Transport(TransportError::PoolClosed),
                ErrorKind::Transport,
            ),
            (
                MasterError::Remote {
                    message: "boom".to_string(),
                },
                ErrorKind::Remote,
            ),
        ];
        for (err, kind) in cases {
            assert_eq!(translate(Operation::Delete, &uri("/a"), err).kind(), kind);
        }
    }

    #[test]
    fn test_errors_carry_path() {
        let err = translate(
            Operation::Mount,
            &uri("/mnt/ufs"),
            MasterError::Remote {
                message: "ufs unreachable".to_string(),
            },
        );
        assert_eq!(err.path(), "/mnt/ufs");
        assert!(err.to_string().contains("ufs unreachable"));
    }

    #[test]
    fn test_from_remote_kind() {
        let err = MasterError::from_remote(RemoteFailureKind::DirectoryNotEmpty, "d".to_string());
        assert!(matches!(err, MasterError::DirectoryNotEmpty { .. }));
        assert!(!err.is_transport());
        assert!(MasterError::Transport(TransportError::PoolClosed).is_transport());
    }
}
