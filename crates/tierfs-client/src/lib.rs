#![warn(missing_docs)]

//! TierFS client: pooled master connections and path-based file system operations

/// Client configuration file
pub mod config;
/// Shared pool and stream factory
pub mod context;
/// Transport, master and caller-facing errors
pub mod error;
/// The `FileSystem` trait and its master-backed implementation
pub mod filesystem;
/// Master client and connector traits
pub mod master;
/// Per-operation options
pub mod options;
/// Master client pool
pub mod pool;
/// TCP wire framing
pub mod protocol;
/// Path status descriptors
pub mod status;
/// Byte streams and the stream factory
pub mod stream;
/// TCP master client
pub mod tcp;
/// Namespace paths
pub mod uri;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ClientConfig, ConfigError};
pub use context::FileSystemContext;
pub use error::{ErrorKind, FsError, MasterError, Operation, Result, TransportError};
pub use filesystem::{BaseFileSystem, FileSystem};
pub use master::{MasterClient, MasterConnector};
pub use options::{ReadType, WriteType};
pub use pool::{MasterClientPool, PoolConfig, PoolStats, PooledMasterClient};
pub use status::UriStatus;
pub use stream::{FileInStream, FileOutStream, LocalTierStreamFactory, StreamFactory};
pub use uri::TierUri;
