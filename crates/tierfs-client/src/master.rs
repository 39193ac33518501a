//! The master client seam.
//!
//! A [`MasterClient`] is one leased channel to the metadata master. Each
//! method is exactly one remote call. [`MasterConnector`] opens new channels
//! and is the only part of the client that knows how the master is addressed.

use crate::error::{MasterResult, TransportError};
use crate::options::{
    CreateDirectoryOptions, CreateFileOptions, DeleteOptions, FreeOptions, LoadMetadataOptions,
    MountOptions, SetAttributeOptions,
};
use crate::status::UriStatus;
use crate::uri::TierUri;

/// Remote calls offered by the metadata master.
///
/// Implementations are used by one dispatch call at a time and need not be
/// internally synchronized.
pub trait MasterClient: Send {
    /// Creates a directory.
    fn create_directory(
        &mut self,
        path: &TierUri,
        options: &CreateDirectoryOptions,
    ) -> MasterResult<()>;

    /// Creates an empty, incomplete file entry.
    fn create_file(&mut self, path: &TierUri, options: &CreateFileOptions) -> MasterResult<()>;

    /// Deletes a file or directory.
    fn delete(&mut self, path: &TierUri, options: &DeleteOptions) -> MasterResult<()>;

    /// Evicts a path's blocks from the cache tier.
    fn free(&mut self, path: &TierUri, options: &FreeOptions) -> MasterResult<()>;

    /// Status of one path.
    fn get_status(&mut self, path: &TierUri) -> MasterResult<UriStatus>;

    /// Statuses of a directory's children, or of the file itself.
    fn list_status(&mut self, path: &TierUri) -> MasterResult<Vec<UriStatus>>;

    /// Loads metadata for a path present only in under storage.
    fn load_metadata(&mut self, path: &TierUri, options: &LoadMetadataOptions) -> MasterResult<()>;

    /// Mounts the under storage location `ufs_path` at namespace path `path`.
    fn mount(&mut self, path: &TierUri, ufs_path: &TierUri, options: &MountOptions)
        -> MasterResult<()>;

    /// Moves `src` to `dst`.
    fn rename(&mut self, src: &TierUri, dst: &TierUri) -> MasterResult<()>;

    /// Applies the `Some` fields of `options`.
    fn set_attribute(&mut self, path: &TierUri, options: &SetAttributeOptions) -> MasterResult<()>;

    /// Removes the mount at `path`.
    fn unmount(&mut self, path: &TierUri) -> MasterResult<()>;

    /// False once the channel is known to be broken; the pool drops such
    /// clients instead of handing them out again.
    fn is_connected(&self) -> bool {
        true
    }
}

/// Opens new channels to the master on behalf of the pool.
pub trait MasterConnector: Send + Sync {
    /// Opens one new channel.
    fn connect(&self) -> Result<Box<dyn MasterClient>, TransportError>;

    /// Human readable master address, for logging.
    fn address(&self) -> &str;
}
