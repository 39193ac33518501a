//! File system operations dispatched to the metadata master.
//!
//! Every operation follows the same template: lease a master client from the
//! context's pool, make exactly one remote call, give the lease back, then
//! translate any failure through [`translate`]. The lease is returned before
//! the error is translated, and on every exit path.
//!
//! Each operation takes `Option<XOptions>`; `None` resolves to
//! `XOptions::DEFAULT`, so the two forms reach the master identically.

use std::sync::Arc;

use tracing::{debug, info};

use crate::context::FileSystemContext;
use crate::error::{translate, FsError, MasterResult, Operation, Result};
use crate::master::MasterClient;
use crate::options::{
    resolve, CreateDirectoryOptions, CreateFileOptions, DeleteOptions, ExistsOptions, FreeOptions,
    GetStatusOptions, ListStatusOptions, LoadMetadataOptions, MountOptions, OpenFileOptions,
    RenameOptions, SetAttributeOptions, UnmountOptions,
};
use crate::status::UriStatus;
use crate::stream::{FileInStream, FileOutStream};
use crate::uri::TierUri;

/// Path-based file system operations.
pub trait FileSystem: Send + Sync {
    /// Creates a directory; see [`CreateDirectoryOptions`] for parents and
    /// existing paths.
    fn create_directory(
        &self,
        path: &TierUri,
        options: Option<CreateDirectoryOptions>,
    ) -> Result<()>;

    /// Creates the file on the master and returns a stream for its bytes.
    fn create_file(&self, path: &TierUri, options: Option<CreateFileOptions>)
        -> Result<FileOutStream>;

    /// Deletes a file, or a directory (recursively if asked).
    fn delete(&self, path: &TierUri, options: Option<DeleteOptions>) -> Result<()>;

    /// True if the path resolves. Not-found and invalid paths both answer `false`.
    fn exists(&self, path: &TierUri, options: Option<ExistsOptions>) -> Result<bool>;

    /// Evicts the path's data from the cache tier.
    fn free(&self, path: &TierUri, options: Option<FreeOptions>) -> Result<()>;

    /// Status of one path. Invalid paths fail as not found.
    fn get_status(&self, path: &TierUri, options: Option<GetStatusOptions>) -> Result<UriStatus>;

    /// Children of a directory, or the file itself. Invalid paths fail as not found.
    fn list_status(
        &self,
        path: &TierUri,
        options: Option<ListStatusOptions>,
    ) -> Result<Vec<UriStatus>>;

    /// Loads metadata for a path that exists only in under storage.
    fn load_metadata(&self, path: &TierUri, options: Option<LoadMetadataOptions>) -> Result<()>;

    /// Mounts under storage `ufs_path` at namespace path `path`.
    fn mount(&self, path: &TierUri, ufs_path: &TierUri, options: Option<MountOptions>)
        -> Result<()>;

    /// Opens a file for reading. Directories are rejected before a stream is built.
    fn open_file(&self, path: &TierUri, options: Option<OpenFileOptions>) -> Result<FileInStream>;

    /// Moves `src` to `dst`.
    fn rename(&self, src: &TierUri, dst: &TierUri, options: Option<RenameOptions>) -> Result<()>;

    /// Changes pin state, TTL or persistence.
    fn set_attribute(&self, path: &TierUri, options: Option<SetAttributeOptions>) -> Result<()>;

    /// Removes the mount at `path`.
    fn unmount(&self, path: &TierUri, options: Option<UnmountOptions>) -> Result<()>;
}

/// [`FileSystem`] backed by a master client pool. Thread safe; clone the
/// `Arc` to the context to share one pool between instances.
#[derive(Clone)]
pub struct BaseFileSystem {
    context: Arc<FileSystemContext>,
}

impl BaseFileSystem {
    /// File system over a shared context.
    pub fn new(context: Arc<FileSystemContext>) -> Self {
        Self { context }
    }

    /// The context this file system dispatches through.
    pub fn context(&self) -> &Arc<FileSystemContext> {
        &self.context
    }

    /// Runs one master call on a leased client.
    fn dispatch<T>(
        &self,
        op: Operation,
        path: &TierUri,
        call: impl FnOnce(&mut dyn MasterClient) -> MasterResult<T>,
    ) -> Result<T> {
        let mut client = self.context.acquire_master_client().map_err(|e| {
            debug!(op = %op, path = %path, error = %e, "no master client");
            FsError::transport(path, e)
        })?;

        let result = call(&mut *client);
        match result {
            Ok(value) => {
                client.release();
                Ok(value)
            }
            Err(err) => {
                if err.is_transport() {
                    client.discard();
                } else {
                    client.release();
                }
                let err = translate(op, path, err);
                debug!(op = %op, path = %path, error = %err, "master call failed");
                Err(err)
            }
        }
    }
}

impl FileSystem for BaseFileSystem {
    fn create_directory(
        &self,
        path: &TierUri,
        options: Option<CreateDirectoryOptions>,
    ) -> Result<()> {
        let options = resolve(options);
        self.dispatch(Operation::CreateDirectory, path, |c| {
            c.create_directory(path, &options)
        })?;
        info!(path = %path, "created directory");
        Ok(())
    }

    fn create_file(
        &self,
        path: &TierUri,
        options: Option<CreateFileOptions>,
    ) -> Result<FileOutStream> {
        let options = resolve(options);
        self.dispatch(Operation::CreateFile, path, |c| c.create_file(path, &options))?;
        info!(path = %path, "created file");
        self.context
            .stream_factory()
            .open_out_stream(path.clone(), options.to_out_stream_options())
    }

    fn delete(&self, path: &TierUri, options: Option<DeleteOptions>) -> Result<()> {
        let options = resolve(options);
        self.dispatch(Operation::Delete, path, |c| c.delete(path, &options))?;
        info!(path = %path, recursive = options.recursive, "deleted");
        Ok(())
    }

    fn exists(&self, path: &TierUri, options: Option<ExistsOptions>) -> Result<bool> {
        let _options = resolve(options);
        match self.dispatch(Operation::Exists, path, |c| c.get_status(path)) {
            Ok(_) => Ok(true),
            Err(FsError::PathNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn free(&self, path: &TierUri, options: Option<FreeOptions>) -> Result<()> {
        let options = resolve(options);
        self.dispatch(Operation::Free, path, |c| c.free(path, &options))?;
        info!(path = %path, "freed");
        Ok(())
    }

    fn get_status(&self, path: &TierUri, options: Option<GetStatusOptions>) -> Result<UriStatus> {
        let _options = resolve(options);
        self.dispatch(Operation::GetStatus, path, |c| c.get_status(path))
    }

    fn list_status(
        &self,
        path: &TierUri,
        options: Option<ListStatusOptions>,
    ) -> Result<Vec<UriStatus>> {
        let _options = resolve(options);
        self.dispatch(Operation::ListStatus, path, |c| c.list_status(path))
    }

    fn load_metadata(&self, path: &TierUri, options: Option<LoadMetadataOptions>) -> Result<()> {
        let options = resolve(options);
        self.dispatch(Operation::LoadMetadata, path, |c| {
            c.load_metadata(path, &options)
        })?;
        info!(path = %path, ?options, "loaded metadata");
        Ok(())
    }

    fn mount(
        &self,
        path: &TierUri,
        ufs_path: &TierUri,
        options: Option<MountOptions>,
    ) -> Result<()> {
        let options = resolve(options);
        self.dispatch(Operation::Mount, path, |c| c.mount(path, ufs_path, &options))?;
        info!(path = %path, ufs_path = %ufs_path, "mounted");
        Ok(())
    }

    fn open_file(&self, path: &TierUri, options: Option<OpenFileOptions>) -> Result<FileInStream> {
        let options = resolve(options);
        let status = self.get_status(path, None)?;
        if status.is_folder() {
            return Err(FsError::IsDirectory {
                path: path.to_string(),
            });
        }
        self.context
            .stream_factory()
            .open_in_stream(status, options.to_in_stream_options())
    }

    fn rename(&self, src: &TierUri, dst: &TierUri, options: Option<RenameOptions>) -> Result<()> {
        let _options = resolve(options);
        self.dispatch(Operation::Rename, src, |c| c.rename(src, dst))?;
        info!(src = %src, dst = %dst, "renamed");
        Ok(())
    }

    fn set_attribute(&self, path: &TierUri, options: Option<SetAttributeOptions>) -> Result<()> {
        let options = resolve(options);
        self.dispatch(Operation::SetAttribute, path, |c| {
            c.set_attribute(path, &options)
        })?;
        info!(path = %path, ?options, "set attributes");
        Ok(())
    }

    fn unmount(&self, path: &TierUri, options: Option<UnmountOptions>) -> Result<()> {
        let _options = resolve(options);
        self.dispatch(Operation::Unmount, path, |c| c.unmount(path))?;
        info!(path = %path, "unmounted");
        Ok(())
    }
}
