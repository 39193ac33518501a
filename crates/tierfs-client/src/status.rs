//! Status descriptors returned by the master.

use serde::{Deserialize, Serialize};

use crate::options::DEFAULT_BLOCK_SIZE_BYTES;
use crate::uri::TierUri;

/// Snapshot of a path's metadata, created fresh for each status call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriStatus {
    /// Master-assigned id, stable across renames.
    pub file_id: u64,
    /// Last path component.
    pub name: String,
    /// Full namespace path as sent by the master. Parse it with
    /// [`UriStatus::uri`] before trusting it.
    pub path: String,
    /// Length in bytes; zero for directories.
    pub length: u64,
    /// Block size the file was written with.
    pub block_size_bytes: u64,
    /// Milliseconds since the Unix epoch.
    pub creation_time_ms: u64,
    /// Milliseconds since the Unix epoch.
    pub last_modification_time_ms: u64,
    /// True for directories.
    pub folder: bool,
    /// Pinned files are never evicted.
    pub pinned: bool,
    /// The writer has closed the file.
    pub completed: bool,
    /// Blocks may be kept in the cache tier.
    pub cacheable: bool,
    /// The data is in under storage.
    pub persisted: bool,
    /// Time to live in milliseconds.
    pub ttl: Option<u64>,
    /// Share of the file's blocks held in memory, 0 to 100.
    pub in_memory_percentage: u8,
    /// Block ids in file order.
    pub block_ids: Vec<u64>,
    /// The path is the root of a mount.
    pub mount_point: bool,
}

impl UriStatus {
    /// A completed, cacheable file of `length` bytes.
    pub fn file(path: &TierUri, length: u64) -> Self {
        Self {
            file_id: 0,
            name: path.name().to_string(),
            path: path.path().to_string(),
            length,
            block_size_bytes: DEFAULT_BLOCK_SIZE_BYTES,
            creation_time_ms: 0,
            last_modification_time_ms: 0,
            folder: false,
            pinned: false,
            completed: true,
            cacheable: true,
            persisted: false,
            ttl: None,
            in_memory_percentage: 100,
            block_ids: Vec::new(),
            mount_point: false,
        }
    }

    /// An empty directory.
    pub fn directory(path: &TierUri) -> Self {
        Self {
            folder: true,
            cacheable: false,
            in_memory_percentage: 0,
            block_size_bytes: 0,
            ..Self::file(path, 0)
        }
    }

    /// True for directories.
    pub fn is_folder(&self) -> bool {
        self.folder
    }

    /// The namespace path this status describes.
    pub fn uri(&self) -> Option<TierUri> {
        TierUri::parse(&self.path).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_status() {
        let uri = TierUri::parse("/data/part-0").unwrap();
        let status = UriStatus::file(&uri, 4096);
        assert_eq!(status.name, "part-0");
        assert_eq!(status.path, "/data/part-0");
        assert_eq!(status.length, 4096);
        assert!(!status.is_folder());
        assert!(status.completed);
    }

    #[test]
    fn test_directory_status() {
        let uri = TierUri::parse("/data").unwrap();
        let status = UriStatus::directory(&uri);
        assert!(status.is_folder());
        assert_eq!(status.length, 0);
        assert_eq!(status.uri(), Some(uri));
    }
}
