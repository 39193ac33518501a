//! Per-operation option structures.
//!
//! Each structure is an immutable value with a `DEFAULT` constant. The
//! file system entry points take `Option<T>` and resolve `None` to that
//! constant through [`resolve`], so omitting the options and passing
//! `T::defaults()` reach the master identically.

use serde::{Deserialize, Serialize};

use crate::stream::{InStreamOptions, OutStreamOptions};

/// Default block size for new files: 512 MiB.
pub const DEFAULT_BLOCK_SIZE_BYTES: u64 = 512 * 1024 * 1024;

/// Resolves an optional option structure to the one sent to the master.
pub fn resolve<T: Default>(options: Option<T>) -> T {
    options.unwrap_or_default()
}

/// Where written data lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WriteType {
    /// Cache only; data is lost if the tier evicts it.
    #[default]
    MustCache,
    /// Cache and synchronously persist to the under storage.
    CacheThrough,
    /// Write to under storage only.
    Through,
    /// Cache now, persist in the background.
    AsyncThrough,
}

/// How reads interact with the cache tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReadType {
    /// Read without touching the cache.
    NoCache,
    /// Cache data read from under storage.
    Cache,
    /// Cache, and move cached blocks to the top tier.
    #[default]
    CachePromote,
}

macro_rules! option_defaults {
    ($ty:ident) => {
        impl Default for $ty {
            fn default() -> Self {
                Self::DEFAULT
            }
        }

        impl $ty {
            /// The documented default for this operation.
            pub const fn defaults() -> Self {
                Self::DEFAULT
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `create_directory`.
pub struct CreateDirectoryOptions {
    /// Succeed if the directory already exists.
    pub allow_exists: bool,
    /// Create missing parents.
    pub recursive: bool,
    /// Where the directory metadata is written.
    pub write_type: WriteType,
}

impl CreateDirectoryOptions {
    /// Strict create: parent must exist, path must not.
    pub const DEFAULT: Self = Self {
        allow_exists: false,
        recursive: false,
        write_type: WriteType::MustCache,
    };

    /// Returns a copy with `allow_exists` replaced.
    pub const fn with_allow_exists(self, allow_exists: bool) -> Self {
        Self {
            allow_exists,
            ..self
        }
    }

    /// Returns a copy with `recursive` replaced.
    pub const fn with_recursive(self, recursive: bool) -> Self {
        Self { recursive, ..self }
    }

    /// Returns a copy with `write_type` replaced.
    pub const fn with_write_type(self, write_type: WriteType) -> Self {
        Self { write_type, ..self }
    }
}

option_defaults!(CreateDirectoryOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `create_file`; also shape the returned out stream.
pub struct CreateFileOptions {
    /// Create missing parents.
    pub recursive: bool,
    /// Block size for the new file.
    pub block_size_bytes: u64,
    /// Time to live in milliseconds; `None` keeps the file indefinitely.
    pub ttl: Option<u64>,
    /// Where the file's bytes are written.
    pub write_type: WriteType,
}

impl CreateFileOptions {
    /// Recursive create, 512 MiB blocks, no TTL, cache only.
    pub const DEFAULT: Self = Self {
        recursive: true,
        block_size_bytes: DEFAULT_BLOCK_SIZE_BYTES,
        ttl: None,
        write_type: WriteType::MustCache,
    };

    /// Returns a copy with `recursive` replaced.
    pub const fn with_recursive(self, recursive: bool) -> Self {
        Self { recursive, ..self }
    }

    /// Returns a copy with `block_size_bytes` replaced.
    pub const fn with_block_size_bytes(self, block_size_bytes: u64) -> Self {
        Self {
            block_size_bytes,
            ..self
        }
    }

    /// Returns a copy with `ttl` replaced.
    pub const fn with_ttl(self, ttl: Option<u64>) -> Self {
        Self { ttl, ..self }
    }

    /// Returns a copy with `write_type` replaced.
    pub const fn with_write_type(self, write_type: WriteType) -> Self {
        Self { write_type, ..self }
    }

    /// Options handed to the stream factory for the new file's output stream.
    pub fn to_out_stream_options(&self) -> OutStreamOptions {
        OutStreamOptions {
            block_size_bytes: self.block_size_bytes,
            ttl: self.ttl,
            write_type: self.write_type,
        }
    }
}

option_defaults!(CreateFileOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `delete`.
pub struct DeleteOptions {
    /// Also delete a non-empty directory's children.
    pub recursive: bool,
}

impl DeleteOptions {
    /// Non-recursive.
    pub const DEFAULT: Self = Self { recursive: false };

    /// Returns a copy with `recursive` replaced.
    pub const fn with_recursive(self, recursive: bool) -> Self {
        Self { recursive }
    }
}

option_defaults!(DeleteOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `exists`. Carries nothing yet.
pub struct ExistsOptions {}

impl ExistsOptions {
    /// The only value.
    pub const DEFAULT: Self = Self {};
}

option_defaults!(ExistsOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `free`.
pub struct FreeOptions {
    /// Free everything below a directory.
    pub recursive: bool,
}

impl FreeOptions {
    /// Non-recursive.
    pub const DEFAULT: Self = Self { recursive: false };

    /// Returns a copy with `recursive` replaced.
    pub const fn with_recursive(self, recursive: bool) -> Self {
        Self { recursive }
    }
}

option_defaults!(FreeOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `get_status`. Carries nothing yet.
pub struct GetStatusOptions {}

impl GetStatusOptions {
    /// The only value.
    pub const DEFAULT: Self = Self {};
}

option_defaults!(GetStatusOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `list_status`. Carries nothing yet.
pub struct ListStatusOptions {}

impl ListStatusOptions {
    /// The only value.
    pub const DEFAULT: Self = Self {};
}

option_defaults!(ListStatusOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `load_metadata`.
pub struct LoadMetadataOptions {
    /// Also load metadata for missing ancestors.
    pub recursive: bool,
}

impl LoadMetadataOptions {
    /// Non-recursive.
    pub const DEFAULT: Self = Self { recursive: false };

    /// Returns a copy with `recursive` replaced.
    pub const fn with_recursive(self, recursive: bool) -> Self {
        Self { recursive }
    }
}

option_defaults!(LoadMetadataOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `mount`.
pub struct MountOptions {
    /// Reject writes below the mount point.
    pub read_only: bool,
}

impl MountOptions {
    /// Writable mount.
    pub const DEFAULT: Self = Self { read_only: false };

    /// Returns a copy with `read_only` replaced.
    pub const fn with_read_only(self, read_only: bool) -> Self {
        Self { read_only }
    }
}

option_defaults!(MountOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `open_file`; handed on to the in stream.
pub struct OpenFileOptions {
    /// Cache behavior of the read.
    pub read_type: ReadType,
}

impl OpenFileOptions {
    /// Read with cache promotion.
    pub const DEFAULT: Self = Self {
        read_type: ReadType::CachePromote,
    };

    /// Returns a copy with `read_type` replaced.
    pub const fn with_read_type(self, read_type: ReadType) -> Self {
        Self { read_type }
    }

    /// Options handed to the stream factory for the file's input stream.
    pub fn to_in_stream_options(&self) -> InStreamOptions {
        InStreamOptions {
            read_type: self.read_type,
        }
    }
}

option_defaults!(OpenFileOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `rename`. Carries nothing yet.
pub struct RenameOptions {}

impl RenameOptions {
    /// The only value.
    pub const DEFAULT: Self = Self {};
}

option_defaults!(RenameOptions);

/// Attribute changes; `None` fields are left untouched by the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAttributeOptions {
    /// Pin or unpin in the cache tier.
    pub pinned: Option<bool>,
    /// `Some(None)` clears the TTL, `Some(Some(ms))` sets it.
    pub ttl: Option<Option<u64>>,
    /// Mark the file as persisted to under storage.
    pub persisted: Option<bool>,
}

impl SetAttributeOptions {
    /// Changes nothing.
    pub const DEFAULT: Self = Self {
        pinned: None,
        ttl: None,
        persisted: None,
    };

    /// Returns a copy with `pinned` replaced.
    pub const fn with_pinned(self, pinned: bool) -> Self {
        Self {
            pinned: Some(pinned),
            ..self
        }
    }

    /// Returns a copy with `ttl` replaced.
    pub const fn with_ttl(self, ttl: Option<u64>) -> Self {
        Self {
            ttl: Some(ttl),
            ..self
        }
    }

    /// Returns a copy with `persisted` replaced.
    pub const fn with_persisted(self, persisted: bool) -> Self {
        Self {
            persisted: Some(persisted),
            ..self
        }
    }

    /// True if no attribute would change.
    pub fn is_empty(&self) -> bool {
        self.pinned.is_none() && self.ttl.is_none() && self.persisted.is_none()
    }
}

option_defaults!(SetAttributeOptions);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Options for `unmount`. Carries nothing yet.
pub struct UnmountOptions {}

impl UnmountOptions {
    /// The only value.
    pub const DEFAULT: Self = Self {};
}

option_defaults!(UnmountOptions);
