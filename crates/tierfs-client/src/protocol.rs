//! Framing for the TCP master protocol.
//!
//! Frame layout: magic (4 bytes, BE), version (1 byte), payload length
//! (4 bytes, BE), bincode payload. One request frame is answered by exactly
//! one response frame.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{RemoteFailureKind, TransportError};
use crate::options::{
    CreateDirectoryOptions, CreateFileOptions, DeleteOptions, FreeOptions, LoadMetadataOptions,
    MountOptions, SetAttributeOptions,
};
use crate::status::UriStatus;
use crate::uri::TierUri;

/// Frame header size in bytes (magic:4 + version:1 + payload_length:4)
pub const FRAME_HEADER_SIZE: usize = 9;

/// Protocol magic number for frame validation
pub const MAGIC: u32 = 0x7F5F_0001;

/// Version byte written into every frame header.
pub const PROTOCOL_VERSION: u8 = 1;

/// Largest payload accepted in either direction (16 MiB).
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// One call to the master. Variants and fields mirror [`crate::MasterClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum MasterRequest {
    CreateDirectory {
        path: TierUri,
        options: CreateDirectoryOptions,
    },
    CreateFile {
        path: TierUri,
        options: CreateFileOptions,
    },
    Delete {
        path: TierUri,
        options: DeleteOptions,
    },
    Free {
        path: TierUri,
        options: FreeOptions,
    },
    GetStatus {
        path: TierUri,
    },
    ListStatus {
        path: TierUri,
    },
    LoadMetadata {
        path: TierUri,
        options: LoadMetadataOptions,
    },
    Mount {
        path: TierUri,
        ufs_path: TierUri,
        options: MountOptions,
    },
    Rename {
        src: TierUri,
        dst: TierUri,
    },
    SetAttribute {
        path: TierUri,
        options: SetAttributeOptions,
    },
    Unmount {
        path: TierUri,
    },
}

/// The master's answer to one [`MasterRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MasterResponse {
    /// The call succeeded and returns nothing.
    Done,
    /// Answer to `GetStatus`.
    Status(UriStatus),
    /// Answer to `ListStatus`, children in master order.
    StatusList(Vec<UriStatus>),
    /// The call failed on the master.
    Failure {
        /// Failure class, mapped to a [`crate::MasterError`] variant.
        kind: RemoteFailureKind,
        /// The master's message.
        message: String,
    },
}

/// Serializes `message` and writes it as one frame.
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), TransportError> {
    let payload =
        bincode::serialize(message).map_err(|e| TransportError::Serialization(e.to_string()))?;
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_PAYLOAD_SIZE)
        .ok_or_else(|| TransportError::Protocol {
            reason: format!("payload of {} bytes exceeds {}", payload.len(), MAX_PAYLOAD_SIZE),
        })?;

    let mut header = [0u8; FRAME_HEADER_SIZE];
    header[0..4].copy_from_slice(&MAGIC.to_be_bytes());
    header[4] = PROTOCOL_VERSION;
    header[5..9].copy_from_slice(&len.to_be_bytes());

    writer.write_all(&header)?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

/// Reads one frame and deserializes its payload.
pub fn read_frame<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T, TransportError> {
    let mut header = [0u8; FRAME_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let magic = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    if magic != MAGIC {
        return Err(TransportError::Protocol {
            reason: format!("invalid magic number 0x{:08X}", magic),
        });
    }
    if header[4] != PROTOCOL_VERSION {
        return Err(TransportError::Protocol {
            reason: format!(
                "protocol version mismatch: expected {}, got {}",
                PROTOCOL_VERSION, header[4]
            ),
        });
    }
    let len = u32::from_be_bytes([header[5], header[6], header[7], header[8]]);
    if len > MAX_PAYLOAD_SIZE {
        return Err(TransportError::Protocol {
            reason: format!("payload of {} bytes exceeds {}", len, MAX_PAYLOAD_SIZE),
        });
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    bincode::deserialize(&payload).map_err(|e| TransportError::Serialization(e.to_string()))
}
