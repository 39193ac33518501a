//! Blocking TCP master client.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{MasterError, MasterResult, TransportError};
use crate::master::{MasterClient, MasterConnector};
use crate::options::{
    CreateDirectoryOptions, CreateFileOptions, DeleteOptions, FreeOptions, LoadMetadataOptions,
    MountOptions, SetAttributeOptions,
};
use crate::protocol::{read_frame, write_frame, MasterRequest, MasterResponse};
use crate::status::UriStatus;
use crate::uri::TierUri;

/// TCP connector configuration
#[derive(Debug, Clone)]
pub struct TcpConnectorConfig {
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Read and write timeout per call in milliseconds.
    pub io_timeout_ms: u64,
    /// Whether to enable TCP_NODELAY (disable Nagle's algorithm).
    pub nodelay: bool,
}

impl Default for TcpConnectorConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5000,
            io_timeout_ms: 30_000,
            nodelay: true,
        }
    }
}

/// Opens [`TcpMasterClient`] connections to one master address.
#[derive(Debug, Clone)]
pub struct TcpMasterConnector {
    addr: String,
    config: TcpConnectorConfig,
}

impl TcpMasterConnector {
    /// Connector for `addr` (`host:port`). Nothing is dialed until `connect`.
    pub fn new(addr: impl Into<String>, config: TcpConnectorConfig) -> Self {
        Self {
            addr: addr.into(),
            config,
        }
    }

    fn resolve(&self) -> Result<SocketAddr, TransportError> {
        self.addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| TransportError::ConnectionRefused {
                addr: self.addr.clone(),
            })
    }
}

impl MasterConnector for TcpMasterConnector {
    fn connect(&self) -> Result<Box<dyn MasterClient>, TransportError> {
        let sock = self.resolve()?;
        let timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let stream = TcpStream::connect_timeout(&sock, timeout).map_err(|e| match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => TransportError::ConnectionTimeout {
                addr: self.addr.clone(),
                timeout_ms: self.config.connect_timeout_ms,
            },
            ErrorKind::ConnectionRefused => TransportError::ConnectionRefused {
                addr: self.addr.clone(),
            },
            _ => TransportError::Io(e),
        })?;

        let io_timeout = Some(Duration::from_millis(self.config.io_timeout_ms));
        stream.set_read_timeout(io_timeout)?;
        stream.set_write_timeout(io_timeout)?;
        if self.config.nodelay {
            stream.set_nodelay(true)?;
        }
        debug!(addr = %self.addr, "master connected");
        Ok(Box::new(TcpMasterClient {
            addr: self.addr.clone(),
            stream,
            connected: true,
        }))
    }

    fn address(&self) -> &str {
        &self.addr
    }
}

/// One TCP channel to the master.
pub struct TcpMasterClient {
    addr: String,
    stream: TcpStream,
    connected: bool,
}

impl TcpMasterClient {
    fn call(&mut self, request: MasterRequest) -> MasterResult<MasterResponse> {
        if !self.connected {
            return Err(TransportError::Protocol {
                reason: format!("channel to {} is closed", self.addr),
            }
            .into());
        }
        let result = write_frame(&mut self.stream, &request)
            .and_then(|()| read_frame::<_, MasterResponse>(&mut self.stream));
        match result {
            Ok(MasterResponse::Failure { kind, message }) => {
                Err(MasterError::from_remote(kind, message))
            }
            Ok(response) => Ok(response),
            Err(e) => {
                // A half-read frame leaves the stream unusable.
                self.connected = false;
                warn!(addr = %self.addr, error = %e, "master channel failed");
                Err(e.into())
            }
        }
    }

    fn call_done(&mut self, request: MasterRequest) -> MasterResult<()> {
        match self.call(request)? {
            MasterResponse::Done => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(response: &MasterResponse) -> MasterError {
    TransportError::Protocol {
        reason: format!("unexpected master response {:?}", response),
    }
    .into()
}

impl MasterClient for TcpMasterClient {
    fn create_directory(
        &mut self,
        path: &TierUri,
        options: &CreateDirectoryOptions,
    ) -> MasterResult<()> {
        self.call_done(MasterRequest::CreateDirectory {
            path: path.clone(),
            options: *options,
        })
    }

    fn create_file(&mut self, path: &TierUri, options: &CreateFileOptions) -> MasterResult<()> {
        self.call_done(MasterRequest::CreateFile {
            path: path.clone(),
            options: *options,
        })
    }

    fn delete(&mut self, path: &TierUri, options: &DeleteOptions) -> MasterResult<()> {
        self.call_done(MasterRequest::Delete {
            path: path.clone(),
            options: *options,
        })
    }

    fn free(&mut self, path: &TierUri, options: &FreeOptions) -> MasterResult<()> {
        self.call_done(MasterRequest::Free {
            path: path.clone(),
            options: *options,
        })
    }

    fn get_status(&mut self, path: &TierUri) -> MasterResult<UriStatus> {
        match self.call(MasterRequest::GetStatus { path: path.clone() })? {
            MasterResponse::Status(status) => Ok(status),
            other => Err(unexpected(&other)),
        }
    }

    fn list_status(&mut self, path: &TierUri) -> MasterResult<Vec<UriStatus>> {
        match self.call(MasterRequest::ListStatus { path: path.clone() })? {
            MasterResponse::StatusList(list) => Ok(list),
            other => Err(unexpected(&other)),
        }
    }

    fn load_metadata(&mut self, path: &TierUri, options: &LoadMetadataOptions) -> MasterResult<()> {
        self.call_done(MasterRequest::LoadMetadata {
            path: path.clone(),
            options: *options,
        })
    }

    fn mount(
        &mut self,
        path: &TierUri,
        ufs_path: &TierUri,
        options: &MountOptions,
    ) -> MasterResult<()> {
        self.call_done(MasterRequest::Mount {
            path: path.clone(),
            ufs_path: ufs_path.clone(),
            options: *options,
        })
    }

    fn rename(&mut self, src: &TierUri, dst: &TierUri) -> MasterResult<()> {
        self.call_done(MasterRequest::Rename {
            src: src.clone(),
            dst: dst.clone(),
        })
    }

    fn set_attribute(&mut self, path: &TierUri, options: &SetAttributeOptions) -> MasterResult<()> {
        self.call_done(MasterRequest::SetAttribute {
            path: path.clone(),
            options: *options,
        })
    }

    fn unmount(&mut self, path: &TierUri) -> MasterResult<()> {
        self.call_done(MasterRequest::Unmount { path: path.clone() })
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
