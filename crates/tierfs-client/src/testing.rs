//! In-process master double used by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::error::{MasterError, MasterResult, Operation, RemoteFailureKind, TransportError};
use crate::master::{MasterClient, MasterConnector};
use crate::options::{
    CreateDirectoryOptions, CreateFileOptions, DeleteOptions, FreeOptions, LoadMetadataOptions,
    MountOptions, SetAttributeOptions,
};
use crate::status::UriStatus;
use crate::stream::{FileInStream, FileOutStream, InStreamOptions, OutStreamOptions, StreamFactory};
use crate::uri::TierUri;

/// One remote call as the master saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    CreateDirectory(TierUri, CreateDirectoryOptions),
    CreateFile(TierUri, CreateFileOptions),
    Delete(TierUri, DeleteOptions),
    Free(TierUri, FreeOptions),
    GetStatus(TierUri),
    ListStatus(TierUri),
    LoadMetadata(TierUri, LoadMetadataOptions),
    Mount(TierUri, TierUri, MountOptions),
    Rename(TierUri, TierUri),
    SetAttribute(TierUri, SetAttributeOptions),
    Unmount(TierUri),
}

/// A failure the mock master returns for every call of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injected {
    Remote(RemoteFailureKind),
    Transport,
}

#[derive(Default)]
struct Gate {
    path: Mutex<Option<String>>,
    open: Mutex<bool>,
    opened: Condvar,
}

#[derive(Default)]
struct MasterState {
    calls: Mutex<Vec<RemoteCall>>,
    statuses: Mutex<BTreeMap<String, UriStatus>>,
    failures: Mutex<HashMap<Operation, Injected>>,
    disconnected: AtomicBool,
    gate: Gate,
}

/// Shared namespace and call log behind every [`MockClient`].
#[derive(Clone, Default)]
pub struct MockMaster {
    state: Arc<MasterState>,
}

impl MockMaster {
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.state.calls.lock().unwrap().clear();
    }

    pub fn insert(&self, status: UriStatus) {
        self.state
            .statuses
            .lock()
            .unwrap()
            .insert(status.path.clone(), status);
    }

    pub fn fail(&self, op: Operation, failure: Injected) {
        self.state.failures.lock().unwrap().insert(op, failure);
    }

    pub fn disconnect_all(&self) {
        self.state.disconnected.store(true, Ordering::SeqCst);
    }

    /// Calls addressed to `path` block until [`MockMaster::open_gate`].
    pub fn gate(&self, path: &str) {
        *self.state.gate.open.lock().unwrap() = false;
        *self.state.gate.path.lock().unwrap() = Some(path.to_string());
    }

    pub fn open_gate(&self) {
        *self.state.gate.open.lock().unwrap() = true;
        self.state.gate.opened.notify_all();
    }

    fn record(&self, op: Operation, path: &TierUri, call: RemoteCall) -> MasterResult<()> {
        self.state.calls.lock().unwrap().push(call);

        let gated = self.state.gate.path.lock().unwrap().as_deref() == Some(path.path());
        if gated {
            let mut open = self.state.gate.open.lock().unwrap();
            while !*open {
                open = self.state.gate.opened.wait(open).unwrap();
            }
        }

        match self.state.failures.lock().unwrap().get(&op) {
            None => Ok(()),
            Some(Injected::Transport) => Err(TransportError::ConnectionReset.into()),
            Some(Injected::Remote(kind)) => Err(MasterError::from_remote(
                *kind,
                format!("injected failure on {}", path),
            )),
        }
    }
}

/// A leased channel to the [`MockMaster`].
pub struct MockClient {
    master: MockMaster,
    connected: bool,
}

impl MockClient {
    fn track<T>(&mut self, result: MasterResult<T>) -> MasterResult<T> {
        if matches!(result, Err(MasterError::Transport(_))) {
            self.connected = false;
        }
        result
    }
}

impl MasterClient for MockClient {
    fn create_directory(
        &mut self,
        path: &TierUri,
        options: &CreateDirectoryOptions,
    ) -> MasterResult<()> {
        let result = self.master.record(
            Operation::CreateDirectory,
            path,
            RemoteCall::CreateDirectory(path.clone(), *options),
        );
        self.track(result)
    }

    fn create_file(&mut self, path: &TierUri, options: &CreateFileOptions) -> MasterResult<()> {
        let result = self.master.record(
            Operation::CreateFile,
            path,
            RemoteCall::CreateFile(path.clone(), *options),
        );
        if result.is_ok() {
            self.master.insert(UriStatus::file(path, 0));
        }
        self.track(result)
    }

    fn delete(&mut self, path: &TierUri, options: &DeleteOptions) -> MasterResult<()> {
        let result = self.master.record(
            Operation::Delete,
            path,
            RemoteCall::Delete(path.clone(), *options),
        );
        self.track(result)
    }

    fn free(&mut self, path: &TierUri, options: &FreeOptions) -> MasterResult<()> {
        let result =
            self.master
                .record(Operation::Free, path, RemoteCall::Free(path.clone(), *options));
        self.track(result)
    }

    fn get_status(&mut self, path: &TierUri) -> MasterResult<UriStatus> {
        let result = self
            .master
            .record(Operation::GetStatus, path, RemoteCall::GetStatus(path.clone()))
            .and_then(|()| {
                self.master
                    .state
                    .statuses
                    .lock()
                    .unwrap()
                    .get(path.path())
                    .cloned()
                    .ok_or_else(|| MasterError::NotFound {
                        message: format!("no inode for {}", path),
                    })
            });
        self.track(result)
    }

    fn list_status(&mut self, path: &TierUri) -> MasterResult<Vec<UriStatus>> {
        let result = self
            .master
            .record(Operation::ListStatus, path, RemoteCall::ListStatus(path.clone()))
            .and_then(|()| {
                let statuses = self.master.state.statuses.lock().unwrap();
                if !statuses.contains_key(path.path()) {
                    return Err(MasterError::NotFound {
                        message: format!("no inode for {}", path),
                    });
                }
                let children: Vec<UriStatus> = statuses
                    .values()
                    .filter(|s| s.uri().and_then(|u| u.parent()).as_ref() == Some(path))
                    .cloned()
                    .collect();
                Ok(children)
            });
        self.track(result)
    }

    fn load_metadata(&mut self, path: &TierUri, options: &LoadMetadataOptions) -> MasterResult<()> {
        let result = self.master.record(
            Operation::LoadMetadata,
            path,
            RemoteCall::LoadMetadata(path.clone(), *options),
        );
        self.track(result)
    }

    fn mount(
        &mut self,
        path: &TierUri,
        ufs_path: &TierUri,
        options: &MountOptions,
    ) -> MasterResult<()> {
        let result = self.master.record(
            Operation::Mount,
            path,
            RemoteCall::Mount(path.clone(), ufs_path.clone(), *options),
        );
        self.track(result)
    }

    fn rename(&mut self, src: &TierUri, dst: &TierUri) -> MasterResult<()> {
        let result = self.master.record(
            Operation::Rename,
            src,
            RemoteCall::Rename(src.clone(), dst.clone()),
        );
        self.track(result)
    }

    fn set_attribute(&mut self, path: &TierUri, options: &SetAttributeOptions) -> MasterResult<()> {
        let result = self.master.record(
            Operation::SetAttribute,
            path,
            RemoteCall::SetAttribute(path.clone(), *options),
        );
        self.track(result)
    }

    fn unmount(&mut self, path: &TierUri) -> MasterResult<()> {
        let result =
            self.master
                .record(Operation::Unmount, path, RemoteCall::Unmount(path.clone()));
        self.track(result)
    }

    fn is_connected(&self) -> bool {
        self.connected && !self.master.state.disconnected.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct ConnectorState {
    attempts: AtomicUsize,
    connects: AtomicUsize,
    failing: AtomicBool,
}

/// Connector handing out [`MockClient`]s for one shared [`MockMaster`].
#[derive(Clone, Default)]
pub struct MockConnector {
    master: MockMaster,
    state: Arc<ConnectorState>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn master(&self) -> MockMaster {
        self.master.clone()
    }

    pub fn fail_connects(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Successful connections.
    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }
}

impl MasterConnector for MockConnector {
    fn connect(&self) -> Result<Box<dyn MasterClient>, TransportError> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionRefused {
                addr: self.address().to_string(),
            });
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockClient {
            master: self.master.clone(),
            connected: true,
        }))
    }

    fn address(&self) -> &str {
        "mock-master:19998"
    }
}

/// Stream factory keeping file bytes in memory and counting opens.
#[derive(Clone, Default)]
pub struct MemoryStreams {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    opened_in: Arc<Mutex<Vec<(String, InStreamOptions)>>>,
    opened_out: Arc<Mutex<Vec<(TierUri, OutStreamOptions)>>>,
}

impl MemoryStreams {
    pub fn put(&self, path: &str, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
    }

    pub fn opened_in(&self) -> Vec<(String, InStreamOptions)> {
        self.opened_in.lock().unwrap().clone()
    }

    pub fn opened_out(&self) -> Vec<(TierUri, OutStreamOptions)> {
        self.opened_out.lock().unwrap().clone()
    }
}

impl StreamFactory for MemoryStreams {
    fn open_in_stream(
        &self,
        status: UriStatus,
        options: InStreamOptions,
    ) -> crate::error::Result<FileInStream> {
        self.opened_in
            .lock()
            .unwrap()
            .push((status.path.clone(), options));
        let bytes = self
            .files
            .lock()
            .unwrap()
            .get(&status.path)
            .cloned()
            .unwrap_or_default();
        Ok(FileInStream::new(status, options, Box::new(Cursor::new(bytes))))
    }

    fn open_out_stream(
        &self,
        path: TierUri,
        options: OutStreamOptions,
    ) -> crate::error::Result<FileOutStream> {
        self.opened_out.lock().unwrap().push((path.clone(), options));
        Ok(FileOutStream::new(path, options, Box::new(io::sink())))
    }
}
