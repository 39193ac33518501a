//! In-memory [`FileSystem`] used by the command tests.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Cursor};
use std::sync::Mutex;

use tierfs_client::options::{
    resolve, CreateDirectoryOptions, CreateFileOptions, DeleteOptions, ExistsOptions, FreeOptions,
    GetStatusOptions, ListStatusOptions, LoadMetadataOptions, MountOptions, OpenFileOptions,
    RenameOptions, SetAttributeOptions, UnmountOptions,
};
use tierfs_client::{FileInStream, FileOutStream, FileSystem, FsError, Result, TierUri, UriStatus};

#[derive(Default)]
struct State {
    calls: Vec<String>,
    entries: BTreeMap<String, UriStatus>,
    contents: HashMap<String, Vec<u8>>,
    failures: HashMap<&'static str, FsError>,
    attributes: Vec<SetAttributeOptions>,
}

pub struct FakeFs {
    state: Mutex<State>,
}

impl FakeFs {
    pub fn new() -> Self {
        let fs = Self {
            state: Mutex::new(State::default()),
        };
        fs.add_dir("/");
        fs
    }

    pub fn add_dir(&self, path: &str) {
        let uri = TierUri::parse(path).unwrap();
        let mut state = self.state.lock().unwrap();
        state
            .entries
            .insert(uri.path().to_string(), UriStatus::directory(&uri));
    }

    pub fn add_file(&self, path: &str, bytes: &[u8]) {
        let uri = TierUri::parse(path).unwrap();
        let mut state = self.state.lock().unwrap();
        state.entries.insert(
            uri.path().to_string(),
            UriStatus::file(&uri, bytes.len() as u64),
        );
        state.contents.insert(uri.path().to_string(), bytes.to_vec());
    }

    /// Next call of `op` fails with `err`.
    pub fn fail(&self, op: &'static str, err: FsError) {
        self.state.lock().unwrap().failures.insert(op, err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn attributes(&self) -> Vec<SetAttributeOptions> {
        self.state.lock().unwrap().attributes.clone()
    }

    fn record(&self, op: &'static str, call: String) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.remove(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn lookup(&self, path: &TierUri) -> Result<UriStatus> {
        self.state
            .lock()
            .unwrap()
            .entries
            .get(path.path())
            .cloned()
            .ok_or_else(|| FsError::PathNotFound {
                path: path.to_string(),
            })
    }
}

impl FileSystem for FakeFs {
    fn create_directory(
        &self,
        path: &TierUri,
        options: Option<CreateDirectoryOptions>,
    ) -> Result<()> {
        let options = resolve(options);
        self.record(
            "create_directory",
            format!("create_directory {} recursive={}", path, options.recursive),
        )?;
        self.add_dir(path.path());
        Ok(())
    }

    fn create_file(
        &self,
        path: &TierUri,
        options: Option<CreateFileOptions>,
    ) -> Result<FileOutStream> {
        let options = resolve(options);
        self.record("create_file", format!("create_file {}", path))?;
        self.add_file(path.path(), b"");
        Ok(FileOutStream::new(
            path.clone(),
            options.to_out_stream_options(),
            Box::new(io::sink()),
        ))
    }

    fn delete(&self, path: &TierUri, options: Option<DeleteOptions>) -> Result<()> {
        let options = resolve(options);
        self.record(
            "delete",
            format!("delete {} recursive={}", path, options.recursive),
        )
    }

    fn exists(&self, path: &TierUri, _options: Option<ExistsOptions>) -> Result<bool> {
        self.record("exists", format!("exists {}", path))?;
        Ok(self.lookup(path).is_ok())
    }

    fn free(&self, path: &TierUri, options: Option<FreeOptions>) -> Result<()> {
        let options = resolve(options);
        self.record("free", format!("free {} recursive={}", path, options.recursive))
    }

    fn get_status(&self, path: &TierUri, _options: Option<GetStatusOptions>) -> Result<UriStatus> {
        self.record("get_status", format!("get_status {}", path))?;
        self.lookup(path)
    }

    fn list_status(
        &self,
        path: &TierUri,
        _options: Option<ListStatusOptions>,
    ) -> Result<Vec<UriStatus>> {
        self.record("list_status", format!("list_status {}", path))?;
        let status = self.lookup(path)?;
        if !status.folder {
            return Ok(vec![status]);
        }
        let state = self.state.lock().unwrap();
        let children = state
            .entries
            .values()
            .filter(|s| {
                s.uri()
                    .and_then(|u| u.parent())
                    .map_or(false, |p| p.path() == path.path())
            })
            .cloned()
            .collect();
        Ok(children)
    }

    fn load_metadata(&self, path: &TierUri, options: Option<LoadMetadataOptions>) -> Result<()> {
        let options = resolve(options);
        self.record(
            "load_metadata",
            format!("load_metadata {} recursive={}", path, options.recursive),
        )
    }

    fn mount(
        &self,
        path: &TierUri,
        ufs_path: &TierUri,
        _options: Option<MountOptions>,
    ) -> Result<()> {
        self.record("mount", format!("mount {} {}", path, ufs_path))
    }

    fn open_file(&self, path: &TierUri, options: Option<OpenFileOptions>) -> Result<FileInStream> {
        let options = resolve(options);
        self.record("open_file", format!("open_file {}", path))?;
        let status = self.lookup(path)?;
        if status.folder {
            return Err(FsError::IsDirectory {
                path: path.to_string(),
            });
        }
        let bytes = self
            .state
            .lock()
            .unwrap()
            .contents
            .get(path.path())
            .cloned()
            .unwrap_or_default();
        Ok(FileInStream::new(
            status,
            options.to_in_stream_options(),
            Box::new(Cursor::new(bytes)),
        ))
    }

    fn rename(&self, src: &TierUri, dst: &TierUri, _options: Option<RenameOptions>) -> Result<()> {
        self.record("rename", format!("rename {} {}", src, dst))
    }

    fn set_attribute(&self, path: &TierUri, options: Option<SetAttributeOptions>) -> Result<()> {
        let options = resolve(options);
        self.record("set_attribute", format!("set_attribute {}", path))?;
        self.state.lock().unwrap().attributes.push(options);
        Ok(())
    }

    fn unmount(&self, path: &TierUri, _options: Option<UnmountOptions>) -> Result<()> {
        self.record("unmount", format!("unmount {}", path))
    }
}
