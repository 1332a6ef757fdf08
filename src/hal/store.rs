use crate::error;
use crate::lang::Error;
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    /// Create or truncate.
    Write,
}

/// Open resource in a `ScriptStore`.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Handle(usize);

/// ## Named-resource storage holding scripts and replay files
///
/// Resources can only be opened while the store is mounted.
pub trait ScriptStore {
    fn mount(&mut self) -> Result<()>;
    fn unmount(&mut self);
    fn open(&mut self, name: &str, mode: OpenMode) -> Result<Handle>;
    fn size(&self, handle: &Handle) -> Result<u64>;
    fn read(&mut self, handle: &Handle, buf: &mut [u8]) -> Result<usize>;
    fn write(&mut self, handle: &Handle, buf: &[u8]) -> Result<usize>;
    fn close(&mut self, handle: Handle);
    /// Erases every resource. Works mounted or not.
    fn format(&mut self) -> Result<()>;
}

#[derive(Debug)]
struct OpenFile {
    name: String,
    pos: usize,
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemStore {
    files: BTreeMap<String, Vec<u8>>,
    open: HashMap<usize, OpenFile>,
    next_handle: usize,
    mounted: bool,
    pub mount_fails: bool,
    pub formats: usize,
    pub mounts: usize,
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore::default()
    }

    pub fn insert<S: Into<Vec<u8>>>(&mut self, name: &str, contents: S) {
        self.files.insert(name.to_string(), contents.into());
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(|v| v.as_slice())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    fn open_file(&self, handle: &Handle) -> Result<&OpenFile> {
        self.open
            .get(&handle.0)
            .ok_or_else(|| error!(DiskIoError; "BAD HANDLE"))
    }
}

impl ScriptStore for MemStore {
    fn mount(&mut self) -> Result<()> {
        if self.mount_fails {
            return Err(error!(DiskNotMounted));
        }
        self.mounts += 1;
        self.mounted = true;
        Ok(())
    }

    fn unmount(&mut self) {
        self.mounted = false;
    }

    fn open(&mut self, name: &str, mode: OpenMode) -> Result<Handle> {
        if !self.mounted {
            return Err(error!(DiskNotMounted));
        }
        match mode {
            OpenMode::Read => {
                if !self.files.contains_key(name) {
                    return Err(error!(NotFound; name));
                }
            }
            OpenMode::Write => {
                self.files.insert(name.to_string(), vec![]);
            }
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.open.insert(
            handle,
            OpenFile {
                name: name.to_string(),
                pos: 0,
            },
        );
        Ok(Handle(handle))
    }

    fn size(&self, handle: &Handle) -> Result<u64> {
        let file = self.open_file(handle)?;
        Ok(self.files.get(&file.name).map_or(0, |v| v.len() as u64))
    }

    fn read(&mut self, handle: &Handle, buf: &mut [u8]) -> Result<usize> {
        let file = self
            .open
            .get_mut(&handle.0)
            .ok_or_else(|| error!(DiskIoError; "BAD HANDLE"))?;
        let data = match self.files.get(&file.name) {
            Some(data) => data,
            None => return Err(error!(NotFound; file.name.clone())),
        };
        let start = file.pos.min(data.len());
        let len = buf.len().min(data.len() - start);
        buf[..len].copy_from_slice(&data[start..start + len]);
        file.pos = start + len;
        Ok(len)
    }

    fn write(&mut self, handle: &Handle, buf: &[u8]) -> Result<usize> {
        let file = self
            .open
            .get_mut(&handle.0)
            .ok_or_else(|| error!(DiskIoError; "BAD HANDLE"))?;
        let data = self.files.entry(file.name.clone()).or_default();
        data.truncate(file.pos);
        data.extend_from_slice(buf);
        file.pos += buf.len();
        Ok(buf.len())
    }

    fn close(&mut self, handle: Handle) {
        self.open.remove(&handle.0);
    }

    fn format(&mut self) -> Result<()> {
        self.open.clear();
        self.files.clear();
        self.formats += 1;
        Ok(())
    }
}

/// Store backed by one host directory. Resource names map to file names
/// inside it.
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
    open: HashMap<usize, File>,
    next_handle: usize,
    mounted: bool,
}

impl DirStore {
    pub fn new<P: AsRef<Path>>(root: P) -> DirStore {
        DirStore {
            root: root.as_ref().to_path_buf(),
            open: HashMap::new(),
            next_handle: 0,
            mounted: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> Result<PathBuf> {
        match Path::new(name.trim_start_matches('/')).file_name() {
            Some(file_name) => Ok(self.root.join(file_name)),
            None => Err(error!(NotFound; name)),
        }
    }

    fn file(&mut self, handle: &Handle) -> Result<&mut File> {
        self.open
            .get_mut(&handle.0)
            .ok_or_else(|| error!(DiskIoError; "BAD HANDLE"))
    }
}

impl ScriptStore for DirStore {
    fn mount(&mut self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(error!(DiskNotMounted; self.root.display().to_string()));
        }
        self.mounted = true;
        Ok(())
    }

    fn unmount(&mut self) {
        self.open.clear();
        self.mounted = false;
    }

    fn open(&mut self, name: &str, mode: OpenMode) -> Result<Handle> {
        if !self.mounted {
            return Err(error!(DiskNotMounted));
        }
        let path = self.path(name)?;
        let file = match mode {
            OpenMode::Read => File::open(&path)?,
            OpenMode::Write => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)?,
        };
        let handle = self.next_handle;
        self.next_handle += 1;
        self.open.insert(handle, file);
        Ok(Handle(handle))
    }

    fn size(&self, handle: &Handle) -> Result<u64> {
        match self.open.get(&handle.0) {
            Some(file) => Ok(file.metadata()?.len()),
            None => Err(error!(DiskIoError; "BAD HANDLE")),
        }
    }

    fn read(&mut self, handle: &Handle, buf: &mut [u8]) -> Result<usize> {
        Ok(self.file(handle)?.read(buf)?)
    }

    fn write(&mut self, handle: &Handle, buf: &[u8]) -> Result<usize> {
        let file = self.file(handle)?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self, handle: Handle) {
        self.open.remove(&handle.0);
    }

    fn format(&mut self) -> Result<()> {
        self.open.clear();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_store_requires_mount() {
        let mut store = MemStore::new();
        store.insert("a.txt", "hello");
        assert_eq!(
            store.open("a.txt", OpenMode::Read).unwrap_err().code(),
            crate::lang::ErrorCode::DiskNotMounted
        );
        store.mount().unwrap();
        let handle = store.open("a.txt", OpenMode::Read).unwrap();
        assert_eq!(store.size(&handle).unwrap(), 5);
        let mut buf = [0u8; 3];
        assert_eq!(store.read(&handle, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(store.read(&handle, &mut buf).unwrap(), 2);
        assert_eq!(store.read(&handle, &mut buf).unwrap(), 0);
        store.close(handle);
        assert_eq!(store.open_count(), 0);
    }

    #[test]
    fn test_mem_store_write_and_format() {
        let mut store = MemStore::new();
        store.mount().unwrap();
        let handle = store.open("log.csv", OpenMode::Write).unwrap();
        store.write(&handle, b"1,2").unwrap();
        store.write(&handle, b",3").unwrap();
        store.close(handle);
        assert_eq!(store.get("log.csv"), Some(&b"1,2,3"[..]));
        store.format().unwrap();
        assert_eq!(store.get("log.csv"), None);
        assert_eq!(store.formats, 1);
    }

    #[test]
    fn test_mem_store_missing() {
        let mut store = MemStore::new();
        store.mount().unwrap();
        let err = store.open("nope", OpenMode::Read).unwrap_err();
        assert_eq!(err.code(), crate::lang::ErrorCode::NotFound);
    }
}
