use crate::error;
use crate::lang::Error;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, Error>;

/// Value of every byte after an erase.
pub const ERASED: u8 = 0xFF;

/// ## NOR-flash region
///
/// `program` can only clear bits; only `erase` sets them again.
pub trait Flash {
    fn len(&self) -> usize;
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<()>;
    fn program(&mut self, offset: usize, data: &[u8]) -> Result<()>;
    fn erase(&mut self) -> Result<()>;
}

fn check_range(offset: usize, len: usize, size: usize) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(error!(FlashError; format!("{}+{} OUT OF RANGE", offset, len))),
    }
}

#[derive(Debug, Clone)]
pub struct MemFlash {
    bytes: Vec<u8>,
    pub erases: usize,
    /// Bytes a program call writes before the simulated power loss.
    pub tear_after: Option<usize>,
}

impl MemFlash {
    pub fn new(len: usize) -> MemFlash {
        MemFlash {
            bytes: vec![ERASED; len],
            erases: 0,
            tear_after: None,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Flash for MemFlash {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.bytes.len())?;
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }

    fn program(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        check_range(offset, data.len(), self.bytes.len())?;
        let count = self.tear_after.take().unwrap_or(data.len()).min(data.len());
        for (byte, new) in self.bytes[offset..offset + count].iter_mut().zip(data) {
            *byte &= *new;
        }
        Ok(())
    }

    fn erase(&mut self) -> Result<()> {
        self.bytes.iter_mut().for_each(|b| *b = ERASED);
        self.erases += 1;
        Ok(())
    }
}

/// Flash region kept in a host file, created erased on first use.
#[derive(Debug)]
pub struct FileFlash {
    path: PathBuf,
    len: usize,
}

impl FileFlash {
    pub fn open<P: AsRef<Path>>(path: P, len: usize) -> Result<FileFlash> {
        let path = path.as_ref().to_path_buf();
        let current = match std::fs::metadata(&path) {
            Ok(meta) => Some(meta.len() as usize),
            Err(_) => None,
        };
        if current != Some(len) {
            std::fs::write(&path, vec![ERASED; len])?;
        }
        Ok(FileFlash { path, len })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Flash for FileFlash {
    fn len(&self) -> usize {
        self.len
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.len)?;
        let mut file = OpenOptions::new().read(true).open(&self.path)?;
        file.seek(SeekFrom::Start(offset as u64))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn program(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        check_range(offset, data.len(), self.len)?;
        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        let mut current = vec![0u8; data.len()];
        file.seek(SeekFrom::Start(offset as u64))?;
        file.read_exact(&mut current)?;
        for (byte, new) in current.iter_mut().zip(data) {
            *byte &= *new;
        }
        file.seek(SeekFrom::Start(offset as u64))?;
        file.write_all(&current)?;
        file.sync_data()?;
        Ok(())
    }

    fn erase(&mut self) -> Result<()> {
        std::fs::write(&self.path, vec![ERASED; self.len])?;
        Ok(())
    }
}
