use crate::error;
use crate::hal::{Handle, OpenMode, ScriptStore};
use crate::lang::Error;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

const CHUNK_SIZE: usize = 256;

/// ## Loaded script
///
/// Lines are immutable for the run; line terminators are already stripped.

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    name: String,
    lines: Vec<Rc<str>>,
}

impl Script {
    pub fn from_str(name: &str, text: &str) -> Script {
        let mut lines: Vec<Rc<str>> = text
            .split('\n')
            .map(|line| line.replace('\r', "").into())
            .collect();
        if text.ends_with('\n') || text.is_empty() {
            lines.pop();
        }
        Script {
            name: name.to_string(),
            lines,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|line| line.as_ref())
    }

    pub(crate) fn shared_line(&self, index: usize) -> Option<Rc<str>> {
        self.lines.get(index).cloned()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.as_ref())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Reads LF-terminated lines from an open resource in fixed chunks. CR bytes
/// are dropped and a final line without terminator is still returned.
pub struct LineReader<'a> {
    store: &'a mut dyn ScriptStore,
    handle: &'a Handle,
    chunk: [u8; CHUNK_SIZE],
    filled: usize,
    pos: usize,
    eof: bool,
}

impl<'a> LineReader<'a> {
    pub fn new(store: &'a mut dyn ScriptStore, handle: &'a Handle) -> LineReader<'a> {
        LineReader {
            store,
            handle,
            chunk: [0; CHUNK_SIZE],
            filled: 0,
            pos: 0,
            eof: false,
        }
    }

    /// True once the resource is exhausted. Right after `next_line` returns
    /// a line this means the line had no terminator.
    pub fn at_end(&self) -> bool {
        self.eof
    }

    pub fn next_line(&mut self) -> Result<Option<String>> {
        let mut bytes: Vec<u8> = vec![];
        loop {
            if self.pos == self.filled {
                if self.eof {
                    break;
                }
                self.filled = self.store.read(self.handle, &mut self.chunk)?;
                self.pos = 0;
                if self.filled == 0 {
                    self.eof = true;
                    break;
                }
            }
            let byte = self.chunk[self.pos];
            self.pos += 1;
            match byte {
                b'\n' => return Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
                b'\r' => {}
                _ => bytes.push(byte),
            }
        }
        if bytes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
        }
    }
}

/// Mounts the store for the duration of `f`. The store is unmounted on every
/// exit path.
pub fn with_mounted<T, F>(store: &mut dyn ScriptStore, f: F) -> Result<T>
where
    F: FnOnce(&mut dyn ScriptStore) -> Result<T>,
{
    if let Err(error) = store.mount() {
        tracing::warn!("mount failed: {}", error);
        return Err(error!(NotFound; "STORE NOT MOUNTED"));
    }
    let result = f(&mut *store);
    store.unmount();
    result
}

/// Reads the named script. Fails with `TooLarge` without reading when twice
/// the file size plus `margin` exceeds `free` bytes.
pub fn load(store: &mut dyn ScriptStore, name: &str, free: usize, margin: usize) -> Result<Script> {
    with_mounted(store, |store| {
        let handle = match store.open(name, OpenMode::Read) {
            Ok(handle) => handle,
            Err(error) => {
                tracing::warn!("cannot open {}: {}", name, error);
                return Err(error!(NotFound; name));
            }
        };
        let result = read_script(&mut *store, &handle, name, free, margin);
        store.close(handle);
        result
    })
}

fn read_script(
    store: &mut dyn ScriptStore,
    handle: &Handle,
    name: &str,
    free: usize,
    margin: usize,
) -> Result<Script> {
    let size = store.size(handle)? as usize;
    let needed = size.saturating_mul(2).saturating_add(margin);
    if needed > free {
        return Err(error!(TooLarge; format!("{} NEEDS {} BYTES, {} FREE", name, needed, free)));
    }
    let mut lines: Vec<Rc<str>> = vec![];
    let mut reader = LineReader::new(store, handle);
    while let Some(line) = reader.next_line()? {
        lines.push(line.into());
    }
    tracing::info!("loaded {} ({} bytes, {} lines)", name, size, lines.len());
    Ok(Script {
        name: name.to_string(),
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MemStore;
    use crate::lang::ErrorCode;

    #[test]
    fn test_from_str() {
        let script = Script::from_str("t", "a\r\nb\n\nc");
        assert_eq!(script.lines().collect::<Vec<_>>(), vec!["a", "b", "", "c"]);
        assert_eq!(Script::from_str("t", "a\n").len(), 1);
        assert!(Script::from_str("t", "").is_empty());
    }

    #[test]
    fn test_load_spans_chunks() {
        let mut store = MemStore::new();
        let long = "x".repeat(300);
        store.insert("s.txt", format!("first\r\n{}\nlast", long));
        let script = load(&mut store, "s.txt", 100_000, 4096).unwrap();
        assert_eq!(script.len(), 3);
        assert_eq!(script.line(0), Some("first"));
        assert_eq!(script.line(1).map(|l| l.len()), Some(300));
        assert_eq!(script.line(2), Some("last"));
        assert!(!store.is_mounted());
        assert_eq!(store.open_count(), 0);
    }

    #[test]
    fn test_load_errors() {
        let mut store = MemStore::new();
        store.insert("big.txt", vec![b'a'; 1000]);
        let err = load(&mut store, "big.txt", 2000, 100).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TooLarge);
        assert!(!store.is_mounted());
        let err = load(&mut store, "missing.txt", 2000, 100).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        store.mount_fails = true;
        let err = load(&mut store, "big.txt", 100_000, 100).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
