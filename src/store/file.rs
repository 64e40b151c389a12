//! File-backed stores.

use super::ByteStore;
use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::Path;

/// Positional reads on an open file.
///
/// Every read goes to the OS; nothing is buffered. Suits very large word
/// lists where only a handful of probes per query are ever touched.
pub struct FileStore {
    file: File,
    size: u64,
}

impl FileStore {
    /// Open a file and record its current length
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Self::from_file(file)
    }

    /// Wrap an already open file
    pub fn from_file(file: File) -> Result<Self> {
        let size = file.metadata().context("Failed to stat store file")?.len();
        Ok(Self { file, size })
    }
}

impl ByteStore for FileStore {
    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        use std::os::unix::fs::FileExt;
        if offset >= self.size {
            return Ok(0);
        }
        self.file.read_at(buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        use std::os::windows::fs::FileExt;
        if offset >= self.size {
            return Ok(0);
        }
        self.file.seek_read(buf, offset)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Memory-mapped store
pub struct MmapStore {
    /// `None` for empty files, which cannot be mapped on every platform
    mmap: Option<Mmap>,
}

impl MmapStore {
    /// Memory-map a file read-only
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let len = file.metadata().context("Failed to stat store file")?.len();

        let mmap = if len == 0 {
            None
        } else {
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self { mmap })
    }

    /// The mapped bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}

impl ByteStore for MmapStore {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.as_bytes().read_at(buf, offset)
    }

    fn size(&self) -> u64 {
        self.as_bytes().len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_reads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, b"a\nbcd\n").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.size(), 6);

        let mut buf = [0u8; 3];
        assert_eq!(store.read_at(&mut buf, 2).unwrap(), 3);
        assert_eq!(&buf, b"bcd");
        assert_eq!(store.read_at(&mut buf, 6).unwrap(), 0);
    }

    #[test]
    fn test_mmap_store_reads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, b"a\nbcd\n").unwrap();

        let store = MmapStore::open(&path).unwrap();
        assert_eq!(store.size(), 6);
        assert_eq!(store.as_bytes(), b"a\nbcd\n");
    }

    #[test]
    fn test_mmap_store_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, b"").unwrap();

        let store = MmapStore::open(&path).unwrap();
        assert_eq!(store.size(), 0);
        let mut buf = [0u8; 4];
        assert_eq!(store.read_at(&mut buf, 0).unwrap(), 0);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        assert!(FileStore::open(&dir.path().join("nope.txt")).is_err());
        assert!(MmapStore::open(&dir.path().join("nope.txt")).is_err());
    }
}
