//! Random-access byte stores backing the position mappers.
//!
//! A [`ByteStore`] is the only capability a mapper needs: positional reads
//! plus a total size. Mappers take their store at construction, so several
//! independent mappers over different files never share hidden state.
//!
//! ## Implementations
//!
//! - `[u8]`, `[u8; N]`, `Vec<u8>` - in-memory stores (tests, small lists)
//! - [`FileStore`] - positional reads on an open file, nothing kept in memory
//! - [`MmapStore`] - memory-mapped file via `memmap2`
//! - [`Prefix`] - the first `size` bytes of another store

pub mod file;

pub use file::{FileStore, MmapStore};

use std::io;
use std::sync::Arc;

/// Immutable, byte-addressable backing store
pub trait ByteStore {
    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns `Ok(0)` at or past the end of data. Short reads are allowed;
    /// callers that need a full buffer loop until `Ok(0)`.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Total length of the store in bytes
    fn size(&self) -> u64;
}

/// Copy from an in-memory slice, reporting end of data as `Ok(0)`
fn read_slice_at(data: &[u8], buf: &mut [u8], offset: u64) -> io::Result<usize> {
    if offset >= data.len() as u64 {
        return Ok(0);
    }
    let start = offset as usize;
    let n = buf.len().min(data.len() - start);
    buf[..n].copy_from_slice(&data[start..start + n]);
    Ok(n)
}

impl ByteStore for [u8] {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        read_slice_at(self, buf, offset)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl<const N: usize> ByteStore for [u8; N] {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        read_slice_at(self, buf, offset)
    }

    fn size(&self) -> u64 {
        N as u64
    }
}

impl ByteStore for Vec<u8> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        read_slice_at(self, buf, offset)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl<T: ByteStore + ?Sized> ByteStore for &T {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

impl<T: ByteStore + ?Sized> ByteStore for Arc<T> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

/// The first `size` bytes of another store.
///
/// Reads at or past `size` report end of data, and reads that would cross it
/// are cut short, so a line running over the boundary ends there.
#[derive(Debug, Clone, Copy)]
pub struct Prefix<S> {
    inner: S,
    size: u64,
}

impl<S: ByteStore> Prefix<S> {
    pub fn new(inner: S, size: u64) -> Self {
        Self { inner, size }
    }
}

impl<S: ByteStore> ByteStore for Prefix<S> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        if offset >= self.size {
            return Ok(0);
        }
        let len = usize::try_from(self.size - offset).map_or(buf.len(), |n| n.min(buf.len()));
        self.inner.read_at(&mut buf[..len], offset)
    }

    fn size(&self) -> u64 {
        self.size.min(self.inner.size())
    }
}

/// Fill as much of `buf` as the store allows.
///
/// Retries short reads and `Interrupted`; stops early only at end of data.
pub fn read_full_at<S: ByteStore + ?Sized>(
    store: &S,
    buf: &mut [u8],
    offset: u64,
) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match store.read_at(&mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
