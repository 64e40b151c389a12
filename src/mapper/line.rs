//! Line reader over a [`ByteStore`].
//!
//! Stateless helpers to locate the start of the line containing an offset and
//! to read a line's bytes. Lines are returned exactly as stored; decoding to
//! text is left to the caller. Nothing is cached here; see [`super::cache`].

use crate::store::{read_full_at, ByteStore};
use memchr::memchr;
use std::io;

/// Forward reads are issued in chunks of this many bytes
pub const CHUNK_SIZE: usize = 32;

/// Find the first byte of the line that contains `offset`.
///
/// A `\n` exactly at `offset` is treated as the terminator of the line it
/// ends, so the scan skips it. Returns 0 when no earlier newline exists.
pub fn find_line_start<S: ByteStore + ?Sized>(store: &S, offset: u64) -> io::Result<u64> {
    let mut byte = [0u8; 1];
    let mut i = offset;

    while i > 0 {
        // Reads past the end count as a non-newline byte
        let n = read_full_at(store, &mut byte, i)?;
        if n == 1 && byte[0] == b'\n' && i != offset {
            return Ok(i + 1);
        }
        i -= 1;
    }

    Ok(0)
}

/// Read the bytes of the line starting at `offset`, without the newline.
///
/// Stops at the first `\n` or at end of data; an unterminated last line is
/// returned as is.
pub fn read_line<S: ByteStore + ?Sized>(store: &S, offset: u64) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut at = offset;

    loop {
        let n = read_full_at(store, &mut chunk, at)?;
        if let Some(end) = memchr(b'\n', &chunk[..n]) {
            line.extend_from_slice(&chunk[..end]);
            break;
        }
        line.extend_from_slice(&chunk[..n]);
        if n < CHUNK_SIZE {
            break;
        }
        at += n as u64;
    }

    Ok(line)
}

/// True if `offset` is 0 or directly follows a newline
pub fn is_line_start<S: ByteStore + ?Sized>(store: &S, offset: u64) -> io::Result<bool> {
    if offset == 0 {
        return Ok(true);
    }
    let mut byte = [0u8; 1];
    let n = read_full_at(store, &mut byte, offset - 1)?;
    Ok(n == 1 && byte[0] == b'\n')
}
