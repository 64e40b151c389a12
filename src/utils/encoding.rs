use crate::error::{MapError, Result};
use crate::mapper::PositionMapper;
use std::io::{self, Read, Write};

/// Widest supported field, the size of a u64
pub const MAX_WIDTH: usize = 8;

/// Fixed-width big-endian encoding of positions.
///
/// A position is written as the low-order `byte_len` bytes of its 8-byte
/// big-endian form, most significant byte first. Decoding zero-extends back
/// to 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidthCodec {
    byte_len: usize,
}

impl FixedWidthCodec {
    /// Create a codec for fields of `byte_len` bytes (1 to 8)
    pub fn new(byte_len: usize) -> Result<Self> {
        if !(1..=MAX_WIDTH).contains(&byte_len) {
            return Err(MapError::InvalidByteLength(byte_len));
        }
        Ok(Self { byte_len })
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Largest position that survives a round trip
    pub fn max_position(&self) -> u64 {
        if self.byte_len == MAX_WIDTH {
            u64::MAX
        } else {
            (1u64 << (8 * self.byte_len)) - 1
        }
    }

    /// True if `position` fits without losing high bytes
    pub fn fits(&self, position: u64) -> bool {
        position <= self.max_position()
    }

    /// Smallest field width that holds `max_value`
    pub fn width_for(max_value: u64) -> usize {
        let bits = 64 - max_value.leading_zeros() as usize;
        bits.div_ceil(8).max(1)
    }

    /// Encode into a new buffer. High bytes beyond the width are dropped.
    pub fn encode(&self, position: u64) -> Vec<u8> {
        position.to_be_bytes()[MAX_WIDTH - self.byte_len..].to_vec()
    }

    /// Encode and write one field
    pub fn encode_to<W: Write>(&self, writer: &mut W, position: u64) -> io::Result<()> {
        writer.write_all(&position.to_be_bytes()[MAX_WIDTH - self.byte_len..])
    }

    /// Map `key` to its position and write the field
    pub fn encode_key<W, M>(&self, writer: &mut W, mapper: &M, key: &str) -> Result<()>
    where
        W: Write,
        M: PositionMapper + ?Sized,
    {
        let position = mapper.encode(key)?;
        self.encode_to(writer, position)?;
        Ok(())
    }

    /// Decode the first `byte_len` bytes of `bytes`.
    ///
    /// A shorter slice is an `UnexpectedEof` I/O error.
    pub fn decode(&self, bytes: &[u8]) -> Result<u64> {
        if bytes.len() < self.byte_len {
            return Err(truncated(bytes.len(), self.byte_len).into());
        }
        let mut buf = [0u8; MAX_WIDTH];
        buf[MAX_WIDTH - self.byte_len..].copy_from_slice(&bytes[..self.byte_len]);
        Ok(u64::from_be_bytes(buf))
    }

    /// Read one field.
    ///
    /// Returns `Ok(None)` at a clean end of stream and `UnexpectedEof` when
    /// the stream ends inside a field.
    pub fn decode_from<R: Read>(&self, reader: &mut R) -> io::Result<Option<u64>> {
        let mut buf = [0u8; MAX_WIDTH];
        let field = &mut buf[MAX_WIDTH - self.byte_len..];
        let mut filled = 0;

        while filled < field.len() {
            match reader.read(&mut field[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        match filled {
            0 => Ok(None),
            n if n < self.byte_len => Err(truncated(n, self.byte_len)),
            _ => Ok(Some(u64::from_be_bytes(buf))),
        }
    }

    /// Read one field and map it back to its key
    pub fn decode_key<R, M>(&self, reader: &mut R, mapper: &M) -> Result<Option<String>>
    where
        R: Read,
        M: PositionMapper + ?Sized,
    {
        match self.decode_from(reader)? {
            Some(position) => mapper.decode(position).map(Some),
            None => Ok(None),
        }
    }
}

fn truncated(got: usize, want: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("truncated field: {got} of {want} bytes"),
    )
}
