//! Direct-search mapper: a fresh binary search on every call.

use super::line::{is_line_start, read_line};
use super::search::binary_search;
use super::{Position, PositionMapper};
use crate::error::{MapError, Result};
use crate::store::{ByteStore, Prefix};

/// Stateless mapper that probes the store for every query.
///
/// Uses O(1) memory and O(log size) reads per lookup.
pub struct DirectMapper<S> {
    store: S,
    size: u64,
}

impl<S: ByteStore> DirectMapper<S> {
    /// Use the store's own length as the search bound
    pub fn new(store: S) -> Self {
        let size = store.size();
        Self { store, size }
    }

    /// Use a caller-supplied total size.
    ///
    /// Bytes at or past `size` are invisible: a line crossing the boundary
    /// ends there, like an unterminated last line.
    pub fn with_size(store: S, size: u64) -> Self {
        Self { store, size }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Decode against a store without any cache
pub(crate) fn decode_at<S: ByteStore + ?Sized>(
    store: &S,
    size: u64,
    position: Position,
) -> Result<String> {
    if position >= size || !is_line_start(store, position)? {
        return Err(MapError::DecodeNotFound(position));
    }

    let line = read_line(store, position)?;
    if line.is_empty() {
        return Err(MapError::DecodeNotFound(position));
    }

    String::from_utf8(line).map_err(|_| MapError::DecodeNotFound(position))
}

impl<S: ByteStore> PositionMapper for DirectMapper<S> {
    fn encode(&self, key: &str) -> Result<Position> {
        if key.is_empty() {
            return Err(MapError::EncodeNotFound(String::new()));
        }

        let store = Prefix::new(&self.store, self.size);
        binary_search(&store, key, 0..self.size, |_| {})?
            .ok_or_else(|| MapError::EncodeNotFound(key.to_string()))
    }

    fn decode(&self, position: Position) -> Result<String> {
        decode_at(&Prefix::new(&self.store, self.size), self.size, position)
    }
}
