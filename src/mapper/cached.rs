//! Cached-search mapper: binary search seeded by a tree of earlier probes.

use super::cache::SearchTree;
use super::direct::decode_at;
use super::search::binary_search;
use super::{Position, PositionMapper};
use crate::error::{MapError, Result};
use crate::store::{ByteStore, Prefix};
use log::trace;
use serde::Serialize;
use std::cell::RefCell;

/// Snapshot of the probe cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub nodes: usize,
    pub depth: usize,
}

/// Mapper that remembers every probed line to shorten later searches.
///
/// Encode consults the tree first: an exact hit skips the store entirely,
/// otherwise the search starts from the bounds of the nearest cached
/// neighbours and adds every new probe to the tree.
///
/// Decode reuses the tree but never inserts into it. Decode misses fall
/// through to a plain direct decode, so the tree's shape is driven only by
/// encode traffic.
///
/// The tree sits behind a `RefCell`: the mapper can move between threads but
/// cannot be shared by them. Use one mapper per thread, or wrap it in a lock.
pub struct CachedMapper<S> {
    store: S,
    size: u64,
    cache: RefCell<SearchTree>,
}

impl<S: ByteStore> CachedMapper<S> {
    /// Use the store's own length as the search bound
    pub fn new(store: S) -> Self {
        let size = store.size();
        Self::with_size(store, size)
    }

    /// Use a caller-supplied total size; bytes past it are never read
    pub fn with_size(store: S, size: u64) -> Self {
        Self {
            store,
            size,
            cache: RefCell::new(SearchTree::new()),
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.borrow();
        CacheStats {
            nodes: cache.len(),
            depth: cache.depth(),
        }
    }

    /// Borrow the probe cache
    pub fn cache(&self) -> std::cell::Ref<'_, SearchTree> {
        self.cache.borrow()
    }
}

impl<S: ByteStore> PositionMapper for CachedMapper<S> {
    fn encode(&self, key: &str) -> Result<Position> {
        if key.is_empty() {
            return Err(MapError::EncodeNotFound(String::new()));
        }

        let narrowed = self.cache.borrow().search_by_key(key, 0..self.size);
        if let Some(position) = narrowed.found {
            trace!("cache hit for {key:?} at {position}");
            return Ok(position);
        }

        // The tree is taken out for the search and put back afterwards; on
        // an I/O error the probes inserted so far are still kept. Lines that
        // are not valid UTF-8 are never cached, so the tree only holds keys
        // that decode would also return.
        let mut tree = self.cache.take();
        let store = Prefix::new(&self.store, self.size);
        let found = binary_search(&store, key, narrowed.range, |probe| {
            if let Some(line) = probe.key() {
                tree = std::mem::take(&mut tree).insert(line, probe.start);
            }
        });
        self.cache.replace(tree);

        found?.ok_or_else(|| MapError::EncodeNotFound(key.to_string()))
    }

    fn decode(&self, position: Position) -> Result<String> {
        let narrowed = self.cache.borrow().search_by_position(position, 0..self.size);
        if let Some(key) = narrowed.found {
            return Ok(key);
        }

        decode_at(&Prefix::new(&self.store, self.size), self.size, position)
    }
}
