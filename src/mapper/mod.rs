//! Key <-> position mapping over sorted line stores.
//!
//! A position is the byte offset of a line's first character; the key is the
//! line's text without its newline. The store must be sorted by key and
//! contain no empty lines. Sortedness is a precondition: it is never checked
//! during lookups, and an unsorted store silently yields wrong answers (use
//! [`stats::verify_store`] to check a file up front).
//!
//! ## Strategies
//!
//! - [`FullIndexMapper`] - scans once into two hash maps, O(1) lookups
//! - [`DirectMapper`] - binary search over the store for every call
//! - [`CachedMapper`] - binary search seeded by a tree of earlier probes
//!
//! All three return identical results on a valid store.
//!
//! ## Building blocks
//!
//! - [`line`] - find a line start, read a line
//! - [`search`] - binary search with offset-midpoint narrowing
//! - [`cache`] - the search-bound tree used by [`CachedMapper`]

pub mod cache;
pub mod cached;
pub mod direct;
pub mod full;
pub mod line;
pub mod search;
pub mod stats;

pub use cache::{Narrowed, SearchTree};
pub use cached::{CacheStats, CachedMapper};
pub use direct::DirectMapper;
pub use full::FullIndexMapper;

use crate::error::Result;
use crate::store::MmapStore;
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Byte offset of a line start
pub type Position = u64;

/// A line of the store and where it starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub key: String,
    pub position: Position,
}

/// Bidirectional mapping between keys and positions
pub trait PositionMapper {
    /// Position of the line equal to `key`, or `EncodeNotFound`
    fn encode(&self, key: &str) -> Result<Position>;

    /// Key of the line starting at `position`, or `DecodeNotFound`
    fn decode(&self, position: Position) -> Result<String>;
}

impl<M: PositionMapper + ?Sized> PositionMapper for &M {
    fn encode(&self, key: &str) -> Result<Position> {
        (**self).encode(key)
    }

    fn decode(&self, position: Position) -> Result<String> {
        (**self).decode(position)
    }
}

impl<M: PositionMapper + ?Sized> PositionMapper for Box<M> {
    fn encode(&self, key: &str) -> Result<Position> {
        (**self).encode(key)
    }

    fn decode(&self, position: Position) -> Result<String> {
        (**self).decode(position)
    }
}

/// Which mapper to build for a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Load every line into memory up front
    Full,
    /// Binary search the file on every lookup
    Direct,
    /// Binary search with a tree of earlier probes
    #[default]
    Cached,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Full, Strategy::Direct, Strategy::Cached];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Full => "full",
            Strategy::Direct => "direct",
            Strategy::Cached => "cached",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open a word list with the given strategy.
///
/// The search strategies memory-map the file; the full strategy reads it
/// once and keeps only the hash maps.
pub fn open_mapper(path: &Path, strategy: Strategy) -> anyhow::Result<Box<dyn PositionMapper>> {
    debug!("opening {} with {} strategy", path.display(), strategy);

    let mapper: Box<dyn PositionMapper> = match strategy {
        Strategy::Full => Box::new(FullIndexMapper::from_path(path)?),
        Strategy::Direct => Box::new(DirectMapper::new(MmapStore::open(path)?)),
        Strategy::Cached => Box::new(CachedMapper::new(MmapStore::open(path)?)),
    };

    Ok(mapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use std::fs;
    use tempfile::tempdir;

    const WORDS: &[u8] = b"a\nbcd\nefg\nhijk\n";

    #[test]
    fn test_strategies_agree() {
        let full = FullIndexMapper::from_reader(WORDS).unwrap();
        let direct = DirectMapper::new(WORDS);
        let cached = CachedMapper::new(WORDS);
        let mappers: [&dyn PositionMapper; 3] = [&full, &direct, &cached];

        for key in ["a", "bcd", "efg", "hijk", "", "0", "b", "f", "zzz"] {
            let expected = full.encode(key).ok();
            for m in mappers {
                assert_eq!(m.encode(key).ok(), expected, "key {key:?}");
            }
        }
        for pos in 0..20 {
            let expected = full.decode(pos).ok();
            for m in mappers {
                assert_eq!(m.decode(pos).ok(), expected, "pos {pos}");
            }
        }
    }

    #[test]
    fn test_open_mapper_every_strategy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, WORDS).unwrap();

        for strategy in Strategy::ALL {
            let m = open_mapper(&path, strategy).unwrap();
            assert_eq!(m.encode("efg").unwrap(), 6, "{strategy}");
            assert_eq!(m.decode(10).unwrap(), "hijk", "{strategy}");
            assert!(matches!(m.encode("zzz"), Err(MapError::EncodeNotFound(_))));
        }
    }

    #[test]
    fn test_strategy_serde_names() {
        assert_eq!(serde_json::to_string(&Strategy::Direct).unwrap(), "\"direct\"");
        let parsed: Strategy = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(parsed, Strategy::Full);
        assert_eq!(Strategy::default(), Strategy::Cached);
    }
}
