//! Full-index mapper: one pass over the store, then hash lookups.

use super::{Entry, Position, PositionMapper};
use crate::error::{MapError, Result};
use anyhow::Context;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Maps keys and positions through two in-memory hash maps.
///
/// Construction reads the whole store once: O(size) time and memory, then
/// O(1) lookups in both directions.
#[derive(Debug, Default)]
pub struct FullIndexMapper {
    key_to_position: FxHashMap<String, Position>,
    position_to_key: FxHashMap<Position, String>,
}

impl FullIndexMapper {
    /// Scan a reader line by line.
    ///
    /// Every `\n` terminated line must be valid UTF-8, otherwise construction
    /// fails with [`MapError::InvalidText`]. Empty lines are not keys and are
    /// skipped. A trailing fragment without a newline is ignored, while the
    /// search mappers still find it as an unterminated last line, so the
    /// strategies disagree on such input; [`super::stats::verify_store`]
    /// reports it as trailing bytes.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = BufReader::new(reader);
        let mut mapper = Self::default();
        let mut line = Vec::new();
        let mut offset: u64 = 0;

        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line)?;
            if n == 0 {
                break;
            }
            offset += n as u64;

            if line.last() != Some(&b'\n') {
                warn!(
                    "ignoring {} trailing bytes without a newline at offset {}",
                    n,
                    offset - n as u64
                );
                break;
            }
            line.pop();

            // offset now points just past the newline
            let first = offset - line.len() as u64 - 1;
            if line.is_empty() {
                continue;
            }
            let key = std::str::from_utf8(&line)
                .map_err(|_| MapError::InvalidText { offset: first })?
                .to_string();

            mapper.position_to_key.insert(first, key.clone());
            mapper.key_to_position.insert(key, first);
        }

        debug!("full index built: {} entries over {} bytes", mapper.len(), offset);
        Ok(mapper)
    }

    /// Open and scan a file
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("Failed to index {}", path.display()))
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.position_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position_to_key.is_empty()
    }

    /// All entries, sorted by position
    pub fn entries(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .position_to_key
            .iter()
            .map(|(&position, key)| Entry {
                key: key.clone(),
                position,
            })
            .collect();
        entries.sort_unstable_by_key(|e| e.position);
        entries
    }
}

impl PositionMapper for FullIndexMapper {
    fn encode(&self, key: &str) -> Result<Position> {
        self.key_to_position
            .get(key)
            .copied()
            .ok_or_else(|| MapError::EncodeNotFound(key.to_string()))
    }

    fn decode(&self, position: Position) -> Result<String> {
        self.position_to_key
            .get(&position)
            .cloned()
            .ok_or(MapError::DecodeNotFound(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(data: &[u8]) -> FullIndexMapper {
        FullIndexMapper::from_reader(data).unwrap()
    }

    #[test]
    fn test_single_line() {
        let m = index(b"a\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m.encode("a").unwrap(), 0);
        assert_eq!(m.decode(0).unwrap(), "a");
    }

    #[test]
    fn test_positions() {
        let m = index(b"a\nbcd\nefg\nhijk\n");
        assert_eq!(m.encode("a").unwrap(), 0);
        assert_eq!(m.encode("bcd").unwrap(), 2);
        assert_eq!(m.encode("efg").unwrap(), 6);
        assert_eq!(m.encode("hijk").unwrap(), 10);
        assert_eq!(m.decode(2).unwrap(), "bcd");
        assert_eq!(
            m.entries().iter().map(|e| e.position).collect::<Vec<_>>(),
            vec![0, 2, 6, 10]
        );
    }

    #[test]
    fn test_not_found() {
        let m = index(b"a\nbcd\nefg\nhijk\n");
        assert!(matches!(m.encode("zzz"), Err(MapError::EncodeNotFound(k)) if k == "zzz"));
        assert!(matches!(m.encode(""), Err(MapError::EncodeNotFound(_))));
        assert!(matches!(m.decode(1), Err(MapError::DecodeNotFound(1))));
        assert!(matches!(m.decode(15), Err(MapError::DecodeNotFound(15))));
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let err = FullIndexMapper::from_reader(&b"a\nb\xffc\n"[..]).unwrap_err();
        assert!(matches!(err, MapError::InvalidText { offset: 2 }));
    }

    #[test]
    fn test_empty_lines_and_trailing_fragment() {
        let m = index(b"a\n\nb\ntail");
        assert_eq!(m.len(), 2);
        assert_eq!(m.encode("b").unwrap(), 3);
        assert!(m.decode(2).is_err());
        assert!(m.encode("tail").is_err());
    }

    #[test]
    fn test_empty_input() {
        let m = index(b"");
        assert!(m.is_empty());
    }
}
