//! Binary search over the lines of a sorted store.
//!
//! The search range is a half-open byte range `[left, right)`. Each probe
//! resolves the line at or before the offset midpoint and compares its bytes
//! to the target's bytes. The range is then narrowed to the offset midpoint, not to the
//! probed line start: a probe that lands mid-line still makes progress, and a
//! target line start `t` always stays inside `(left, right)` on a sorted store.

use super::line::{find_line_start, read_line};
use crate::store::ByteStore;
use log::trace;
use std::cmp::Ordering;
use std::io;
use std::ops::Range;

/// One probe: a line start and the raw line found there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub start: u64,
    pub line: Vec<u8>,
}

impl Probe {
    /// The line as a key, or `None` if it is not valid UTF-8
    pub fn key(&self) -> Option<&str> {
        std::str::from_utf8(&self.line).ok()
    }
}

/// Offset midpoint of `[left, right)`
#[inline]
pub fn midpoint(left: u64, right: u64) -> u64 {
    left + (right - left) / 2
}

/// Read the line at or before the midpoint of `range`
pub fn probe<S: ByteStore + ?Sized>(store: &S, range: &Range<u64>) -> io::Result<Probe> {
    let start = find_line_start(store, midpoint(range.start, range.end))?;
    let line = read_line(store, start)?;
    Ok(Probe { start, line })
}

/// Search `key` within `range`, calling `on_probe` for every line read.
///
/// Returns the line start of an exact match, or `None` once the range can no
/// longer be split. I/O errors abort the search immediately.
pub fn binary_search<S, F>(
    store: &S,
    key: &str,
    mut range: Range<u64>,
    mut on_probe: F,
) -> io::Result<Option<u64>>
where
    S: ByteStore + ?Sized,
    F: FnMut(&Probe),
{
    while range.start + 1 < range.end {
        let probe = probe(store, &range)?;
        trace!(
            "probe [{}, {}) -> {} {:?}",
            range.start,
            range.end,
            probe.start,
            String::from_utf8_lossy(&probe.line)
        );
        on_probe(&probe);

        match key.as_bytes().cmp(probe.line.as_slice()) {
            Ordering::Equal => return Ok(Some(probe.start)),
            Ordering::Less => range.end = midpoint(range.start, range.end),
            Ordering::Greater => range.start = midpoint(range.start, range.end),
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE: &[u8] = b"a\nbcd\nefg\nhijk\n";

    fn search(key: &str) -> Option<u64> {
        binary_search(STORE, key, 0..STORE.len() as u64, |_| {}).unwrap()
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(midpoint(0, 15), 7);
        assert_eq!(midpoint(7, 15), 11);
        assert_eq!(midpoint(4, 5), 4);
    }

    #[test]
    fn test_probe_resolves_line_start() {
        // midpoint 7 lands inside "efg"
        let p = probe(STORE, &(0..15)).unwrap();
        assert_eq!(p, Probe { start: 6, line: b"efg".to_vec() });
        assert_eq!(p.key(), Some("efg"));
    }

    #[test]
    fn test_finds_every_line() {
        assert_eq!(search("a"), Some(0));
        assert_eq!(search("bcd"), Some(2));
        assert_eq!(search("efg"), Some(6));
        assert_eq!(search("hijk"), Some(10));
    }

    #[test]
    fn test_missing_keys() {
        for key in ["", "0", "b", "bcde", "eff", "hijkl", "zzz"] {
            assert_eq!(search(key), None, "key {key:?}");
        }
    }

    #[test]
    fn test_empty_store() {
        let empty: &[u8] = b"";
        assert_eq!(binary_search(empty, "a", 0..0, |_| {}).unwrap(), None);
    }

    #[test]
    fn test_single_line_store() {
        let one: &[u8] = b"only\n";
        assert_eq!(binary_search(one, "only", 0..5, |_| {}).unwrap(), Some(0));
        assert_eq!(binary_search(one, "other", 0..5, |_| {}).unwrap(), None);
    }

    #[test]
    fn test_probes_reported_in_order() {
        let mut probes = Vec::new();
        let found = binary_search(STORE, "hijk", 0..15, |p| probes.push(p.start)).unwrap();
        assert_eq!(found, Some(10));
        // 0..15 -> mid 7 ("efg"), 7..15 -> mid 11 ("hijk")
        assert_eq!(probes, vec![6, 10]);
    }

    #[test]
    fn test_compares_raw_bytes() {
        // the replacement character must not match a line holding 0xff
        let data: &[u8] = b"a\xff\nb\n";
        let size = data.len() as u64;
        let mut probes = Vec::new();
        let found =
            binary_search(data, "a\u{fffd}", 0..size, |p| probes.push(p.clone())).unwrap();
        assert_eq!(found, None);
        assert!(probes.iter().any(|p| p.start == 0 && p.key().is_none()));

        assert_eq!(binary_search(data, "b", 0..size, |_| {}).unwrap(), Some(3));
    }

    #[test]
    fn test_io_error_aborts() {
        struct Broken;
        impl ByteStore for Broken {
            fn read_at(&self, _buf: &mut [u8], _offset: u64) -> io::Result<usize> {
                Err(io::Error::other("disk gone"))
            }
            fn size(&self) -> u64 {
                100
            }
        }

        let err = binary_search(&Broken, "a", 0..100, |_| {}).unwrap_err();
        assert_eq!(err.to_string(), "disk gone");
    }
}
