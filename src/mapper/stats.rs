//! Store statistics and cross-strategy verification.

use super::{
    CacheStats, CachedMapper, DirectMapper, Entry, FullIndexMapper, PositionMapper, Strategy,
};
use crate::store::{ByteStore, MmapStore};
use crate::utils::progress::{ProgressBar, ProgressStyle};
use anyhow::Result;
use log::{debug, info};
use memchr::memchr_iter;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;

/// Shape of a word list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub size: u64,
    pub lines: u64,
    pub empty_lines: u64,
    /// Lines equal to the line before them
    pub duplicate_lines: u64,
    pub longest_line: u64,
    /// Start of the first line that sorts before its predecessor
    pub first_unsorted: Option<u64>,
    /// Bytes after the final newline
    pub trailing_bytes: u64,
}

impl StoreStats {
    /// Scan a whole store in memory
    pub fn scan(data: &[u8]) -> Self {
        let mut stats = StoreStats {
            size: data.len() as u64,
            ..Default::default()
        };

        let mut start = 0usize;
        let mut prev: Option<&[u8]> = None;
        for end in memchr_iter(b'\n', data) {
            let line = &data[start..end];
            stats.lines += 1;
            stats.longest_line = stats.longest_line.max(line.len() as u64);

            if line.is_empty() {
                stats.empty_lines += 1;
            } else {
                match prev.map(|p| p.cmp(line)) {
                    Some(Ordering::Equal) => stats.duplicate_lines += 1,
                    Some(Ordering::Greater) if stats.first_unsorted.is_none() => {
                        stats.first_unsorted = Some(start as u64);
                    }
                    _ => {}
                }
                prev = Some(line);
            }
            start = end + 1;
        }
        stats.trailing_bytes = (data.len() - start) as u64;

        stats
    }

    /// True if lookups on this store are well defined.
    ///
    /// Duplicates keep the order non-decreasing, so they do not make a store
    /// invalid; the mappers may still pick different copies of a repeated
    /// key, which verification reports as mismatches.
    pub fn is_valid(&self) -> bool {
        self.first_unsorted.is_none() && self.empty_lines == 0 && self.trailing_bytes == 0
    }
}

/// A key on which the strategies disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub strategy: Strategy,
    pub entry: Entry,
    pub encoded: Option<u64>,
    pub decoded: Option<String>,
}

/// Outcome of [`verify_store`]
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub stats: StoreStats,
    pub checked: usize,
    pub mismatches: Vec<Mismatch>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.stats.is_valid() && self.mismatches.is_empty()
    }
}

/// Check every line of `data` through the search strategies against the full
/// index. Lines are checked in parallel; each worker owns its cached mapper.
pub fn verify_bytes(data: &[u8], progress: &ProgressBar) -> Result<VerifyReport> {
    let stats = StoreStats::scan(data);
    let full = FullIndexMapper::from_reader(data)?;
    let entries = full.entries();
    let direct = DirectMapper::new(data);

    let check = |strategy: Strategy, mapper: &dyn PositionMapper, entry: &Entry| {
        let encoded = mapper.encode(&entry.key).ok();
        let decoded = mapper.decode(entry.position).ok();
        if encoded == Some(entry.position) && decoded.as_deref() == Some(entry.key.as_str()) {
            None
        } else {
            Some(Mismatch {
                strategy,
                entry: entry.clone(),
                encoded,
                decoded,
            })
        }
    };

    let mut mismatches: Vec<Mismatch> = entries
        .par_iter()
        .map_init(
            || CachedMapper::new(data),
            |cached, entry| {
                let found: Vec<Mismatch> = [
                    check(Strategy::Direct, &direct, entry),
                    check(Strategy::Cached, &*cached, entry),
                ]
                .into_iter()
                .flatten()
                .collect();
                progress.inc(1);
                found
            },
        )
        .flatten()
        .collect();
    mismatches.sort_by_key(|m| (m.entry.position, m.strategy.as_str()));

    debug!("verified {} entries, {} mismatches", entries.len(), mismatches.len());
    Ok(VerifyReport {
        stats,
        checked: entries.len(),
        mismatches,
    })
}

/// Verify a word list on disk
pub fn verify_store(path: &Path) -> Result<VerifyReport> {
    let store = MmapStore::open(path)?;
    info!("verifying {} ({} bytes)", path.display(), store.size());

    let data = store.as_bytes();
    let progress = ProgressBar::new(memchr_iter(b'\n', data).count() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{bar:40} {pos}/{len} {msg}") {
        progress.set_style(style.progress_chars("=> "));
    }
    progress.set_message("checking lines");

    let report = verify_bytes(data, &progress);
    progress.finish_and_clear();
    report
}

/// Print statistics for a word list
pub fn show_stats(path: &Path, warm_up: bool) -> Result<()> {
    let store = MmapStore::open(path)?;
    let stats = StoreStats::scan(store.as_bytes());

    println!("Store Statistics");
    println!("================");
    println!();
    println!("Path:             {}", path.display());
    println!("Size:             {}", format_size(stats.size));
    println!("Lines:            {}", stats.lines);
    println!("Empty lines:      {}", stats.empty_lines);
    println!("Duplicate lines:  {}", stats.duplicate_lines);
    println!("Longest line:     {} bytes", stats.longest_line);
    println!("Trailing bytes:   {}", stats.trailing_bytes);
    match stats.first_unsorted {
        Some(offset) => println!("Sorted:           no (first break at byte {})", offset),
        None => println!("Sorted:           yes"),
    }
    println!(
        "Min field width:  {} bytes",
        crate::utils::FixedWidthCodec::width_for(stats.size.saturating_sub(1))
    );

    if warm_up {
        let cached = CachedMapper::new(store.as_bytes());
        let full = FullIndexMapper::from_reader(store.as_bytes())?;
        let cache = warm_cache(&cached, &full.entries())?;
        println!();
        println!("Cache after warm-up:");
        println!("  Nodes:          {}", cache.nodes);
        println!("  Depth:          {}", cache.depth);
    }

    Ok(())
}

/// Encode every entry through `cached` and report the resulting tree.
///
/// Keys an unsorted store hides from the search are skipped; store errors
/// abort the warm-up.
pub fn warm_cache<S: ByteStore>(
    cached: &CachedMapper<S>,
    entries: &[Entry],
) -> crate::error::Result<CacheStats> {
    for entry in entries {
        if let Err(e) = cached.encode(&entry.key)
            && !e.is_not_found()
        {
            return Err(e);
        }
    }
    Ok(cached.cache_stats())
}

/// Format bytes as human-readable size
fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} bytes", bytes)
    }
}
