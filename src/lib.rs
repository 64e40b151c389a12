//! # linepos - positions of words in sorted word lists
//!
//! linepos maps short strings (keys) to the byte offset of their line in a
//! sorted, newline-delimited text file, and back. Positions can then be packed
//! into fixed-width big-endian fields, for example as compact word references
//! inside an n-gram table.
//!
//! ## Architecture
//!
//! - [`store`] - Random-access byte stores (in-memory, file, mmap)
//! - [`mapper`] - Line reader, binary search, probe cache and the three mappers
//! - [`utils`] - Fixed-width codec, configuration, progress bars
//! - [`output`] - Result formatting (plain, colored, JSON)
//! - [`error`] - The [`MapError`] type
//!
//! ## Quick Start
//!
//! ```no_run
//! use linepos::mapper::{CachedMapper, PositionMapper};
//! use linepos::store::MmapStore;
//! use linepos::utils::FixedWidthCodec;
//! use std::path::Path;
//!
//! let store = MmapStore::open(Path::new("words.txt")).unwrap();
//! let mapper = CachedMapper::new(store);
//!
//! let position = mapper.encode("bcd").unwrap();
//! assert_eq!(mapper.decode(position).unwrap(), "bcd");
//!
//! let codec = FixedWidthCodec::new(3).unwrap();
//! let field = codec.encode(position);
//! assert_eq!(codec.decode(&field).unwrap(), position);
//! ```
//!
//! ## Strategies
//!
//! 1. **Full index** - one scan into hash maps; fastest lookups, O(size) memory
//! 2. **Direct search** - binary search per lookup; no memory beyond the store
//! 3. **Cached search** - binary search narrowed by a tree of earlier probes

pub mod error;
pub mod mapper;
pub mod output;
pub mod store;
pub mod utils;

pub use error::{MapError, Result};
pub use mapper::{
    open_mapper, CachedMapper, DirectMapper, Entry, FullIndexMapper, Position, PositionMapper,
    Strategy,
};
