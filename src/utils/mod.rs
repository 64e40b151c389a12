//! Utility functions and data structures.
//!
//! ## Modules
//!
//! - [`app_data`] - JSON configuration in the user config directory
//! - [`encoding`] - Fixed-width big-endian position fields
//! - [`progress`] - Progress bar wrapper (no-op without the `progress` feature)
//!
//! ## Example
//!
//! ```no_run
//! use linepos::utils::FixedWidthCodec;
//!
//! let codec = FixedWidthCodec::new(3).unwrap();
//! assert_eq!(codec.encode(0x10FF05), vec![0x10, 0xFF, 0x05]);
//! assert_eq!(codec.decode(&[0x10, 0xFF, 0x05]).unwrap(), 0x10FF05);
//! ```

pub mod app_data;
pub mod encoding;
pub mod progress;

pub use app_data::*;
pub use encoding::*;
