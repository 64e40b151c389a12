//! Error types shared by the stores, mappers and the fixed-width codec.

use std::io;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T, E = MapError> = std::result::Result<T, E>;

/// Errors produced while mapping between keys and positions
#[derive(Debug, Error)]
pub enum MapError {
    /// The key does not appear as a line in the store
    #[error("key cannot be encoded: {0:?}")]
    EncodeNotFound(String),

    /// The position is not the start of a valid, non-empty line
    #[error("position cannot be decoded: {0}")]
    DecodeNotFound(u64),

    /// A line is not valid UTF-8 (raised while building a full index)
    #[error("invalid text in line starting at byte {offset}")]
    InvalidText { offset: u64 },

    /// Fixed-width fields must be between 1 and 8 bytes wide
    #[error("invalid byte length: {0} (expected 1..=8)")]
    InvalidByteLength(usize),

    /// Failure reading the backing store, passed through untouched
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl MapError {
    /// True for the two ordinary "no such entry" outcomes
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MapError::EncodeNotFound(_) | MapError::DecodeNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(MapError::EncodeNotFound("zzz".into()).is_not_found());
        assert!(MapError::DecodeNotFound(7).is_not_found());
        assert!(!MapError::InvalidByteLength(9).is_not_found());
        assert!(!MapError::Io(io::Error::other("boom")).is_not_found());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            MapError::EncodeNotFound("zzz".into()).to_string(),
            "key cannot be encoded: \"zzz\""
        );
        assert_eq!(
            MapError::DecodeNotFound(65).to_string(),
            "position cannot be decoded: 65"
        );
    }
}
