//! Error types shared by the library.

use thiserror::Error;

/// Errors raised while building a [`Word`](crate::word::Word) from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
    /// The word has no letters.
    #[error("word is empty")]
    Empty,
    /// The word does not fit in a 64-bit pattern.
    #[error("word length {0} exceeds the maximum of 64")]
    TooLong(usize),
    /// A character other than `0` or `1` was found.
    #[error("invalid character {ch:?} at position {pos} (expected '0' or '1')")]
    InvalidChar {
        /// Offending character.
        ch: char,
        /// Zero-based position in the input.
        pos: usize,
    },
}

/// Configuration errors, reported before any computation starts.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Word length outside the supported range.
    #[error("word length {len} is outside [{min}, {max}]")]
    InvalidLength {
        /// Requested length.
        len: usize,
        /// Smallest accepted length for the operation.
        min: usize,
        /// Largest accepted length for the operation.
        max: usize,
    },
    /// The occurrence hint must be positive.
    #[error("occurrence hint must be positive")]
    ZeroHint,
    /// Partitioned modes need a power-of-two worker count.
    #[error("thread count {0} is not a positive power of two")]
    ThreadCount(usize),
    /// The partition selector does not fit in the word.
    #[error("{threads} threads need {bits} selector bits above position {shift}, but the word has length {len}")]
    SelectorTooWide {
        /// Worker count.
        threads: usize,
        /// Selector width in bits.
        bits: u32,
        /// Selector offset.
        shift: usize,
        /// Word length.
        len: usize,
    },
    /// Flip radius for local search out of range.
    #[error("flip radius {radius} must be in [1, {max}]")]
    InvalidRadius {
        /// Requested radius.
        radius: usize,
        /// Largest accepted radius.
        max: usize,
    },
    /// Malformed word input.
    #[error(transparent)]
    Word(#[from] WordError),
    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Mismatch found by the self-check in [`validate`](crate::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The counter disagreed with the brute-force count.
    #[error("count({word}, {subword}) = {got}, brute force gives {expected}")]
    Count {
        /// Word as a 0/1 string.
        word: String,
        /// Subword as a 0/1 string.
        subword: String,
        /// Counter result.
        got: u64,
        /// Reference result.
        expected: u64,
    },
    /// Two search drivers disagreed.
    #[error("n={n}: {mode} found {got}, exhaustive search found {expected}")]
    Search {
        /// Word length.
        n: usize,
        /// Name of the driver under test.
        mode: &'static str,
        /// Its record value.
        got: u64,
        /// Exhaustive record value.
        expected: u64,
    },
    /// Two search drivers agreed on the value but not on the optimal words.
    #[error("n={n}: {mode} reported {got} optimal words, exhaustive search reported {expected}")]
    Witnesses {
        /// Word length.
        n: usize,
        /// Name of the driver under test.
        mode: &'static str,
        /// Number of words it reported.
        got: usize,
        /// Number of words exhaustive search reported.
        expected: usize,
    },
    /// A configuration error surfaced during validation.
    #[error("search failed: {0}")]
    Config(String),
}

/// Result alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
