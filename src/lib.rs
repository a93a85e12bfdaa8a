//! # Subword Search Engine
//!
//! A Rust library for finding binary words whose most frequent subword is as
//! rare as possible.
//!
//! A subword of `w` is any subsequence of `w`, not necessarily contiguous, and
//! its occurrence count is the number of ways to pick it out of `w`. For a
//! word of length `n`, the quantity of interest is the largest count over all
//! subwords of length `2..=n-2`; the search looks for the words of length `n`
//! minimizing it.
//!
//! This crate provides:
//! - A **run-length** word representation packed into a `u64`.
//! - An **exact** divide-and-conquer occurrence counter backed by a shared,
//!   partitioned cache.
//! - A per-word maximum finder with early termination against a bound.
//! - Exhaustive, branch-and-bound, partitioned-parallel and randomized local
//!   search drivers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use subword::cache::SubwordCache;
//! use subword::search::{evaluate_mode, SearchConfig, SearchMode};
//!
//! let cache = SubwordCache::new();
//! let cfg = SearchConfig {
//!     threads: 8,
//!     ..SearchConfig::for_length(24)
//! };
//! let best = evaluate_mode(SearchMode::ParallelPruned, &cfg, &cache).unwrap();
//! for record in &best.records {
//!     println!("{record}");
//! }
//! ```
//!
//! ## Counting Occurrences
//!
//! ```
//! use subword::cache::SubwordCache;
//! use subword::counter::SubwordCounter;
//! use subword::word::Word;
//!
//! let cache = SubwordCache::new();
//! let counter = SubwordCounter::new(&cache);
//! let word: Word = "0010110".parse().unwrap();
//! let sub: Word = "010".parse().unwrap();
//! assert_eq!(counter.count(&word, &sub), 10);
//! ```
//!
//! ## Evaluating One Word
//!
//! ```
//! use subword::cache::SubwordCache;
//! use subword::search::evaluate_word;
//!
//! let cache = SubwordCache::new();
//! let record = evaluate_word(&"0110".parse().unwrap(), &cache);
//! assert_eq!(record.occurrences, 1);
//! ```
//!
//! ## Modules
//!
//! - [`word`]: Packed words, run-length views and primitivity.
//! - [`counter`]: Exact occurrence counting; [`cache`] holds its memo table.
//! - [`finder`]: Most frequent subwords of one word, under a bound.
//! - [`search`]: Configuration, drivers and the mode dispatcher.
//! - [`partition`]: Splitting a driver over a worker pool.
//! - [`descent`]: Randomized neighbourhood descent.
//! - [`validate`]: Deterministic self-checks against brute force.
//!
//! ## Performance Notes
//!
//! - Words are limited to 64 letters.
//! - The cache only memoizes counts in words of fewer than 8 runs.
//! - Partitioned modes never write to the cache, so warm it with a sequential
//!   run first if it matters.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::inline_always)] // Intentional for hot-path code
#![allow(clippy::many_single_char_names)] // Mathematical variable names
#![allow(clippy::needless_range_loop)] // Often clearer for run indexing
#![allow(clippy::doc_markdown)]
#![allow(clippy::multiple_crate_versions)] // Cargo.lock management is external

pub mod binomial;
pub mod cache;
pub mod counter;
pub mod descent;
pub mod error;
pub mod finder;
pub mod partition;
pub mod record;
pub mod restricted;
pub mod search;
pub mod validate;
pub mod word;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::cache::SubwordCache;
    pub use crate::counter::SubwordCounter;
    pub use crate::error::{SearchError, ValidationError, WordError};
    pub use crate::finder::MaxSubwordFinder;
    pub use crate::record::{GlobalRecord, WordRecord};
    pub use crate::search::{evaluate_mode, evaluate_word, histogram, SearchConfig, SearchMode};
    pub use crate::validate::validate_engine;
    pub use crate::word::Word;
}
