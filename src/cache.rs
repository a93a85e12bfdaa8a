//! Memo table for sub-counts computed by the counter.
//!
//! Entries are partitioned by `(word_len, subword_len)` and keyed by the two
//! bit patterns. The table only grows; a value, once stored, is exact, so
//! concurrent readers never observe a wrong count. Inserting can be switched
//! off for the rest of the process (partitioned searches do so before their
//! workers start).

use crate::word::MAX_LEN;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Word views with at least this many runs are neither looked up nor stored.
pub const MAX_CACHE_RUNS: usize = 8;

type Partition = RwLock<FxHashMap<(u64, u64), u64>>;

/// Partitioned, thread-safe memo of subword counts.
pub struct SubwordCache {
    partitions: Vec<Partition>,
    insertion_enabled: AtomicBool,
}

impl SubwordCache {
    /// Empty cache with insertion enabled.
    pub fn new() -> Self {
        let partitions = (0..(MAX_LEN + 1) * (MAX_LEN + 1))
            .map(|_| RwLock::new(FxHashMap::default()))
            .collect();
        Self {
            partitions,
            insertion_enabled: AtomicBool::new(true),
        }
    }

    #[inline(always)]
    fn partition(&self, word_len: u32, sub_len: u32) -> &Partition {
        &self.partitions[word_len as usize * (MAX_LEN + 1) + sub_len as usize]
    }

    /// Cached count for the given pair, if any.
    #[inline]
    pub fn get(&self, word_bits: u64, word_len: u32, sub_bits: u64, sub_len: u32) -> Option<u64> {
        self.partition(word_len, sub_len)
            .read()
            .get(&(word_bits, sub_bits))
            .copied()
    }

    /// Stores a count. No-op while insertion is disabled.
    #[inline]
    pub fn insert(&self, word_bits: u64, word_len: u32, sub_bits: u64, sub_len: u32, count: u64) {
        if !self.insertion_enabled() {
            return;
        }
        self.partition(word_len, sub_len)
            .write()
            .insert((word_bits, sub_bits), count);
    }

    /// Turns insertion on or off. Lookups are unaffected.
    pub fn set_insertion_enabled(&self, enabled: bool) {
        self.insertion_enabled.store(enabled, Ordering::Release);
    }

    /// Whether inserts are currently accepted.
    #[inline(always)]
    pub fn insertion_enabled(&self) -> bool {
        self.insertion_enabled.load(Ordering::Acquire)
    }

    /// Total number of stored entries.
    pub fn len(&self) -> usize {
        self.partitions.iter().map(|p| p.read().len()).sum()
    }

    /// True if no count is stored.
    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(|p| p.read().is_empty())
    }
}

impl Default for SubwordCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SubwordCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubwordCache")
            .field("entries", &self.len())
            .field("insertion_enabled", &self.insertion_enabled())
            .finish()
    }
}
