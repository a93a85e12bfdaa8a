//! Splitting an enumeration over a fixed pool of workers.
//!
//! With `T` workers (a power of two), worker `id` owns the words whose
//! `log2(T)` bits starting at position `n/2` spell `id`. Each worker runs its
//! own sequential driver with its own finder and record; nothing is shared
//! during the run except the read-mostly cache, whose insertion is switched
//! off before the workers start. Records are merged after every worker joined.

use crate::cache::SubwordCache;
use crate::error::Result;
use crate::finder::MaxSubwordFinder;
use crate::record::GlobalRecord;
use crate::search::{exhaustive_search, pruned_search, SearchConfig};
use crate::word::Word;
use rayon::prelude::*;
use tracing::info;

/// One worker's share of the words of length `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    /// Worker index, below `count`.
    pub id: usize,
    /// Number of workers.
    pub count: usize,
    n: usize,
    shift: usize,
}

impl Partition {
    /// Share `id` of `count` (a power of two) for words of length `n`.
    pub fn new(id: usize, count: usize, n: usize) -> Self {
        debug_assert!(count.is_power_of_two() && id < count);
        Self {
            id,
            count,
            n,
            shift: n / 2,
        }
    }

    #[inline(always)]
    fn selector_mask(&self) -> u64 {
        self.count as u64 - 1
    }

    /// Whether the full-length word `bits` belongs to this partition.
    #[inline]
    pub fn contains(&self, bits: u64) -> bool {
        (bits >> self.shift) & self.selector_mask() == self.id as u64
    }

    /// Same test on a prefix; the prefix must be long enough to cover the
    /// selector bits.
    #[inline]
    pub fn contains_prefix(&self, prefix: &Word) -> bool {
        let missing = self.n - prefix.len();
        debug_assert!(missing <= self.shift);
        (prefix.bits() >> (self.shift - missing)) & self.selector_mask() == self.id as u64
    }
}

/// Runs the exhaustive (or, with `pruned`, the branch-and-bound) driver on
/// `config.threads` workers and merges their records. The configuration is
/// assumed validated.
///
/// # Errors
/// Returns [`SearchError::ThreadPool`](crate::error::SearchError::ThreadPool)
/// if the worker pool cannot be created.
pub fn partitioned_search(config: &SearchConfig, cache: &SubwordCache, pruned: bool) -> Result<GlobalRecord> {
    let threads = config.threads;
    let n = config.n;
    let bound = config.bound();

    cache.set_insertion_enabled(false);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("subword-worker-{i}"))
        .build()?;

    let results: Vec<GlobalRecord> = pool.install(|| {
        (0..threads)
            .into_par_iter()
            .map(|id| {
                let part = Partition::new(id, threads, n);
                let mut finder = MaxSubwordFinder::new(cache);
                let record = if pruned {
                    pruned_search(n, bound, &mut finder, |prefix| part.contains_prefix(prefix))
                } else {
                    exhaustive_search(n, bound, &mut finder, |word| part.contains(word.bits()))
                };
                info!(
                    worker = id,
                    occurrences = record.occurrences,
                    words = record.records.len(),
                    "partition finished"
                );
                record
            })
            .collect()
    });

    let mut merged = GlobalRecord::new(bound);
    for record in results {
        merged.merge(record);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{evaluate_mode, pruned_prefix_len, SearchMode};
    use std::collections::BTreeSet;

    fn word_set(global: &GlobalRecord) -> BTreeSet<u64> {
        global.words().map(Word::bits).collect()
    }

    #[test]
    fn partitions_cover_each_word_once() {
        for n in [6usize, 9, 12] {
            for threads in [1usize, 2, 4] {
                for bits in 0..1u64 << (n - 1) {
                    let owners = (0..threads)
                        .filter(|&id| Partition::new(id, threads, n).contains(bits))
                        .count();
                    assert_eq!(owners, 1);
                }
            }
        }
    }

    #[test]
    fn prefix_test_agrees_with_full_words() {
        let n = 11;
        let len = pruned_prefix_len(n);
        for id in 0..4 {
            let part = Partition::new(id, 4, n);
            for bits in 0..1u64 << (n - 1) {
                let prefix = Word::build(bits >> (n - len), len);
                assert_eq!(part.contains_prefix(&prefix), part.contains(bits));
            }
        }
    }

    #[test]
    fn partitioned_matches_sequential() {
        for n in [6usize, 8, 11] {
            let seq_cache = SubwordCache::new();
            let full = evaluate_mode(SearchMode::Exhaustive, &SearchConfig::for_length(n), &seq_cache).unwrap();
            for threads in [1usize, 2, 4] {
                let cfg = SearchConfig {
                    threads,
                    ..SearchConfig::for_length(n)
                };
                for mode in [SearchMode::Parallel, SearchMode::ParallelPruned] {
                    let cache = SubwordCache::new();
                    let par = evaluate_mode(mode, &cfg, &cache).unwrap();
                    assert_eq!(par.occurrences, full.occurrences, "n={n} threads={threads} {mode}");
                    assert_eq!(word_set(&par), word_set(&full), "n={n} threads={threads} {mode}");
                }
            }
        }
    }

    #[test]
    fn partitioned_mode_disables_cache_insertion() {
        let cache = SubwordCache::new();
        let cfg = SearchConfig {
            threads: 2,
            ..SearchConfig::for_length(8)
        };
        assert!(cache.insertion_enabled());
        evaluate_mode(SearchMode::Parallel, &cfg, &cache).unwrap();
        assert!(!cache.insertion_enabled());
        assert!(cache.is_empty());
    }

    #[test]
    fn warm_cache_is_shared_read_only() {
        let cache = SubwordCache::new();
        let seq = evaluate_mode(SearchMode::Pruned, &SearchConfig::for_length(10), &cache).unwrap();
        let entries = cache.len();
        assert!(entries > 0);
        let cfg = SearchConfig {
            threads: 4,
            ..SearchConfig::for_length(10)
        };
        let par = evaluate_mode(SearchMode::ParallelPruned, &cfg, &cache).unwrap();
        assert_eq!(cache.len(), entries);
        assert_eq!(word_set(&par), word_set(&seq));
    }
}
