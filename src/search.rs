//! Minimization drivers: exhaustive and branch-and-bound enumeration, plus the
//! single-word queries built on the finder.
//!
//! Every driver keeps a [`GlobalRecord`] whose value is used as the bound for
//! the next word, so the finder can abandon hopeless words early.

use crate::cache::SubwordCache;
use crate::descent::local_descent;
use crate::error::{Result, SearchError};
use crate::finder::MaxSubwordFinder;
use crate::partition::partitioned_search;
use crate::record::{GlobalRecord, WordRecord};
use crate::word::{is_primitive, low_mask, primitive_multiplicity, Word, MAX_LEN};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

// ============================================================================
// Configuration
// ============================================================================

/// Search strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Every 0-led primitive word, with the running record as bound.
    Exhaustive,
    /// Branch-and-bound over prefixes.
    Pruned,
    /// Randomized neighbourhood descent; returns one good word, not a proof.
    Descent,
    /// [`SearchMode::Exhaustive`] split over a worker pool.
    Parallel,
    /// [`SearchMode::Pruned`] split over a worker pool.
    ParallelPruned,
}

impl SearchMode {
    /// Name used in logs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exhaustive => "exhaustive",
            Self::Pruned => "pruned",
            Self::Descent => "descent",
            Self::Parallel => "parallel",
            Self::ParallelPruned => "parallel-pruned",
        }
    }

    /// Whether the mode runs on a partitioned worker pool.
    pub fn is_partitioned(self) -> bool {
        matches!(self, Self::Parallel | Self::ParallelPruned)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search configuration parameters.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Word length.
    pub n: usize,
    /// Over-estimate of the optimum; only words at or below it are reported.
    /// Defaults to `2^n`.
    pub hint: Option<u64>,
    /// Worker count for partitioned modes (power of two).
    pub threads: usize,
    /// Largest number of simultaneous bit flips in a descent neighbourhood.
    pub radius: usize,
    /// Unimproving perturbations tolerated before a descent perturbs harder.
    pub samples: u64,
    /// Optional deterministic seed for descent.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism()
            .map(std::num::NonZero::get)
            .map(|t| 1 << t.ilog2())
            .unwrap_or(4);

        Self {
            n: 20,
            hint: None,
            threads,
            radius: 2,
            samples: 1_000,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Config for length `n` with every other field at its default.
    pub fn for_length(n: usize) -> Self {
        Self {
            n,
            ..Self::default()
        }
    }

    /// The hint, or `2^n` (saturating) when none was given.
    pub fn bound(&self) -> u64 {
        self.hint.unwrap_or_else(|| default_bound(self.n))
    }

    /// Checks the fields `mode` relies on.
    ///
    /// # Errors
    /// Returns the first [`SearchError`] that applies.
    pub fn validate(&self, mode: SearchMode) -> Result<()> {
        let n = self.n;
        if !(1..=MAX_LEN).contains(&n) {
            return Err(SearchError::InvalidLength { len: n, min: 1, max: MAX_LEN });
        }
        if self.hint == Some(0) {
            return Err(SearchError::ZeroHint);
        }
        if mode.is_partitioned() {
            if self.threads == 0 || !self.threads.is_power_of_two() {
                return Err(SearchError::ThreadCount(self.threads));
            }
            let bits = self.threads.trailing_zeros();
            // The selector must sit below the leading letter, which is always 0.
            if n / 2 + bits as usize > n - 1 {
                return Err(SearchError::SelectorTooWide {
                    threads: self.threads,
                    bits,
                    shift: n / 2,
                    len: n,
                });
            }
        }
        if mode == SearchMode::Descent {
            if n < 4 {
                return Err(SearchError::InvalidLength { len: n, min: 4, max: MAX_LEN });
            }
            if !(1..n).contains(&self.radius) {
                return Err(SearchError::InvalidRadius {
                    radius: self.radius,
                    max: n - 1,
                });
            }
        }
        Ok(())
    }
}

/// `2^n`, saturating at `u64::MAX`. Exceeds every occurrence count of a word
/// of length `n`.
pub fn default_bound(n: usize) -> u64 {
    1u64.checked_shl(n as u32).unwrap_or(u64::MAX)
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Runs `mode` on `config`, sharing `cache` with any other caller.
///
/// # Errors
/// Configuration errors are reported before any work starts; partitioned modes
/// also fail if the worker pool cannot be created.
pub fn evaluate_mode(mode: SearchMode, config: &SearchConfig, cache: &SubwordCache) -> Result<GlobalRecord> {
    config.validate(mode)?;
    let n = config.n;
    let bound = config.bound();
    info!(%mode, n, bound, "search started");
    let started = Instant::now();

    let result = match mode {
        SearchMode::Exhaustive => exhaustive_search(n, bound, &mut MaxSubwordFinder::new(cache), |_| true),
        SearchMode::Pruned => pruned_search(n, bound, &mut MaxSubwordFinder::new(cache), |_| true),
        SearchMode::Descent => local_descent(config, cache),
        SearchMode::Parallel => partitioned_search(config, cache, false)?,
        SearchMode::ParallelPruned => partitioned_search(config, cache, true)?,
    };

    info!(
        %mode,
        n,
        occurrences = result.occurrences,
        words = result.records.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search finished"
    );
    Ok(result)
}

// ============================================================================
// Enumeration drivers
// ============================================================================

/// Evaluates every primitive 0-led word of length `n` accepted by `keep`.
pub fn exhaustive_search<F>(n: usize, bound: u64, finder: &mut MaxSubwordFinder<'_>, keep: F) -> GlobalRecord
where
    F: Fn(&Word) -> bool,
{
    let mut global = GlobalRecord::new(bound);
    let mut word = Word::build(0, n);
    loop {
        if keep(&word) && is_primitive(word.bits(), n) {
            let record = finder.find(&word, global.occurrences);
            offer(&mut global, record);
        }
        if !word.successor_by_1() {
            return global;
        }
    }
}

/// Branch-and-bound: grows every 0-led prefix of length `n/2 + 1` accepted by
/// `keep` one letter at a time, abandoning a prefix once one of its subwords
/// occurs more often than the current record allows.
pub fn pruned_search<F>(n: usize, bound: u64, finder: &mut MaxSubwordFinder<'_>, keep: F) -> GlobalRecord
where
    F: Fn(&Word) -> bool,
{
    let mut global = GlobalRecord::new(bound);
    let mut prefix = Word::build(0, pruned_prefix_len(n));
    loop {
        if keep(&prefix) {
            extend(n, &mut prefix, finder, &mut global);
        }
        if !prefix.successor_by_1() {
            return global;
        }
    }
}

/// Length of the prefixes the pruned search starts from.
#[inline]
pub fn pruned_prefix_len(n: usize) -> usize {
    (n / 2 + 1).min(n)
}

fn extend(n: usize, word: &mut Word, finder: &mut MaxSubwordFinder<'_>, global: &mut GlobalRecord) {
    if word.len() == n {
        if is_primitive(word.bits(), n) {
            let record = finder.find(word, global.occurrences);
            offer(global, record);
        }
        return;
    }
    for bit in 0..2 {
        word.append_bit(bit);
        // Occurrences in a prefix never exceed those in its extensions.
        if finder.find(word, global.occurrences).occurrences <= global.occurrences {
            extend(n, word, finder, global);
        }
        word.remove_last_bit();
    }
}

#[inline]
fn offer(global: &mut GlobalRecord, record: WordRecord) {
    let word = record.word;
    if global.update(record) {
        debug!(%word, occurrences = global.occurrences, "new record");
    }
}

// ============================================================================
// Single-word queries
// ============================================================================

/// Histogram of the exact maximal occurrence count over all words of length
/// `n`, counting complements and reversals through the primitive words.
///
/// # Errors
/// Returns [`SearchError::InvalidLength`] unless `1 <= n <= 64`.
pub fn histogram(n: usize, cache: &SubwordCache) -> Result<BTreeMap<u64, u64>> {
    if !(1..=MAX_LEN).contains(&n) {
        return Err(SearchError::InvalidLength { len: n, min: 1, max: MAX_LEN });
    }
    let finder = MaxSubwordFinder::new(cache);
    let mut histo = BTreeMap::new();
    let mut word = Word::build(0, n);
    loop {
        let mult = primitive_multiplicity(word.bits(), n);
        if mult > 0 {
            *histo.entry(finder.max_frequency(&word)).or_insert(0) += mult;
        }
        if !word.successor_by_1() {
            break;
        }
    }
    info!(n, classes = histo.len(), "histogram finished");
    Ok(histo)
}

/// Exact record of a single word.
pub fn evaluate_word(word: &Word, cache: &SubwordCache) -> WordRecord {
    MaxSubwordFinder::new(cache).find(word, default_bound(word.len()))
}

/// Inserts one letter anywhere in `word` and returns the extension with the
/// smallest fast score ([`MaxSubwordFinder::max_frequency_fast`]), if any
/// scores below twice the score of `word`.
///
/// # Errors
/// Returns [`SearchError::InvalidLength`] if `word` has 64 letters or none.
pub fn insertion_heuristic(word: &Word, cache: &SubwordCache) -> Result<Option<(Word, u64)>> {
    let len = word.len();
    if !(1..MAX_LEN).contains(&len) {
        return Err(SearchError::InvalidLength { len, min: 1, max: MAX_LEN - 1 });
    }
    let finder = MaxSubwordFinder::new(cache);
    let mut threshold = finder.max_frequency_fast(word).saturating_mul(2);
    let mut best = None;
    let bits = word.bits();
    for pos in 0..len {
        for bit in 0..2u64 {
            let high = (((bits >> pos) << 1) | bit) << pos;
            let extended = Word::build(high | (bits & low_mask(pos)), len + 1);
            let score = finder.max_frequency_fast(&extended);
            if score < threshold {
                threshold = score;
                best = Some((extended, score));
            }
        }
    }
    if let Some((w, score)) = &best {
        debug!(word = %w, score, "best insertion");
    }
    Ok(best)
}

// ============================================================================
// Seeding
// ============================================================================

pub(crate) fn random_u64() -> u64 {
    rand::random::<u64>()
}

/// SplitMix64 mixer for deriving well-spread seeds from a base seed.
#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn word_set(global: &GlobalRecord) -> BTreeSet<u64> {
        global.words().map(Word::bits).collect()
    }

    /// Minimum over primitive words of the exact maximum, by direct evaluation.
    fn reference(n: usize, cache: &SubwordCache) -> (u64, BTreeSet<u64>) {
        let finder = MaxSubwordFinder::new(cache);
        let mut best = u64::MAX;
        let mut words = BTreeSet::new();
        for bits in 0..1u64 << (n - 1) {
            if !is_primitive(bits, n) {
                continue;
            }
            let value = finder.max_frequency(&Word::build(bits, n));
            if value < best {
                best = value;
                words.clear();
            }
            if value == best {
                words.insert(bits);
            }
        }
        (best, words)
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    #[test]
    fn splitmix64_is_deterministic() {
        assert_eq!(splitmix64(0), splitmix64(0));
        assert_ne!(splitmix64(0), splitmix64(1));
    }

    #[test]
    fn search_config_default_is_valid() {
        let cfg = SearchConfig::default();
        assert!(cfg.threads.is_power_of_two());
        for mode in [
            SearchMode::Exhaustive,
            SearchMode::Pruned,
            SearchMode::Descent,
            SearchMode::Parallel,
            SearchMode::ParallelPruned,
        ] {
            let cfg = SearchConfig { threads: 4, ..SearchConfig::default() };
            assert!(cfg.validate(mode).is_ok(), "{mode}");
        }
        assert_eq!(cfg.bound(), 1 << 20);
        assert_eq!(default_bound(64), u64::MAX);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let cfg = |n, f: fn(&mut SearchConfig)| {
            let mut c = SearchConfig { threads: 4, ..SearchConfig::for_length(n) };
            f(&mut c);
            c
        };
        assert!(matches!(
            cfg(0, |_| {}).validate(SearchMode::Exhaustive),
            Err(SearchError::InvalidLength { len: 0, .. })
        ));
        assert!(matches!(
            cfg(65, |_| {}).validate(SearchMode::Pruned),
            Err(SearchError::InvalidLength { len: 65, .. })
        ));
        assert!(matches!(
            cfg(10, |c| c.hint = Some(0)).validate(SearchMode::Exhaustive),
            Err(SearchError::ZeroHint)
        ));
        assert!(matches!(
            cfg(10, |c| c.threads = 3).validate(SearchMode::Parallel),
            Err(SearchError::ThreadCount(3))
        ));
        assert!(matches!(
            cfg(10, |c| c.threads = 0).validate(SearchMode::ParallelPruned),
            Err(SearchError::ThreadCount(0))
        ));
        assert!(matches!(
            cfg(5, |c| c.threads = 8).validate(SearchMode::Parallel),
            Err(SearchError::SelectorTooWide { .. })
        ));
        assert!(matches!(
            cfg(3, |_| {}).validate(SearchMode::Descent),
            Err(SearchError::InvalidLength { min: 4, .. })
        ));
        assert!(matches!(
            cfg(10, |c| c.radius = 10).validate(SearchMode::Descent),
            Err(SearchError::InvalidRadius { max: 9, .. })
        ));
        assert!(matches!(
            cfg(10, |c| c.radius = 0).validate(SearchMode::Descent),
            Err(SearchError::InvalidRadius { .. })
        ));
        // Thread count is irrelevant to sequential modes.
        assert!(cfg(10, |c| c.threads = 3).validate(SearchMode::Pruned).is_ok());

        let cache = SubwordCache::new();
        assert!(evaluate_mode(SearchMode::Exhaustive, &cfg(0, |_| {}), &cache).is_err());
    }

    // ------------------------------------------------------------------------
    // Drivers
    // ------------------------------------------------------------------------

    #[test]
    fn exhaustive_matches_direct_evaluation() {
        let cache = SubwordCache::new();
        for n in 5..=11 {
            let (best, words) = reference(n, &cache);
            let global = evaluate_mode(SearchMode::Exhaustive, &SearchConfig::for_length(n), &cache).unwrap();
            assert_eq!(global.occurrences, best, "n={n}");
            assert_eq!(word_set(&global), words, "n={n}");
            for rec in &global.records {
                assert_eq!(rec.occurrences, best);
                assert!(!rec.subwords.is_empty());
            }
        }
    }

    #[test]
    fn pruned_matches_exhaustive() {
        let cache = SubwordCache::new();
        for n in 5..=12 {
            let cfg = SearchConfig::for_length(n);
            let full = evaluate_mode(SearchMode::Exhaustive, &cfg, &cache).unwrap();
            let pruned = evaluate_mode(SearchMode::Pruned, &cfg, &cache).unwrap();
            assert_eq!(pruned.occurrences, full.occurrences, "n={n}");
            assert_eq!(word_set(&pruned), word_set(&full), "n={n}");
        }
    }

    #[test]
    fn tight_hints_give_the_same_answer() {
        let cache = SubwordCache::new();
        for n in 6..=12 {
            let open = evaluate_mode(SearchMode::Exhaustive, &SearchConfig::for_length(n), &cache).unwrap();
            let cfg = SearchConfig {
                hint: Some(open.occurrences),
                ..SearchConfig::for_length(n)
            };
            for mode in [SearchMode::Exhaustive, SearchMode::Pruned] {
                let hinted = evaluate_mode(mode, &cfg, &cache).unwrap();
                assert_eq!(hinted.occurrences, open.occurrences, "n={n} {mode}");
                assert_eq!(word_set(&hinted), word_set(&open), "n={n} {mode}");
            }
        }
    }

    #[test]
    fn hint_below_optimum_finds_nothing() {
        let cache = SubwordCache::new();
        let open = evaluate_mode(SearchMode::Pruned, &SearchConfig::for_length(10), &cache).unwrap();
        let cfg = SearchConfig {
            hint: Some(open.occurrences - 1),
            ..SearchConfig::for_length(10)
        };
        for mode in [SearchMode::Exhaustive, SearchMode::Pruned] {
            let res = evaluate_mode(mode, &cfg, &cache).unwrap();
            assert!(res.is_empty());
            assert_eq!(res.occurrences, open.occurrences - 1);
        }
    }

    #[test]
    fn records_are_primitive_and_exact() {
        let cache = SubwordCache::new();
        let global = evaluate_mode(SearchMode::Pruned, &SearchConfig::for_length(12), &cache).unwrap();
        let finder = MaxSubwordFinder::new(&cache);
        for rec in &global.records {
            assert!(is_primitive(rec.word.bits(), 12));
            assert_eq!(finder.max_frequency(&rec.word), global.occurrences);
            for sub in &rec.subwords {
                assert_eq!(finder.counter().count(&rec.word, sub), global.occurrences);
            }
        }
    }

    #[test]
    fn keep_filter_restricts_the_enumeration() {
        let cache = SubwordCache::new();
        let mut finder = MaxSubwordFinder::new(&cache);
        let global = exhaustive_search(8, default_bound(8), &mut finder, |w| w.last_letter() == 1);
        assert!(global.words().all(|w| w.last_letter() == 1));
        let none = pruned_search(8, default_bound(8), &mut finder, |_| false);
        assert!(none.is_empty());
        assert_eq!(none.occurrences, default_bound(8));
    }

    #[test]
    fn tiny_lengths() {
        let cache = SubwordCache::new();
        for n in 1..=3 {
            for mode in [SearchMode::Exhaustive, SearchMode::Pruned] {
                let res = evaluate_mode(mode, &SearchConfig::for_length(n), &cache).unwrap();
                assert_eq!(res.occurrences, 0, "n={n} {mode}");
                assert!(!res.is_empty());
            }
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    #[test]
    fn histogram_counts_every_word() {
        let cache = SubwordCache::new();
        for n in 5..=12 {
            let histo = histogram(n, &cache).unwrap();
            assert_eq!(histo.values().sum::<u64>(), 1 << (n - 1), "n={n}");
            let global = evaluate_mode(SearchMode::Exhaustive, &SearchConfig::for_length(n), &cache).unwrap();
            assert_eq!(histo.keys().next(), Some(&global.occurrences));
        }
        assert!(histogram(0, &cache).is_err());
    }

    #[test]
    fn evaluate_word_is_exact() {
        let cache = SubwordCache::new();
        let w: Word = "0110".parse().unwrap();
        assert_eq!(evaluate_word(&w, &cache).occurrences, 1);
        let w: Word = "0010110111".parse().unwrap();
        let rec = evaluate_word(&w, &cache);
        assert_eq!(rec.occurrences, MaxSubwordFinder::new(&cache).max_frequency(&w));
        assert!(!rec.subwords.is_empty());
    }

    #[test]
    fn insertion_heuristic_returns_a_longer_word() {
        let cache = SubwordCache::new();
        let w: Word = "0010110111010".parse().unwrap();
        let (ext, score) = insertion_heuristic(&w, &cache).unwrap().unwrap();
        assert_eq!(ext.len(), w.len() + 1);
        let finder = MaxSubwordFinder::new(&cache);
        assert_eq!(finder.max_frequency_fast(&ext), score);
        // The result is a supersequence of the original word.
        assert!(crate::validate::brute_force_count(&ext, &w) > 0);
        assert!(insertion_heuristic(&Word::build(0, 64), &cache).is_err());
    }
}
