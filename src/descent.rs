//! Randomized local search for good (not provably optimal) words.
//!
//! Candidates are scored with the fast evaluator
//! ([`MaxSubwordFinder::fast_record`]), which only looks at subword lengths
//! `n/4 .. n/2`. A neighbourhood pass flips every `k`-subset of the `n - 1`
//! non-leading letters and moves to the first strictly better word. Around
//! that, a perturbation loop randomly flips about `flips` letters of the best
//! word and descends again, perturbing harder after `samples` consecutive
//! failures and stopping once `3 * flips > n`.

use crate::cache::SubwordCache;
use crate::finder::MaxSubwordFinder;
use crate::record::{GlobalRecord, WordRecord};
use crate::search::{default_bound, random_u64, splitmix64, SearchConfig};
use crate::word::{low_mask, Word};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

// ============================================================================
// Flip subsets
// ============================================================================

/// All `k`-subsets of `positions` bit positions, as masks, in decreasing
/// numeric order (starting from the `k` highest positions).
#[derive(Clone, Debug)]
pub struct FlipSubsets {
    k: u32,
    current: Option<u64>,
}

impl FlipSubsets {
    /// Subsets of size `k` of the lowest `positions` bits.
    pub fn new(positions: usize, k: usize) -> Self {
        debug_assert!(k >= 1 && k <= positions && positions <= 64);
        Self {
            k: k as u32,
            current: Some(low_mask(k) << (positions - k)),
        }
    }

    fn advance(mask: u64, k: u32) -> Option<u64> {
        let lowest = mask.trailing_zeros();
        if lowest > 0 {
            // Slide the lowest set bit one step right.
            return Some(mask - (1 << (lowest - 1)));
        }
        // The low block of ones is stuck; slide the next set bit right and
        // pack the block right behind it.
        let block = (!mask).trailing_zeros();
        if block == k {
            return None;
        }
        let rest = mask - low_mask(block as usize);
        let next = rest.trailing_zeros();
        Some(rest - (1 << (next - 1 - block)))
    }
}

impl Iterator for FlipSubsets {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let mask = self.current?;
        self.current = Self::advance(mask, self.k);
        Some(mask)
    }
}

// ============================================================================
// Descent
// ============================================================================

/// First-improvement descent over the `k`-flip neighbourhood of `start`.
///
/// Returns the last word reached with its fast record, or `None` if no
/// neighbour of `start` scores below `bound`.
pub fn neighborhood_descent(start: &Word, k: usize, bound: u64, finder: &MaxSubwordFinder<'_>) -> Option<WordRecord> {
    let n = start.len();
    let mut best: Option<WordRecord> = None;
    let mut bound = bound;
    let mut base = start.bits();
    'scan: loop {
        for mask in FlipSubsets::new(n - 1, k) {
            let candidate = Word::build(base ^ mask, n);
            let rec = finder.fast_record(&candidate, bound);
            if rec.occurrences < bound {
                bound = rec.occurrences;
                base = candidate.bits();
                best = Some(rec);
                continue 'scan;
            }
        }
        return best;
    }
}

/// Tries radii `1..=radius` in turn and returns the first descent that gets
/// below `bound`.
pub fn local_search_full(start: &Word, radius: usize, bound: u64, finder: &MaxSubwordFinder<'_>) -> Option<WordRecord> {
    (1..=radius).find_map(|k| neighborhood_descent(start, k, bound, finder))
}

/// Perturb-and-descend loop described in the module docs. The returned record
/// holds the best word found with its exact maximum.
pub fn local_descent(config: &SearchConfig, cache: &SubwordCache) -> GlobalRecord {
    let n = config.n;
    let radius = config.radius;
    let seed = config.seed.unwrap_or_else(random_u64);
    let mut rng = SmallRng::seed_from_u64(splitmix64(seed));
    let finder = MaxSubwordFinder::new(cache);

    let start = Word::random(&mut rng, n);
    let mut best = local_search_full(&start, radius, finder.max_frequency_fast(&start), &finder)
        .unwrap_or_else(|| finder.fast_record(&start, u64::MAX));
    info!(seed, word = %best.word, score = best.occurrences, "descent started");

    let reset = radius + 2;
    let mut flips = reset;
    let mut stagnant = 0u64;
    while 3 * flips <= n {
        let p = (flips as f64 / (n - 1) as f64).min(1.0);
        let mut bits = best.word.bits();
        for i in 0..n - 1 {
            if rng.random_bool(p) {
                bits ^= 1 << i;
            }
        }
        match local_search_full(&Word::build(bits, n), radius, best.occurrences, &finder) {
            Some(rec) => {
                info!(word = %rec.word, score = rec.occurrences, "descent improved");
                best = rec;
                flips = reset;
                stagnant = 0;
            }
            None => {
                stagnant += 1;
                if stagnant >= config.samples {
                    stagnant = 0;
                    flips += 1;
                    debug!(flips, "perturbation escalated");
                }
            }
        }
    }

    let mut finder = finder;
    let exact = finder.find(&best.word, default_bound(n));
    info!(word = %exact.word, score = best.occurrences, occurrences = exact.occurrences, "descent finished");
    GlobalRecord {
        occurrences: exact.occurrences,
        records: vec![exact],
    }
}
