//! Exact subword occurrence counting on run-length encodings.
//!
//! The count of `s` in `w` is the number of strictly increasing maps from the
//! letters of `s` to equal letters of `w`. The counter splits `s` at its middle
//! run, locates the span of runs of `w` that run may occupy with two greedy
//! scans, and recurses on the two halves. When the middle run may spread over
//! several same-letter runs of `w`, every (first run, last run) pair is
//! weighted by inclusion–exclusion over binomials.

use crate::binomial::{binomial, binomial_signed};
use crate::cache::{SubwordCache, MAX_CACHE_RUNS};
use crate::error::{Result, SearchError};
use crate::word::{RunView, Word, MAX_LEN};

/// Subsequence counter backed by a shared [`SubwordCache`].
#[derive(Clone, Copy, Debug)]
pub struct SubwordCounter<'c> {
    cache: &'c SubwordCache,
}

impl<'c> SubwordCounter<'c> {
    /// Counter reading and filling `cache`.
    pub fn new(cache: &'c SubwordCache) -> Self {
        Self { cache }
    }

    /// The backing cache.
    pub fn cache(&self) -> &'c SubwordCache {
        self.cache
    }

    /// Number of occurrences of `subword` in `word` as a subsequence.
    pub fn count(&self, word: &Word, subword: &Word) -> u64 {
        if subword.is_empty() {
            return 1;
        }
        if subword.len() > word.len() {
            return 0;
        }
        // Letters of the word before the first match of the subword's first
        // letter can never be used; the same holds at the other end.
        let mut w = word.view();
        if w.first_letter() != subword.first_letter() {
            w = w.drop_first_run();
            if w.len == 0 {
                return 0;
            }
        }
        if w.last_letter() != subword.last_letter() {
            w = w.drop_last_run();
            if w.len == 0 {
                return 0;
            }
        }
        self.count_raw(w, subword.view())
    }

    /// Checked entry point on raw bit patterns.
    ///
    /// # Errors
    /// Returns [`SearchError::InvalidLength`] if either length is outside
    /// `[1, 64]`.
    pub fn count_bits(&self, word_bits: u64, word_len: usize, sub_bits: u64, sub_len: usize) -> Result<u64> {
        for len in [word_len, sub_len] {
            if !(1..=MAX_LEN).contains(&len) {
                return Err(SearchError::InvalidLength { len, min: 1, max: MAX_LEN });
            }
        }
        Ok(self.count(&Word::build(word_bits, word_len), &Word::build(sub_bits, sub_len)))
    }

    /// Core recursion. Both views must start with the same letter and end with
    /// the same letter (or the subword must be empty).
    fn count_raw(&self, w: RunView<'_>, s: RunView<'_>) -> u64 {
        let sub_runs = s.run_count();
        if sub_runs == 0 {
            return 1;
        }
        let word_runs = w.run_count();
        if word_runs < sub_runs {
            return 0;
        }

        let mid = sub_runs / 2;
        let m = s.runs[mid] as usize;
        let Some(lo) = leftmost_start(w.runs, &s.runs[..mid]) else {
            return 0;
        };
        let Some(hi) = rightmost_end(w.runs, &s.runs[mid + 1..]) else {
            return 0;
        };
        if lo > hi {
            return 0;
        }

        let cacheable = word_runs < MAX_CACHE_RUNS;
        if cacheable {
            if let Some(count) = self.cache.get(w.bits, w.len, s.bits, s.len) {
                return count;
            }
        }

        let s_front = s.cut_front(mid);
        let s_back = s.cut_back(mid + 1);
        let total = if lo == hi {
            let middle = binomial(w.runs[lo] as usize, m);
            if middle == 0 {
                0
            } else {
                middle * self.count_raw(w.cut_front(lo), s_front) * self.count_raw(w.cut_back(lo + 1), s_back)
            }
        } else {
            let mut total = 0u64;
            for k in (lo..=hi).step_by(2) {
                let first = i64::from(w.runs[k]);
                let mut span = 0i64;
                for l in (k..=hi).step_by(2) {
                    let last = i64::from(w.runs[l]);
                    span += last;
                    // Placements of the middle run inside runs k..=l touching
                    // both run k and run l.
                    let mult = binomial_signed(span, m) - binomial_signed(span - last, m) - binomial_signed(span - first, m)
                        + binomial_signed(span - first - last, m);
                    if mult <= 0 {
                        continue;
                    }
                    let front = self.count_raw(w.cut_front(k), s_front);
                    if front == 0 {
                        continue;
                    }
                    total += mult as u64 * front * self.count_raw(w.cut_back(l + 1), s_back);
                }
            }
            total
        };

        if cacheable {
            self.cache.insert(w.bits, w.len, s.bits, s.len, total);
        }
        total
    }
}

// ============================================================================
// Greedy placement scans
// ============================================================================

/// Index of the first run of `word` left free by the leftmost embedding of
/// the runs `front`. `None` if `front` does not fit.
#[inline(always)]
fn leftmost_start(word: &[u8], front: &[u8]) -> Option<usize> {
    let mut idx = 0;
    for &run in front {
        let mut need = run;
        loop {
            let have = *word.get(idx)?;
            if have < need {
                // Exhausts this run; continue in the next run of the same letter.
                need -= have;
                idx += 2;
            } else {
                idx += 1;
                break;
            }
        }
    }
    Some(idx)
}

/// Index of the last run of `word` left free by the rightmost embedding of
/// the runs `back`. `None` if `back` does not fit or nothing is left.
#[inline(always)]
fn rightmost_end(word: &[u8], back: &[u8]) -> Option<usize> {
    // `end` is one past the run under inspection.
    let mut end = word.len();
    for &run in back.iter().rev() {
        let mut need = run;
        loop {
            let idx = end.checked_sub(1)?;
            let have = word[idx];
            if have < need {
                need -= have;
                end = end.checked_sub(2)?;
            } else {
                end = idx;
                break;
            }
        }
    }
    end.checked_sub(1)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::brute_force_count;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    fn count_str(counter: &SubwordCounter<'_>, w: &str, s: &str) -> u64 {
        counter.count(&w.parse().unwrap(), &s.parse().unwrap())
    }

    // ------------------------------------------------------------------------
    // Known values
    // ------------------------------------------------------------------------

    #[test]
    fn small_examples() {
        let cache = SubwordCache::new();
        let counter = SubwordCounter::new(&cache);
        assert_eq!(count_str(&counter, "0101", "01"), 3);
        assert_eq!(count_str(&counter, "0110", "01"), 2);
        assert_eq!(count_str(&counter, "0110", "10"), 2);
        assert_eq!(count_str(&counter, "0110", "00"), 1);
        assert_eq!(count_str(&counter, "0110", "11"), 1);
        assert_eq!(count_str(&counter, "000111", "01"), 9);
        assert_eq!(count_str(&counter, "000111", "10"), 0);
        assert_eq!(count_str(&counter, "1111", "0"), 0);
        assert_eq!(count_str(&counter, "1", "1"), 1);
        assert_eq!(count_str(&counter, "01", "011"), 0);
        assert_eq!(counter.count(&"0101".parse().unwrap(), &Word::empty()), 1);
    }

    #[test]
    fn single_run_words_are_binomials() {
        let cache = SubwordCache::new();
        let counter = SubwordCounter::new(&cache);
        let zeros = Word::build(0, 64);
        for k in [1, 2, 10, 32, 63, 64] {
            assert_eq!(counter.count(&zeros, &Word::build(0, k)), binomial(64, k));
        }
        assert_eq!(counter.count(&zeros, &Word::build(1, 2)), 0);
    }

    #[test]
    fn middle_run_spanning_several_runs() {
        let cache = SubwordCache::new();
        let counter = SubwordCounter::new(&cache);
        assert_eq!(count_str(&counter, "0010010", "000"), 10);
        // Choose 3 zeros among the 2 + 2 + 2 zeros: C(6, 3).
        assert_eq!(count_str(&counter, "00100100", "000"), 20);
        assert_eq!(count_str(&counter, "00100100", "01000"), brute_force_count(&"00100100".parse().unwrap(), &"01000".parse().unwrap()));
    }

    // ------------------------------------------------------------------------
    // Brute-force agreement
    // ------------------------------------------------------------------------

    #[test]
    fn agrees_with_brute_force_on_all_short_pairs() {
        let cache = SubwordCache::new();
        let counter = SubwordCounter::new(&cache);
        for n in 1..=8usize {
            for wb in 0..1u64 << n {
                let w = Word::build(wb, n);
                for k in 1..=n {
                    for sb in 0..1u64 << k {
                        let s = Word::build(sb, k);
                        assert_eq!(counter.count(&w, &s), brute_force_count(&w, &s), "w={w} s={s}");
                    }
                }
            }
        }
    }

    #[test]
    fn agrees_with_brute_force_on_long_random_words() {
        let cache = SubwordCache::new();
        let counter = SubwordCounter::new(&cache);
        let mut rng = XorShiftRng::seed_from_u64(2024);
        for _ in 0..300 {
            let n = rng.random_range(20..=64);
            let k = rng.random_range(1..=n / 2);
            let w = Word::build(rng.random(), n);
            let s = Word::build(rng.random(), k);
            assert_eq!(counter.count(&w, &s), brute_force_count(&w, &s), "w={w} s={s}");
        }
    }

    #[test]
    fn disabled_insertion_gives_same_counts() {
        let cache = SubwordCache::new();
        cache.set_insertion_enabled(false);
        let counter = SubwordCounter::new(&cache);
        let mut rng = XorShiftRng::seed_from_u64(5);
        for _ in 0..200 {
            let w = Word::build(rng.random(), 16);
            let s = Word::build(rng.random(), 6);
            assert_eq!(counter.count(&w, &s), brute_force_count(&w, &s));
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn warm_cache_gives_same_counts() {
        let cache = SubwordCache::new();
        let counter = SubwordCounter::new(&cache);
        let w: Word = "0010110100".parse().unwrap();
        let s: Word = "0100".parse().unwrap();
        let cold = counter.count(&w, &s);
        assert!(!cache.is_empty());
        assert_eq!(counter.count(&w, &s), cold);
        assert_eq!(cold, brute_force_count(&w, &s));
    }

    #[test]
    fn count_bits_validates_lengths() {
        let cache = SubwordCache::new();
        let counter = SubwordCounter::new(&cache);
        assert_eq!(counter.count_bits(0b0101, 4, 0b01, 2).unwrap(), 3);
        assert!(matches!(
            counter.count_bits(0, 0, 0, 1),
            Err(SearchError::InvalidLength { len: 0, .. })
        ));
        assert!(matches!(
            counter.count_bits(0, 4, 0, 65),
            Err(SearchError::InvalidLength { len: 65, .. })
        ));
    }

    // ------------------------------------------------------------------------
    // Scans
    // ------------------------------------------------------------------------

    #[test]
    fn greedy_scans() {
        // word 00 1 0 111, front run "000" needs runs 0 and 2.
        let word = [2u8, 1, 1, 3];
        assert_eq!(leftmost_start(&word, &[3]), Some(3));
        assert_eq!(leftmost_start(&word, &[]), Some(0));
        assert_eq!(leftmost_start(&word, &[4]), None);
        assert_eq!(rightmost_end(&word, &[]), Some(3));
        assert_eq!(rightmost_end(&word, &[3]), Some(2));
        assert_eq!(rightmost_end(&word, &[4]), Some(0));
        assert_eq!(rightmost_end(&word, &[5]), None);
        assert_eq!(rightmost_end(&word, &[3, 1]), None);
    }

    proptest! {
        #[test]
        fn prop_counter_matches_dp(wb in any::<u64>(), n in 1usize..=24, sb in any::<u64>(), k in 1usize..=12) {
            let cache = SubwordCache::new();
            let counter = SubwordCounter::new(&cache);
            let w = Word::build(wb, n);
            let s = Word::build(sb, k);
            prop_assert_eq!(counter.count(&w, &s), brute_force_count(&w, &s));
        }

        #[test]
        fn prop_complement_and_reversal_preserve_counts(wb in any::<u64>(), n in 2usize..=20, sb in any::<u64>(), k in 1usize..=8) {
            let cache = SubwordCache::new();
            let counter = SubwordCounter::new(&cache);
            let w = Word::build(wb, n);
            let s = Word::build(sb, k);
            let base = counter.count(&w, &s);
            prop_assert_eq!(counter.count(&w.complement(), &s.complement()), base);
            prop_assert_eq!(counter.count(&w.reversed(), &s.reversed()), base);
        }
    }
}
