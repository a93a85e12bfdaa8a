//! Fast deterministic self-checks of the counter and the search drivers.

use crate::cache::SubwordCache;
use crate::counter::SubwordCounter;
use crate::error::ValidationError;
use crate::record::GlobalRecord;
use crate::search::{evaluate_mode, SearchConfig, SearchMode};
use crate::word::Word;
use std::collections::BTreeSet;
use tracing::info;

// ============================================================================
// Public API
// ============================================================================

/// Counts occurrences of `subword` in `word` with the textbook
/// `O(|word| * |subword|)` dynamic program.
pub fn brute_force_count(word: &Word, subword: &Word) -> u64 {
    let k = subword.len();
    let mut ways = vec![0u64; k + 1];
    ways[0] = 1;
    for i in (0..word.len()).rev() {
        let letter = (word.bits() >> i) & 1;
        // `ways[j]` counts embeddings of the first `j` letters of `subword`.
        for j in (1..=k).rev() {
            if (subword.bits() >> (k - j)) & 1 == letter {
                ways[j] += ways[j - 1];
            }
        }
    }
    ways[k]
}

/// Compares the counter against [`brute_force_count`] for every word of
/// length `1..=max_len` and every subword no longer than it.
///
/// # Errors
/// Returns the first disagreement.
pub fn validate_counter(max_len: usize, cache: &SubwordCache) -> Result<(), ValidationError> {
    let counter = SubwordCounter::new(cache);
    for n in 1..=max_len {
        for wb in 0..1u64 << n {
            let word = Word::build(wb, n);
            for k in 1..=n {
                for sb in 0..1u64 << k {
                    let sub = Word::build(sb, k);
                    let got = counter.count(&word, &sub);
                    let expected = brute_force_count(&word, &sub);
                    if got != expected {
                        return Err(ValidationError::Count {
                            word: word.to_string(),
                            subword: sub.to_string(),
                            got,
                            expected,
                        });
                    }
                }
            }
        }
    }
    info!(max_len, "counter agrees with brute force");
    Ok(())
}

/// Runs every exact driver on each length and checks that all of them find
/// the exhaustive value and the same optimal words.
///
/// Partitioned drivers run on their own cache, since they switch insertion
/// off on the cache they are given.
///
/// # Errors
/// Returns the first disagreement, or [`ValidationError::Config`] if a length
/// cannot be searched at all.
pub fn validate_searches<I>(lengths: I, cache: &SubwordCache) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = usize>,
{
    for n in lengths {
        let cfg = SearchConfig {
            threads: max_threads(n),
            ..SearchConfig::for_length(n)
        };
        let baseline = run(SearchMode::Exhaustive, &cfg, cache)?;
        let expected = word_set(&baseline);

        let shared = SubwordCache::new();
        for mode in [SearchMode::Pruned, SearchMode::Parallel, SearchMode::ParallelPruned] {
            let target = if mode.is_partitioned() { &shared } else { cache };
            let got = run(mode, &cfg, target)?;
            if got.occurrences != baseline.occurrences {
                return Err(ValidationError::Search {
                    n,
                    mode: mode.as_str(),
                    got: got.occurrences,
                    expected: baseline.occurrences,
                });
            }
            let words = word_set(&got);
            if words != expected {
                return Err(ValidationError::Witnesses {
                    n,
                    mode: mode.as_str(),
                    got: words.len(),
                    expected: expected.len(),
                });
            }
        }
        info!(n, occurrences = baseline.occurrences, words = expected.len(), "drivers agree");
    }
    Ok(())
}

/// Counter check up to length 8 followed by the driver check on lengths
/// `5..=10`.
///
/// # Errors
/// Returns the first failing check.
pub fn validate_engine() -> Result<(), ValidationError> {
    let cache = SubwordCache::new();
    validate_counter(8, &cache)?;
    validate_searches(5..=10, &cache)
}

// ============================================================================
// Internal
// ============================================================================

/// Largest worker count, up to 4, whose selector fits in a word of length `n`.
fn max_threads(n: usize) -> usize {
    let room = (n.saturating_sub(1) - n / 2).min(2);
    1 << room
}

fn run(mode: SearchMode, cfg: &SearchConfig, cache: &SubwordCache) -> Result<GlobalRecord, ValidationError> {
    evaluate_mode(mode, cfg, cache).map_err(|e| ValidationError::Config(e.to_string()))
}

fn word_set(global: &GlobalRecord) -> BTreeSet<u64> {
    global.words().map(Word::bits).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn w(s: &str) -> Word {
        s.parse().unwrap()
    }

    #[test]
    fn brute_force_small_cases() {
        assert_eq!(brute_force_count(&w("0110"), &w("01")), 2);
        assert_eq!(brute_force_count(&w("0110"), &w("10")), 2);
        assert_eq!(brute_force_count(&w("0010010"), &w("000")), 10);
        assert_eq!(brute_force_count(&w("0101"), &w("0101")), 1);
        assert_eq!(brute_force_count(&w("0101"), &w("110")), 0);
        assert_eq!(brute_force_count(&w("01"), &w("010")), 0);
        assert_eq!(brute_force_count(&w("0110"), &Word::empty()), 1);
    }

    #[test]
    fn brute_force_on_constant_words_is_binomial() {
        let zeros = Word::build(0, 20);
        for k in 1..=20 {
            let sub = Word::build(0, k);
            assert_eq!(brute_force_count(&zeros, &sub), crate::binomial::binomial(20, k));
        }
    }

    #[test]
    fn counter_validation_passes() {
        validate_counter(6, &SubwordCache::new()).unwrap();
    }

    #[test]
    fn search_validation_passes() {
        validate_searches([5, 7, 9], &SubwordCache::new()).unwrap();
    }

    #[test]
    fn thread_counts_fit_the_selector() {
        assert_eq!(max_threads(1), 1);
        assert_eq!(max_threads(2), 1);
        assert_eq!(max_threads(3), 2);
        assert_eq!(max_threads(5), 4);
        for n in 1..=64 {
            let cfg = SearchConfig {
                threads: max_threads(n),
                ..SearchConfig::for_length(n)
            };
            assert!(cfg.validate(SearchMode::ParallelPruned).is_ok(), "n={n}");
        }
    }

    #[test]
    fn invalid_length_surfaces_as_config_error() {
        let err = validate_searches([0], &SubwordCache::new()).unwrap_err();
        assert!(matches!(err, ValidationError::Config(_)));
    }

    #[test]
    fn validation_error_messages() {
        let err = ValidationError::Search {
            n: 9,
            mode: "pruned",
            got: 4,
            expected: 3,
        };
        assert_eq!(err.to_string(), "n=9: pruned found 4, exhaustive search found 3");
    }
}
