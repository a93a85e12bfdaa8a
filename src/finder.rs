//! Most frequent subwords of a single word, with early exit against a bound.
//!
//! The maximum ranges over *anchored* subwords: those starting with the
//! word's first letter and ending with its last letter, of every length from
//! 2 to `len - 2`. For words of length 5 and more this is also the maximum
//! over all subwords of those lengths.
//!
//! Most words examined by a minimization run are hopeless, so [`find`]
//! first probes a few subwords derived from the last disqualifying subword
//! (the *hint*), then the quickly alternating subwords of the hint's length,
//! and only then enumerates lengths outward from the hint's length.
//!
//! [`find`]: MaxSubwordFinder::find

use crate::binomial::binomial;
use crate::cache::SubwordCache;
use crate::counter::SubwordCounter;
use crate::record::WordRecord;
use crate::restricted::RestrictedWords;
use crate::word::{Word, MAX_LEN};

/// Per-worker finder; owns the hint carried from one word to the next.
#[derive(Clone, Debug)]
pub struct MaxSubwordFinder<'c> {
    counter: SubwordCounter<'c>,
    hint: Word,
}

impl<'c> MaxSubwordFinder<'c> {
    /// Finder with the initial hint `00`.
    pub fn new(cache: &'c SubwordCache) -> Self {
        Self::with_hint(cache, Word::build(0, 2))
    }

    /// Finder starting from a caller-supplied hint subword.
    pub fn with_hint(cache: &'c SubwordCache, hint: Word) -> Self {
        debug_assert!(hint.len() >= 2);
        Self {
            counter: SubwordCounter::new(cache),
            hint,
        }
    }

    /// Last subword that disqualified a word.
    pub fn hint(&self) -> &Word {
        &self.hint
    }

    /// The underlying counter.
    pub fn counter(&self) -> &SubwordCounter<'c> {
        &self.counter
    }

    // ------------------------------------------------------------------------
    // Bounded search
    // ------------------------------------------------------------------------

    /// Most frequent anchored subwords of `word`, stopping as soon as one
    /// occurs more than `bound` times.
    ///
    /// If the returned count is at most `bound` it is the exact maximum and
    /// `subwords` lists every anchored subword attaining it. Otherwise the
    /// record only witnesses that `word` exceeds the bound.
    pub fn find(&mut self, word: &Word, bound: u64) -> WordRecord {
        if word.first_letter() == 1 {
            return self.find_zero_led(&word.complement(), bound).complemented();
        }
        self.find_zero_led(word, bound)
    }

    fn find_zero_led(&mut self, word: &Word, bound: u64) -> WordRecord {
        if let Some(hit) = self.probe(word, bound) {
            return hit;
        }

        let len = word.len();
        let mut best = WordRecord::new(*word);
        if len < 4 {
            return best;
        }
        let center = self.hint.len().clamp(2, len - 2);
        for k in length_order(center, 2, len - 2) {
            // A length whose total number of index choices is below the
            // running maximum can neither beat nor tie it.
            if binomial(len, k) < bound.min(best.occurrences) {
                continue;
            }
            best.absorb(self.best_at_length(word, k, bound));
            if best.occurrences > bound {
                self.hint = best.subwords[0];
                break;
            }
        }
        best
    }

    /// Cheap candidates derived from the hint. Returns a record as soon as one
    /// of them exceeds `bound`.
    fn probe(&mut self, word: &Word, bound: u64) -> Option<WordRecord> {
        let hint = self.hint;
        let hint_len = hint.len();
        let last = word.last_letter();

        let hit = |sub: Word, occ: u64| WordRecord::with_witness(*word, sub, occ);

        let mut near = vec![Word::build((hint.bits() & !1) | last, hint_len)];
        if hint_len < MAX_LEN {
            near.push(Word::build((hint.bits() << 1) | last, hint_len + 1));
        }
        near.push(hint);
        for sub in near {
            let occ = self.counter.count(word, &sub);
            if occ > bound {
                return Some(hit(sub, occ));
            }
        }

        // Interior flips keep the end letters of the hint.
        for i in 1..hint_len.saturating_sub(1) {
            let sub = Word::build(hint.bits() ^ (1 << i), hint_len);
            let occ = self.counter.count(word, &sub);
            if occ > bound {
                return Some(hit(sub, occ));
            }
        }
        for i in 1..hint_len.saturating_sub(2) {
            for j in i + 1..hint_len - 1 {
                let sub = Word::build(hint.bits() ^ (1 << i) ^ (1 << j), hint_len);
                let occ = self.counter.count(word, &sub);
                if occ > bound {
                    return Some(hit(sub, occ));
                }
            }
        }

        if hint_len >= 3 {
            if let Ok(restricted) = RestrictedWords::new(hint_len) {
                for bits in restricted {
                    let sub = Word::build(bits, hint_len);
                    let occ = self.counter.count(word, &sub);
                    if occ > bound {
                        self.hint = sub;
                        return Some(hit(sub, occ));
                    }
                }
            }
        }
        None
    }

    /// Best subwords of length `k` starting with 0 and ending with the word's
    /// last letter; stops at the first count above `bound`.
    fn best_at_length(&self, word: &Word, k: usize, bound: u64) -> WordRecord {
        let mut rec = WordRecord::new(*word);
        let mut sub = Word::build(word.last_letter(), k);
        loop {
            let occ = self.counter.count(word, &sub);
            if occ > 0 && occ >= rec.occurrences {
                rec.offer(sub, occ);
                if occ > bound {
                    break;
                }
            }
            if !sub.successor_by_2() {
                break;
            }
        }
        rec
    }

    // ------------------------------------------------------------------------
    // Unbounded queries
    // ------------------------------------------------------------------------

    /// Exact maximal anchored occurrence count over lengths `2..=len-2`
    /// (0 for words shorter than 4). Ignores the hint.
    pub fn max_frequency(&self, word: &Word) -> u64 {
        let word = zero_led(word);
        (2..word.len().saturating_sub(1))
            .map(|k| self.max_at(&word, k))
            .max()
            .unwrap_or(0)
    }

    /// Maximal count among subwords of length `k` that start with the word's
    /// first letter and end with its last letter. For `k = 1` this is the
    /// number of occurrences of the last letter.
    pub fn max_frequency_at_length(&self, word: &Word, k: usize) -> u64 {
        if k == 0 || k > word.len() {
            return 0;
        }
        self.max_at(&zero_led(word), k)
    }

    fn max_at(&self, word: &Word, k: usize) -> u64 {
        let mut best = 0;
        let mut sub = Word::build(word.last_letter(), k);
        loop {
            best = best.max(self.counter.count(word, &sub));
            if !sub.successor_by_2() {
                return best;
            }
        }
    }

    /// Bounded search restricted to lengths `len/4 .. len/2`, where the most
    /// frequent subwords of long words usually sit. Used to score words
    /// during local search.
    pub fn fast_record(&self, word: &Word, bound: u64) -> WordRecord {
        let flipped = word.first_letter() == 1;
        let w = zero_led(word);
        let mut best = WordRecord::new(w);
        for k in (w.len() / 4).max(1)..w.len() / 2 {
            best.absorb(self.best_at_length(&w, k, bound));
            if best.occurrences > bound {
                break;
            }
        }
        if flipped {
            best.complemented()
        } else {
            best
        }
    }

    /// Unbounded [`fast_record`](Self::fast_record) value.
    pub fn max_frequency_fast(&self, word: &Word) -> u64 {
        self.fast_record(word, u64::MAX).occurrences
    }
}

#[inline]
fn zero_led(word: &Word) -> Word {
    if word.first_letter() == 1 {
        word.complement()
    } else {
        *word
    }
}

/// `center, center-1, center+1, center-2, center+2, …` restricted to
/// `[lo, hi]`, covering every length in the range once.
pub fn length_order(center: usize, lo: usize, hi: usize) -> Vec<usize> {
    debug_assert!(lo <= center && center <= hi);
    let mut order = Vec::with_capacity(hi - lo + 1);
    order.push(center);
    let mut below = (lo..center).rev();
    let mut above = center + 1..=hi;
    loop {
        let down = below.next();
        let up = above.next();
        if down.is_none() && up.is_none() {
            break;
        }
        order.extend(down);
        order.extend(up);
    }
    order
}

// ============================================================================
// Tests
// ============================================================================
