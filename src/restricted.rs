//! Generator of words whose runs all have length 1 or 2.
//!
//! Subwords that occur many times tend to alternate quickly, so the finder
//! tries these before falling back to a full per-length enumeration. There are
//! `F(len + 1)` such words starting with 0 (Fibonacci numbers, `F(1) = F(2) = 1`).

use crate::error::{Result, SearchError};
use crate::word::MAX_LEN;

/// Iterator over the 0-led words of a fixed length with runs in `{1, 2}`.
///
/// Order: start from `0011 0011 …`; a trailing pair is split into two singles;
/// otherwise the trailing block of singles is dropped, the pair before it is
/// shortened, and the tail is refilled with pairs.
#[derive(Clone, Debug)]
pub struct RestrictedWords {
    len: usize,
    current: u64,
    done: bool,
}

impl RestrictedWords {
    /// # Errors
    /// Returns [`SearchError::InvalidLength`] unless `2 <= len <= 64`.
    pub fn new(len: usize) -> Result<Self> {
        if !(2..=MAX_LEN).contains(&len) {
            return Err(SearchError::InvalidLength { len, min: 2, max: MAX_LEN });
        }
        Ok(Self {
            len,
            current: fill_with_pairs(0, len - 2),
            done: false,
        })
    }

    /// Word length of every generated pattern.
    pub fn word_len(&self) -> usize {
        self.len
    }

    fn advance(&mut self) {
        let cur = self.current;
        if (cur ^ (cur >> 1)) & 1 == 0 {
            // Trailing pair: split it.
            self.current ^= 1;
            return;
        }
        let mut cur = cur;
        let mut freed = 0;
        while (cur ^ (cur >> 1)) & 1 == 1 {
            cur >>= 1;
            freed += 1;
        }
        if freed == self.len - 1 {
            // 0101…: last word.
            self.done = true;
            return;
        }
        self.current = fill_with_pairs(cur >> 1, freed + 1);
    }
}

impl Iterator for RestrictedWords {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.done {
            return None;
        }
        let out = self.current;
        self.advance();
        Some(out)
    }
}

/// Appends `remaining` letters to `bits` as alternating pairs, starting with
/// the letter opposite to the current last one. An odd tail gets one single.
#[inline]
fn fill_with_pairs(mut bits: u64, mut remaining: usize) -> u64 {
    let mut pair = (bits & 1) * 0b11;
    while remaining >= 2 {
        pair ^= 0b11;
        bits = (bits << 2) | pair;
        remaining -= 2;
    }
    if remaining == 1 {
        pair ^= 0b11;
        bits = (bits << 1) | (pair & 1);
    }
    bits
}
