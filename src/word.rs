//! Run-length encoded binary words.
//!
//! A [`Word`] stores its letters twice: packed in a `u64` (leftmost letter in
//! the most significant used bit) and as a list of run lengths read left to
//! right. The first run is labelled 0 whatever its actual letter, so the letter
//! of run `i` is `first_letter ^ (i & 1)`.
//!
//! All mutators (`successor_by_1`, `successor_by_2`, `append_bit`,
//! `remove_last_bit`) keep both encodings in sync in O(1), which is what the
//! enumeration loops of the search drivers rely on.

use crate::error::WordError;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Longest supported word.
pub const MAX_LEN: usize = 64;

/// Mask selecting the `len` lowest bits.
#[inline(always)]
pub const fn low_mask(len: usize) -> u64 {
    if len >= MAX_LEN {
        u64::MAX
    } else {
        (1u64 << len) - 1
    }
}

/// Reverses the `len` lowest bits of `bits`.
#[inline(always)]
pub fn reverse_bits(bits: u64, len: usize) -> u64 {
    if len == 0 {
        return 0;
    }
    (bits & low_mask(len)).reverse_bits() >> (MAX_LEN - len)
}

// ============================================================================
// Word
// ============================================================================

/// Binary word of length at most 64 with its run-length encoding.
///
/// Run slots past `run_count` are kept at zero, so derived equality is
/// equivalent to comparing `(bits, len)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Word {
    bits: u64,
    len: u8,
    run_count: u8,
    runs: [u8; MAX_LEN],
}

impl Word {
    /// The word with no letters.
    pub const fn empty() -> Self {
        Self {
            bits: 0,
            len: 0,
            run_count: 0,
            runs: [0; MAX_LEN],
        }
    }

    /// Builds the word whose letters are the `len` lowest bits of `bits`.
    ///
    /// Bits above `len` are ignored. `len` must not exceed [`MAX_LEN`]; use
    /// [`Word::try_new`] for unchecked input.
    pub fn build(bits: u64, len: usize) -> Self {
        debug_assert!(len <= MAX_LEN);
        let mut word = Self::empty();
        if len == 0 {
            return word;
        }
        word.bits = bits & low_mask(len);
        word.len = len as u8;

        // Scan right to left over the reversed pattern, complementing after
        // each run so the run being read is always made of zeros.
        let mut rev = reverse_bits(word.bits, len);
        if rev & 1 == 1 {
            rev = !rev;
        }
        let mut unread = len as u32;
        let mut count = 0;
        loop {
            let zeros = rev.trailing_zeros();
            if zeros >= unread {
                word.runs[count] = unread as u8;
                count += 1;
                break;
            }
            word.runs[count] = zeros as u8;
            count += 1;
            unread -= zeros;
            rev = !(rev >> zeros);
        }
        word.run_count = count as u8;
        word
    }

    /// Checked variant of [`Word::build`].
    ///
    /// # Errors
    /// Returns [`WordError::Empty`] for `len == 0` and [`WordError::TooLong`]
    /// for `len > 64`.
    pub fn try_new(bits: u64, len: usize) -> Result<Self, WordError> {
        match len {
            0 => Err(WordError::Empty),
            l if l > MAX_LEN => Err(WordError::TooLong(l)),
            l => Ok(Self::build(bits, l)),
        }
    }

    /// Uniformly random word of length `len` whose first letter is 0.
    pub fn random<R: Rng>(rng: &mut R, len: usize) -> Self {
        debug_assert!((1..=MAX_LEN).contains(&len));
        let bits = rng.random::<u64>() & low_mask(len - 1);
        Self::build(bits, len)
    }

    /// Letters packed MSB-first into the low `len` bits.
    #[inline(always)]
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Number of letters.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// True for the empty word.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of maximal blocks of equal letters.
    #[inline(always)]
    pub fn run_count(&self) -> usize {
        self.run_count as usize
    }

    /// Active run lengths, left to right.
    #[inline(always)]
    pub fn runs(&self) -> &[u8] {
        &self.runs[..self.run_count as usize]
    }

    /// Leftmost letter (0 for the empty word).
    #[inline(always)]
    pub fn first_letter(&self) -> u64 {
        if self.len == 0 {
            return 0;
        }
        (self.bits >> (self.len - 1)) & 1
    }

    /// Rightmost letter (0 for the empty word).
    /// Letter of the last run.
    #[inline(always)]
    pub fn last_letter(&self) -> u64 {
        self.bits & 1
    }

    /// Borrowed run view over the whole word.
    #[inline(always)]
    pub fn view(&self) -> RunView<'_> {
        RunView {
            bits: self.bits,
            len: u32::from(self.len),
            runs: self.runs(),
        }
    }

    /// Word with every letter flipped; the runs are unchanged.
    pub fn complement(&self) -> Self {
        let mut out = *self;
        out.bits ^= low_mask(self.len());
        out
    }

    /// Word read right to left.
    pub fn reversed(&self) -> Self {
        Self::build(reverse_bits(self.bits, self.len()), self.len())
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Advances to the numerically next word of the same length.
    ///
    /// Returns `false`, leaving the word untouched, when the next pattern
    /// would change the leading letter (or overflow). For words starting with
    /// 0 that happens exactly at `01…1`.
    pub fn successor_by_1(&mut self) -> bool {
        let c = self.run_count as usize;
        if c == 0 {
            return false;
        }
        if self.bits & 1 == 0 {
            if self.runs[c - 1] > 1 {
                // ...000 -> ...001
                self.runs[c - 1] -= 1;
                self.runs[c] = 1;
                self.run_count += 1;
            } else {
                if c == 1 {
                    return false;
                }
                // ...10 -> ...11, merge into the run before
                self.runs[c - 2] += 1;
                self.runs[c - 1] = 0;
                self.run_count -= 1;
            }
        } else {
            if c == 1 {
                return false;
            }
            let ones = self.runs[c - 1];
            if self.runs[c - 2] > 1 {
                // ...0011 -> ...0100
                self.runs[c - 2] -= 1;
                self.runs[c - 1] = 1;
                self.runs[c] = ones;
                self.run_count += 1;
            } else {
                if c == 2 {
                    return false;
                }
                // ...1011 -> ...1100, the lone 0 joins the ones before it
                self.runs[c - 3] += 1;
                self.runs[c - 2] = ones;
                self.runs[c - 1] = 0;
                self.run_count -= 1;
            }
        }
        self.bits += 1;
        true
    }

    /// Advances by two, keeping the first and last letters. Fails without
    /// mutation when either single step would fail.
    pub fn successor_by_2(&mut self) -> bool {
        let mut next = *self;
        if next.successor_by_1() && next.successor_by_1() {
            *self = next;
            true
        } else {
            false
        }
    }

    /// Appends `bit` (0 or 1) on the right.
    pub fn append_bit(&mut self, bit: u64) {
        debug_assert!(self.len() < MAX_LEN);
        let bit = bit & 1;
        let c = self.run_count as usize;
        if c > 0 && self.bits & 1 == bit {
            self.runs[c - 1] += 1;
        } else {
            self.runs[c] = 1;
            self.run_count += 1;
        }
        self.bits = (self.bits << 1) | bit;
        self.len += 1;
    }

    /// Removes the rightmost letter; exact inverse of [`Word::append_bit`].
    pub fn remove_last_bit(&mut self) {
        debug_assert!(self.len > 0);
        let c = self.run_count as usize;
        self.runs[c - 1] -= 1;
        if self.runs[c - 1] == 0 {
            self.run_count -= 1;
        }
        self.bits >>= 1;
        self.len -= 1;
    }
}

impl Default for Word {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len()).rev() {
            f.write_str(if (self.bits >> i) & 1 == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({self}, runs={:?})", self.runs())
    }
}

impl FromStr for Word {
    type Err = WordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let len = s.chars().count();
        if len == 0 {
            return Err(WordError::Empty);
        }
        if len > MAX_LEN {
            return Err(WordError::TooLong(len));
        }
        let mut bits = 0u64;
        for (pos, ch) in s.chars().enumerate() {
            let bit = match ch {
                '0' => 0,
                '1' => 1,
                _ => return Err(WordError::InvalidChar { ch, pos }),
            };
            bits = (bits << 1) | bit;
        }
        Ok(Self::build(bits, len))
    }
}

// ============================================================================
// Run views
// ============================================================================

/// Borrowed window over consecutive runs of a word.
///
/// `bits` holds exactly the letters of the window; `runs` is a sub-slice of
/// the parent's run array.
#[derive(Clone, Copy, Debug)]
pub struct RunView<'a> {
    pub(crate) bits: u64,
    pub(crate) len: u32,
    pub(crate) runs: &'a [u8],
}

impl<'a> RunView<'a> {
    /// Number of runs in the window.
    #[inline(always)]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Letter of the first run.
    #[inline(always)]
    pub fn first_letter(&self) -> u64 {
        debug_assert!(self.len > 0);
        (self.bits >> (self.len - 1)) & 1
    }

    /// Letter of the last run.
    #[inline(always)]
    pub fn last_letter(&self) -> u64 {
        self.bits & 1
    }

    /// The first `k` runs.
    #[inline(always)]
    pub fn cut_front(&self, k: usize) -> RunView<'a> {
        let runs = &self.runs[..k];
        let len: u32 = runs.iter().map(|&r| u32::from(r)).sum();
        RunView {
            bits: self.bits.checked_shr(self.len - len).unwrap_or(0),
            len,
            runs,
        }
    }

    /// Every run from index `k` on.
    #[inline(always)]
    pub fn cut_back(&self, k: usize) -> RunView<'a> {
        let runs = &self.runs[k..];
        let len: u32 = runs.iter().map(|&r| u32::from(r)).sum();
        RunView {
            bits: self.bits & low_mask(len as usize),
            len,
            runs,
        }
    }

    /// View without its first run.
    #[inline(always)]
    pub fn drop_first_run(&self) -> RunView<'a> {
        self.cut_back(1)
    }

    /// View without its last run.
    #[inline(always)]
    pub fn drop_last_run(&self) -> RunView<'a> {
        self.cut_front(self.runs.len() - 1)
    }
}

// ============================================================================
// Symmetry
// ============================================================================

/// Number of 0-led words in the reversal/complement class of the word that
/// `bits` represents, if that word is the class's smallest member; 0 otherwise.
///
/// Summed over all primitive words of length `len`, this gives `2^(len-1)`.
pub fn primitive_multiplicity(bits: u64, len: usize) -> u64 {
    if len == 0 {
        return 0;
    }
    let mask = low_mask(len);
    let bits = bits & mask;
    if bits >> (len - 1) == 1 {
        return 0;
    }
    // The other 0-led member is the reversal, complemented when it starts with 1.
    let mut other = reverse_bits(bits, len);
    if bits & 1 == 1 {
        other = !other & mask;
    }
    match bits.cmp(&other) {
        std::cmp::Ordering::Less => 2,
        std::cmp::Ordering::Equal => 1,
        std::cmp::Ordering::Greater => 0,
    }
}

/// Whether `bits` is the smallest of itself, its reversal, its complement and
/// its reversed complement.
#[inline]
pub fn is_primitive(bits: u64, len: usize) -> bool {
    primitive_multiplicity(bits, len) > 0
}

// ============================================================================
// Tests
// ============================================================================
