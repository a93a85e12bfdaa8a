//! Per-word and global records.
//!
//! Both follow the same rule: a strictly better value replaces the witnesses,
//! an equal value adds to them, a worse value is ignored. "Better" means a
//! larger occurrence count for a word (we want its most frequent subwords) and
//! a smaller one for the global record (we want the word whose most frequent
//! subword is rarest).

use crate::word::Word;
use std::fmt;

// ============================================================================
// WordRecord
// ============================================================================

/// Most frequent subwords found for one word.
///
/// `occurrences` is exact only when it does not exceed the bound the finder
/// was given; above the bound it only proves the word cannot beat the bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordRecord {
    /// The evaluated word.
    pub word: Word,
    /// Largest occurrence count found.
    pub occurrences: u64,
    /// Subwords attaining it.
    pub subwords: Vec<Word>,
}

impl WordRecord {
    /// Record with nothing found yet.
    pub fn new(word: Word) -> Self {
        Self {
            word,
            occurrences: 0,
            subwords: Vec::new(),
        }
    }

    /// Record holding a single witness.
    pub fn with_witness(word: Word, subword: Word, occurrences: u64) -> Self {
        Self {
            word,
            occurrences,
            subwords: vec![subword],
        }
    }

    /// Offers one subword with its count.
    #[inline]
    pub fn offer(&mut self, subword: Word, occurrences: u64) {
        if occurrences > self.occurrences {
            self.occurrences = occurrences;
            self.subwords.clear();
            self.subwords.push(subword);
        } else if occurrences == self.occurrences {
            self.subwords.push(subword);
        }
    }

    /// Folds in the result of a partial search on the same word.
    pub fn absorb(&mut self, other: WordRecord) {
        debug_assert_eq!(self.word, other.word);
        if other.occurrences > self.occurrences {
            self.occurrences = other.occurrences;
            self.subwords = other.subwords;
        } else if other.occurrences == self.occurrences {
            self.subwords.extend(other.subwords);
        }
    }

    /// Same record with the word and every subword complemented.
    pub fn complemented(mut self) -> Self {
        self.word = self.word.complement();
        for sub in &mut self.subwords {
            *sub = sub.complement();
        }
        self
    }
}

impl fmt::Display for WordRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} occ={} subwords=[", self.word, self.occurrences)?;
        for (i, sub) in self.subwords.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{sub}")?;
        }
        f.write_str("]")
    }
}

// ============================================================================
// GlobalRecord
// ============================================================================

/// Smallest maximal occurrence count seen so far and the words attaining it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalRecord {
    /// Current value, or the bound while nothing was kept.
    pub occurrences: u64,
    /// One record per word attaining the value.
    pub records: Vec<WordRecord>,
}

impl GlobalRecord {
    /// Empty record whose value starts at `bound`; only words at or below it
    /// are kept.
    pub fn new(bound: u64) -> Self {
        Self {
            occurrences: bound,
            records: Vec::new(),
        }
    }

    /// Applies the update rule. Returns `true` if the value strictly improved.
    pub fn update(&mut self, record: WordRecord) -> bool {
        if record.occurrences < self.occurrences {
            self.occurrences = record.occurrences;
            self.records.clear();
            self.records.push(record);
            true
        } else {
            if record.occurrences == self.occurrences {
                self.records.push(record);
            }
            false
        }
    }

    /// Combines the result of another worker.
    pub fn merge(&mut self, other: GlobalRecord) {
        if other.occurrences < self.occurrences {
            *self = other;
        } else if other.occurrences == self.occurrences {
            self.records.extend(other.records);
        }
    }

    /// True if no word reached the bound.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Words attaining the current value.
    pub fn words(&self) -> impl Iterator<Item = &Word> + '_ {
        self.records.iter().map(|r| &r.word)
    }
}
