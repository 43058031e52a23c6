//! Dense bit set over abstract indices.
//!
//! Used for materialised state sets (target, avoid, safe) and for the
//! `state * no_inputs + input` validity matrix of a winning domain.

use crate::error::{try_alloc, Result};
use crate::predicate::StateSet;
use crate::types::State;

/// A bit set backed by a vector of u64 words.
///
/// The bit set grows automatically when inserting beyond the current capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    words: Vec<u64>,
    /// Number of set bits, cached for O(1) `len()`.
    count: usize,
}

impl BitSet {
    const BITS_PER_WORD: usize = 64;

    /// Creates a new empty bit set with room for `capacity` bits.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::BITS_PER_WORD)],
            count: 0,
        }
    }

    /// Like [`new`][Self::new], but reports allocation failure instead of aborting.
    pub(crate) fn try_new(capacity: usize) -> Result<Self> {
        Ok(Self {
            words: try_alloc("bit set", capacity.div_ceil(Self::BITS_PER_WORD), 0)?,
            count: 0,
        })
    }

    /// Creates a bit set of `capacity` bits where bit `i` is `f(i)`.
    pub fn from_fn(capacity: usize, mut f: impl FnMut(usize) -> bool) -> Self {
        let mut bs = Self::new(capacity);
        for i in 0..capacity {
            if f(i) {
                bs.insert(i);
            }
        }
        bs
    }

    /// Materialises a state set over the states `0..no_states`.
    pub fn from_states<S>(no_states: usize, set: &S) -> Self
    where
        S: StateSet + ?Sized,
    {
        Self::from_fn(no_states, |i| set.contains(State::new(i as u32)))
    }

    /// Returns the number of set bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no bits are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the capacity in bits.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.words.len() * Self::BITS_PER_WORD
    }

    #[inline]
    fn word_and_bit(index: usize) -> (usize, usize) {
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// Returns true if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);
        match self.words.get(word_idx) {
            Some(word) => word & (1u64 << bit_idx) != 0,
            None => false,
        }
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);

        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }

        let mask = 1u64 << bit_idx;
        let was_clear = self.words[word_idx] & mask == 0;
        if was_clear {
            self.words[word_idx] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Clears the bit at the given index. Returns true if the bit was previously set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(index);

        let Some(word) = self.words.get_mut(word_idx) else {
            return false;
        };

        let mask = 1u64 << bit_idx;
        let was_set = *word & mask != 0;
        if was_set {
            *word &= !mask;
            self.count -= 1;
        }
        was_set
    }

    /// Returns an iterator over all set bit indices, in increasing order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl Extend<usize> for BitSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for index in iter {
            self.insert(index);
        }
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut bs = BitSet::default();
        bs.extend(iter);
        bs
    }
}

/// Iterator over set bits in a [`BitSet`].
pub struct BitSetIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // clear lowest set bit
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}
