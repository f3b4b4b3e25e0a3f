//! Packed hurdle bit-vectors.
//!
//! Bit `c` is `1` for a hurdle and `0` for a passable column. Every bit at or
//! past `len`, including the unused tail of the last word, reads as `1`, so
//! scans never run past the end of a lane.
use crate::bitscan::{lsb, lsz, Word, W};
use crate::prelude::*;
use std::fmt;
use std::ops::Range;

#[derive(Clone, PartialEq, Eq)]
pub struct HurdleBits {
    words: Vec<Word>,
    len: usize,
}

/// Mask of the `off` high bits that are shifted in when shifting a word right by `off`.
#[inline(always)]
fn shifted_in(off: usize) -> Word {
    if off == 0 {
        0
    } else {
        !(Word::MAX >> off)
    }
}

/// Mask of bits `[lo, hi)` within one word, `hi <= W`.
#[inline(always)]
fn range_mask(lo: usize, hi: usize) -> Word {
    debug_assert!(lo <= hi && hi <= W);
    if lo == hi {
        return 0;
    }
    (Word::MAX >> (W - (hi - lo))) << lo
}

impl HurdleBits {
    /// A vector of `len` hurdles.
    pub fn ones(len: usize) -> Self {
        HurdleBits {
            words: vec![Word::MAX; len.div_ceil(W)],
            len,
        }
    }

    /// A vector of `len` passable columns.
    pub fn zeros(len: usize) -> Self {
        let mut bits = Self::ones(len);
        bits.fill(0..len, false);
        bits
    }

    pub fn from_fn(len: usize, mut is_hurdle: impl FnMut(usize) -> bool) -> Self {
        let mut bits = Self::ones(len);
        for (idx, word) in bits.words.iter_mut().enumerate() {
            for off in 0..min(W, len - idx * W) {
                if !is_hurdle(idx * W + off) {
                    *word &= !(1 << off);
                }
            }
        }
        bits
    }

    /// Parses `0`/`1` characters, mostly for tests.
    pub fn from_str01(s: &str) -> Self {
        let b = s.as_bytes();
        Self::from_fn(b.len(), |c| b[c] == b'1')
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Whether column `c` is a hurdle. Negative and past-the-end columns are.
    #[inline]
    pub fn get(&self, c: Col) -> bool {
        if c < 0 || c as usize >= self.len {
            return true;
        }
        let c = c as usize;
        self.words[c / W] >> (c % W) & 1 == 1
    }

    /// Sets column `c`. Columns outside the vector are ignored.
    #[inline]
    pub fn set(&mut self, c: usize, hurdle: bool) {
        if c >= self.len {
            return;
        }
        if hurdle {
            self.words[c / W] |= 1 << (c % W);
        } else {
            self.words[c / W] &= !(1 << (c % W));
        }
    }

    /// Sets all columns in `range`, clipped to the vector.
    pub fn fill(&mut self, range: Range<usize>, hurdle: bool) {
        let end = min(range.end, self.len);
        let mut c = range.start;
        while c < end {
            let (idx, off) = (c / W, c % W);
            let hi = min(W, off + (end - c));
            let mask = range_mask(off, hi);
            if hurdle {
                self.words[idx] |= mask;
            } else {
                self.words[idx] &= !mask;
            }
            c += hi - off;
        }
    }

    /// The word starting at column `c`, with the bits shifted in from the top
    /// set to `1`. `None` past the last word.
    #[inline(always)]
    fn word_at(&self, c: usize) -> Option<(Word, usize)> {
        let idx = c / W;
        let off = c % W;
        let word = *self.words.get(idx)?;
        Some(((word >> off) | shifted_in(off), W - off))
    }

    /// Number of consecutive passable columns starting at `c`.
    ///
    /// This is `0` when `c` is a hurdle or past the end.
    pub fn zeros_from(&self, c: usize) -> usize {
        let mut pos = c;
        loop {
            let Some((w, rem)) = self.word_at(pos) else {
                return pos - c;
            };
            if w == 0 {
                pos += rem;
                continue;
            }
            return pos + lsb(w) - c;
        }
    }

    /// Number of consecutive hurdles starting at `c`, or `None` when the run
    /// continues past the end of the vector.
    pub fn ones_from(&self, c: usize) -> Option<usize> {
        self.next_zero(c).map(|z| z - c)
    }

    /// The first passable column at or after `c`.
    pub fn next_zero(&self, c: usize) -> Option<usize> {
        let mut pos = c;
        loop {
            let (w, rem) = self.word_at(pos)?;
            if w == Word::MAX {
                pos += rem;
                continue;
            }
            let z = pos + lsz(w);
            // The tail of the last word is all ones, so `z < len` here.
            debug_assert!(z < self.len);
            return Some(z);
        }
    }

    /// The first hurdle at or after `c`. Always exists thanks to the sentinel.
    pub fn next_one(&self, c: usize) -> usize {
        c + self.zeros_from(c)
    }

    /// Number of hurdles in `range`. Columns past the end count as hurdles.
    pub fn count_ones(&self, range: Range<usize>) -> usize {
        if range.start >= range.end {
            return 0;
        }
        let inside = min(range.end, self.len);
        let outside = range.end - max(inside, range.start);
        let mut count = 0;
        let mut c = range.start;
        while c < inside {
            let (idx, off) = (c / W, c % W);
            let hi = min(W, off + (inside - c));
            count += (self.words[idx] & range_mask(off, hi)).count_ones() as usize;
            c += hi - off;
        }
        count + outside
    }

    /// Number of passable columns in `range`.
    pub fn count_zeros(&self, range: Range<usize>) -> usize {
        range.len() - self.count_ones(range)
    }

    /// Iterates the maximal runs of passable columns as `(start, len)`.
    pub fn zero_runs(&self) -> ZeroRuns<'_> {
        ZeroRuns { bits: self, pos: 0 }
    }

    /// The bits of `range`, clipped to the vector. Clipped columns are ORed
    /// with a one-mask and read as hurdles.
    ///
    /// Each output word is stitched from at most two input words.
    pub fn window(&self, range: Range<usize>) -> HurdleBits {
        let len = range.end.saturating_sub(range.start);
        let mut out = HurdleBits::ones(len);
        for (o, word) in out.words.iter_mut().enumerate() {
            let c = range.start + o * W;
            let (idx, off) = (c / W, c % W);
            // Missing words read as all hurdles.
            let lo = self.words.get(idx).map_or(Word::MAX, |w| w >> off);
            let hi = if off == 0 {
                0
            } else {
                self.words
                    .get(idx + 1)
                    .map_or(Word::MAX, |w| w << (W - off))
            };
            *word = lo | hi;
        }
        if len % W != 0 {
            if let Some(last) = out.words.last_mut() {
                *last |= Word::MAX << (len % W);
            }
        }
        out
    }
}

pub struct ZeroRuns<'a> {
    bits: &'a HurdleBits,
    pos: usize,
}

impl Iterator for ZeroRuns<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        // Skip the hurdle run.
        let start = self.bits.next_zero(self.pos)?;
        // Measure the passable run.
        let len = self.bits.zeros_from(start);
        self.pos = start + len;
        Some((start, len))
    }
}

impl fmt::Debug for HurdleBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = (0..self.len)
            .map(|c| if self.get(c as Col) { '1' } else { '0' })
            .collect();
        write!(f, "HurdleBits({s})")
    }
}
