//! Constant-time least-significant bit scans on 32-bit words.
//!
//! Isolating the lowest set bit leaves a power of two `2^t`. Multiplying it
//! with a de Bruijn constant shifts a unique 5-bit window into the top bits of
//! the word, which indexes a permutation table that maps it back to `t`.

/// The word type of all hurdle vectors.
pub type Word = u32;

/// Bits per word.
pub const W: usize = Word::BITS as usize;

/// The de Bruijn multiplier for 32-bit words.
const DE_BRUIJN: Word = 0x06EB_14F9;

/// `DE_BRUIJN_TABLE[(2^t * DE_BRUIJN) >> 27] == t`.
const DE_BRUIJN_TABLE: [u8; 32] = [
    0, 1, 16, 2, 29, 17, 3, 22, //
    30, 20, 18, 11, 13, 4, 7, 23, //
    31, 15, 28, 21, 19, 10, 12, 6, //
    14, 27, 9, 5, 26, 8, 25, 24,
];

/// Index of the least significant set bit.
///
/// The result is meaningless for `w == 0`; callers must check this first.
#[inline(always)]
pub fn lsb(w: Word) -> usize {
    debug_assert!(w != 0, "lsb of an all-zero word");
    let isolated = w & w.wrapping_neg();
    DE_BRUIJN_TABLE[(isolated.wrapping_mul(DE_BRUIJN) >> (W - 5)) as usize] as usize
}

/// Index of the least significant zero bit.
///
/// The result is meaningless for `w == Word::MAX`.
#[inline(always)]
pub fn lsz(w: Word) -> usize {
    lsb(!w)
}
