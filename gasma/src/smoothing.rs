//! Smoothing of hurdle vectors.
//!
//! Short isolated runs of hurdles inside a highway are noise: removing them
//! lets two nearby highways be seen as one. Short isolated runs of matches
//! between hurdles are noise as well and are turned into hurdles.
//!
//! Only *interior* runs are changed, i.e. runs with a neighbour of the other
//! kind on both sides. Runs touching column 0 or the end of the lane are kept.
use serde::{Deserialize, Serialize};

use crate::bits::HurdleBits;

/// Thresholds for smoothing and highway merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothParams {
    /// Interior runs of at most this many hurdles become passable.
    pub max_ones_ignored: usize,
    /// Interior runs of at most this many matches become hurdles.
    pub max_zeros_ignored: usize,
    /// Highways separated by at most this many smoothed hurdles are merged.
    pub cross_hurdle_threshold: usize,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self {
            max_ones_ignored: 1,
            max_zeros_ignored: 0,
            cross_hurdle_threshold: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Smoothed {
    pub bits: HurdleBits,
    /// Hurdle columns that were made passable.
    pub absorbed: Vec<usize>,
    /// Match columns that were turned into hurdles.
    pub excluded: Vec<usize>,
}

/// Flips interior `1`-runs of length `<= max_ones`, then interior `0`-runs of
/// length `<= max_zeros`. Applying this twice gives the same bits.
pub fn smooth(raw: &HurdleBits, max_ones: usize, max_zeros: usize) -> Smoothed {
    let len = raw.len();
    let mut bits = raw.clone();
    let mut absorbed = vec![];
    let mut excluded = vec![];

    if max_ones > 0 {
        // A hurdle run between two consecutive match runs is interior.
        let runs: Vec<_> = raw.zero_runs().collect();
        for w in runs.windows(2) {
            let lo = w[0].0 + w[0].1;
            let hi = w[1].0;
            if hi - lo <= max_ones {
                bits.fill(lo..hi, false);
                absorbed.extend(lo..hi);
            }
        }
    }

    if max_zeros > 0 {
        let runs: Vec<_> = bits.zero_runs().collect();
        for (start, run) in runs {
            let interior = start > 0 && start + run < len;
            if interior && run <= max_zeros {
                bits.fill(start..start + run, true);
                excluded.extend(start..start + run);
            }
        }
    }

    Smoothed {
        bits,
        absorbed,
        excluded,
    }
}
