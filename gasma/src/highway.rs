//! Highways: maximal runs of passable columns in a smoothed hurdle vector.
use smallvec::SmallVec;

use crate::bits::HurdleBits;
use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highway {
    pub lane: Lane,
    pub start: Col,
    pub len: Col,
    /// Raw hurdles inside `[start, end)`, hidden by smoothing or merging.
    pub absorbed: SmallVec<[Col; 4]>,
}

impl Highway {
    /// One past the last column.
    pub fn end(&self) -> Col {
        self.start + self.len
    }

    pub fn contains(&self, c: Col) -> bool {
        self.start <= c && c < self.end()
    }
}

/// Extracts the highways of one lane.
///
/// Alternates a least-significant-zero scan (skipping hurdles) with a
/// least-significant-one scan (measuring the highway). Highways separated by
/// at most `cross_hurdle_threshold` smoothed hurdles are merged.
pub fn extract_highways(
    lane: Lane,
    smooth: &HurdleBits,
    raw: &HurdleBits,
    cross_hurdle_threshold: usize,
) -> Vec<Highway> {
    let mut runs: Vec<(usize, usize)> = vec![];
    for (start, len) in smooth.zero_runs() {
        let gap = runs.last().map(|&(s, l)| start - (s + l));
        match runs.last_mut() {
            Some((s, l)) if gap.is_some_and(|g| g <= cross_hurdle_threshold) => {
                *l = start + len - *s;
            }
            _ => runs.push((start, len)),
        }
    }
    runs.into_iter()
        .map(|(start, len)| {
            let end = start + len;
            let mut absorbed = SmallVec::new();
            let mut c = raw.next_one(start);
            while c < end {
                absorbed.push(c as Col);
                c = raw.next_one(c + 1);
            }
            Highway {
                lane,
                start: start as Col,
                len: len as Col,
                absorbed,
            }
        })
        .collect()
}
