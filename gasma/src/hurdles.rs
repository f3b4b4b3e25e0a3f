//! The diagonal hurdle engine.
//!
//! For each lane `d` in `[-k, k]` this stores the raw hurdle vector, its
//! smoothed version and the highways extracted from it. The lanes are
//! independent and built in parallel.
//!
//! Geometry, with `a` the shorter sequence of length `m` and `b` of length `n`:
//! - state `(i, j)` lies on lane `i - j` at column `min(i, j)`;
//! - bit `c` of lane `d` is the diagonal step from column `c` to `c + 1`,
//!   comparing `a[c + max(d, 0)]` with `b[c + max(-d, 0)]`;
//! - lane `d` has `min(m - max(d, 0), n - max(-d, 0))` steps;
//! - the destination `(m, n)` is column `m` of lane `m - n`.
use rayon::prelude::*;
use std::ops::Range;

use crate::bits::HurdleBits;
use crate::highway::{extract_highways, Highway};
use crate::prelude::*;
use crate::smoothing::{smooth, SmoothParams, Smoothed};

/// Everything known about a single lane.
#[derive(Debug, Clone)]
pub struct LaneTrack {
    pub lane: Lane,
    /// Number of diagonal steps in the lane. `0` for lanes without columns.
    pub len: Col,
    pub raw: HurdleBits,
    pub smooth: Smoothed,
    /// Sorted by start column.
    pub highways: Vec<Highway>,
}

impl LaneTrack {
    fn build(a: Seq, b: Seq, lane: Lane, params: &SmoothParams) -> Self {
        let raw = build_hurdle_vector(a, b, lane);
        let smooth = smooth(&raw, params.max_ones_ignored, params.max_zeros_ignored);
        let highways = extract_highways(lane, &smooth.bits, &raw, params.cross_hurdle_threshold);
        LaneTrack {
            lane,
            len: raw.len() as Col,
            raw,
            smooth,
            highways,
        }
    }

    /// Number of raw hurdles in `[lo, hi)`. Columns past the lane count as hurdles.
    pub fn hurdles(&self, lo: Col, hi: Col) -> Col {
        if hi <= lo {
            return 0;
        }
        self.raw.count_ones(max(lo, 0) as usize..hi as usize) as Col
    }

    /// Number of raw matches in `[lo, hi)`.
    pub fn matches(&self, lo: Col, hi: Col) -> Col {
        if hi <= lo {
            return 0;
        }
        (hi - lo) - self.hurdles(lo, hi)
    }

    /// Raw passable steps starting at `c`. `0` at or past the end of the lane.
    pub fn run_length(&self, c: Col) -> Col {
        if c < 0 {
            return 0;
        }
        self.raw.zeros_from(c as usize) as Col
    }

    /// Index of the first highway that ends after `c`.
    pub fn highway_index(&self, c: Col) -> usize {
        self.highways.partition_point(|h| h.end() <= c)
    }

    /// The smoothed highway containing column `c`, or else the first one after it.
    pub fn nearest_highway(&self, c: Col) -> Option<&Highway> {
        let c = max(c, 0);
        let from = if self.smooth.bits.get(c) {
            self.smooth.bits.next_zero(c as usize)? as Col
        } else {
            c
        };
        self.highways.get(self.highway_index(from))
    }
}

/// The raw hurdle vector of `lane` in the grid of `a` and `b`.
///
/// Lanes without columns get an empty vector, which reads as all hurdles.
pub fn build_hurdle_vector(a: Seq, b: Seq, lane: Lane) -> HurdleBits {
    let (m, n) = (a.len() as Col, b.len() as Col);
    let len = max(0, lane_len(m, n, lane));
    let di = max(lane, 0) as usize;
    let dj = max(-lane, 0) as usize;
    HurdleBits::from_fn(len as usize, |c| a[c + di] != b[c + dj])
}

/// Number of diagonal steps in `lane`. Negative when the lane misses the grid.
pub fn lane_len(m: Col, n: Col, lane: Lane) -> Col {
    min(m - max(lane, 0), n - max(-lane, 0))
}

#[derive(Debug, Clone)]
pub struct HurdleMatrix<'s> {
    a: Seq<'s>,
    b: Seq<'s>,
    /// Whether the inputs were swapped to make `a` the shorter one.
    swapped: bool,
    k: Lane,
    /// Indexed by `lane + k`.
    tracks: Vec<LaneTrack>,
}

impl<'s> HurdleMatrix<'s> {
    pub fn new(
        a: Seq<'s>,
        b: Seq<'s>,
        k: Lane,
        params: &SmoothParams,
    ) -> Result<Self, GasmaError> {
        let swapped = a.len() > b.len();
        let (a, b) = if swapped { (b, a) } else { (a, b) };
        let diff = (b.len() - a.len()) as Col;
        if k < diff {
            return Err(GasmaError::BandTooNarrow { k, diff });
        }
        let tracks: Vec<LaneTrack> = (-k..=k)
            .into_par_iter()
            .map(|lane| LaneTrack::build(a, b, lane, params))
            .collect();
        debug_assert_eq!(tracks.len(), (2 * k + 1) as usize);
        Ok(HurdleMatrix {
            a,
            b,
            swapped,
            k,
            tracks,
        })
    }

    /// The shorter sequence.
    pub fn a(&self) -> Seq<'s> {
        self.a
    }

    pub fn b(&self) -> Seq<'s> {
        self.b
    }

    pub fn swapped(&self) -> bool {
        self.swapped
    }

    pub fn k(&self) -> Lane {
        self.k
    }

    pub fn lanes(&self) -> std::ops::RangeInclusive<Lane> {
        -self.k..=self.k
    }

    pub fn num_lanes(&self) -> usize {
        self.tracks.len()
    }

    pub fn num_highways(&self) -> usize {
        self.tracks.iter().map(|t| t.highways.len()).sum()
    }

    /// The final column, `len(a)`.
    pub fn max_col(&self) -> Col {
        self.a.len() as Col
    }

    /// The lane of the end state `(len(a), len(b))`.
    pub fn dest_lane(&self) -> Lane {
        self.a.len() as Lane - self.b.len() as Lane
    }

    /// Number of steps in `lane`; `0` for lanes that miss the grid.
    pub fn lane_len(&self, lane: Lane) -> Col {
        max(0, lane_len(self.a.len() as Col, self.b.len() as Col, lane))
    }

    /// Whether `lane` contains at least one state of the grid.
    pub fn lane_exists(&self, lane: Lane) -> bool {
        lane_len(self.a.len() as Col, self.b.len() as Col, lane) >= 0
    }

    /// The state at `(lane, col)`.
    pub fn to_ij(&self, lane: Lane, col: Col) -> (Col, Col) {
        (col + max(lane, 0), col + max(-lane, 0))
    }

    pub fn in_band(&self, lane: Lane) -> bool {
        -self.k <= lane && lane <= self.k
    }

    pub fn track(&self, lane: Lane) -> Result<&LaneTrack, GasmaError> {
        if !self.in_band(lane) {
            return Err(GasmaError::LaneOutOfRange { lane, k: self.k });
        }
        Ok(&self.tracks[(lane + self.k) as usize])
    }

    /// Unchecked access for lanes known to be in the band.
    pub(crate) fn tr(&self, lane: Lane) -> &LaneTrack {
        debug_assert!(self.in_band(lane), "lane {lane} outside band {}", self.k);
        &self.tracks[(lane + self.k) as usize]
    }

    pub fn tracks(&self) -> &[LaneTrack] {
        &self.tracks
    }

    /// The raw hurdle bits of `[col, col + len)` on `lane`. Columns past the
    /// lane read as hurdles.
    pub fn extract_window(&self, lane: Lane, col: Col, len: Col) -> Result<HurdleBits, GasmaError> {
        let track = self.track(lane)?;
        let range: Range<usize> = max(col, 0) as usize..max(col + len, 0) as usize;
        Ok(track.raw.window(range))
    }

    pub fn run_length(&self, lane: Lane, col: Col) -> Result<Col, GasmaError> {
        Ok(self.track(lane)?.run_length(col))
    }

    pub fn nearest_highway(&self, lane: Lane, col: Col) -> Result<Option<&Highway>, GasmaError> {
        Ok(self.track(lane)?.nearest_highway(col))
    }

    pub fn highways(&self) -> impl Iterator<Item = &Highway> {
        self.tracks.iter().flat_map(|t| t.highways.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix<'s>(a: &'s [u8], b: &'s [u8], k: Lane) -> HurdleMatrix<'s> {
        HurdleMatrix::new(a, b, k, &SmoothParams::default()).unwrap()
    }

    #[test]
    fn lane_geometry() {
        let hm = matrix(b"ACGT", b"ACGTAC", 3);
        assert!(!hm.swapped());
        assert_eq!(hm.dest_lane(), -2);
        assert_eq!(hm.lane_len(0), 4);
        assert_eq!(hm.lane_len(-2), 4);
        assert_eq!(hm.lane_len(-3), 3);
        assert_eq!(hm.lane_len(2), 2);
        assert_eq!(hm.to_ij(-2, 4), (4, 6));
        assert_eq!(hm.to_ij(2, 1), (3, 1));
    }

    #[test]
    fn raw_vectors() {
        let hm = matrix(b"ACGT", b"TACG", 1);
        // Lane 0 compares ACGT with TACG.
        assert_eq!(format!("{:?}", hm.track(0).unwrap().raw), "HurdleBits(1111)");
        // Lane -1 compares ACG with ACG.
        assert_eq!(format!("{:?}", hm.track(-1).unwrap().raw), "HurdleBits(000)");
        assert_eq!(hm.run_length(-1, 0), Ok(3));
        assert_eq!(hm.run_length(-1, 3), Ok(0));
        assert_eq!(hm.run_length(0, 1), Ok(0));
    }

    #[test]
    fn shorter_sequence_first() {
        let hm = matrix(b"ACGTAC", b"ACG", 3);
        assert!(hm.swapped());
        assert_eq!(hm.a(), b"ACG");
        assert_eq!(hm.dest_lane(), -3);
    }

    #[test]
    fn band_too_narrow() {
        let err = HurdleMatrix::new(b"A", b"ACGT", 2, &SmoothParams::default()).unwrap_err();
        assert_eq!(err, GasmaError::BandTooNarrow { k: 2, diff: 3 });
    }

    #[test]
    fn out_of_range_lane() {
        let hm = matrix(b"ACGT", b"ACGT", 2);
        assert_eq!(
            hm.extract_window(3, 0, 4).unwrap_err(),
            GasmaError::LaneOutOfRange { lane: 3, k: 2 }
        );
        assert!(hm.track(-2).is_ok());
    }

    #[test]
    fn window_is_clipped() {
        let hm = matrix(b"AAAAAAAA", b"AAAAAAAA", 1);
        let w = hm.extract_window(1, 4, 6).unwrap();
        // Lane 1 has 7 steps.
        assert_eq!(format!("{w:?}"), "HurdleBits(000111)");
    }

    #[test]
    fn nearest_highway() {
        let hm = matrix(b"AACCAAAAGA", b"AAGGAAAACA", 0);
        let track = hm.track(0).unwrap();
        assert_eq!(format!("{:?}", track.raw), "HurdleBits(0011000010)");
        let h = hm.nearest_highway(0, 1).unwrap().unwrap();
        assert_eq!((h.start, h.len), (0, 2));
        let h = hm.nearest_highway(0, 2).unwrap().unwrap();
        // The single hurdle at 8 is smoothed away.
        assert_eq!((h.start, h.len), (4, 6));
        assert_eq!(h.absorbed.as_slice(), &[8]);
        assert!(hm.nearest_highway(0, 10).unwrap().is_none());
    }
}
