//! Replaying a route through the edit graph.
//!
//! A `Walker` moves through the grid using diagonal steps and lane leaps and
//! records the alignment it traces. Every router and the DP build their
//! output by driving a `Walker`, so the reported cost is always the cost of a
//! real alignment.
//!
//! The walker may be driven past the end of the grid, e.g. by the DP which
//! clamps columns at the last column of `a`. Such states are projected back
//! onto the grid: a step whose projection does not move emits nothing, and a
//! diagonal step that only moves in one sequence emits a gap.
use itertools::Itertools;
use serde::Serialize;

use crate::hurdles::HurdleMatrix;
use crate::prelude::*;
use crate::tracer::TraceInstance;

pub const GAP: u8 = b'-';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Waypoint {
    pub lane: Lane,
    pub col: Col,
}

pub struct Walker<'h, 's> {
    hm: &'h HurdleMatrix<'s>,
    /// Position in the grid, possibly past its end.
    i: Col,
    j: Col,
    aa: Sequence,
    bb: Sequence,
    hurdles: Cost,
    leaps: Cost,
    clipped: Cost,
    matches: Col,
    num_leaps: usize,
    route: Vec<Waypoint>,
}

impl<'h, 's> Walker<'h, 's> {
    /// A walker at the start `(0, 0)`.
    pub fn new(hm: &'h HurdleMatrix<'s>) -> Self {
        Self::starting_at(hm, 0)
    }

    /// A walker at column 0 of `lane`. The skipped prefix is emitted against
    /// gaps but not charged.
    pub fn starting_at(hm: &'h HurdleMatrix<'s>, lane: Lane) -> Self {
        let cap = hm.a().len() + hm.b().len();
        let mut w = Walker {
            hm,
            i: 0,
            j: 0,
            aa: Vec::with_capacity(cap),
            bb: Vec::with_capacity(cap),
            hurdles: 0,
            leaps: 0,
            clipped: 0,
            matches: 0,
            num_leaps: 0,
            route: vec![],
        };
        let (i, j) = hm.to_ij(lane, 0);
        w.clip_to(i, j);
        w.route.push(w.waypoint());
        w
    }

    pub fn lane(&self) -> Lane {
        self.i - self.j
    }

    pub fn col(&self) -> Col {
        min(self.i, self.j)
    }

    pub fn waypoint(&self) -> Waypoint {
        Waypoint {
            lane: self.lane(),
            col: min(self.col(), self.hm.max_col()),
        }
    }

    fn projected(&self) -> (usize, usize) {
        (
            min(self.i, self.hm.a().len() as Col) as usize,
            min(self.j, self.hm.b().len() as Col) as usize,
        )
    }

    /// Moves by `(di, dj)` and emits the projected step.
    fn step(&mut self, di: Col, dj: Col) {
        let (pi, pj) = self.projected();
        self.i += di;
        self.j += dj;
        let (qi, qj) = self.projected();
        let (a, b) = (self.hm.a(), self.hm.b());
        let diagonal = di == 1 && dj == 1;
        match (qi > pi, qj > pj) {
            (false, false) => return,
            (true, true) => {
                self.aa.push(a[pi]);
                self.bb.push(b[pj]);
                if a[pi] == b[pj] {
                    self.matches += 1;
                    return;
                }
            }
            (true, false) => {
                self.aa.push(a[pi]);
                self.bb.push(GAP);
            }
            (false, true) => {
                self.aa.push(GAP);
                self.bb.push(b[pj]);
            }
        }
        if diagonal {
            self.hurdles += 1;
        } else {
            self.leaps += 1;
        }
    }

    /// Emits `a[..i]` and `b[..j]` (projected) against gaps, uncharged.
    fn clip_to(&mut self, i: Col, j: Col) {
        let (pi, pj) = self.projected();
        self.i = max(self.i, i);
        self.j = max(self.j, j);
        let (qi, qj) = self.projected();
        for &c in &self.hm.a()[pi..qi] {
            self.aa.push(c);
            self.bb.push(GAP);
        }
        for &c in &self.hm.b()[pj..qj] {
            self.aa.push(GAP);
            self.bb.push(c);
        }
        self.clipped += ((qi - pi) + (qj - pj)) as Cost;
    }

    /// Diagonal steps until column `col`. Does nothing when already past it.
    pub fn advance_to(&mut self, col: Col) {
        while self.col() < col {
            self.step(1, 1);
        }
    }

    /// A single diagonal step, whether or not it is a match.
    pub fn step_through(&mut self) {
        self.step(1, 1);
    }

    /// Leaps to lane `to` as a chain of unit gaps.
    pub fn leap(&mut self, to: Lane) {
        let from = self.lane();
        if from == to {
            return;
        }
        self.push_waypoint();
        for _ in 0..(to - from).abs() {
            if to > from {
                self.step(1, 0);
            } else {
                self.step(0, 1);
            }
        }
        self.num_leaps += 1;
        self.push_waypoint();
    }

    /// `leap`, reported to `tracer`.
    pub fn leap_traced(&mut self, to: Lane, tracer: &mut impl TraceInstance) {
        if to != self.lane() {
            tracer.leap(self.waypoint(), to);
            self.leap(to);
        }
    }

    fn push_waypoint(&mut self) {
        let w = self.waypoint();
        if self.route.last() != Some(&w) {
            self.route.push(w);
        }
    }

    /// Ends the walk at the end of the grid. Anything left of either
    /// sequence is charged as gaps.
    pub fn finish(mut self) -> Walk {
        let (m, n) = (self.hm.a().len(), self.hm.b().len());
        while self.projected().0 < m {
            self.step(1, 0);
        }
        while self.projected().1 < n {
            self.step(0, 1);
        }
        self.push_waypoint();
        self.into_walk()
    }

    /// Ends the walk where it is. The remainder of both sequences is clipped:
    /// emitted against gaps but not charged.
    pub fn finish_clipped(mut self) -> Walk {
        self.push_waypoint();
        let (m, n) = (self.hm.a().len() as Col, self.hm.b().len() as Col);
        self.clip_to(m, n);
        self.into_walk()
    }

    fn into_walk(self) -> Walk {
        let (aligned_a, aligned_b) = if self.hm.swapped() {
            (self.bb, self.aa)
        } else {
            (self.aa, self.bb)
        };
        Walk {
            route: self.route,
            aligned: (aligned_a, aligned_b),
            hurdles: self.hurdles,
            leaps: self.leaps,
            clipped: self.clipped,
            matches: self.matches,
            max_col: self.hm.max_col(),
            num_leaps: self.num_leaps,
        }
    }
}

/// A finished route and the alignment it traces.
#[derive(Debug, Clone, Serialize)]
pub struct Walk {
    /// Waypoints in internal lane orientation, with columns clamped to the grid.
    pub route: Vec<Waypoint>,
    /// The aligned strings in the caller's order, `-` for gaps.
    pub aligned: (Sequence, Sequence),
    /// Charged diagonal mismatches.
    pub hurdles: Cost,
    /// Charged gaps.
    pub leaps: Cost,
    /// Uncharged gaps at clipped ends.
    pub clipped: Cost,
    pub matches: Col,
    pub max_col: Col,
    num_leaps: usize,
}

impl Walk {
    /// The unit edit cost of the alignment.
    pub fn cost(&self) -> Cost {
        self.hurdles + self.leaps
    }

    pub fn hurdle_cost(&self) -> Cost {
        self.hurdles
    }

    pub fn leap_cost(&self) -> Cost {
        self.leaps
    }

    pub fn num_leaps(&self) -> usize {
        self.num_leaps
    }

    /// Fraction of the columns of the shorter sequence covered by matches.
    pub fn coverage(&self) -> f64 {
        if self.max_col == 0 {
            return 1.0;
        }
        self.matches as f64 / self.max_col as f64
    }

    /// Run-length encoded operations: `M` for aligned symbols, `D` for a
    /// symbol of the first sequence against a gap, `I` for a symbol of the
    /// second sequence against a gap.
    pub fn cigar(&self) -> String {
        let (aa, bb) = &self.aligned;
        aa.iter()
            .zip(bb)
            .map(|(&x, &y)| match (x == GAP, y == GAP) {
                (true, _) => 'I',
                (_, true) => 'D',
                _ => 'M',
            })
            .dedup_with_count()
            .map(|(cnt, op)| format!("{cnt}{op}"))
            .join("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::SmoothParams;

    fn matrix<'s>(a: &'s [u8], b: &'s [u8]) -> HurdleMatrix<'s> {
        HurdleMatrix::new(a, b, 4, &SmoothParams::default()).unwrap()
    }

    #[test]
    fn diagonal_walk() {
        let hm = matrix(b"ACGT", b"AGGT");
        let mut w = Walker::new(&hm);
        w.advance_to(4);
        let walk = w.finish();
        assert_eq!(walk.cost(), 1);
        assert_eq!(walk.matches, 3);
        assert_eq!(walk.coverage(), 0.75);
        assert_eq!(walk.aligned, (b"ACGT".to_vec(), b"AGGT".to_vec()));
        assert_eq!(walk.cigar(), "4M");
        assert_eq!(walk.num_leaps(), 0);
    }

    #[test]
    fn empty_walk_is_covered() {
        let hm = matrix(b"", b"AC");
        let walk = Walker::new(&hm).finish();
        assert_eq!(walk.cost(), 2);
        assert_eq!(walk.coverage(), 1.0);
    }

    #[test]
    fn leap_columns() {
        // AGC against AGTC: lane 0 up to column 2, then to lane -1.
        let hm = matrix(b"AGC", b"AGTC");
        let mut w = Walker::new(&hm);
        w.advance_to(2);
        w.leap(-1);
        assert_eq!(w.col(), 2);
        w.advance_to(3);
        let walk = w.finish();
        assert_eq!(walk.cost(), 1);
        assert_eq!(walk.leap_cost(), 1);
        assert_eq!(walk.aligned, (b"AG-C".to_vec(), b"AGTC".to_vec()));
        assert_eq!(walk.cigar(), "2M1I1M");
        assert_eq!(
            walk.route,
            vec![
                Waypoint { lane: 0, col: 0 },
                Waypoint { lane: 0, col: 2 },
                Waypoint { lane: -1, col: 2 },
                Waypoint { lane: -1, col: 3 },
            ]
        );
    }

    #[test]
    fn swapped_back() {
        // Internally AGC is `a`, so the gap lands in the second string.
        let hm = matrix(b"AGTC", b"AGC");
        let mut w = Walker::new(&hm);
        w.advance_to(2);
        w.leap(-1);
        w.advance_to(3);
        let walk = w.finish();
        assert_eq!(walk.aligned, (b"AGTC".to_vec(), b"AG-C".to_vec()));
        assert_eq!(walk.cigar(), "2M1D1M");
    }

    #[test]
    fn past_the_end_is_projected() {
        let hm = matrix(b"AC", b"ACG");
        let mut w = Walker::new(&hm);
        w.advance_to(2);
        // Column 2 is the last column of `a`; stepping on is a gap in `a`.
        w.step_through();
        assert_eq!(w.lane(), 0);
        w.leap(-1);
        let walk = w.finish();
        assert_eq!(walk.cost(), 1);
        assert_eq!(walk.hurdle_cost(), 1);
        assert_eq!(walk.leap_cost(), 0);
        assert_eq!(walk.aligned, (b"AC-".to_vec(), b"ACG".to_vec()));
    }

    #[test]
    fn clipped_ends_are_free() {
        let hm = matrix(b"CGT", b"ACGTA");
        let mut w = Walker::starting_at(&hm, -1);
        w.advance_to(3);
        let walk = w.finish_clipped();
        assert_eq!(walk.cost(), 0);
        assert_eq!(walk.clipped, 2);
        assert_eq!(walk.aligned, (b"-CGT-".to_vec(), b"ACGTA".to_vec()));
    }
}
