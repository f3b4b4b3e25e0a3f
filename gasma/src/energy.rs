//! The energy-bounded diagonal DP.
//!
//! `start[e][l]` is the furthest column on lane `l` that can be entered with
//! exactly `e` energy spent, and `end[e][l]` is that column advanced past the
//! run of matches starting there, found with a single bit-scan.
//!
//! A transition from lane `l_` at energy `e - p` to lane `l` at energy `e`,
//! with `p` the leap penalty, lands at `end[e - p][l_] + forward(l_, l)`.
//! Staying on a lane is a substitution that costs the hurdle cost and advances
//! one column. Positions are clamped to the last column of `a`.
//!
//! With the default costs every transition is a chain of unit edits, so this
//! is a diagonal-transition algorithm over the band `[-k, k]`. It returns the
//! exact edit distance when `k` and the energy budget are at least the
//! distance. Columns past the end of a lane read as hurdles, so a position
//! past the grid never slides and projects back onto the grid edge.
use serde::Serialize;

use crate::costs::CostModel;
use crate::hurdles::HurdleMatrix;
use crate::prelude::*;
use crate::tracer::TraceInstance;
use crate::walk::{Walk, Walker};

/// One lane visited by the backtracked path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Leg {
    pub lane: Lane,
    pub energy: Cost,
    pub start: Col,
    pub end: Col,
}

pub struct EnergyDp<'a> {
    hm: &'a HurdleMatrix<'a>,
    costs: &'a CostModel<'a>,
    budget: Cost,
    origins: Vec<Lane>,
    destinations: Vec<Lane>,
}

/// The filled DP table, up to the first energy level that reaches a destination.
#[derive(Debug, Clone)]
pub struct EnergyTable {
    k: Lane,
    /// `start[e][lane + k]`.
    start: Vec<Vec<Option<Col>>>,
    end: Vec<Vec<Option<Col>>>,
    /// Per lane, all source lanes and their penalty, by increasing penalty.
    sources: Vec<Vec<(Lane, Cost)>>,
    /// The destination lane that was reached, and the energy.
    terminal: (Lane, Cost),
}

impl EnergyTable {
    fn idx(&self, lane: Lane) -> usize {
        (lane + self.k) as usize
    }

    pub fn start(&self, lane: Lane, energy: Cost) -> Option<Col> {
        *self.start.get(energy as usize)?.get(self.idx(lane))?
    }

    pub fn end(&self, lane: Lane, energy: Cost) -> Option<Col> {
        *self.end.get(energy as usize)?.get(self.idx(lane))?
    }

    /// The minimal energy.
    pub fn energy(&self) -> Cost {
        self.terminal.1
    }

    pub fn terminal_lane(&self) -> Lane {
        self.terminal.0
    }
}

#[derive(Debug, Clone)]
pub struct EnergySolution {
    pub energy: Cost,
    pub legs: Vec<Leg>,
    /// Whether the path runs from the start to the end of the grid, rather
    /// than between custom origins and destinations.
    pub global: bool,
}

impl<'a> EnergyDp<'a> {
    /// A DP from the start `(0, 0)` to the end `(len(a), len(b))`.
    pub fn new(hm: &'a HurdleMatrix<'a>, costs: &'a CostModel<'a>, budget: Cost) -> Self {
        Self {
            hm,
            costs,
            budget,
            origins: vec![0],
            destinations: vec![hm.dest_lane()],
        }
    }

    /// Start at column 0 of each of `lanes`. Lanes other than 0 skip a
    /// prefix of one of the sequences for free.
    pub fn with_origins(mut self, lanes: Vec<Lane>) -> Self {
        self.origins = lanes;
        self
    }

    /// Stop at the last column of any of `lanes`.
    pub fn with_destinations(mut self, lanes: Vec<Lane>) -> Self {
        self.destinations = lanes;
        self
    }

    /// Stop as soon as either sequence is exhausted.
    pub fn semi_global(self) -> Self {
        let lanes = self
            .hm
            .lanes()
            .filter(|&l| self.hm.lane_exists(l))
            .collect();
        self.with_destinations(lanes)
    }

    fn is_global(&self) -> bool {
        self.origins == [0] && self.destinations == [self.hm.dest_lane()]
    }

    fn validate(&self, lanes: &[Lane]) -> Result<(), GasmaError> {
        for &lane in lanes {
            if !self.hm.in_band(lane) || !self.hm.lane_exists(lane) {
                return Err(GasmaError::LaneOutOfRange {
                    lane,
                    k: self.hm.k(),
                });
            }
        }
        Ok(())
    }

    fn sources(&self) -> Result<Vec<Vec<(Lane, Cost)>>, GasmaError> {
        self.hm
            .lanes()
            .map(|l| {
                let mut s = self
                    .hm
                    .lanes()
                    .map(|l_| Ok((l_, self.costs.penalty(l_, l)?)))
                    .collect::<Result<Vec<_>, GasmaError>>()?;
                s.sort_by_key(|&(l_, p)| (p, (l - l_).abs()));
                Ok(s)
            })
            .collect()
    }

    /// Furthest column reached by sliding from `c` on `lane`.
    fn slide(&self, lane: Lane, c: Col) -> Col {
        c + self.hm.tr(lane).run_length(c)
    }

    /// Fills energy levels until a destination is reached.
    pub fn run(&self, tracer: &mut impl TraceInstance) -> Result<EnergyTable, GasmaError> {
        self.validate(&self.origins)?;
        self.validate(&self.destinations)?;
        let k = self.hm.k();
        let m = self.hm.max_col();
        let num_lanes = self.hm.num_lanes();
        let idx = |lane: Lane| (lane + k) as usize;

        let mut table = EnergyTable {
            k,
            start: vec![],
            end: vec![],
            sources: self.sources()?,
            terminal: (0, 0),
        };

        let mut start = vec![None; num_lanes];
        let mut end = vec![None; num_lanes];
        for &o in &self.origins {
            start[idx(o)] = Some(0);
            end[idx(o)] = Some(self.slide(o, 0));
        }
        table.start.push(start);
        table.end.push(end);

        for e in 0..=self.budget {
            if e > 0 {
                let mut start = vec![None; num_lanes];
                let mut end = vec![None; num_lanes];
                for l in self.hm.lanes() {
                    let mut best: Option<Col> = None;
                    for &(l_, p) in &table.sources[idx(l)] {
                        if p > e {
                            break;
                        }
                        let level = (e - p) as usize;
                        let source = (table.start[level][idx(l_)], table.end[level][idx(l_)]);
                        let (Some(s_), Some(en_)) = source else {
                            continue;
                        };
                        let candidate = en_ + self.costs.forward(l_, l, s_);
                        best = max(best, Some(candidate));
                    }
                    if let Some(c) = best {
                        let c = min(c, m);
                        start[idx(l)] = Some(c);
                        end[idx(l)] = Some(self.slide(l, c));
                    }
                }
                table.start.push(start);
                table.end.push(end);
            }

            let ends = &table.end[e as usize];
            tracer.energy_level(e, ends.iter().filter(|x| x.is_some()).count());
            let reached = self
                .destinations
                .iter()
                .copied()
                .find(|&d| ends[idx(d)].is_some_and(|c| c >= self.hm.lane_len(d)));
            if let Some(d) = reached {
                table.terminal = (d, e);
                return Ok(table);
            }
        }
        Err(GasmaError::NoSolution {
            budget: self.budget,
        })
    }

    /// Runs the DP and backtracks a path of legs from an origin to the
    /// reached destination.
    pub fn solve(&self, tracer: &mut impl TraceInstance) -> Result<EnergySolution, GasmaError> {
        let table = self.run(tracer)?;
        let legs = self.backtrack(&table)?;
        Ok(EnergySolution {
            energy: table.energy(),
            legs,
            global: self.is_global(),
        })
    }

    /// Repeatedly finds a source state satisfying the transition equality.
    pub fn backtrack(&self, table: &EnergyTable) -> Result<Vec<Leg>, GasmaError> {
        let m = self.hm.max_col();
        let (mut lane, mut e) = table.terminal;
        let mut legs = vec![];
        loop {
            let err = GasmaError::Backtrack { lane, energy: e };
            let (Some(start), Some(end)) = (table.start(lane, e), table.end(lane, e)) else {
                return Err(err);
            };
            legs.push(Leg {
                lane,
                energy: e,
                start,
                end,
            });
            if e == 0 {
                if start != 0 || !self.origins.contains(&lane) {
                    return Err(err);
                }
                break;
            }
            let source = table.sources[table.idx(lane)]
                .iter()
                .take_while(|&&(_, p)| p <= e)
                .find(|&&(l_, p)| match (table.start(l_, e - p), table.end(l_, e - p)) {
                    (Some(s_), Some(en_)) => {
                        min(en_ + self.costs.forward(l_, lane, s_), m) == start
                    }
                    _ => false,
                });
            let Some(&(l_, p)) = source else {
                return Err(err);
            };
            (lane, e) = (l_, e - p);
        }
        legs.reverse();
        Ok(legs)
    }
}

impl EnergySolution {
    /// Replays the legs through a `Walker` to obtain the alignment.
    pub fn replay(
        &self,
        hm: &HurdleMatrix,
        costs: &CostModel,
        tracer: &mut impl TraceInstance,
    ) -> Walk {
        let Some(first) = self.legs.first() else {
            return Walker::new(hm).finish();
        };
        let mut w = Walker::starting_at(hm, first.lane);
        w.advance_to(first.end);
        for pair in self.legs.windows(2) {
            let (prev, leg) = (&pair[0], &pair[1]);
            if leg.lane == prev.lane {
                if costs.forward(prev.lane, leg.lane, prev.start) > 0 {
                    w.step_through();
                }
            } else {
                w.leap_traced(leg.lane, tracer);
            }
            w.advance_to(leg.end);
        }
        if self.global {
            w.finish()
        } else {
            w.finish_clipped()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::LeapCosts;
    use crate::smoothing::SmoothParams;
    use crate::tracer::NoTrace;
    use std::sync::Arc;

    fn solve(a: &[u8], b: &[u8], k: Lane, budget: Cost) -> Result<EnergySolution, GasmaError> {
        let hm = HurdleMatrix::new(a, b, k, &SmoothParams::default())?;
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col())?;
        EnergyDp::new(&hm, &costs, budget).solve(&mut NoTrace)
    }

    #[test]
    fn agtc_agc() {
        let s = solve(b"AGTC", b"AGC", 2, 5).unwrap();
        assert_eq!(s.energy, 1);
        // Internally AGC is first; AG on lane 0, then the gap to lane -1.
        assert_eq!(
            s.legs,
            vec![
                Leg {
                    lane: 0,
                    energy: 0,
                    start: 0,
                    end: 2
                },
                Leg {
                    lane: -1,
                    energy: 1,
                    start: 2,
                    end: 3
                },
            ]
        );
    }

    #[test]
    fn identical_is_free() {
        let s = solve(b"ACGTACGT", b"ACGTACGT", 1, 0).unwrap();
        assert_eq!(s.energy, 0);
        assert_eq!(s.legs.len(), 1);
    }

    #[test]
    fn substitution_stays_on_lane() {
        let s = solve(b"ACGTACGT", b"ACGAACGT", 1, 3).unwrap();
        assert_eq!(s.energy, 1);
        assert!(s.legs.iter().all(|l| l.lane == 0));
    }

    #[test]
    fn budget_exhausted() {
        assert_eq!(
            solve(b"AAAA", b"CCCC", 1, 3).unwrap_err(),
            GasmaError::NoSolution { budget: 3 }
        );
    }

    #[test]
    fn empty_sequences() {
        assert_eq!(solve(b"", b"", 0, 0).unwrap().energy, 0);
        assert_eq!(solve(b"", b"ACG", 3, 5).unwrap().energy, 3);
    }

    #[test]
    fn replay_matches_energy() {
        let (a, b) = (b"ACTAGAACTT", b"ACTTAGCACT");
        let hm = HurdleMatrix::new(a, b, 4, &SmoothParams::default()).unwrap();
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col()).unwrap();
        let s = EnergyDp::new(&hm, &costs, 10).solve(&mut NoTrace).unwrap();
        let walk = s.replay(&hm, &costs, &mut NoTrace);
        assert_eq!(walk.cost(), s.energy);
        assert_eq!(s.energy, triple_accel::levenshtein_exp(a, b) as Cost);
    }

    #[test]
    fn invalid_penalty() {
        let hm = HurdleMatrix::new(b"ACGT", b"ACG", 2, &SmoothParams::default()).unwrap();
        let leap_costs = LeapCosts {
            penalty: Some(Arc::new(|from: Lane, to: Lane| (to - from).abs())),
            ..Default::default()
        };
        let costs = leap_costs.resolve(hm.max_col()).unwrap();
        let err = EnergyDp::new(&hm, &costs, 5).solve(&mut NoTrace).unwrap_err();
        assert!(matches!(err, GasmaError::InvalidPenalty { penalty: 0, .. }));
    }

    #[test]
    fn origin_outside_band() {
        let hm = HurdleMatrix::new(b"ACGT", b"ACG", 2, &SmoothParams::default()).unwrap();
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col()).unwrap();
        let err = EnergyDp::new(&hm, &costs, 5)
            .with_origins(vec![5])
            .solve(&mut NoTrace)
            .unwrap_err();
        assert_eq!(err, GasmaError::LaneOutOfRange { lane: 5, k: 2 });
    }

    #[test]
    fn custom_origin_skips_prefix() {
        let (a, b) = (b"ACGT", b"TTACGT");
        let hm = HurdleMatrix::new(a, b, 2, &SmoothParams::default()).unwrap();
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col()).unwrap();
        assert_eq!(EnergyDp::new(&hm, &costs, 5).solve(&mut NoTrace).unwrap().energy, 2);

        let s = EnergyDp::new(&hm, &costs, 5)
            .with_origins(vec![-2])
            .solve(&mut NoTrace)
            .unwrap();
        assert_eq!(s.energy, 0);
        assert!(!s.global);
        assert_eq!(s.legs[0].lane, -2);
        let walk = s.replay(&hm, &costs, &mut NoTrace);
        assert_eq!(walk.cost(), 0);
        assert_eq!(walk.clipped, 2);
        assert_eq!(walk.aligned.0, b"--ACGT".to_vec());
    }

    #[test]
    fn custom_destination() {
        let (a, b) = (b"ACGT", b"ACGTTT");
        let hm = HurdleMatrix::new(a, b, 2, &SmoothParams::default()).unwrap();
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col()).unwrap();

        let s = EnergyDp::new(&hm, &costs, 5)
            .with_destinations(vec![0])
            .solve(&mut NoTrace)
            .unwrap();
        assert_eq!(s.energy, 0);
        let walk = s.replay(&hm, &costs, &mut NoTrace);
        assert_eq!(walk.clipped, 2);

        // One gap to reach the end of lane -1, the last symbol is clipped.
        let dp = EnergyDp::new(&hm, &costs, 5).with_destinations(vec![-1]);
        let table = dp.run(&mut NoTrace).unwrap();
        assert_eq!((table.terminal_lane(), table.energy()), (-1, 1));
        let s = dp.solve(&mut NoTrace).unwrap();
        assert_eq!(s.legs.last().map(|l| (l.lane, l.end)), Some((-1, 4)));
        let walk = s.replay(&hm, &costs, &mut NoTrace);
        assert_eq!(walk.cost(), 1);
        assert_eq!(walk.clipped, 1);
        assert_eq!(walk.aligned.0, b"ACGT--".to_vec());

        assert_eq!(
            EnergyDp::new(&hm, &costs, 5)
                .with_destinations(vec![3])
                .solve(&mut NoTrace)
                .unwrap_err(),
            GasmaError::LaneOutOfRange { lane: 3, k: 2 }
        );
    }

    #[test]
    fn semi_global_stops_at_either_end() {
        let (a, b) = (b"ACGTAC", b"ACGTACGGGG");
        let hm = HurdleMatrix::new(a, b, 10, &SmoothParams::default()).unwrap();
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col()).unwrap();
        let s = EnergyDp::new(&hm, &costs, 10)
            .semi_global()
            .solve(&mut NoTrace)
            .unwrap();
        assert_eq!(s.energy, 0);
        let walk = s.replay(&hm, &costs, &mut NoTrace);
        assert_eq!(walk.cost(), 0);
        assert_eq!(walk.clipped, 4);
        assert_eq!(walk.aligned.0, b"ACGTAC----".to_vec());
    }
}
