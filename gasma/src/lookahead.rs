//! The bounded-lookahead router.
//!
//! Starting at the origin, repeatedly look at the next highway on every lane
//! and move onto the best one that starts within `sight` columns. When
//! nothing is in sight, move to the nearest highway instead. Once no highway
//! is left ahead, leap to the destination lane and walk to the end.
use std::cmp::Reverse;

use crate::costs::CostModel;
use crate::highway::Highway;
use crate::hurdles::HurdleMatrix;
use crate::prelude::*;
use crate::scorer::{Candidate, HighwayScorer};
use crate::stats::AlignStats;
use crate::tracer::TraceInstance;
use crate::walk::{Walk, Walker};

/// The next highway on some lane, as seen from the current position.
#[derive(Debug, Clone, Copy)]
struct Target<'h> {
    highway: &'h Highway,
    lane: Lane,
    /// Column reached by leaping to `lane` right now.
    arrival: Col,
    /// Usable part of the highway.
    start: Col,
    end: Col,
    score: Col,
}

pub(crate) fn route<I: TraceInstance>(
    hm: &HurdleMatrix,
    costs: &CostModel,
    scorer: &HighwayScorer,
    sight: Col,
    shortcut_radius: Col,
    tracer: &mut I,
    stats: &mut AlignStats,
) -> Result<Walk, GasmaError> {
    let dest = hm.dest_lane();
    let hurdle_cost = costs.hurdle_cost();
    // Per lane, the index of the first highway that may still be used.
    let mut cursors = vec![0usize; hm.num_lanes()];
    let mut w = Walker::new(hm);

    loop {
        let (cur, col) = (w.lane(), w.col());
        // (score, on destination lane, shorter leap)
        let mut best: Option<((Col, bool, Reverse<Col>), Target)> = None;
        // (earlier start, on destination lane, shorter leap)
        let mut nearest: Option<((Reverse<Col>, bool, Reverse<Col>), Target)> = None;

        for lane in hm.lanes() {
            let track = hm.tr(lane);
            let arrival = col + costs.leap_forward(cur, lane, col);
            if arrival > track.len {
                continue;
            }
            let cursor = &mut cursors[(lane + hm.k()) as usize];
            while *cursor < track.highways.len() && track.highways[*cursor].end() <= arrival {
                *cursor += 1;
            }
            let Some(highway) = track.highways.get(*cursor) else {
                continue;
            };
            let start = max(highway.start, arrival);
            let end = highway.end();
            let candidate = Candidate {
                lane,
                start,
                end,
                matches: track.matches(start, end),
                crossing: track.hurdles(arrival, start) * hurdle_cost,
                leap_penalty: if lane == cur {
                    0
                } else {
                    costs.penalty(cur, lane)?
                },
                pull: pull(costs, cur, lane, dest)?,
                uncovered: 0,
            };
            let target = Target {
                highway,
                lane,
                arrival,
                start,
                end,
                score: scorer.score(&candidate),
            };
            let tie = (lane == dest, Reverse((lane - cur).abs()));

            let key = (Reverse(start), tie.0, tie.1);
            if nearest.as_ref().map_or(true, |(k, _)| key > *k) {
                nearest = Some((key, target));
            }
            if start - col <= sight {
                let key = (target.score, tie.0, tie.1);
                if best.as_ref().map_or(true, |(k, _)| key > *k) {
                    best = Some((key, target));
                }
            }
        }

        let Some(target) = best.map(|(_, t)| t).or(nearest.map(|(_, t)| t)) else {
            break;
        };
        stats.steps += 1;
        tracer.highway_chosen(target.highway, target.score);
        take(hm, costs, &mut w, &target, shortcut_radius, tracer)?;
    }

    w.leap_traced(dest, tracer);
    w.advance_to(hm.max_col());
    Ok(w.finish())
}

/// Change in the leap penalty still to pay to reach `dest` when moving from
/// lane `cur` to `lane`.
fn pull(costs: &CostModel, cur: Lane, lane: Lane, dest: Lane) -> Result<Cost, GasmaError> {
    let to_dest = |l: Lane| {
        if l == dest {
            Ok(0)
        } else {
            costs.penalty(l, dest)
        }
    };
    Ok(to_dest(lane)? - to_dest(cur)?)
}

/// Moves from the current position onto `target` and to its end.
fn take<I: TraceInstance>(
    hm: &HurdleMatrix,
    costs: &CostModel,
    w: &mut Walker,
    target: &Target,
    shortcut_radius: Col,
    tracer: &mut I,
) -> Result<(), GasmaError> {
    let (cur, col) = (w.lane(), w.col());
    let lane = target.lane;
    match (lane - cur).abs() {
        0 => {}
        1 => {
            // Either leap now and walk on the new lane, or walk on the current
            // lane and leap just before the highway. Both cover the same
            // number of columns.
            let late = target.start - costs.leap_forward(cur, lane, target.start);
            let here = hm.tr(cur);
            if late > col
                && late <= here.len
                && here.hurdles(col, late) < hm.tr(lane).hurdles(target.arrival, target.start)
            {
                w.advance_to(late);
            }
            w.leap_traced(lane, tracer);
        }
        _ => {
            if let Some((mid, exit)) = shortcut(hm, costs, col, cur, target, shortcut_radius)? {
                w.leap_traced(mid, tracer);
                w.advance_to(exit);
            }
            w.leap_traced(lane, tracer);
        }
    }
    w.advance_to(target.end);
    Ok(())
}

/// The best highway on a lane strictly between `cur` and the target lane
/// that starts within `radius` columns and pays for splitting the leap.
/// Returns the intermediate lane and the column to leave it.
fn shortcut(
    hm: &HurdleMatrix,
    costs: &CostModel,
    col: Col,
    cur: Lane,
    target: &Target,
    radius: Col,
) -> Result<Option<(Lane, Col)>, GasmaError> {
    let lane = target.lane;
    let direct = costs.penalty(cur, lane)?;
    let mut best: Option<(Col, Lane, Col)> = None;
    for mid in min(cur, lane) + 1..max(cur, lane) {
        let track = hm.tr(mid);
        let arrival = col + costs.leap_forward(cur, mid, col);
        if arrival > track.len {
            continue;
        }
        let Some(h) = track.highways.get(track.highway_index(arrival)) else {
            continue;
        };
        let start = max(h.start, arrival);
        if start - col > radius {
            continue;
        }
        // Leaving at `exit` must land on the target lane before its end.
        let exit = min(h.end(), target.end - costs.leap_forward(mid, lane, start));
        if exit <= start {
            continue;
        }
        let split = costs.penalty(cur, mid)? + costs.penalty(mid, lane)?;
        let score = track.matches(start, exit)
            - track.hurdles(arrival, start) * costs.hurdle_cost()
            - (split - direct);
        if score > 0 && best.map_or(true, |(s, _, _)| score > s) {
            best = Some((score, mid, exit));
        }
    }
    Ok(best.map(|(_, mid, exit)| (mid, exit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::LeapCosts;
    use crate::smoothing::SmoothParams;
    use crate::tracer::NoTrace;

    fn run(a: &[u8], b: &[u8], k: Lane, sight: Col) -> (Walk, AlignStats) {
        run_with(a, b, k, sight, &SmoothParams::default())
    }

    fn run_with(
        a: &[u8],
        b: &[u8],
        k: Lane,
        sight: Col,
        params: &SmoothParams,
    ) -> (Walk, AlignStats) {
        let hm = HurdleMatrix::new(a, b, k, params).unwrap();
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col()).unwrap();
        let scorer = HighwayScorer::BoundedLookahead {
            sight,
            shortcut_radius: 3,
        };
        let mut stats = AlignStats::default();
        let walk = route(&hm, &costs, &scorer, sight, 3, &mut NoTrace, &mut stats).unwrap();
        (walk, stats)
    }

    #[test]
    fn identical() {
        let (walk, stats) = run(b"ACGTTGCAAC", b"ACGTTGCAAC", 2, 7);
        assert_eq!(walk.cost(), 0);
        assert_eq!(stats.steps, 1);
    }

    #[test]
    fn single_deletion() {
        let a = b"ACGTACGCTTAGGCA";
        let b = b"ACGTACGTTAGGCA";
        // Without smoothing the mismatch right after the deletion stays visible.
        let params = SmoothParams {
            max_ones_ignored: 0,
            ..Default::default()
        };
        let (walk, _) = run_with(a, b, 2, 7, &params);
        assert_eq!(walk.cost(), 1);
        assert_eq!(walk.aligned.0, a.to_vec());
        assert_eq!(walk.aligned.1, b"ACGTACG-TTAGGCA".to_vec());
    }

    #[test]
    fn nearest_highway_beyond_sight() {
        // The first highway on any lane starts at column 4, out of sight.
        let params = SmoothParams {
            max_ones_ignored: 0,
            ..Default::default()
        };
        let (walk, stats) = run_with(b"GGGGCCCC", b"TTTTTCCCC", 1, 0, &params);
        assert_eq!(stats.steps, 1);
        assert_eq!(walk.cost(), 5);
        assert_eq!(walk.route[1], crate::Waypoint { lane: -1, col: 0 });
    }

    #[test]
    fn pull_follows_penalty() {
        let default = LeapCosts::default();
        let costs = default.resolve(10).unwrap();
        assert_eq!(pull(&costs, 0, -2, -3).unwrap(), -2);
        assert_eq!(pull(&costs, -3, -3, -3).unwrap(), 0);
        assert_eq!(pull(&costs, -3, 0, -3).unwrap(), 3);

        let triple = LeapCosts {
            penalty: Some(std::sync::Arc::new(|from: Lane, to: Lane| {
                3 * (to - from).abs()
            })),
            ..Default::default()
        };
        let costs = triple.resolve(10).unwrap();
        assert_eq!(pull(&costs, 0, -2, -3).unwrap(), -6);
        assert_eq!(pull(&costs, -3, 0, -3).unwrap(), 9);
    }

    #[test]
    fn multi_lane_leap_uses_middle_lane() {
        // Lane -2 matches from column 4 on, lane -1 matches columns 0..4.
        let (a, b) = (b"ACGTGGGG", b"TACGTCGGGG");
        let params = SmoothParams {
            max_ones_ignored: 0,
            ..Default::default()
        };
        let hm = HurdleMatrix::new(a, b, 2, &params).unwrap();
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col()).unwrap();
        let highway = &hm.tr(-2).highways[0];
        assert_eq!((highway.start, highway.end()), (4, 8));
        let target = Target {
            highway,
            lane: -2,
            arrival: 0,
            start: 4,
            end: 8,
            score: 0,
        };

        assert_eq!(shortcut(&hm, &costs, 0, 0, &target, 3).unwrap(), Some((-1, 4)));
        assert_eq!(shortcut(&hm, &costs, 1, 0, &target, 0).unwrap(), Some((-1, 4)));
        // From column 4 the next highway on lane -1 starts at 5.
        assert_eq!(shortcut(&hm, &costs, 4, 0, &target, 0).unwrap(), None);
        assert_eq!(shortcut(&hm, &costs, 4, 0, &target, 1).unwrap(), Some((-1, 8)));

        let mut w = Walker::new(&hm);
        take(&hm, &costs, &mut w, &target, 3, &mut NoTrace).unwrap();
        let walk = w.finish();
        assert_eq!(walk.cost(), 2);
        assert_eq!(
            walk.route,
            vec![
                crate::Waypoint { lane: 0, col: 0 },
                crate::Waypoint { lane: -1, col: 0 },
                crate::Waypoint { lane: -1, col: 4 },
                crate::Waypoint { lane: -2, col: 4 },
                crate::Waypoint { lane: -2, col: 8 },
            ]
        );
        assert_eq!(walk.aligned.0, b"-ACGT-GGGG".to_vec());
    }

    #[test]
    fn empty_first() {
        let (walk, _) = run(b"", b"ACG", 3, 7);
        assert_eq!(walk.cost(), 3);
        assert_eq!(walk.route.last(), Some(&crate::Waypoint { lane: -3, col: 0 }));
    }
}
