//! The global greedy router.
//!
//! 1. Select highways by weighted greedy set cover over the columns of `a`.
//! 2. Link the selected highways from the destination back to the origin,
//!    each time taking the one reachable with the fewest hurdle crossings.
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::bits::HurdleBits;
use crate::costs::CostModel;
use crate::highway::Highway;
use crate::hurdles::HurdleMatrix;
use crate::prelude::*;
use crate::scorer::{Candidate, HighwayScorer};
use crate::stats::AlignStats;
use crate::tracer::TraceInstance;
use crate::walk::{Walk, Walker};

pub(crate) fn route<I: TraceInstance>(
    hm: &HurdleMatrix,
    costs: &CostModel,
    scorer: &HighwayScorer,
    tracer: &mut I,
    stats: &mut AlignStats,
) -> Result<Walk, GasmaError> {
    let chosen = select(hm, scorer, tracer);
    stats.chosen += chosen.len();
    let plan = link(hm, costs, chosen);

    let mut w = Walker::new(hm);
    for (lane, col) in plan {
        w.leap_traced(lane, tracer);
        w.advance_to(col);
    }
    Ok(w.finish())
}

/// Lazy greedy set cover. Marginal gains only shrink, so a popped highway
/// whose recomputed gain equals its stored gain is the best one.
fn select<'h, I: TraceInstance>(
    hm: &'h HurdleMatrix,
    scorer: &HighwayScorer,
    tracer: &mut I,
) -> Vec<&'h Highway> {
    let m = hm.max_col();
    let dest = hm.dest_lane();
    let highways: Vec<&Highway> = hm.highways().collect();
    // `1` for columns not covered yet.
    let mut uncovered = HurdleBits::ones(m as usize);

    let gain = |h: &Highway, uncovered: &HurdleBits| {
        let end = min(h.end(), m);
        scorer.score(&Candidate {
            lane: h.lane,
            start: h.start,
            end,
            uncovered: uncovered.count_ones(h.start as usize..end as usize) as Col,
            ..Default::default()
        })
    };

    let mut heap: BinaryHeap<(Col, bool, Reverse<usize>)> = highways
        .iter()
        .enumerate()
        .map(|(idx, h)| (gain(*h, &uncovered), h.lane == dest, Reverse(idx)))
        .collect();

    let mut chosen = vec![];
    while let Some((stored, is_dest, Reverse(idx))) = heap.pop() {
        let h = highways[idx];
        let now = gain(h, &uncovered);
        if now < stored {
            heap.push((now, is_dest, Reverse(idx)));
            continue;
        }
        if now < 0 {
            break;
        }
        uncovered.fill(h.start as usize..h.end() as usize, false);
        tracer.highway_chosen(h, now);
        chosen.push(h);
    }
    chosen
}

/// Links the chosen highways into a plan of `(lane, column)` stops: leap to
/// `lane`, then advance to `column`. The plan ends at the destination.
fn link(hm: &HurdleMatrix, costs: &CostModel, mut chosen: Vec<&Highway>) -> Vec<(Lane, Col)> {
    let (mut lane, mut col) = (hm.dest_lane(), hm.max_col());
    let mut plan = vec![(lane, col)];
    loop {
        // (crossings, leap distance, -usable length), highway, exit column.
        let mut best: Option<((Col, Col, Col), &Highway, Col)> = None;
        chosen.retain(|h| {
            let f = costs.leap_forward(h.lane, lane, h.start);
            // Leaving `h` at `x` must land at or before `col`.
            let x = min(h.end(), col - f);
            if x <= h.start {
                return false;
            }
            let crossings = hm.tr(lane).hurdles(x + f, col) + hm.tr(h.lane).hurdles(h.start, x);
            let key = (crossings, (h.lane - lane).abs(), -(x - h.start));
            if best.as_ref().map_or(true, |(k, _, _)| key < *k) {
                best = Some((key, *h, x));
            }
            true
        });
        let Some((_, h, x)) = best else {
            break;
        };
        chosen.retain(|c| !std::ptr::eq(*c, h));
        plan.push((h.lane, x));
        (lane, col) = (h.lane, h.start);
    }
    plan.reverse();
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::LeapCosts;
    use crate::smoothing::SmoothParams;
    use crate::tracer::NoTrace;

    fn run(a: &[u8], b: &[u8], k: Lane, overhead: Col) -> (Walk, AlignStats) {
        let hm = HurdleMatrix::new(a, b, k, &SmoothParams::default()).unwrap();
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col()).unwrap();
        let mut stats = AlignStats::default();
        let walk = route(
            &hm,
            &costs,
            &HighwayScorer::GlobalGreedy { overhead },
            &mut NoTrace,
            &mut stats,
        )
        .unwrap();
        (walk, stats)
    }

    #[test]
    fn identical() {
        let (walk, stats) = run(b"ACGTACGTTA", b"ACGTACGTTA", 3, 2);
        assert_eq!(walk.cost(), 0);
        assert_eq!(stats.chosen, 1);
        assert_eq!(walk.num_leaps(), 0);
    }

    #[test]
    fn single_insertion() {
        let (walk, _) = run(b"ACGTACGTTAGGCA", b"ACGTACGCTTAGGCA", 2, 2);
        assert_eq!(walk.cost(), 1);
        assert_eq!(walk.route.last(), Some(&crate::Waypoint { lane: -1, col: 14 }));
    }

    #[test]
    fn tie_prefers_destination_lane() {
        // Lanes -1 and 0 both cover columns 0..4; lane -1 comes first.
        let (a, b) = (b"AAAAC", b"AAAAA");
        let hm = HurdleMatrix::new(a, b, 1, &SmoothParams::default()).unwrap();
        let chosen = select(
            &hm,
            &HighwayScorer::GlobalGreedy { overhead: 2 },
            &mut NoTrace,
        );
        let lanes: Vec<Lane> = chosen.iter().map(|h| h.lane).collect();
        assert_eq!(lanes, vec![0]);

        let (walk, stats) = run(a, b, 1, 2);
        assert_eq!(stats.chosen, 1);
        assert_eq!(walk.cost(), 1);
        assert_eq!(walk.num_leaps(), 0);
    }

    #[test]
    fn link_truncates_and_drops() {
        let a = b"ACGTACGTAC";
        let hm = HurdleMatrix::new(a, a, 1, &SmoothParams::default()).unwrap();
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col()).unwrap();
        let highway = |lane, start, len| Highway {
            lane,
            start,
            len,
            absorbed: Default::default(),
        };
        let last = highway(0, 5, 5);
        let long = highway(1, 0, 8);
        let short = highway(1, 6, 2);
        let plan = link(&hm, &costs, vec![&long, &short, &last]);
        // Leaving lane 1 for column 5 of lane 0 must happen by column 4, and
        // `short` starts after that.
        assert_eq!(plan, vec![(1, 4), (0, 10), (0, 10)]);
    }

    #[test]
    fn plan_ends_at_destination() {
        let hm =
            HurdleMatrix::new(b"AAAACCCC", b"GGAAAACCCC", 3, &SmoothParams::default()).unwrap();
        let leap_costs = LeapCosts::default();
        let costs = leap_costs.resolve(hm.max_col()).unwrap();
        let chosen = select(
            &hm,
            &HighwayScorer::GlobalGreedy { overhead: 2 },
            &mut NoTrace,
        );
        let plan = link(&hm, &costs, chosen);
        assert_eq!(plan.last(), Some(&(-2, 8)));
        assert_eq!(plan[0], (-2, 8));
    }
}
