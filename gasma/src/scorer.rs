//! Scoring of candidate highways for the two heuristic routers.
use serde::{Deserialize, Serialize};

use crate::costs::CostModel;
use crate::hurdles::HurdleMatrix;
use crate::prelude::*;
use crate::stats::AlignStats;
use crate::tracer::TraceInstance;
use crate::walk::Walk;
use crate::{greedy, lookahead};

/// What a router knows about a highway it may use next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Candidate {
    pub lane: Lane,
    /// The usable part of the highway.
    pub start: Col,
    pub end: Col,
    /// Columns of the highway not covered by any chosen highway yet.
    pub uncovered: Col,
    /// Raw matches in `[start, end)`.
    pub matches: Col,
    /// Cost of the hurdles between the arrival on the lane and `start`.
    pub crossing: Cost,
    pub leap_penalty: Cost,
    /// Increase of the leap penalty still owed to reach the destination lane.
    pub pull: Col,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighwayScorer {
    /// Set-cover selection: newly covered columns minus a fixed overhead per
    /// highway.
    GlobalGreedy { overhead: Col },
    /// Online routing with a limited view: only highways starting within
    /// `sight` columns are considered, and multi-lane leaps look for a
    /// stepping stone within `shortcut_radius` columns.
    BoundedLookahead { sight: Col, shortcut_radius: Col },
}

impl HighwayScorer {
    pub fn score(&self, c: &Candidate) -> Col {
        match *self {
            HighwayScorer::GlobalGreedy { overhead } => c.uncovered - overhead,
            HighwayScorer::BoundedLookahead { .. } => {
                c.matches - c.leap_penalty - c.pull - c.crossing
            }
        }
    }

    /// Routes from the start to the end of the grid.
    pub fn route<I: TraceInstance>(
        &self,
        hm: &HurdleMatrix,
        costs: &CostModel,
        tracer: &mut I,
        stats: &mut AlignStats,
    ) -> Result<Walk, GasmaError> {
        match *self {
            HighwayScorer::GlobalGreedy { .. } => greedy::route(hm, costs, self, tracer, stats),
            HighwayScorer::BoundedLookahead {
                sight,
                shortcut_radius,
            } => lookahead::route(hm, costs, self, sight, shortcut_radius, tracer, stats),
        }
    }
}
