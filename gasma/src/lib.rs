//!
//! # GASMA
//!
//! Approximate edit distance between two DNA sequences using per-diagonal
//! hurdle bit-vectors.
//!
//! Every diagonal ("lane") of the edit graph gets a bit-vector with a `1` for
//! each mismatch ("hurdle"). Runs of `0`s are "highways" that can be traversed
//! for free. Three consumers share these vectors:
//! - `GlobalGreedy`: set-cover selection of highways, linked back to front.
//! - `BoundedLookahead`: an online router that only looks `sight` columns ahead.
//! - `EnergyDp`: an exact diagonal-transition DP over the energy (cost) spent,
//!   skipping each highway in a single bit-scan.
//!
//! The easiest entrypoint is `GasmaArgs::build`, which returns a `Gasma` that
//! aligns pairs of sequences with the configured algorithm.
//!
//! The shorter sequence is always used as `a` internally. Lanes are numbered
//! `i - j` in this internal orientation and the column of a state is
//! `min(i, j)`. Aligned strings and CIGARs are swapped back to the caller's
//! order.

pub mod bits;
pub mod bitscan;
pub mod config;
pub mod costs;
pub mod energy;
pub mod error;
mod greedy;
pub mod highway;
pub mod hurdles;
mod lookahead;
pub mod scorer;
pub mod smoothing;
pub mod stats;
pub mod tracer;
pub mod walk;

mod prelude {
    pub use pa_types::*;
    pub use std::cmp::{max, min};

    pub use crate::error::GasmaError;
    pub use crate::{Col, Lane};
}

/// A diagonal `i - j` of the edit graph.
pub type Lane = i32;
/// A position along a lane, `min(i, j)`.
pub type Col = i32;

pub use config::{Algorithm, GasmaArgs};
pub use costs::{CostModel, LeapCosts};
pub use energy::{EnergyDp, EnergySolution, Leg};
pub use error::GasmaError;
pub use highway::Highway;
pub use hurdles::HurdleMatrix;
pub use scorer::HighwayScorer;
pub use stats::AlignStats;
pub use tracer::{LogTracer, NoTrace, TraceInstance, Tracer};
pub use walk::{Walk, Waypoint};

// ------------ Root alignment interface follows from here ------------

use prelude::*;

/// The result of a single alignment.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// Unit edit cost of the returned alignment.
    pub cost: Cost,
    /// The minimal energy found by the DP. `None` for the routers.
    pub energy: Option<Cost>,
    pub walk: Walk,
}

/// A configured aligner. Build one with `GasmaArgs::build`.
#[derive(Debug, Clone)]
pub struct Gasma<T: Tracer = NoTrace> {
    pub args: GasmaArgs,
    pub costs: LeapCosts,
    pub tracer: T,
}

impl<T: Tracer> Gasma<T> {
    /// Replace the lane-change penalty.
    pub fn with_penalty(
        mut self,
        penalty: impl Fn(Lane, Lane) -> Cost + Send + Sync + 'static,
    ) -> Self {
        self.costs.penalty = Some(std::sync::Arc::new(penalty));
        self
    }

    /// Replace the forward-column rule. The last argument is the final column.
    pub fn with_forward(
        mut self,
        forward: impl Fn(Lane, Lane, Col, Col) -> Col + Send + Sync + 'static,
    ) -> Self {
        self.costs.forward = Some(std::sync::Arc::new(forward));
        self
    }

    /// Builds the per-lane hurdle vectors and highways for `a` and `b`.
    pub fn hurdles<'s>(&self, a: Seq<'s>, b: Seq<'s>) -> Result<HurdleMatrix<'s>, GasmaError> {
        HurdleMatrix::new(a, b, self.args.k, &self.args.smoothing())
    }

    /// Aligns `a` and `b` with the configured algorithm.
    pub fn align(&self, a: Seq, b: Seq) -> Result<(Alignment, AlignStats), GasmaError> {
        match self.args.algorithm {
            Algorithm::Greedy => self.route(a, b, self.args.greedy_scorer()),
            Algorithm::Lookahead => self.route(a, b, self.args.lookahead_scorer()),
            Algorithm::Energy => self.energy(a, b),
            Algorithm::SemiGlobal => self.semi_global(a, b),
        }
    }

    /// Runs one of the heuristic routers.
    pub fn route(
        &self,
        a: Seq,
        b: Seq,
        scorer: HighwayScorer,
    ) -> Result<(Alignment, AlignStats), GasmaError> {
        let mut stats = AlignStats::init(a, b);
        let mut tracer = self.tracer.build(a, b);
        let hm = self.hurdles(a, b)?;
        stats.add_lanes(&hm);
        tracer.lanes_built(hm.num_lanes(), hm.num_highways());
        let costs = self.costs.resolve(hm.max_col())?;
        let walk = scorer.route(&hm, &costs, &mut tracer, &mut stats)?;
        let cost = walk.cost();
        stats.cost = cost;
        tracer.finished(cost);
        Ok((
            Alignment {
                cost,
                energy: None,
                walk,
            },
            stats,
        ))
    }

    /// Runs the exact energy-bounded DP from the origin to the destination.
    pub fn energy(&self, a: Seq, b: Seq) -> Result<(Alignment, AlignStats), GasmaError> {
        self.run_energy(a, b, false)
    }

    /// The energy DP, stopping as soon as either sequence is exhausted. The
    /// remainder of the other sequence is clipped for free.
    pub fn semi_global(&self, a: Seq, b: Seq) -> Result<(Alignment, AlignStats), GasmaError> {
        self.run_energy(a, b, true)
    }

    fn run_energy(
        &self,
        a: Seq,
        b: Seq,
        semi_global: bool,
    ) -> Result<(Alignment, AlignStats), GasmaError> {
        let mut stats = AlignStats::init(a, b);
        let mut tracer = self.tracer.build(a, b);
        let hm = self.hurdles(a, b)?;
        stats.add_lanes(&hm);
        tracer.lanes_built(hm.num_lanes(), hm.num_highways());
        let costs = self.costs.resolve(hm.max_col())?;
        let mut dp = EnergyDp::new(&hm, &costs, self.args.energy);
        if semi_global {
            dp = dp.semi_global();
        }
        let solution = dp.solve(&mut tracer)?;
        stats.energy_levels = solution.energy as usize + 1;
        let walk = solution.replay(&hm, &costs, &mut tracer);
        let cost = walk.cost();
        stats.cost = cost;
        tracer.finished(cost);
        Ok((
            Alignment {
                cost,
                energy: Some(solution.energy),
                walk,
            },
            stats,
        ))
    }
}
