//! Observers for the progress of an alignment.
//!
//! A `Tracer` is the configuration and is `build` into a `TraceInstance` for
//! every input pair. All hooks default to doing nothing.
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::highway::Highway;
use crate::prelude::*;
use crate::walk::Waypoint;

pub trait Tracer: Clone + Default + Debug {
    type Instance: TraceInstance;
    fn build(&self, a: Seq, b: Seq) -> Self::Instance;
}

pub trait TraceInstance {
    /// Called once all lanes have been built.
    fn lanes_built(&mut self, _lanes: usize, _highways: usize) {}

    /// A router committed to `highway`, with the given score.
    fn highway_chosen(&mut self, _highway: &Highway, _score: Col) {}

    fn leap(&mut self, _from: Waypoint, _to: Lane) {}

    /// The DP finished energy level `energy`, reaching `reached` lanes.
    fn energy_level(&mut self, _energy: Cost, _reached: usize) {}

    fn finished(&mut self, _cost: Cost) {}
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoTrace;

impl Tracer for NoTrace {
    type Instance = Self;
    fn build(&self, _a: Seq, _b: Seq) -> Self::Instance {
        Self
    }
}
impl TraceInstance for NoTrace {}

/// Forwards all events to the `log` facade.
///
/// Summaries go to `debug!`, per-step events to `trace!`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogTracer;

pub struct LogTraceInstance {
    len_a: usize,
    len_b: usize,
    chosen: usize,
    leaps: usize,
}

impl Tracer for LogTracer {
    type Instance = LogTraceInstance;
    fn build(&self, a: Seq, b: Seq) -> Self::Instance {
        LogTraceInstance {
            len_a: a.len(),
            len_b: b.len(),
            chosen: 0,
            leaps: 0,
        }
    }
}

impl TraceInstance for LogTraceInstance {
    fn lanes_built(&mut self, lanes: usize, highways: usize) {
        debug!(
            "{}x{}: built {lanes} lanes with {highways} highways",
            self.len_a, self.len_b
        );
    }

    fn highway_chosen(&mut self, highway: &Highway, score: Col) {
        self.chosen += 1;
        trace!(
            "highway lane {} [{}, {}) score {score}",
            highway.lane,
            highway.start,
            highway.end()
        );
    }

    fn leap(&mut self, from: Waypoint, to: Lane) {
        self.leaps += 1;
        trace!("leap {} -> {to} at column {}", from.lane, from.col);
    }

    fn energy_level(&mut self, energy: Cost, reached: usize) {
        trace!("energy {energy}: {reached} lanes reached");
    }

    fn finished(&mut self, cost: Cost) {
        debug!(
            "{}x{}: cost {cost} using {} highways and {} leaps",
            self.len_a, self.len_b, self.chosen, self.leaps
        );
    }
}
