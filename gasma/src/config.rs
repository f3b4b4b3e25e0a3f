use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::costs::LeapCosts;
use crate::prelude::*;
use crate::scorer::HighwayScorer;
use crate::smoothing::SmoothParams;
use crate::tracer::{NoTrace, Tracer};
use crate::Gasma;

/// The algorithm used by `Gasma::align`. Defaults to the exact energy DP.
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy, ValueEnum, Serialize, Deserialize)]
pub enum Algorithm {
    /// Greedy set cover of highways, linked back to front.
    Greedy,
    /// Online router with a limited view ahead.
    Lookahead,
    /// Energy-bounded diagonal DP.
    #[default]
    Energy,
    /// Energy DP that stops when either sequence is exhausted.
    SemiGlobal,
}

fn default_k() -> Lane {
    16
}
fn default_energy() -> Cost {
    64
}
fn default_max_ones_ignored() -> usize {
    1
}
fn default_sight() -> Col {
    7
}
fn default_shortcut_radius() -> Col {
    3
}
fn default_highway_overhead() -> Col {
    2
}
fn default_hurdle_cost() -> Cost {
    1
}

/// Aligner arguments.
#[derive(Parser, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[clap(next_help_heading = "Aligner")]
#[serde(deny_unknown_fields)]
pub struct GasmaArgs {
    #[clap(short, long, default_value_t, value_enum, display_order = 10)]
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Lanes `[-k, k]` are built
    ///
    /// Must be at least the difference in length of the sequences.
    #[clap(short, long, default_value_t = 16, value_name = "k", display_order = 10)]
    #[serde(default = "default_k")]
    pub k: Lane,

    /// Energy budget of the DP
    #[clap(short = 'E', long, default_value_t = 64, value_name = "E", display_order = 10)]
    #[serde(default = "default_energy")]
    pub energy: Cost,

    /// Hurdle runs up to this length are smoothed into highways
    #[clap(long, default_value_t = 1, help_heading = "Smoothing")]
    #[serde(default = "default_max_ones_ignored")]
    pub max_ones_ignored: usize,

    /// Match runs up to this length between hurdles are dropped
    #[clap(long, default_value_t = 0, help_heading = "Smoothing")]
    #[serde(default)]
    pub max_zeros_ignored: usize,

    /// Merge highways on a lane separated by at most this many hurdles
    #[clap(long, default_value_t = 0, help_heading = "Smoothing")]
    #[serde(default)]
    pub cross_hurdle_threshold: usize,

    /// Columns the lookahead router looks ahead
    #[clap(long, default_value_t = 7, hide_short_help = true)]
    #[serde(default = "default_sight")]
    pub sight: Col,

    /// Columns searched for stepping stones on multi-lane leaps
    #[clap(long, default_value_t = 3, hide_short_help = true)]
    #[serde(default = "default_shortcut_radius")]
    pub shortcut_radius: Col,

    /// Cost of selecting one more highway in the greedy router
    #[clap(long, default_value_t = 2, hide_short_help = true)]
    #[serde(default = "default_highway_overhead")]
    pub highway_overhead: Col,

    /// Cost of crossing a hurdle
    #[clap(long, default_value_t = 1, hide_short_help = true)]
    #[serde(default = "default_hurdle_cost")]
    pub hurdle_cost: Cost,
}

impl Default for GasmaArgs {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            k: default_k(),
            energy: default_energy(),
            max_ones_ignored: default_max_ones_ignored(),
            max_zeros_ignored: 0,
            cross_hurdle_threshold: 0,
            sight: default_sight(),
            shortcut_radius: default_shortcut_radius(),
            highway_overhead: default_highway_overhead(),
            hurdle_cost: default_hurdle_cost(),
        }
    }
}

/// A short summary, e.g. for tables of results.
impl ToString for GasmaArgs {
    fn to_string(&self) -> String {
        match self.algorithm {
            Algorithm::Greedy => format!(
                "Greedy (k={}, overhead={})",
                self.k, self.highway_overhead
            ),
            Algorithm::Lookahead => format!("Lookahead (k={}, sight={})", self.k, self.sight),
            Algorithm::Energy => format!("Energy DP (k={}, E={})", self.k, self.energy),
            Algorithm::SemiGlobal => {
                format!("Semi-global energy DP (k={}, E={})", self.k, self.energy)
            }
        }
    }
}

impl GasmaArgs {
    pub fn smoothing(&self) -> SmoothParams {
        SmoothParams {
            max_ones_ignored: self.max_ones_ignored,
            max_zeros_ignored: self.max_zeros_ignored,
            cross_hurdle_threshold: self.cross_hurdle_threshold,
        }
    }

    pub fn greedy_scorer(&self) -> HighwayScorer {
        HighwayScorer::GlobalGreedy {
            overhead: self.highway_overhead,
        }
    }

    pub fn lookahead_scorer(&self) -> HighwayScorer {
        HighwayScorer::BoundedLookahead {
            sight: self.sight,
            shortcut_radius: self.shortcut_radius,
        }
    }

    pub fn build(&self) -> Gasma<NoTrace> {
        self.build_with_tracer(NoTrace)
    }

    pub fn build_with_tracer<T: Tracer>(&self, tracer: T) -> Gasma<T> {
        Gasma {
            args: *self,
            costs: LeapCosts {
                hurdle_cost: self.hurdle_cost,
                ..Default::default()
            },
            tracer,
        }
    }
}
