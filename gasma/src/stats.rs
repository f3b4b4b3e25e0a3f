use derive_more::AddAssign;
use serde::Serialize;

use crate::hurdles::HurdleMatrix;
use crate::prelude::*;

#[derive(Default, Clone, Copy, AddAssign, Debug, Serialize)]
pub struct AlignStats {
    pub len_a: usize,
    pub len_b: usize,
    /// The reported cost.
    pub cost: Cost,
    /// Lanes built.
    pub lanes: usize,
    /// Highways over all lanes.
    pub highways: usize,
    /// Highways picked by the greedy selection.
    pub chosen: usize,
    /// Steps taken by the lookahead router.
    pub steps: usize,
    /// Energy levels filled by the DP.
    pub energy_levels: usize,
    pub sample_size: usize,
}

impl AlignStats {
    pub fn init(a: Seq, b: Seq) -> Self {
        Self {
            len_a: a.len(),
            len_b: b.len(),
            sample_size: 1,
            ..Default::default()
        }
    }

    pub fn add_lanes(&mut self, hm: &HurdleMatrix) {
        self.lanes += hm.num_lanes();
        self.highways += hm.num_highways();
    }
}
