use pa_types::Cost;
use thiserror::Error;

use crate::{Col, Lane};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GasmaError {
    /// The destination lane `len(a) - len(b)` lies outside `[-k, k]`.
    #[error("k = {k} is too narrow for length difference {diff}")]
    BandTooNarrow { k: Lane, diff: Col },

    #[error("lane {lane} is outside the band [-{k}, {k}] or has no columns")]
    LaneOutOfRange { lane: Lane, k: Lane },

    #[error("penalty {penalty} for leaping from lane {from} to lane {to} is not positive")]
    InvalidPenalty { from: Lane, to: Lane, penalty: Cost },

    /// The energy budget ran out before any destination was reached.
    #[error("no alignment within energy {budget}")]
    NoSolution { budget: Cost },

    #[error("no predecessor for lane {lane} at energy {energy}")]
    Backtrack { lane: Lane, energy: Cost },
}
