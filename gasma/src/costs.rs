//! Costs of moving between lanes.
//!
//! `LeapCosts` holds optional overrides for the two cost functions. Before an
//! alignment it is resolved into a `CostModel` for the final column of the
//! input, which fills in the defaults.
use std::fmt;
use std::sync::Arc;

use crate::prelude::*;

/// `(from, to) -> energy` spent to move from lane `from` to lane `to`.
pub type PenaltyFn = Arc<dyn Fn(Lane, Lane) -> Cost + Send + Sync>;

/// `(from, to, pos, max_col) -> columns` advanced when leaving lane `from` at
/// `pos` and arriving on lane `to`.
pub type ForwardFn = Arc<dyn Fn(Lane, Lane, Col, Col) -> Col + Send + Sync>;

#[derive(Clone)]
pub struct LeapCosts {
    pub penalty: Option<PenaltyFn>,
    pub forward: Option<ForwardFn>,
    /// Cost of crossing a single hurdle, and of a substitution in the DP.
    pub hurdle_cost: Cost,
}

impl Default for LeapCosts {
    fn default() -> Self {
        Self {
            penalty: None,
            forward: None,
            hurdle_cost: 1,
        }
    }
}

impl fmt::Debug for LeapCosts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeapCosts")
            .field("penalty", &self.penalty.as_ref().map(|_| "custom"))
            .field("forward", &self.forward.as_ref().map(|_| "custom"))
            .field("hurdle_cost", &self.hurdle_cost)
            .finish()
    }
}

impl LeapCosts {
    pub fn resolve(&self, max_col: Col) -> Result<CostModel<'_>, GasmaError> {
        if self.hurdle_cost <= 0 {
            return Err(GasmaError::InvalidPenalty {
                from: 0,
                to: 0,
                penalty: self.hurdle_cost,
            });
        }
        Ok(CostModel {
            costs: self,
            max_col,
        })
    }
}

/// `|to - from|` for a leap, `hurdle_cost` for staying on the lane.
pub fn default_penalty(from: Lane, to: Lane, hurdle_cost: Cost) -> Cost {
    if from == to {
        hurdle_cost
    } else {
        (to - from).abs()
    }
}

/// The number of columns a leap from `from` to `to` moves forward.
///
/// A leap is a chain of unit gaps. A unit gap moving toward lane 0 consumes a
/// symbol of the sequence that is ahead and advances the column by one; a
/// unit gap moving away from lane 0 leaves the column unchanged. Staying on a
/// lane is a substitution and advances one column, except at the very end.
pub fn default_forward(from: Lane, to: Lane, pos: Col, max_col: Col) -> Col {
    if from == to {
        return if pos >= max_col { 0 } else { 1 };
    }
    if from.signum() * to.signum() < 0 {
        // Crossing lane 0: only the steps toward 0 advance.
        return from.abs();
    }
    if to.abs() > from.abs() {
        0
    } else {
        (from - to).abs()
    }
}

/// The resolved cost functions for a single input pair.
#[derive(Clone)]
pub struct CostModel<'c> {
    costs: &'c LeapCosts,
    max_col: Col,
}

impl CostModel<'_> {
    pub fn max_col(&self) -> Col {
        self.max_col
    }

    pub fn hurdle_cost(&self) -> Cost {
        self.costs.hurdle_cost
    }

    /// The leap penalty, validated to be positive.
    pub fn penalty(&self, from: Lane, to: Lane) -> Result<Cost, GasmaError> {
        let penalty = match &self.costs.penalty {
            Some(f) => f(from, to),
            None => default_penalty(from, to, self.costs.hurdle_cost),
        };
        if penalty <= 0 {
            return Err(GasmaError::InvalidPenalty { from, to, penalty });
        }
        Ok(penalty)
    }

    pub fn forward(&self, from: Lane, to: Lane, pos: Col) -> Col {
        match &self.costs.forward {
            Some(f) => f(from, to, pos, self.max_col),
            None => default_forward(from, to, pos, self.max_col),
        }
    }

    /// Columns advanced by an actual lane change; `0` when staying on the lane.
    pub fn leap_forward(&self, from: Lane, to: Lane, pos: Col) -> Col {
        if from == to {
            0
        } else {
            self.forward(from, to, pos)
        }
    }
}
