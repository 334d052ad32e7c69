//! Iteration budget: computation depth and color table length.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted iteration budget.
pub const MIN_ITERATIONS: u32 = 100;

/// Increment applied by the +/- navigation inputs.
pub const ITERATION_STEP: u32 = 100;

pub const DEFAULT_ITERATIONS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("iteration budget {0} is below the minimum of {MIN_ITERATIONS}")]
pub struct BudgetTooSmall(pub u32);

/// Maximum iteration count, always at least [`MIN_ITERATIONS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct IterationBudget(u32);

impl IterationBudget {
    /// Returns `None` for values below [`MIN_ITERATIONS`].
    pub fn new(value: u32) -> Option<Self> {
        (value >= MIN_ITERATIONS).then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increased(self) -> Self {
        Self(self.0.saturating_add(ITERATION_STEP))
    }

    /// One step lower, or `None` if that would fall below the floor.
    pub fn decreased(self) -> Option<Self> {
        Self::new(self.0.saturating_sub(ITERATION_STEP))
    }
}

impl Default for IterationBudget {
    fn default() -> Self {
        Self(DEFAULT_ITERATIONS)
    }
}

impl TryFrom<u32> for IterationBudget {
    type Error = BudgetTooSmall;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(BudgetTooSmall(value))
    }
}

impl From<IterationBudget> for u32 {
    fn from(budget: IterationBudget) -> Self {
        budget.0
    }
}
