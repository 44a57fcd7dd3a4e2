use serde::{Deserialize, Serialize};

use crate::config::PROPORTION_TOLERANCE;
use crate::error::{Result, SplitError};

/// Target fractions for the three splits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Proportions {
    pub train: f64,
    pub dev: f64,
    pub test: f64,
}

impl Default for Proportions {
    fn default() -> Self {
        Proportions {
            train: 0.9,
            dev: 0.05,
            test: 0.05,
        }
    }
}

/// Number of records per split for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SplitSizes {
    pub train: usize,
    pub dev: usize,
    pub test: usize,
}

impl SplitSizes {
    pub fn total(&self) -> usize {
        self.train + self.dev + self.test
    }
}

impl Proportions {
    pub fn new(train: f64, dev: f64, test: f64) -> Self {
        Proportions { train, dev, test }
    }

    pub fn sum(&self) -> f64 {
        self.train + self.dev + self.test
    }

    /// Each fraction in `[0, 1]`, and all three summing to 1.0 within
    /// [`PROPORTION_TOLERANCE`].
    pub fn validate(&self) -> Result<()> {
        for (split, value) in [("train", self.train), ("dev", self.dev), ("test", self.test)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SplitError::InvalidProportion { split, value });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > PROPORTION_TOLERANCE {
            return Err(SplitError::ProportionSum { sum });
        }
        Ok(())
    }

    /// Partition `n` records.
    ///
    /// `train` and `dev` are floor-truncated; `test` takes whatever is left,
    /// so the sizes always add up to `n` and all rounding slack lands in
    /// `test`.
    pub fn partition(&self, n: usize) -> SplitSizes {
        let train = ((n as f64) * self.train).floor() as usize;
        let train = train.min(n);
        // Sums slightly above 1.0 pass validation; keep train + dev <= n.
        let dev = (((n as f64) * self.dev).floor() as usize).min(n - train);
        SplitSizes {
            train,
            dev,
            test: n - train - dev,
        }
    }
}
