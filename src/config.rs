//! Defaults and the JSON split configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::FilterMode;
use crate::error::SplitError;
use crate::split::proportions::Proportions;
use crate::split::splitter::check_split_column;

/// Allowed absolute deviation of the proportion sum from 1.0.
pub const PROPORTION_TOLERANCE: f64 = 1e-6;

/// Column holding the boolean eligibility flag.
pub const DEFAULT_ELIGIBLE_COLUMN: &str = "eligible";

/// Column the split labels are written to.
pub const DEFAULT_SPLIT_COLUMN: &str = "split";

/// Everything needed to run one split.
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```json
/// { "mode": "all", "proportions": { "train": 0.8, "dev": 0.1, "test": 0.1 }, "seed": 42 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    pub mode: FilterMode,
    pub proportions: Proportions,
    pub shuffle: bool,
    pub seed: Option<u64>,
    pub eligible_column: String,
    pub split_column: String,
    /// Column of the input file that holds the row index. Positions are
    /// used when unset.
    pub index_column: Option<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            mode: FilterMode::default(),
            proportions: Proportions::default(),
            shuffle: true,
            seed: None,
            eligible_column: DEFAULT_ELIGIBLE_COLUMN.to_string(),
            split_column: DEFAULT_SPLIT_COLUMN.to_string(),
            index_column: None,
        }
    }
}

impl SplitConfig {
    /// Read a config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Check proportions and column names without touching any table.
    pub fn validate(&self) -> std::result::Result<(), SplitError> {
        self.proportions.validate()?;
        check_split_column(
            &self.split_column,
            &self.eligible_column,
            self.index_column.as_deref(),
        )
    }
}
