//! Error types for the splitter.
//!
//! `SplitError` covers everything the core can reject. File loading and
//! writing report through `anyhow` instead, since those errors only need
//! context for the user, not matching.

use thiserror::Error;

use crate::data::model::MetadataValue;

/// Main error type for the splitting library.
#[derive(Debug, Error)]
pub enum SplitError {
    /// The three fractions do not add up to one.
    #[error("proportions must sum to 1.0 (got {sum})")]
    ProportionSum { sum: f64 },

    /// A single fraction is outside `[0, 1]` or not a number.
    #[error("proportion for '{split}' must be within [0, 1] (got {value})")]
    InvalidProportion { split: &'static str, value: f64 },

    /// Filter mode string not recognised.
    #[error("unsupported filter mode: '{0}'. Expected 'include', 'exclude' or 'all'")]
    UnsupportedMode(String),

    /// The eligibility column is absent from the table.
    #[error("eligibility column '{0}' not found in table")]
    MissingColumn(String),

    /// The eligibility column holds something other than a boolean.
    #[error("eligibility column '{column}' must be boolean, row {index} has '{value}'")]
    NonBooleanEligibility {
        column: String,
        index: MetadataValue,
        value: MetadataValue,
    },

    /// The split column would overwrite the index or the eligibility column.
    #[error("split column '{column}' is also the {role} column")]
    ColumnConflict { column: String, role: &'static str },

    /// An assignment was applied to a table it was not computed from.
    #[error("split assignment does not match table: {0}")]
    AssignmentMismatch(String),
}

impl SplitError {
    /// Whether the error stems from the split configuration (proportions,
    /// mode or column names) rather than from applying an assignment.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SplitError::ProportionSum { .. }
                | SplitError::InvalidProportion { .. }
                | SplitError::UnsupportedMode(_)
                | SplitError::MissingColumn(_)
                | SplitError::NonBooleanEligibility { .. }
                | SplitError::ColumnConflict { .. }
        )
    }
}

/// Result type alias for splitting operations.
pub type Result<T> = std::result::Result<T, SplitError>;
