use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::{MetadataTable, MetadataValue};
use crate::error::{Result, SplitError};

// ---------------------------------------------------------------------------
// Filter mode: which rows take part in a split
// ---------------------------------------------------------------------------

/// Selects the eligible subset of a table from its boolean eligibility column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Rows whose eligibility flag is `true`.
    #[default]
    #[serde(rename = "include", alias = "include-filtered", alias = "PS-Pairs")]
    IncludeFiltered,
    /// Rows whose eligibility flag is `false`.
    #[serde(rename = "exclude", alias = "exclude-filtered", alias = "not PS-Pairs")]
    ExcludeFiltered,
    /// Every row; the eligibility column is not consulted.
    #[serde(alias = "All")]
    All,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::IncludeFiltered => "include",
            FilterMode::ExcludeFiltered => "exclude",
            FilterMode::All => "all",
        }
    }

    /// Whether this mode reads the eligibility column at all.
    pub fn uses_eligibility(&self) -> bool {
        !matches!(self, FilterMode::All)
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            // `PS-Pairs` / `not PS-Pairs` name the modes after the usual
            // eligibility column of seismic metadata tables.
            "include" | "include-filtered" | "includefiltered" | "ps-pairs" => {
                Ok(FilterMode::IncludeFiltered)
            }
            "exclude" | "exclude-filtered" | "excludefiltered" | "not ps-pairs" => {
                Ok(FilterMode::ExcludeFiltered)
            }
            "all" => Ok(FilterMode::All),
            _ => Err(SplitError::UnsupportedMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Eligible subset selection
// ---------------------------------------------------------------------------

/// Return positions of records in the eligible subset, in table order.
///
/// For `IncludeFiltered` / `ExcludeFiltered` every record must carry a
/// boolean in `column`:
/// * column unknown to the table → [`SplitError::MissingColumn`]
/// * a record with a non-boolean (or missing) value → [`SplitError::NonBooleanEligibility`]
///
/// An empty table has an empty subset whatever the mode.
pub fn eligible_positions(
    table: &MetadataTable,
    column: &str,
    mode: FilterMode,
) -> Result<Vec<usize>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }
    if !mode.uses_eligibility() {
        return Ok((0..table.len()).collect());
    }
    let wanted = mode == FilterMode::IncludeFiltered;

    if !table.has_column(column) {
        return Err(SplitError::MissingColumn(column.to_string()));
    }

    // Validate every row before selecting so a bad row anywhere fails the call.
    let mut positions = Vec::new();
    for (pos, rec) in table.records.iter().enumerate() {
        let value = rec.get(column).unwrap_or(&MetadataValue::Null);
        match value.as_bool() {
            Some(flag) if flag == wanted => positions.push(pos),
            Some(_) => {}
            None => {
                return Err(SplitError::NonBooleanEligibility {
                    column: column.to_string(),
                    index: rec.index.clone(),
                    value: value.clone(),
                })
            }
        }
    }
    Ok(positions)
}
