use std::collections::BTreeMap;

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::label::SplitLabel;
use super::proportions::{Proportions, SplitSizes};
use crate::config::{SplitConfig, DEFAULT_ELIGIBLE_COLUMN, DEFAULT_SPLIT_COLUMN};
use crate::data::filter::{eligible_positions, FilterMode};
use crate::data::model::{MetadataTable, MetadataValue};
use crate::error::{Result, SplitError};

// ---------------------------------------------------------------------------
// SplitAssignment – the result of a split, detached from the table
// ---------------------------------------------------------------------------

/// One label per table row, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitAssignment {
    index: Vec<MetadataValue>,
    labels: Vec<SplitLabel>,
    sizes: SplitSizes,
}

impl SplitAssignment {
    /// Sizes computed for the eligible subset.
    pub fn sizes(&self) -> SplitSizes {
        self.sizes
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[SplitLabel] {
        &self.labels
    }

    /// `(row index, label)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&MetadataValue, SplitLabel)> + '_ {
        self.index.iter().zip(self.labels.iter().copied())
    }

    pub fn label_for(&self, index: &MetadataValue) -> Option<SplitLabel> {
        self.iter().find(|(i, _)| *i == index).map(|(_, l)| l)
    }

    /// Table positions carrying `label`.
    pub fn positions(&self, label: SplitLabel) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == label)
            .map(|(p, _)| p)
            .collect()
    }

    pub fn count(&self, label: SplitLabel) -> usize {
        self.labels.iter().filter(|l| **l == label).count()
    }

    pub fn to_map(&self) -> BTreeMap<MetadataValue, SplitLabel> {
        self.iter().map(|(i, l)| (i.clone(), l)).collect()
    }

    /// Write the labels into `column` of `table`.
    ///
    /// The column is reset to `Undefined` on every row first. The table must
    /// be the one the assignment was computed from (same rows, same order),
    /// and `column` must not be its index column.
    pub fn apply(&self, table: &mut MetadataTable, column: &str) -> Result<()> {
        if table.index_name.as_deref() == Some(column) {
            return Err(SplitError::ColumnConflict {
                column: column.to_string(),
                role: "index",
            });
        }
        if table.len() != self.len() {
            return Err(SplitError::AssignmentMismatch(format!(
                "assignment has {} rows, table has {}",
                self.len(),
                table.len()
            )));
        }
        if let Some((pos, rec)) = table
            .records
            .iter()
            .enumerate()
            .find(|(pos, rec)| rec.index != self.index[*pos])
        {
            return Err(SplitError::AssignmentMismatch(format!(
                "row {pos} has index {} but assignment expects {}",
                rec.index, self.index[pos]
            )));
        }

        table.set_column(column, SplitLabel::Undefined.into());
        for label in SplitLabel::ASSIGNED {
            table.assign(column, &self.positions(label), label.into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Splitter
// ---------------------------------------------------------------------------

/// Partitions the eligible rows of a table into train / dev / test.
///
/// Sizes are `floor(n * train)` and `floor(n * dev)`, with `test` taking the
/// remainder. With shuffling enabled the eligible rows are permuted first;
/// the same seed always yields the same permutation. Without shuffling the
/// split is a prefix partition of the eligible rows in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct Splitter {
    mode: FilterMode,
    proportions: Proportions,
    shuffle: bool,
    seed: Option<u64>,
    eligible_column: String,
    split_column: String,
}

impl Default for Splitter {
    fn default() -> Self {
        Splitter::new(Proportions::default())
    }
}

impl Splitter {
    pub fn new(proportions: Proportions) -> Self {
        Splitter {
            mode: FilterMode::default(),
            proportions,
            shuffle: true,
            seed: None,
            eligible_column: DEFAULT_ELIGIBLE_COLUMN.to_string(),
            split_column: DEFAULT_SPLIT_COLUMN.to_string(),
        }
    }

    pub fn from_config(config: &SplitConfig) -> Self {
        Splitter {
            mode: config.mode,
            proportions: config.proportions,
            shuffle: config.shuffle,
            seed: config.seed,
            eligible_column: config.eligible_column.clone(),
            split_column: config.split_column.clone(),
        }
    }

    pub fn mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn eligible_column(mut self, column: impl Into<String>) -> Self {
        self.eligible_column = column.into();
        self
    }

    pub fn split_column(mut self, column: impl Into<String>) -> Self {
        self.split_column = column.into();
        self
    }

    /// Compute the assignment for `table` without touching it.
    ///
    /// Shuffling uses a ChaCha8 generator seeded from the configured seed,
    /// or from a fresh random seed (logged at debug level) when none is set.
    pub fn assign(&self, table: &MetadataTable) -> Result<SplitAssignment> {
        if !self.shuffle {
            return self.assign_inner(table, None);
        }
        let seed = self.seed.unwrap_or_else(rand::random);
        debug!("Shuffling with seed {seed}");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.assign_inner(table, Some(&mut rng as &mut dyn RngCore))
    }

    /// Same as [`Splitter::assign`] but shuffles with the given random
    /// source. The configured seed is ignored; `rng` is not used when
    /// shuffling is disabled.
    pub fn assign_with_rng<R: Rng>(
        &self,
        table: &MetadataTable,
        rng: &mut R,
    ) -> Result<SplitAssignment> {
        if self.shuffle {
            self.assign_inner(table, Some(rng as &mut dyn RngCore))
        } else {
            self.assign_inner(table, None)
        }
    }

    /// Compute the assignment and write it into the split column of `table`.
    ///
    /// Nothing is written when validation fails.
    pub fn split(&self, table: &mut MetadataTable) -> Result<SplitSizes> {
        let assignment = self.assign(table)?;
        assignment.apply(table, &self.split_column)?;
        Ok(assignment.sizes())
    }

    fn assign_inner(
        &self,
        table: &MetadataTable,
        rng: Option<&mut dyn RngCore>,
    ) -> Result<SplitAssignment> {
        self.proportions.validate()?;
        check_split_column(
            &self.split_column,
            &self.eligible_column,
            table.index_name.as_deref(),
        )?;
        let mut positions = eligible_positions(table, &self.eligible_column, self.mode)?;

        let n = positions.len();
        info!("Number of selected samples: {n}");
        let sizes = self.proportions.partition(n);
        debug!(
            "Split sizes ({} mode): train={} dev={} test={}",
            self.mode, sizes.train, sizes.dev, sizes.test
        );

        if let Some(rng) = rng {
            positions.shuffle(rng);
        }

        let mut labels = vec![SplitLabel::Undefined; table.len()];
        let (train, rest) = positions.split_at(sizes.train);
        let (dev, test) = rest.split_at(sizes.dev);
        for (slice, label) in [
            (train, SplitLabel::Train),
            (dev, SplitLabel::Dev),
            (test, SplitLabel::Test),
        ] {
            for &p in slice {
                labels[p] = label;
            }
        }

        Ok(SplitAssignment {
            index: table.records.iter().map(|r| r.index.clone()).collect(),
            labels,
            sizes,
        })
    }
}

/// The split column must differ from the eligibility column and from the
/// index column, whatever the filter mode.
pub fn check_split_column(
    split_column: &str,
    eligible_column: &str,
    index_column: Option<&str>,
) -> Result<()> {
    let role = if split_column == eligible_column {
        "eligibility"
    } else if index_column == Some(split_column) {
        "index"
    } else {
        return Ok(());
    };
    Err(SplitError::ColumnConflict {
        column: split_column.to_string(),
        role,
    })
}
