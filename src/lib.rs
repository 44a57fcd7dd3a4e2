//! Reproducible train/dev/test splitting of sample metadata tables.
//!
//! ```no_run
//! use std::path::Path;
//! use rusty_split::{load_file, FilterMode, Proportions, Splitter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut table = load_file(Path::new("metadata.csv"), Some("trace_name"))?;
//! let sizes = Splitter::new(Proportions::new(0.8, 0.1, 0.1))
//!     .mode(FilterMode::IncludeFiltered)
//!     .eligible_column("PS-pairs")
//!     .seed(Some(42))
//!     .split(&mut table)?;
//! println!("{} train / {} dev / {} test", sizes.train, sizes.dev, sizes.test);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod split;
pub mod system;

pub use config::SplitConfig;
pub use data::filter::FilterMode;
pub use data::loader::load_file;
pub use data::model::{MetadataTable, MetadataValue, Record};
pub use data::writer::write_file;
pub use error::{Result, SplitError};
pub use split::{Proportions, SplitAssignment, SplitLabel, SplitSizes, Splitter};
pub use system::CpuSummary;
