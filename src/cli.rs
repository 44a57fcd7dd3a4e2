//! Command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use crate::config::SplitConfig;
use crate::data::filter::FilterMode;
use crate::data::loader::load_file;
use crate::data::model::MetadataValue;
use crate::data::writer::write_file;
use crate::split::{SplitLabel, Splitter};
use crate::system::CpuSummary;

/// Rusty Split - reproducible train/dev/test splits of sample metadata.
#[derive(Debug, Parser)]
#[command(name = "rusty-split")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Label every row of a metadata table as train, dev, test or Undefined.
    Split(SplitArgs),
    /// Print CPU model and core counts.
    CpuInfo,
}

#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Input table (.csv, .json or .parquet)
    pub input: PathBuf,

    /// Output table; format follows the extension
    #[arg(short, long)]
    pub output: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Rows to split: include (eligible), exclude (not eligible) or all
    #[arg(short, long)]
    pub mode: Option<FilterMode>,

    /// Fraction of selected rows for training
    #[arg(long)]
    pub train: Option<f64>,

    /// Fraction of selected rows for validation
    #[arg(long)]
    pub dev: Option<f64>,

    /// Fraction of selected rows for testing
    #[arg(long)]
    pub test: Option<f64>,

    /// Keep table order instead of shuffling
    #[arg(long)]
    pub no_shuffle: bool,

    /// Seed for reproducible shuffling
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Boolean column that decides eligibility (default: eligible)
    #[arg(long)]
    pub eligible_column: Option<String>,

    /// Column holding the row index (default: row position)
    #[arg(long)]
    pub index_column: Option<String>,

    /// Column to write labels to (default: split)
    #[arg(long)]
    pub split_column: Option<String>,
}

impl SplitArgs {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<SplitConfig> {
        let mut config = match &self.config {
            Some(path) => SplitConfig::from_file(path)?,
            None => SplitConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(train) = self.train {
            config.proportions.train = train;
        }
        if let Some(dev) = self.dev {
            config.proportions.dev = dev;
        }
        if let Some(test) = self.test {
            config.proportions.test = test;
        }
        if self.no_shuffle {
            config.shuffle = false;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(column) = &self.eligible_column {
            config.eligible_column = column.clone();
        }
        if let Some(column) = &self.split_column {
            config.split_column = column.clone();
        }
        if self.index_column.is_some() {
            config.index_column = self.index_column.clone();
        }
        Ok(config)
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    execute(Cli::parse())
}

/// Execute already-parsed arguments.
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Split(args) => split_command(&args),
        Commands::CpuInfo => {
            print!("{}", CpuSummary::detect());
            Ok(())
        }
    }
}

fn split_command(args: &SplitArgs) -> Result<()> {
    let config = args.resolve_config()?;
    // Check the configuration before reading a potentially large input.
    config.validate()?;

    let mut table = load_file(&args.input, config.index_column.as_deref())
        .with_context(|| format!("loading {}", args.input.display()))?;
    info!("Loaded {} rows from {}", table.len(), args.input.display());

    let sizes = Splitter::from_config(&config).split(&mut table)?;

    let counts = table.value_counts(&config.split_column);
    println!("Selected samples ({} mode): {}", config.mode, sizes.total());
    for label in [
        SplitLabel::Train,
        SplitLabel::Dev,
        SplitLabel::Test,
        SplitLabel::Undefined,
    ] {
        let n = counts
            .get(&MetadataValue::from(label))
            .copied()
            .unwrap_or(0);
        println!("  {:<10} {n}", label.as_str());
    }

    write_file(&table, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("Saved to: {}", args.output.display());
    Ok(())
}
