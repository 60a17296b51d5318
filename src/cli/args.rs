//! Command-line argument definitions for the warehouse loader
//!
//! Defines the CLI interface using the clap derive API.

use crate::config::{CompressionAlgorithm, EtlConfig};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the Smart Sales warehouse loader
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sales-warehouse",
    version,
    about = "Load the Smart Sales star-schema warehouse from staging CSV extracts",
    long_about = "Reads the prepared customer, product and sales extracts, derives the \
                  dimension tables, validates every sale against them and stores accepted \
                  sales and rejects (with a reason) as Parquet tables in the warehouse directory."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Load staging extracts into the warehouse
    Run(RunArgs),
    /// Print table sizes and reject reasons of an existing warehouse
    Summary(SummaryArgs),
}

/// Arguments for the run command
#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// Directory holding customers_prepared.csv, products_prepared.csv
    /// and sales_prepared.csv
    #[arg(
        short = 's',
        long = "staging",
        value_name = "PATH",
        default_value = "data/prepared"
    )]
    pub staging_dir: PathBuf,

    /// Override the customers extract location
    #[arg(long = "customers", value_name = "FILE")]
    pub customers_file: Option<PathBuf>,

    /// Override the products extract location
    #[arg(long = "products", value_name = "FILE")]
    pub products_file: Option<PathBuf>,

    /// Override the sales extract location
    #[arg(long = "sales", value_name = "FILE")]
    pub sales_file: Option<PathBuf>,

    /// Directory for the warehouse Parquet tables, created if missing
    #[arg(
        short = 'w',
        long = "warehouse",
        value_name = "PATH",
        default_value = "data/dw"
    )]
    pub warehouse_dir: PathBuf,

    /// Drop every warehouse table before loading
    #[arg(long)]
    pub reset: bool,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long, default_value = "snappy")]
    pub compression: String,

    /// Skip column statistics in the written Parquet files
    #[arg(long)]
    pub no_statistics: bool,
}

/// Arguments for the summary command
#[derive(Debug, Clone, Parser)]
pub struct SummaryArgs {
    /// Warehouse directory to inspect
    #[arg(
        short = 'w',
        long = "warehouse",
        value_name = "PATH",
        default_value = "data/dw"
    )]
    pub warehouse_dir: PathBuf,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Spinners are hidden in quiet mode
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl RunArgs {
    /// Build the pipeline configuration from the command line
    pub fn to_config(&self) -> Result<EtlConfig> {
        let compression: CompressionAlgorithm = self.compression.parse()?;

        let mut config = EtlConfig::default()
            .with_staging_dir(&self.staging_dir)
            .with_warehouse_dir(self.warehouse_dir.clone())
            .with_compression(compression);

        if let Some(path) = &self.customers_file {
            config = config.with_customers_file(path.clone());
        }
        if let Some(path) = &self.products_file {
            config = config.with_products_file(path.clone());
        }
        if let Some(path) = &self.sales_file {
            config = config.with_sales_file(path.clone());
        }
        if self.reset {
            config = config.with_reset();
        }
        config.enable_statistics = !self.no_statistics;

        Ok(config)
    }
}
