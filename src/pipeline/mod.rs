//! Warehouse load pipeline.
//!
//! Orchestrates one load cycle: staging read, warehouse open (skipped on
//! reset), dimension build, fact validation and load, and commit. Stages
//! run strictly in that order and nothing on disk changes before commit. Blocking file work is moved off the async
//! runtime with `spawn_blocking`, one stage at a time.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use sales_warehouse::config::EtlConfig;
//! use sales_warehouse::pipeline::Pipeline;
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> sales_warehouse::error::Result<()> {
//! let config = EtlConfig::default()
//!     .with_staging_dir(Path::new("data/prepared"))
//!     .with_warehouse_dir(PathBuf::from("data/dw"));
//!
//! let summary = Pipeline::new(config).run().await?;
//! println!("{}", summary.summary());
//! # Ok(())
//! # }
//! ```

pub mod dimensions;
pub mod facts;

#[cfg(test)]
mod tests;

pub use dimensions::{DimensionStats, InsertCounts, build_dimensions};
pub use facts::{Classification, FactLoadSummary, ParsedSale, classify, load_facts};

use crate::config::EtlConfig;
use crate::error::Result;
use crate::models::StagingData;
use crate::staging::read_staging;
use crate::warehouse::{CommitOptions, TableCounts, Warehouse};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, info};

/// Result of the in-memory transform stages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformReport {
    pub dimensions: DimensionStats,
    pub facts: FactLoadSummary,
}

/// Build dimensions then load facts, without touching disk
pub fn transform(staging: &StagingData, warehouse: &mut Warehouse) -> Result<TransformReport> {
    let dimensions = build_dimensions(staging, warehouse);
    let facts = load_facts(&staging.sales, warehouse)?;
    Ok(TransformReport { dimensions, facts })
}

/// Everything a run reports back to its driver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub report: TransformReport,
    /// Committed table sizes
    pub counts: TableCounts,
    pub processing_time_ms: u128,
}

impl RunSummary {
    pub fn summary(&self) -> String {
        let facts = &self.report.facts;
        format!(
            "Load Summary: {} staged sales -> {} accepted, {} rejected, {} already loaded | \
             fact_sales: {} rows | fact_sales_reject: {} rows | new dimension rows: {}",
            facts.staged,
            facts.accepted,
            facts.rejected,
            facts.already_loaded,
            self.counts.sales,
            self.counts.rejects,
            self.report.dimensions.total_inserted()
        )
    }
}

/// Driver for one warehouse load cycle
pub struct Pipeline {
    config: EtlConfig,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(config: EtlConfig) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    /// Show a spinner with the current stage on stderr
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Run every stage and commit the warehouse
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        self.config.validate()?;
        debug!("Pipeline configuration: {:?}", self.config);

        let progress = self.progress_bar();
        let warehouse_dir = self.config.warehouse_dir.clone();

        progress.set_message("Reading staging tables");
        let paths = self.config.staging.clone();
        let staging = task::spawn_blocking(move || read_staging(&paths)).await??;

        // A reset starts from empty tables; the commit replaces every file
        let mut warehouse = if self.config.reset {
            info!(
                "Reset requested, rebuilding {} from staging only",
                warehouse_dir.display()
            );
            Warehouse::new()
        } else {
            progress.set_message("Opening warehouse");
            let dir = warehouse_dir.clone();
            task::spawn_blocking(move || Warehouse::open(&dir)).await??
        };

        progress.set_message("Building dimensions and loading facts");
        let report = transform(&staging, &mut warehouse)?;

        progress.set_message("Committing warehouse");
        let options = CommitOptions {
            compression: self.config.compression,
            enable_statistics: self.config.enable_statistics,
        };
        let dir = warehouse_dir.clone();
        let counts =
            task::spawn_blocking(move || warehouse.commit(&dir, &options)).await??;

        progress.finish_and_clear();

        let summary = RunSummary {
            report,
            counts,
            processing_time_ms: start_time.elapsed().as_millis(),
        };
        info!("{}", summary.summary());
        Ok(summary)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}
