//! Configuration management and validation.
//!
//! Provides the staging file layout, warehouse location and Parquet
//! output settings for a pipeline run.

use crate::constants::{DEFAULT_CUSTOMERS_FILE, DEFAULT_PRODUCTS_FILE, DEFAULT_SALES_FILE};
use crate::error::{EtlError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported compression algorithms for warehouse tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snappy" => Ok(CompressionAlgorithm::Snappy),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            "lz4" => Ok(CompressionAlgorithm::Lz4),
            "none" | "uncompressed" => Ok(CompressionAlgorithm::Uncompressed),
            other => Err(EtlError::Configuration {
                message: format!(
                    "Unknown compression '{}' (expected snappy, zstd, lz4 or none)",
                    other
                ),
            }),
        }
    }
}

/// Locations of the three staging extracts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingPaths {
    pub customers: PathBuf,
    pub products: PathBuf,
    pub sales: PathBuf,
}

impl StagingPaths {
    /// Default file names inside one staging directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            customers: dir.join(DEFAULT_CUSTOMERS_FILE),
            products: dir.join(DEFAULT_PRODUCTS_FILE),
            sales: dir.join(DEFAULT_SALES_FILE),
        }
    }
}

/// Global configuration for a warehouse load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Staging extract locations
    pub staging: StagingPaths,

    /// Directory holding the warehouse tables
    pub warehouse_dir: PathBuf,

    /// Drop every warehouse table before loading
    pub reset: bool,

    /// Compression for committed tables
    pub compression: CompressionAlgorithm,

    /// Write column statistics into Parquet files
    pub enable_statistics: bool,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            staging: StagingPaths::in_dir(Path::new("data/prepared")),
            warehouse_dir: PathBuf::from("data/dw"),
            reset: false,
            compression: CompressionAlgorithm::Snappy,
            enable_statistics: true,
        }
    }
}

impl EtlConfig {
    /// Read staging extracts from a directory using the default file names
    pub fn with_staging_dir(mut self, dir: &Path) -> Self {
        self.staging = StagingPaths::in_dir(dir);
        self
    }

    pub fn with_customers_file(mut self, path: PathBuf) -> Self {
        self.staging.customers = path;
        self
    }

    pub fn with_products_file(mut self, path: PathBuf) -> Self {
        self.staging.products = path;
        self
    }

    pub fn with_sales_file(mut self, path: PathBuf) -> Self {
        self.staging.sales = path;
        self
    }

    pub fn with_warehouse_dir(mut self, dir: PathBuf) -> Self {
        self.warehouse_dir = dir;
        self
    }

    /// Drop existing tables before the run
    pub fn with_reset(mut self) -> Self {
        self.reset = true;
        self
    }

    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    /// Reject configurations that cannot describe a run
    pub fn validate(&self) -> Result<()> {
        let staging = [
            &self.staging.customers,
            &self.staging.products,
            &self.staging.sales,
        ];
        if staging.iter().any(|p| p.starts_with(&self.warehouse_dir)) {
            return Err(EtlError::Configuration {
                message: format!(
                    "Staging files must live outside the warehouse directory {}",
                    self.warehouse_dir.display()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_parsing() {
        assert_eq!(
            "ZSTD".parse::<CompressionAlgorithm>().unwrap(),
            CompressionAlgorithm::Zstd
        );
        assert_eq!(
            "none".parse::<CompressionAlgorithm>().unwrap(),
            CompressionAlgorithm::Uncompressed
        );
        assert!("brotli".parse::<CompressionAlgorithm>().is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let config = EtlConfig::default()
            .with_staging_dir(Path::new("/in"))
            .with_sales_file(PathBuf::from("/other/sales.csv"))
            .with_warehouse_dir(PathBuf::from("/out"))
            .with_reset();

        assert_eq!(
            config.staging.customers,
            PathBuf::from("/in/customers_prepared.csv")
        );
        assert_eq!(config.staging.sales, PathBuf::from("/other/sales.csv"));
        assert!(config.reset);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_staging_inside_warehouse_is_rejected() {
        let config = EtlConfig::default()
            .with_staging_dir(Path::new("/dw/staging"))
            .with_warehouse_dir(PathBuf::from("/dw"));
        assert!(config.validate().is_err());
    }
}
