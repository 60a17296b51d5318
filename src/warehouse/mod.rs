//! The star-schema warehouse: five dimensions, the fact table and the
//! reject table.
//!
//! All transform work runs against an in-memory [`Warehouse`]. Disk is
//! touched only by [`Warehouse::open`] and [`Warehouse::commit`]. A commit
//! writes every table to a pending file and renames them into place only
//! once all writes have succeeded, so a failed run never leaves a
//! half-loaded fact or reject table behind.
//!
//! Each rename is atomic on its own; the set of seven is not. If a rename
//! fails partway, the tables renamed before it hold the new rows and the
//! rest keep their previous contents.

pub mod frames;

use crate::config::CompressionAlgorithm;
use crate::constants::{PENDING_SUFFIX, TABLE_EXTENSION, tables};
use crate::error::{EtlError, Result};
use crate::models::{
    DimCampaign, DimCustomer, DimDate, DimProduct, DimStore, FactSale, FactSaleReject,
};
use crate::store::Table;
use frames::TableRecord;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Parquet settings applied on commit
#[derive(Debug, Clone, Copy)]
pub struct CommitOptions {
    pub compression: CompressionAlgorithm,
    pub enable_statistics: bool,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            compression: CompressionAlgorithm::Snappy,
            enable_statistics: true,
        }
    }
}

/// Row counts for every warehouse table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub customers: usize,
    pub products: usize,
    pub stores: usize,
    pub campaigns: usize,
    pub dates: usize,
    pub sales: usize,
    pub rejects: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Warehouse {
    pub customers: Table<DimCustomer>,
    pub products: Table<DimProduct>,
    pub stores: Table<DimStore>,
    pub campaigns: Table<DimCampaign>,
    pub dates: Table<DimDate>,
    pub sales: Table<FactSale>,
    pub rejects: Table<FactSaleReject>,
}

impl Warehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of a committed table inside a warehouse directory
    pub fn table_path(dir: &Path, table: &str) -> PathBuf {
        dir.join(format!("{}.{}", table, TABLE_EXTENSION))
    }

    fn pending_path(dir: &Path, table: &str) -> PathBuf {
        dir.join(format!("{}.{}.{}", table, TABLE_EXTENSION, PENDING_SUFFIX))
    }

    /// Load every committed table. Tables without a file start empty.
    pub fn open(dir: &Path) -> Result<Self> {
        let warehouse = Self {
            customers: load_table(dir)?,
            products: load_table(dir)?,
            stores: load_table(dir)?,
            campaigns: load_table(dir)?,
            dates: load_table(dir)?,
            sales: load_table(dir)?,
            rejects: load_table(dir)?,
        };

        debug!(
            "Opened warehouse at {}: {:?}",
            dir.display(),
            warehouse.counts()
        );
        Ok(warehouse)
    }

    /// Persist every table. No table is replaced unless all seven writes succeed.
    pub fn commit(&self, dir: &Path, options: &CommitOptions) -> Result<TableCounts> {
        std::fs::create_dir_all(dir)?;
        discard_pending(dir);

        let written = self.write_pending(dir, options);
        if let Err(e) = written {
            discard_pending(dir);
            return Err(EtlError::CommitFailed {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            });
        }

        for table in tables::ALL {
            let pending = Self::pending_path(dir, table);
            let target = Self::table_path(dir, table);
            if let Err(e) = std::fs::rename(&pending, &target) {
                discard_pending(dir);
                return Err(EtlError::CommitFailed {
                    path: target,
                    reason: format!("rename failed: {}", e),
                });
            }
        }

        let counts = self.counts();
        info!("Committed warehouse at {}: {:?}", dir.display(), counts);
        Ok(counts)
    }

    fn write_pending(&self, dir: &Path, options: &CommitOptions) -> Result<()> {
        write_table(&self.customers, dir, options)?;
        write_table(&self.products, dir, options)?;
        write_table(&self.stores, dir, options)?;
        write_table(&self.campaigns, dir, options)?;
        write_table(&self.dates, dir, options)?;
        write_table(&self.sales, dir, options)?;
        write_table(&self.rejects, dir, options)?;
        Ok(())
    }

    pub fn counts(&self) -> TableCounts {
        TableCounts {
            customers: self.customers.len(),
            products: self.products.len(),
            stores: self.stores.len(),
            campaigns: self.campaigns.len(),
            dates: self.dates.len(),
            sales: self.sales.len(),
            rejects: self.rejects.len(),
        }
    }
}

fn load_table<R: TableRecord>(dir: &Path) -> Result<Table<R>> {
    let path = Warehouse::table_path(dir, R::TABLE);
    if !path.exists() {
        debug!("No committed {} table, starting empty", R::TABLE);
        return Ok(Table::new());
    }

    let corrupt = |reason: String| EtlError::CorruptTable {
        table: R::TABLE.to_string(),
        path: path.clone(),
        reason,
    };

    let file = File::open(&path)?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| corrupt(e.to_string()))?;
    let rows = R::from_frame(&df).map_err(|e| corrupt(e.to_string()))?;

    debug!("Loaded {} rows into {}", rows.len(), R::TABLE);
    Ok(Table::from_rows(rows))
}

fn write_table<R: TableRecord>(
    table: &Table<R>,
    dir: &Path,
    options: &CommitOptions,
) -> Result<()> {
    let rows: Vec<&R> = table.iter().collect();
    let mut df = R::to_frame(&rows)?;

    let path = Warehouse::pending_path(dir, R::TABLE);
    let file = File::create(&path)?;
    let statistics = if options.enable_statistics {
        StatisticsOptions::default()
    } else {
        StatisticsOptions::empty()
    };

    ParquetWriter::new(file)
        .with_compression(options.compression.to_polars_compression())
        .with_statistics(statistics)
        .finish(&mut df)?;

    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

fn discard_pending(dir: &Path) {
    for table in tables::ALL {
        let pending = Warehouse::pending_path(dir, table);
        if pending.exists() {
            if let Err(e) = std::fs::remove_file(&pending) {
                warn!(
                    "Failed to remove pending table file {}: {}",
                    pending.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::PaidWithPoints;
    use crate::models::RejectReason;
    use crate::store::KeyedStore;
    use tempfile::TempDir;

    fn sample_warehouse() -> Warehouse {
        let mut wh = Warehouse::new();
        wh.customers.insert_if_absent(DimCustomer {
            customer_key: 1,
            customer_name: Some("Ada".to_string()),
            region: None,
            join_date: Some("2021-02-03".to_string()),
            member_points: Some(120),
            member_status: Some("Gold".to_string()),
            preferred_contact: None,
        });
        wh.products.insert_if_absent(DimProduct {
            product_key: 1,
            product_name: Some("Laptop".to_string()),
            category: Some("Electronics".to_string()),
            unit_price: Some(793.12),
            year_released: Some(2020),
            month_purchased: None,
            ordering_sku: Some("SKU-1".to_string()),
            supplier_name: None,
        });
        wh.stores.insert_if_absent(DimStore::placeholder(3));
        wh.campaigns.insert_if_absent(DimCampaign::placeholder(2));
        wh.dates.insert_if_absent(DimDate {
            date_key: 20240315,
            full_date: "2024-03-15".to_string(),
            day: 15,
            month: 3,
            year: 2024,
            quarter: 1,
            week: 11,
            day_of_week: "Friday".to_string(),
        });
        wh.sales.insert_if_absent(FactSale {
            transaction_id: 550,
            date_key: 20240315,
            customer_key: 1,
            product_key: 1,
            store_key: Some(3),
            campaign_key: None,
            sale_date: "3/15/2024".to_string(),
            sale_amount: Some(100.0),
            discount_percent: None,
            paid_with_points: PaidWithPoints::Yes,
        });
        wh.rejects.insert_if_absent(FactSaleReject {
            transaction_id: 551,
            date_key: Some(20240315),
            customer_key: Some(999),
            product_key: Some(1),
            store_key: Some(3),
            campaign_key: Some(2),
            sale_date: "3/15/2024".to_string(),
            sale_amount: Some(5.5),
            discount_percent: Some(10.0),
            paid_with_points: PaidWithPoints::No,
            reject_reason: RejectReason::CustomerKeyNotFound,
        });
        wh
    }

    #[test]
    fn test_open_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let wh = Warehouse::open(&dir.path().join("dw")).unwrap();
        assert_eq!(wh.counts(), TableCounts::default());
    }

    #[test]
    fn test_commit_then_open_preserves_rows() {
        let dir = TempDir::new().unwrap();
        let wh = sample_warehouse();

        let counts = wh.commit(dir.path(), &CommitOptions::default()).unwrap();
        assert_eq!(counts.sales, 1);
        assert_eq!(counts.rejects, 1);

        for table in tables::ALL {
            assert!(Warehouse::table_path(dir.path(), table).exists());
            assert!(!Warehouse::pending_path(dir.path(), table).exists());
        }

        let reopened = Warehouse::open(dir.path()).unwrap();
        assert_eq!(reopened.counts(), wh.counts());
        assert_eq!(reopened.customers.get(1), wh.customers.get(1));
        assert_eq!(reopened.products.get(1), wh.products.get(1));
        assert_eq!(reopened.dates.get(20240315), wh.dates.get(20240315));
        assert_eq!(reopened.sales.get(550), wh.sales.get(550));
        assert_eq!(reopened.rejects.get(551), wh.rejects.get(551));
    }

    #[test]
    fn test_commit_with_other_compression() {
        let dir = TempDir::new().unwrap();
        let options = CommitOptions {
            compression: CompressionAlgorithm::Zstd,
            enable_statistics: false,
        };
        sample_warehouse().commit(dir.path(), &options).unwrap();
        assert_eq!(Warehouse::open(dir.path()).unwrap().counts().stores, 1);
    }

    #[test]
    fn test_commit_replaces_tables_and_clears_stale_pending() {
        let dir = TempDir::new().unwrap();
        sample_warehouse()
            .commit(dir.path(), &CommitOptions::default())
            .unwrap();
        let stale = Warehouse::pending_path(dir.path(), tables::FACT_SALES);
        std::fs::write(&stale, b"left by an earlier run").unwrap();

        let counts = Warehouse::new()
            .commit(dir.path(), &CommitOptions::default())
            .unwrap();

        assert_eq!(counts, TableCounts::default());
        assert!(!stale.exists());
        assert_eq!(
            Warehouse::open(dir.path()).unwrap().counts(),
            TableCounts::default()
        );
    }

    #[test]
    fn test_failed_rename_discards_remaining_pending_files() {
        let dir = TempDir::new().unwrap();
        // A directory at a table path makes that rename fail
        let blocked = Warehouse::table_path(dir.path(), tables::FACT_SALES);
        std::fs::create_dir_all(blocked.join("occupied")).unwrap();

        let err = sample_warehouse()
            .commit(dir.path(), &CommitOptions::default())
            .unwrap_err();

        assert!(matches!(err, EtlError::CommitFailed { .. }));
        for table in tables::ALL {
            assert!(!Warehouse::pending_path(dir.path(), table).exists());
        }
    }

    #[test]
    fn test_corrupt_table_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            Warehouse::table_path(dir.path(), tables::DIM_STORE),
            b"not parquet",
        )
        .unwrap();

        let err = Warehouse::open(dir.path()).unwrap_err();
        assert!(matches!(err, EtlError::CorruptTable { ref table, .. } if table == "dim_store"));
    }
}
