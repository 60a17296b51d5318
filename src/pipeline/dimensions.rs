//! Dimension builders.
//!
//! Customer and product rows are projected straight from their staging
//! tables. Store, campaign and date rows have no staging table of their
//! own and are derived from the distinct values referenced by staging
//! sales. Every insert is first-write-wins, so rebuilding from the same
//! staging data leaves the tables unchanged.

use crate::coerce::{
    IdCoercion, blank_to_none, coerce_identifier, parse_optional_f64, parse_optional_i64,
};
use crate::dates::CalendarDate;
use crate::models::{
    DimCampaign, DimCustomer, DimDate, DimProduct, DimStore, StagingCustomer, StagingData,
    StagingProduct, StagingSale,
};
use crate::store::{Insert, KeyedStore, Table};
use crate::warehouse::Warehouse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Insert outcomes for one dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertCounts {
    pub inserted: usize,
    pub existing: usize,
}

impl InsertCounts {
    fn record(&mut self, outcome: Insert) {
        match outcome {
            Insert::Inserted => self.inserted += 1,
            Insert::AlreadyPresent => self.existing += 1,
        }
    }
}

/// Statistics for one dimension build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionStats {
    pub customers: InsertCounts,
    pub products: InsertCounts,
    pub stores: InsertCounts,
    pub campaigns: InsertCounts,
    pub dates: InsertCounts,
    /// Staging customers or products whose identifier could not be keyed
    pub unkeyed_rows: usize,
    /// Customer join dates present but malformed, loaded as no value
    pub invalid_join_dates: usize,
    /// Distinct sale date texts excluded from the date dimension
    pub invalid_sale_dates: usize,
    /// Distinct non-blank campaign texts that did not coerce
    pub malformed_campaigns: usize,
}

impl DimensionStats {
    pub fn total_inserted(&self) -> usize {
        self.customers.inserted
            + self.products.inserted
            + self.stores.inserted
            + self.campaigns.inserted
            + self.dates.inserted
    }
}

/// Build all five dimensions from staging data
pub fn build_dimensions(staging: &StagingData, warehouse: &mut Warehouse) -> DimensionStats {
    let mut stats = DimensionStats::default();

    build_customers(&staging.customers, &mut warehouse.customers, &mut stats);
    build_products(&staging.products, &mut warehouse.products, &mut stats);
    build_stores(&staging.sales, &mut warehouse.stores, &mut stats);
    build_campaigns(&staging.sales, &mut warehouse.campaigns, &mut stats);
    build_dates(&staging.sales, &mut warehouse.dates, &mut stats);

    info!(
        "Dimensions built: {} new rows (customers {}, products {}, stores {}, campaigns {}, dates {})",
        stats.total_inserted(),
        stats.customers.inserted,
        stats.products.inserted,
        stats.stores.inserted,
        stats.campaigns.inserted,
        stats.dates.inserted
    );

    stats
}

pub fn build_customers(
    rows: &[StagingCustomer],
    table: &mut Table<DimCustomer>,
    stats: &mut DimensionStats,
) {
    for (index, row) in rows.iter().enumerate() {
        let Some(customer_key) = coerce_identifier(&row.customer_id).value() else {
            warn!(
                "Skipping staging customer {}: unusable CustomerID '{}'",
                index, row.customer_id
            );
            stats.unkeyed_rows += 1;
            continue;
        };

        let join_date = match CalendarDate::parse(&row.join_date) {
            Ok(date) => date.map(|d| d.iso()),
            Err(e) => {
                debug!("Customer {}: {}", customer_key, e);
                stats.invalid_join_dates += 1;
                None
            }
        };

        let outcome = table.insert_if_absent(DimCustomer {
            customer_key,
            customer_name: blank_to_none(&row.name),
            region: blank_to_none(&row.region),
            join_date,
            member_points: parse_optional_i64(&row.member_points),
            member_status: blank_to_none(&row.member_status),
            preferred_contact: blank_to_none(&row.preferred_contact),
        });
        stats.customers.record(outcome);
    }
}

pub fn build_products(
    rows: &[StagingProduct],
    table: &mut Table<DimProduct>,
    stats: &mut DimensionStats,
) {
    for (index, row) in rows.iter().enumerate() {
        let Some(product_key) = coerce_identifier(&row.product_id).value() else {
            warn!(
                "Skipping staging product {}: unusable ProductID '{}'",
                index, row.product_id
            );
            stats.unkeyed_rows += 1;
            continue;
        };

        let outcome = table.insert_if_absent(DimProduct {
            product_key,
            product_name: blank_to_none(&row.product_name),
            category: blank_to_none(&row.category),
            unit_price: parse_optional_f64(&row.unit_price),
            year_released: parse_optional_i64(&row.year_released),
            month_purchased: blank_to_none(&row.month_purchased),
            ordering_sku: blank_to_none(&row.ordering_sku),
            supplier_name: blank_to_none(&row.supplier_name),
        });
        stats.products.record(outcome);
    }
}

/// Distinct store identifiers referenced by sales
pub fn build_stores(sales: &[StagingSale], table: &mut Table<DimStore>, stats: &mut DimensionStats) {
    let keys: BTreeSet<i64> = sales
        .iter()
        .filter_map(|sale| coerce_identifier(&sale.store_id).value())
        .collect();

    for key in keys {
        stats.stores.record(table.insert_if_absent(DimStore::placeholder(key)));
    }
}

/// Distinct campaign identifiers referenced by sales. Blank and malformed
/// identifiers are excluded, matching how the fact loader reads them.
pub fn build_campaigns(
    sales: &[StagingSale],
    table: &mut Table<DimCampaign>,
    stats: &mut DimensionStats,
) {
    let mut keys = BTreeSet::new();
    let mut malformed = BTreeSet::new();

    for sale in sales {
        match coerce_identifier(&sale.campaign_id) {
            IdCoercion::Value(key) => {
                keys.insert(key);
            }
            IdCoercion::Blank => {}
            IdCoercion::Malformed => {
                malformed.insert(sale.campaign_id.trim());
            }
        }
    }

    if !malformed.is_empty() {
        warn!(
            "Treating {} malformed campaign identifiers as absent: {:?}",
            malformed.len(),
            malformed
        );
    }
    stats.malformed_campaigns += malformed.len();

    for key in keys {
        stats
            .campaigns
            .record(table.insert_if_absent(DimCampaign::placeholder(key)));
    }
}

/// Distinct parseable sale dates. Unparseable dates are left out; the
/// owning sales are rejected later as `date_key_not_found`.
pub fn build_dates(sales: &[StagingSale], table: &mut Table<DimDate>, stats: &mut DimensionStats) {
    let texts: BTreeSet<&str> = sales.iter().map(|sale| sale.sale_date.trim()).collect();
    let mut dates = BTreeSet::new();

    for text in texts {
        match CalendarDate::parse(text) {
            Ok(Some(date)) => {
                dates.insert(date);
            }
            Ok(None) => {}
            Err(e) => {
                debug!("Excluding sale date from date dimension: {}", e);
                stats.invalid_sale_dates += 1;
            }
        }
    }

    for date in dates {
        stats.dates.record(table.insert_if_absent(date_row(&date)));
    }
}

/// Date dimension row for a calendar date
pub fn date_row(date: &CalendarDate) -> DimDate {
    DimDate {
        date_key: date.key(),
        full_date: date.iso(),
        day: date.day() as i32,
        month: date.month() as i32,
        year: date.year(),
        quarter: date.quarter() as i32,
        week: date.iso_week() as i32,
        day_of_week: date.weekday_name().to_string(),
    }
}
