//! Staging CSV reader.
//!
//! Reads the three staging extracts with every column kept as text, so
//! that blank cells, float-formatted identifiers and free-text dates reach
//! the transform stages untouched. Header names are matched after trimming.

use crate::config::StagingPaths;
use crate::constants::{customer_columns, product_columns, sale_columns};
use crate::error::{EtlError, Result};
use crate::models::{StagingCustomer, StagingData, StagingProduct, StagingSale};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Read all three staging datasets
pub fn read_staging(paths: &StagingPaths) -> Result<StagingData> {
    let customers = read_customers(&paths.customers)?;
    let products = read_products(&paths.products)?;
    let sales = read_sales(&paths.sales)?;

    info!(
        "Staging rows: {} customers, {} products, {} sales",
        customers.len(),
        products.len(),
        sales.len()
    );

    Ok(StagingData {
        customers,
        products,
        sales,
    })
}

pub fn read_customers(path: &Path) -> Result<Vec<StagingCustomer>> {
    use customer_columns::*;

    let table = TextTable::read(path, "customers", REQUIRED)?;
    let ids = table.column(CUSTOMER_ID)?;
    let names = table.column(NAME)?;
    let regions = table.column(REGION)?;
    let join_dates = table.column(JOIN_DATE)?;
    let points = table.column(MEMBER_POINTS)?;
    let statuses = table.column(MEMBER_STATUS)?;
    let contacts = table.column(PREFERRED_CONTACT)?;

    Ok((0..table.height)
        .map(|i| StagingCustomer {
            customer_id: ids[i].clone(),
            name: names[i].clone(),
            region: regions[i].clone(),
            join_date: join_dates[i].clone(),
            member_points: points[i].clone(),
            member_status: statuses[i].clone(),
            preferred_contact: contacts[i].clone(),
        })
        .collect())
}

pub fn read_products(path: &Path) -> Result<Vec<StagingProduct>> {
    use product_columns::*;

    let table = TextTable::read(path, "products", REQUIRED)?;
    let ids = table.column(PRODUCT_ID)?;
    let names = table.column(PRODUCT_NAME)?;
    let categories = table.column(CATEGORY)?;
    let prices = table.column(UNIT_PRICE)?;
    let years = table.column(YEAR_RELEASED)?;
    let months = table.column(MONTH_PURCHASED)?;
    let skus = table.column(ORDERING_SKU)?;
    let suppliers = table.column(SUPPLIER_NAME)?;

    Ok((0..table.height)
        .map(|i| StagingProduct {
            product_id: ids[i].clone(),
            product_name: names[i].clone(),
            category: categories[i].clone(),
            unit_price: prices[i].clone(),
            year_released: years[i].clone(),
            month_purchased: months[i].clone(),
            ordering_sku: skus[i].clone(),
            supplier_name: suppliers[i].clone(),
        })
        .collect())
}

pub fn read_sales(path: &Path) -> Result<Vec<StagingSale>> {
    use sale_columns::*;

    let table = TextTable::read(path, "sales", REQUIRED)?;
    let transaction_ids = table.column(TRANSACTION_ID)?;
    let dates = table.column(SALE_DATE)?;
    let customers = table.column(CUSTOMER_ID)?;
    let products = table.column(PRODUCT_ID)?;
    let stores = table.column(STORE_ID)?;
    let campaigns = table.column(CAMPAIGN_ID)?;
    let amounts = table.column(SALE_AMOUNT)?;
    let discounts = table.column(DISCOUNT_PERCENT)?;
    let points = table.column(PAID_WITH_POINTS)?;

    Ok((0..table.height)
        .map(|i| StagingSale {
            transaction_id: transaction_ids[i].clone(),
            sale_date: dates[i].clone(),
            customer_id: customers[i].clone(),
            product_id: products[i].clone(),
            store_id: stores[i].clone(),
            campaign_id: campaigns[i].clone(),
            sale_amount: amounts[i].clone(),
            discount_percent: discounts[i].clone(),
            paid_with_points: points[i].clone(),
        })
        .collect())
}

/// A staging CSV loaded as all-text columns
struct TextTable {
    name: &'static str,
    frame: DataFrame,
    height: usize,
}

impl TextTable {
    fn read(path: &Path, name: &'static str, required: &[&str]) -> Result<Self> {
        if !path.exists() {
            return Err(EtlError::StagingNotFound {
                path: path.to_path_buf(),
            });
        }

        // Schema inference over zero rows reads every column as String
        let frame = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        let height = frame.height();
        debug!(
            "Read staging table {} from {}: {} rows, {} columns",
            name,
            path.display(),
            height,
            frame.width()
        );

        let table = Self {
            name,
            frame,
            height,
        };

        for column in required {
            if table.find(column).is_none() {
                return Err(EtlError::MissingColumn {
                    table: name.to_string(),
                    column: column.to_string(),
                });
            }
        }

        Ok(table)
    }

    fn find(&self, column: &str) -> Option<&Column> {
        self.frame
            .get_columns()
            .iter()
            .find(|c| c.name().trim() == column)
    }

    /// Column cells as owned text. Nulls and absent optional columns
    /// read as empty strings.
    fn column(&self, column: &str) -> Result<Vec<String>> {
        let Some(found) = self.find(column) else {
            debug!(
                "Staging table {} has no column {}, reading as blank",
                self.name, column
            );
            return Ok(vec![String::new(); self.height]);
        };

        let values = found.str()?;
        Ok(values
            .into_iter()
            .map(|cell| cell.unwrap_or_default().to_string())
            .collect())
    }
}
