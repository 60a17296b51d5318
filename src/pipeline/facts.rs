//! Fact validation and loading.
//!
//! Every staging sale is parsed, resolved against the built dimensions and
//! routed to exactly one of the fact table or the reject table. Resolution
//! checks run in a fixed order (date, customer, product, store, campaign)
//! and the first failure is the recorded reason.

use crate::coerce::{IdCoercion, PaidWithPoints, coerce_identifier, parse_optional_f64};
use crate::dates::CalendarDate;
use crate::error::{EtlError, Result};
use crate::models::{FactSale, FactSaleReject, RejectReason, StagingSale};
use crate::store::{Insert, KeyedStore};
use crate::warehouse::Warehouse;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Typed view of one staging sale before resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSale {
    pub transaction_id: i64,
    pub date_key: Option<i32>,
    pub customer_key: Option<i64>,
    pub product_key: Option<i64>,
    /// `Ok(None)` when the sale names no store, `Err` when the text is unusable
    pub store_key: std::result::Result<Option<i64>, String>,
    pub campaign_key: Option<i64>,
    pub sale_date: String,
    pub sale_amount: Option<f64>,
    pub discount_percent: Option<f64>,
    pub paid_with_points: PaidWithPoints,
}

impl ParsedSale {
    /// Parse a staging sale. Only an unusable transaction identifier is an
    /// error; every other field degrades to no value.
    pub fn parse(index: usize, sale: &StagingSale) -> Result<Self> {
        let transaction_id = coerce_identifier(&sale.transaction_id)
            .value()
            .ok_or_else(|| EtlError::InvalidStagingRow {
                table: "sales".to_string(),
                row: index,
                reason: format!("unusable TransactionID '{}'", sale.transaction_id),
            })?;

        let date_key = match CalendarDate::parse(&sale.sale_date) {
            Ok(date) => date.map(|d| d.key()),
            Err(e) => {
                debug!("Transaction {}: {}", transaction_id, e);
                None
            }
        };

        let store_key = match coerce_identifier(&sale.store_id) {
            IdCoercion::Value(key) => Ok(Some(key)),
            IdCoercion::Blank => Ok(None),
            IdCoercion::Malformed => Err(sale.store_id.trim().to_string()),
        };

        Ok(Self {
            transaction_id,
            date_key,
            customer_key: coerce_identifier(&sale.customer_id).value(),
            product_key: coerce_identifier(&sale.product_id).value(),
            store_key,
            campaign_key: coerce_identifier(&sale.campaign_id).value(),
            sale_date: sale.sale_date.clone(),
            sale_amount: parse_optional_f64(&sale.sale_amount),
            discount_percent: parse_optional_f64(&sale.discount_percent),
            paid_with_points: PaidWithPoints::parse(&sale.paid_with_points),
        })
    }
}

/// Where a sale ends up
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Accepted(FactSale),
    Rejected(FactSaleReject),
}

/// Resolve a parsed sale against the warehouse dimensions
pub fn classify(sale: ParsedSale, warehouse: &Warehouse) -> Classification {
    match first_unresolved(&sale, warehouse) {
        None => Classification::Accepted(FactSale {
            transaction_id: sale.transaction_id,
            // Resolution succeeded, so the mandatory keys are present
            date_key: sale.date_key.unwrap_or_default(),
            customer_key: sale.customer_key.unwrap_or_default(),
            product_key: sale.product_key.unwrap_or_default(),
            store_key: sale.store_key.unwrap_or_default(),
            campaign_key: sale.campaign_key,
            sale_date: sale.sale_date,
            sale_amount: sale.sale_amount,
            discount_percent: sale.discount_percent,
            paid_with_points: sale.paid_with_points,
        }),
        Some(reject_reason) => Classification::Rejected(FactSaleReject {
            transaction_id: sale.transaction_id,
            date_key: sale.date_key,
            customer_key: sale.customer_key,
            product_key: sale.product_key,
            store_key: sale.store_key.unwrap_or_default(),
            campaign_key: sale.campaign_key,
            sale_date: sale.sale_date,
            sale_amount: sale.sale_amount,
            discount_percent: sale.discount_percent,
            paid_with_points: sale.paid_with_points,
            reject_reason,
        }),
    }
}

/// First failing check in priority order, `None` when every key resolves
pub fn first_unresolved(sale: &ParsedSale, warehouse: &Warehouse) -> Option<RejectReason> {
    if !sale.date_key.is_some_and(|k| warehouse.dates.exists(k)) {
        return Some(RejectReason::DateKeyNotFound);
    }
    if !sale.customer_key.is_some_and(|k| warehouse.customers.exists(k)) {
        return Some(RejectReason::CustomerKeyNotFound);
    }
    if !sale.product_key.is_some_and(|k| warehouse.products.exists(k)) {
        return Some(RejectReason::ProductKeyNotFound);
    }
    let store_ok = match &sale.store_key {
        Ok(None) => true,
        Ok(Some(k)) => warehouse.stores.exists(*k),
        Err(_) => false,
    };
    if !store_ok {
        return Some(RejectReason::StoreKeyNotFound);
    }
    if sale
        .campaign_key
        .is_some_and(|k| !warehouse.campaigns.exists(k))
    {
        return Some(RejectReason::CampaignKeyNotFound);
    }
    None
}

/// Outcome of one fact load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactLoadSummary {
    /// Staging sales seen this run
    pub staged: usize,
    /// New rows added to the fact table
    pub accepted: usize,
    /// New rows added to the reject table
    pub rejected: usize,
    /// Rows whose transaction was already in their target table
    pub already_loaded: usize,
    /// New rejects by reason
    pub by_reason: BTreeMap<RejectReason, usize>,
    /// Cumulative fact table size after the load
    pub fact_rows: usize,
    /// Cumulative reject table size after the load
    pub reject_rows: usize,
}

/// Validate and load every staging sale.
///
/// All transaction identifiers are checked before the warehouse is touched,
/// so an unkeyable row aborts the load with no partial inserts. A
/// transaction repeated within the batch is routed once, from its first
/// row; later copies count as already loaded.
pub fn load_facts(sales: &[StagingSale], warehouse: &mut Warehouse) -> Result<FactLoadSummary> {
    let parsed = sales
        .iter()
        .enumerate()
        .map(|(index, sale)| ParsedSale::parse(index, sale))
        .collect::<Result<Vec<_>>>()?;

    let mut summary = FactLoadSummary {
        staged: parsed.len(),
        ..Default::default()
    };

    // First row wins per transaction, whichever table it lands in
    let mut seen = BTreeSet::new();

    for sale in parsed {
        if !seen.insert(sale.transaction_id) {
            debug!(
                "Transaction {} repeated in staging, keeping the first row",
                sale.transaction_id
            );
            summary.already_loaded += 1;
            continue;
        }

        match classify(sale, warehouse) {
            Classification::Accepted(fact) => match warehouse.sales.insert_if_absent(fact) {
                Insert::Inserted => summary.accepted += 1,
                Insert::AlreadyPresent => summary.already_loaded += 1,
            },
            Classification::Rejected(reject) => {
                let reason = reject.reject_reason;
                debug!(
                    "Rejecting transaction {}: {}",
                    reject.transaction_id, reason
                );
                match warehouse.rejects.insert_if_absent(reject) {
                    Insert::Inserted => {
                        summary.rejected += 1;
                        *summary.by_reason.entry(reason).or_default() += 1;
                    }
                    Insert::AlreadyPresent => summary.already_loaded += 1,
                }
            }
        }
    }

    summary.fact_rows = warehouse.sales.len();
    summary.reject_rows = warehouse.rejects.len();

    info!(
        "Fact load complete: {} staged, {} accepted, {} rejected, {} already loaded (fact_sales={}, fact_sales_reject={})",
        summary.staged,
        summary.accepted,
        summary.rejected,
        summary.already_loaded,
        summary.fact_rows,
        summary.reject_rows
    );

    Ok(summary)
}
