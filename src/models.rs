//! Core data structures for the sales warehouse.
//!
//! Staging rows carry raw cell text exactly as extracted. Warehouse rows
//! are the typed star-schema records produced by the transform stages.

use crate::coerce::PaidWithPoints;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Staging
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagingCustomer {
    pub customer_id: String,
    pub name: String,
    pub region: String,
    pub join_date: String,
    pub member_points: String,
    pub member_status: String,
    pub preferred_contact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagingProduct {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub unit_price: String,
    pub year_released: String,
    pub month_purchased: String,
    pub ordering_sku: String,
    pub supplier_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagingSale {
    pub transaction_id: String,
    pub sale_date: String,
    pub customer_id: String,
    pub product_id: String,
    pub store_id: String,
    pub campaign_id: String,
    pub sale_amount: String,
    pub discount_percent: String,
    pub paid_with_points: String,
}

/// The three staging datasets of one load cycle
#[derive(Debug, Clone, Default)]
pub struct StagingData {
    pub customers: Vec<StagingCustomer>,
    pub products: Vec<StagingProduct>,
    pub sales: Vec<StagingSale>,
}

// =============================================================================
// Dimensions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimCustomer {
    pub customer_key: i64,
    pub customer_name: Option<String>,
    pub region: Option<String>,
    /// ISO `YYYY-MM-DD`
    pub join_date: Option<String>,
    pub member_points: Option<i64>,
    pub member_status: Option<String>,
    pub preferred_contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimProduct {
    pub product_key: i64,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<f64>,
    pub year_released: Option<i64>,
    pub month_purchased: Option<String>,
    pub ordering_sku: Option<String>,
    pub supplier_name: Option<String>,
}

/// Store descriptors are unknown at load time and stay null until
/// enriched by another process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimStore {
    pub store_key: i64,
    pub store_name: Option<String>,
    pub region: Option<String>,
    pub store_type: Option<String>,
}

impl DimStore {
    pub fn placeholder(store_key: i64) -> Self {
        Self {
            store_key,
            store_name: None,
            region: None,
            store_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimCampaign {
    pub campaign_key: i64,
    pub campaign_name: Option<String>,
}

impl DimCampaign {
    pub fn placeholder(campaign_key: i64) -> Self {
        Self {
            campaign_key,
            campaign_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimDate {
    pub date_key: i32,
    pub full_date: String,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub quarter: i32,
    pub week: i32,
    pub day_of_week: String,
}

// =============================================================================
// Facts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSale {
    pub transaction_id: i64,
    pub date_key: i32,
    pub customer_key: i64,
    pub product_key: i64,
    pub store_key: Option<i64>,
    pub campaign_key: Option<i64>,
    /// Source text of the sale date
    pub sale_date: String,
    pub sale_amount: Option<f64>,
    pub discount_percent: Option<f64>,
    pub paid_with_points: PaidWithPoints,
}

/// A sale that failed referential validation. Keys are kept as computed,
/// whether or not they resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSaleReject {
    pub transaction_id: i64,
    pub date_key: Option<i32>,
    pub customer_key: Option<i64>,
    pub product_key: Option<i64>,
    pub store_key: Option<i64>,
    pub campaign_key: Option<i64>,
    pub sale_date: String,
    pub sale_amount: Option<f64>,
    pub discount_percent: Option<f64>,
    pub paid_with_points: PaidWithPoints,
    pub reject_reason: RejectReason,
}

/// Why a sale was diverted to the reject table. Checks run in declaration
/// order and only the first failure is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    DateKeyNotFound,
    CustomerKeyNotFound,
    ProductKeyNotFound,
    StoreKeyNotFound,
    CampaignKeyNotFound,
}

impl RejectReason {
    pub const ALL: [RejectReason; 5] = [
        RejectReason::DateKeyNotFound,
        RejectReason::CustomerKeyNotFound,
        RejectReason::ProductKeyNotFound,
        RejectReason::StoreKeyNotFound,
        RejectReason::CampaignKeyNotFound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::DateKeyNotFound => "date_key_not_found",
            RejectReason::CustomerKeyNotFound => "customer_key_not_found",
            RejectReason::ProductKeyNotFound => "product_key_not_found",
            RejectReason::StoreKeyNotFound => "store_key_not_found",
            RejectReason::CampaignKeyNotFound => "campaign_key_not_found",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RejectReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RejectReason::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| format!("unknown reject reason '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_reason_codes() {
        assert_eq!(
            RejectReason::DateKeyNotFound.to_string(),
            "date_key_not_found"
        );
        assert_eq!(
            "campaign_key_not_found".parse::<RejectReason>().unwrap(),
            RejectReason::CampaignKeyNotFound
        );
        assert!("bad_reason".parse::<RejectReason>().is_err());
    }

    #[test]
    fn test_reject_reason_priority_order() {
        let mut sorted = RejectReason::ALL;
        sorted.sort();
        assert_eq!(sorted, RejectReason::ALL);
        assert!(RejectReason::DateKeyNotFound < RejectReason::CustomerKeyNotFound);
    }
}
