//! Tests for the dimension and fact stages
//!
//! Fixtures build staging rows the way the upstream extract writes them:
//! every field is text, blank where absent.

pub mod transform_tests;

use crate::models::{StagingCustomer, StagingData, StagingProduct, StagingSale};

/// A staging customer with the given identifier and join date
pub fn staging_customer(id: &str, join_date: &str) -> StagingCustomer {
    StagingCustomer {
        customer_id: id.to_string(),
        name: format!("Customer {}", id),
        region: "East".to_string(),
        join_date: join_date.to_string(),
        member_points: "1200".to_string(),
        member_status: "Gold".to_string(),
        preferred_contact: "Email".to_string(),
    }
}

/// A staging product with the given identifier
pub fn staging_product(id: &str) -> StagingProduct {
    StagingProduct {
        product_id: id.to_string(),
        product_name: "Laptop".to_string(),
        category: "Electronics".to_string(),
        unit_price: "793.12".to_string(),
        year_released: "2020".to_string(),
        month_purchased: "March".to_string(),
        ordering_sku: "LAP-001".to_string(),
        supplier_name: "Acme".to_string(),
    }
}

/// The reference sale: customer 1, product 1, store 1, no campaign,
/// 3/15/2024, paid with points
pub fn staging_sale(transaction_id: &str) -> StagingSale {
    StagingSale {
        transaction_id: transaction_id.to_string(),
        sale_date: "3/15/2024".to_string(),
        customer_id: "1".to_string(),
        product_id: "1".to_string(),
        store_id: "1".to_string(),
        campaign_id: String::new(),
        sale_amount: "100.0".to_string(),
        discount_percent: "5".to_string(),
        paid_with_points: "Yes".to_string(),
    }
}

/// Staging data with customer 1, product 1 and the given sales
pub fn staging_with_sales(sales: Vec<StagingSale>) -> StagingData {
    StagingData {
        customers: vec![staging_customer("1", "2/3/2021")],
        products: vec![staging_product("1")],
        sales,
    }
}
