//! Application constants for the sales warehouse loader
//!
//! Staging column names, warehouse table names and file defaults shared
//! by the reader, the transform stages and the persistence layer.

// =============================================================================
// Staging Files
// =============================================================================

/// Default staging file names, as written by the upstream prep scripts
pub const DEFAULT_CUSTOMERS_FILE: &str = "customers_prepared.csv";
pub const DEFAULT_PRODUCTS_FILE: &str = "products_prepared.csv";
pub const DEFAULT_SALES_FILE: &str = "sales_prepared.csv";

/// Staging customer columns
pub mod customer_columns {
    pub const CUSTOMER_ID: &str = "CustomerID";
    pub const NAME: &str = "Name";
    pub const REGION: &str = "Region";
    pub const JOIN_DATE: &str = "JoinDate";
    pub const MEMBER_POINTS: &str = "MemberPoints";
    pub const MEMBER_STATUS: &str = "MemberStatus";
    pub const PREFERRED_CONTACT: &str = "PreferredContact";

    pub const REQUIRED: &[&str] = &[CUSTOMER_ID];
}

/// Staging product columns
pub mod product_columns {
    pub const PRODUCT_ID: &str = "ProductID";
    pub const PRODUCT_NAME: &str = "ProductName";
    pub const CATEGORY: &str = "Category";
    pub const UNIT_PRICE: &str = "UnitPrice";
    pub const YEAR_RELEASED: &str = "YearReleased";
    pub const MONTH_PURCHASED: &str = "MonthPurchased";
    pub const ORDERING_SKU: &str = "OrderingSKU";
    pub const SUPPLIER_NAME: &str = "SupplierName";

    pub const REQUIRED: &[&str] = &[PRODUCT_ID];
}

/// Staging sale columns
pub mod sale_columns {
    pub const TRANSACTION_ID: &str = "TransactionID";
    pub const SALE_DATE: &str = "SaleDate";
    pub const CUSTOMER_ID: &str = "CustomerID";
    pub const PRODUCT_ID: &str = "ProductID";
    pub const STORE_ID: &str = "StoreID";
    pub const CAMPAIGN_ID: &str = "CampaignID";
    pub const SALE_AMOUNT: &str = "SaleAmount";
    pub const DISCOUNT_PERCENT: &str = "DiscountPercent";
    pub const PAID_WITH_POINTS: &str = "PaidWithPoints";

    pub const REQUIRED: &[&str] = &[TRANSACTION_ID, SALE_DATE, CUSTOMER_ID, PRODUCT_ID];
}

// =============================================================================
// Warehouse Tables
// =============================================================================

pub mod tables {
    pub const DIM_CUSTOMER: &str = "dim_customer";
    pub const DIM_PRODUCT: &str = "dim_product";
    pub const DIM_STORE: &str = "dim_store";
    pub const DIM_CAMPAIGN: &str = "dim_campaign";
    pub const DIM_DATE: &str = "dim_date";
    pub const FACT_SALES: &str = "fact_sales";
    pub const FACT_SALES_REJECT: &str = "fact_sales_reject";

    /// Every table, dimensions first
    pub const ALL: &[&str] = &[
        DIM_CUSTOMER,
        DIM_PRODUCT,
        DIM_STORE,
        DIM_CAMPAIGN,
        DIM_DATE,
        FACT_SALES,
        FACT_SALES_REJECT,
    ];
}

/// Extension for persisted warehouse tables
pub const TABLE_EXTENSION: &str = "parquet";

/// Suffix for table files written during a commit, before the rename
pub const PENDING_SUFFIX: &str = "pending";

// =============================================================================
// Calendar
// =============================================================================

/// Weekday names indexed from Sunday = 0
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
