//! Conversion between warehouse rows and polars frames.
//!
//! Column names here are the published warehouse schema read by the
//! reporting layer.

use crate::coerce::PaidWithPoints;
use crate::constants::tables;
use crate::models::{
    DimCampaign, DimCustomer, DimDate, DimProduct, DimStore, FactSale, FactSaleReject,
    RejectReason,
};
use crate::store::Keyed;
use polars::prelude::*;

/// A row type persisted as one warehouse table
pub trait TableRecord: Keyed + Sized {
    const TABLE: &'static str;

    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame>;

    fn from_frame(df: &DataFrame) -> PolarsResult<Vec<Self>>;
}

fn corrupt(message: String) -> PolarsError {
    PolarsError::ComputeError(message.into())
}

fn strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

fn i64s(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    Ok(df.column(name)?.i64()?.into_iter().collect())
}

fn i32s(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i32>>> {
    Ok(df.column(name)?.i32()?.into_iter().collect())
}

fn f64s(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    Ok(df.column(name)?.f64()?.into_iter().collect())
}

/// Unwrap a NOT NULL column
fn required<T>(values: Vec<Option<T>>, name: &str) -> PolarsResult<Vec<T>> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or_else(|| corrupt(format!("null in column {} at row {}", name, row))))
        .collect()
}

impl TableRecord for DimCustomer {
    const TABLE: &'static str = tables::DIM_CUSTOMER;

    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                "customer_key".into(),
                rows.iter().map(|r| r.customer_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "customer_name".into(),
                rows.iter().map(|r| r.customer_name.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "region".into(),
                rows.iter().map(|r| r.region.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "join_date".into(),
                rows.iter().map(|r| r.join_date.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "member_points".into(),
                rows.iter().map(|r| r.member_points).collect::<Vec<_>>(),
            ),
            Column::new(
                "member_status".into(),
                rows.iter().map(|r| r.member_status.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "preferred_contact".into(),
                rows.iter()
                    .map(|r| r.preferred_contact.clone())
                    .collect::<Vec<_>>(),
            ),
        ])
    }

    fn from_frame(df: &DataFrame) -> PolarsResult<Vec<Self>> {
        let keys = required(i64s(df, "customer_key")?, "customer_key")?;
        let names = strings(df, "customer_name")?;
        let regions = strings(df, "region")?;
        let join_dates = strings(df, "join_date")?;
        let points = i64s(df, "member_points")?;
        let statuses = strings(df, "member_status")?;
        let contacts = strings(df, "preferred_contact")?;

        Ok(keys
            .into_iter()
            .enumerate()
            .map(|(i, customer_key)| DimCustomer {
                customer_key,
                customer_name: names[i].clone(),
                region: regions[i].clone(),
                join_date: join_dates[i].clone(),
                member_points: points[i],
                member_status: statuses[i].clone(),
                preferred_contact: contacts[i].clone(),
            })
            .collect())
    }
}

impl TableRecord for DimProduct {
    const TABLE: &'static str = tables::DIM_PRODUCT;

    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                "product_key".into(),
                rows.iter().map(|r| r.product_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "product_name".into(),
                rows.iter().map(|r| r.product_name.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "category".into(),
                rows.iter().map(|r| r.category.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "unit_price".into(),
                rows.iter().map(|r| r.unit_price).collect::<Vec<_>>(),
            ),
            Column::new(
                "year_released".into(),
                rows.iter().map(|r| r.year_released).collect::<Vec<_>>(),
            ),
            Column::new(
                "month_purchased".into(),
                rows.iter()
                    .map(|r| r.month_purchased.clone())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "ordering_sku".into(),
                rows.iter().map(|r| r.ordering_sku.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "supplier_name".into(),
                rows.iter().map(|r| r.supplier_name.clone()).collect::<Vec<_>>(),
            ),
        ])
    }

    fn from_frame(df: &DataFrame) -> PolarsResult<Vec<Self>> {
        let keys = required(i64s(df, "product_key")?, "product_key")?;
        let names = strings(df, "product_name")?;
        let categories = strings(df, "category")?;
        let prices = f64s(df, "unit_price")?;
        let years = i64s(df, "year_released")?;
        let months = strings(df, "month_purchased")?;
        let skus = strings(df, "ordering_sku")?;
        let suppliers = strings(df, "supplier_name")?;

        Ok(keys
            .into_iter()
            .enumerate()
            .map(|(i, product_key)| DimProduct {
                product_key,
                product_name: names[i].clone(),
                category: categories[i].clone(),
                unit_price: prices[i],
                year_released: years[i],
                month_purchased: months[i].clone(),
                ordering_sku: skus[i].clone(),
                supplier_name: suppliers[i].clone(),
            })
            .collect())
    }
}

impl TableRecord for DimStore {
    const TABLE: &'static str = tables::DIM_STORE;

    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                "store_key".into(),
                rows.iter().map(|r| r.store_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "store_name".into(),
                rows.iter().map(|r| r.store_name.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "region".into(),
                rows.iter().map(|r| r.region.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "store_type".into(),
                rows.iter().map(|r| r.store_type.clone()).collect::<Vec<_>>(),
            ),
        ])
    }

    fn from_frame(df: &DataFrame) -> PolarsResult<Vec<Self>> {
        let keys = required(i64s(df, "store_key")?, "store_key")?;
        let names = strings(df, "store_name")?;
        let regions = strings(df, "region")?;
        let types = strings(df, "store_type")?;

        Ok(keys
            .into_iter()
            .enumerate()
            .map(|(i, store_key)| DimStore {
                store_key,
                store_name: names[i].clone(),
                region: regions[i].clone(),
                store_type: types[i].clone(),
            })
            .collect())
    }
}

impl TableRecord for DimCampaign {
    const TABLE: &'static str = tables::DIM_CAMPAIGN;

    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                "campaign_key".into(),
                rows.iter().map(|r| r.campaign_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "campaign_name".into(),
                rows.iter().map(|r| r.campaign_name.clone()).collect::<Vec<_>>(),
            ),
        ])
    }

    fn from_frame(df: &DataFrame) -> PolarsResult<Vec<Self>> {
        let keys = required(i64s(df, "campaign_key")?, "campaign_key")?;
        let names = strings(df, "campaign_name")?;

        Ok(keys
            .into_iter()
            .zip(names)
            .map(|(campaign_key, campaign_name)| DimCampaign {
                campaign_key,
                campaign_name,
            })
            .collect())
    }
}

impl TableRecord for DimDate {
    const TABLE: &'static str = tables::DIM_DATE;

    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                "date_key".into(),
                rows.iter().map(|r| r.date_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "full_date".into(),
                rows.iter().map(|r| r.full_date.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "day".into(),
                rows.iter().map(|r| r.day).collect::<Vec<_>>(),
            ),
            Column::new(
                "month".into(),
                rows.iter().map(|r| r.month).collect::<Vec<_>>(),
            ),
            Column::new(
                "year".into(),
                rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            ),
            Column::new(
                "quarter".into(),
                rows.iter().map(|r| r.quarter).collect::<Vec<_>>(),
            ),
            Column::new(
                "week".into(),
                rows.iter().map(|r| r.week).collect::<Vec<_>>(),
            ),
            Column::new(
                "day_of_week".into(),
                rows.iter().map(|r| r.day_of_week.clone()).collect::<Vec<_>>(),
            ),
        ])
    }

    fn from_frame(df: &DataFrame) -> PolarsResult<Vec<Self>> {
        let keys = required(i32s(df, "date_key")?, "date_key")?;
        let full_dates = required(strings(df, "full_date")?, "full_date")?;
        let days = required(i32s(df, "day")?, "day")?;
        let months = required(i32s(df, "month")?, "month")?;
        let years = required(i32s(df, "year")?, "year")?;
        let quarters = required(i32s(df, "quarter")?, "quarter")?;
        let weeks = required(i32s(df, "week")?, "week")?;
        let weekdays = required(strings(df, "day_of_week")?, "day_of_week")?;

        Ok(keys
            .into_iter()
            .enumerate()
            .map(|(i, date_key)| DimDate {
                date_key,
                full_date: full_dates[i].clone(),
                day: days[i],
                month: months[i],
                year: years[i],
                quarter: quarters[i],
                week: weeks[i],
                day_of_week: weekdays[i].clone(),
            })
            .collect())
    }
}

impl TableRecord for FactSale {
    const TABLE: &'static str = tables::FACT_SALES;

    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                "transaction_id".into(),
                rows.iter().map(|r| r.transaction_id).collect::<Vec<_>>(),
            ),
            Column::new(
                "date_key".into(),
                rows.iter().map(|r| r.date_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "customer_key".into(),
                rows.iter().map(|r| r.customer_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "product_key".into(),
                rows.iter().map(|r| r.product_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "store_key".into(),
                rows.iter().map(|r| r.store_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "campaign_key".into(),
                rows.iter().map(|r| r.campaign_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "sale_date".into(),
                rows.iter().map(|r| r.sale_date.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "sale_amount".into(),
                rows.iter().map(|r| r.sale_amount).collect::<Vec<_>>(),
            ),
            Column::new(
                "discount_percent".into(),
                rows.iter().map(|r| r.discount_percent).collect::<Vec<_>>(),
            ),
            Column::new(
                "paid_with_points".into(),
                rows.iter()
                    .map(|r| r.paid_with_points.as_flag())
                    .collect::<Vec<_>>(),
            ),
        ])
    }

    fn from_frame(df: &DataFrame) -> PolarsResult<Vec<Self>> {
        let ids = required(i64s(df, "transaction_id")?, "transaction_id")?;
        let date_keys = required(i32s(df, "date_key")?, "date_key")?;
        let customer_keys = required(i64s(df, "customer_key")?, "customer_key")?;
        let product_keys = required(i64s(df, "product_key")?, "product_key")?;
        let store_keys = i64s(df, "store_key")?;
        let campaign_keys = i64s(df, "campaign_key")?;
        let sale_dates = strings(df, "sale_date")?;
        let amounts = f64s(df, "sale_amount")?;
        let discounts = f64s(df, "discount_percent")?;
        let points = i32s(df, "paid_with_points")?;

        Ok(ids
            .into_iter()
            .enumerate()
            .map(|(i, transaction_id)| FactSale {
                transaction_id,
                date_key: date_keys[i],
                customer_key: customer_keys[i],
                product_key: product_keys[i],
                store_key: store_keys[i],
                campaign_key: campaign_keys[i],
                sale_date: sale_dates[i].clone().unwrap_or_default(),
                sale_amount: amounts[i],
                discount_percent: discounts[i],
                paid_with_points: PaidWithPoints::from_flag(points[i]),
            })
            .collect())
    }
}

impl TableRecord for FactSaleReject {
    const TABLE: &'static str = tables::FACT_SALES_REJECT;

    fn to_frame(rows: &[&Self]) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new(
                "transaction_id".into(),
                rows.iter().map(|r| r.transaction_id).collect::<Vec<_>>(),
            ),
            Column::new(
                "date_key".into(),
                rows.iter().map(|r| r.date_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "customer_key".into(),
                rows.iter().map(|r| r.customer_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "product_key".into(),
                rows.iter().map(|r| r.product_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "store_key".into(),
                rows.iter().map(|r| r.store_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "campaign_key".into(),
                rows.iter().map(|r| r.campaign_key).collect::<Vec<_>>(),
            ),
            Column::new(
                "sale_date".into(),
                rows.iter().map(|r| r.sale_date.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "sale_amount".into(),
                rows.iter().map(|r| r.sale_amount).collect::<Vec<_>>(),
            ),
            Column::new(
                "discount_percent".into(),
                rows.iter().map(|r| r.discount_percent).collect::<Vec<_>>(),
            ),
            Column::new(
                "paid_with_points".into(),
                rows.iter()
                    .map(|r| r.paid_with_points.as_flag())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "reject_reason".into(),
                rows.iter()
                    .map(|r| r.reject_reason.as_str())
                    .collect::<Vec<_>>(),
            ),
        ])
    }

    fn from_frame(df: &DataFrame) -> PolarsResult<Vec<Self>> {
        let ids = required(i64s(df, "transaction_id")?, "transaction_id")?;
        let date_keys = i32s(df, "date_key")?;
        let customer_keys = i64s(df, "customer_key")?;
        let product_keys = i64s(df, "product_key")?;
        let store_keys = i64s(df, "store_key")?;
        let campaign_keys = i64s(df, "campaign_key")?;
        let sale_dates = strings(df, "sale_date")?;
        let amounts = f64s(df, "sale_amount")?;
        let discounts = f64s(df, "discount_percent")?;
        let points = i32s(df, "paid_with_points")?;
        let reasons = required(strings(df, "reject_reason")?, "reject_reason")?;

        ids.into_iter()
            .enumerate()
            .map(|(i, transaction_id)| {
                let reject_reason = reasons[i].parse::<RejectReason>().map_err(corrupt)?;
                Ok(FactSaleReject {
                    transaction_id,
                    date_key: date_keys[i],
                    customer_key: customer_keys[i],
                    product_key: product_keys[i],
                    store_key: store_keys[i],
                    campaign_key: campaign_keys[i],
                    sale_date: sale_dates[i].clone().unwrap_or_default(),
                    sale_amount: amounts[i],
                    discount_percent: discounts[i],
                    paid_with_points: PaidWithPoints::from_flag(points[i]),
                    reject_reason,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_frame_keeps_nulls_and_reason() {
        let reject = FactSaleReject {
            transaction_id: 9,
            date_key: None,
            customer_key: Some(999),
            product_key: Some(1),
            store_key: None,
            campaign_key: None,
            sale_date: "13/1/2024".to_string(),
            sale_amount: Some(10.0),
            discount_percent: None,
            paid_with_points: PaidWithPoints::Unknown,
            reject_reason: RejectReason::DateKeyNotFound,
        };

        let df = FactSaleReject::to_frame(&[&reject]).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(
            df.column("reject_reason").unwrap().str().unwrap().get(0),
            Some("date_key_not_found")
        );
        assert_eq!(df.column("date_key").unwrap().i32().unwrap().get(0), None);

        let back = FactSaleReject::from_frame(&df).unwrap();
        assert_eq!(back, vec![reject]);
    }

    #[test]
    fn test_empty_table_frame() {
        let df = DimDate::to_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 8);
        assert!(DimDate::from_frame(&df).unwrap().is_empty());
    }

    #[test]
    fn test_null_key_is_rejected() {
        let df = DataFrame::new(vec![
            Column::new("store_key".into(), vec![Some(1i64), None]),
            Column::new("store_name".into(), vec![None::<String>, None]),
            Column::new("region".into(), vec![None::<String>, None]),
            Column::new("store_type".into(), vec![None::<String>, None]),
        ])
        .unwrap();

        assert!(DimStore::from_frame(&df).is_err());
    }
}
