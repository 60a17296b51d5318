//! End-to-end transform tests over in-memory warehouses

use super::*;
use crate::models::RejectReason;
use crate::pipeline::transform;
use crate::store::KeyedStore;
use crate::warehouse::Warehouse;

fn mixed_staging() -> StagingData {
    let mut bad_customer = staging_sale("102");
    bad_customer.customer_id = "999".to_string();
    let mut bad_date = staging_sale("103");
    bad_date.sale_date = "13/1/2024".to_string();
    let mut campaign = staging_sale("104");
    campaign.campaign_id = "2".to_string();
    campaign.sale_date = "12/31/2023".to_string();

    let mut staging = staging_with_sales(vec![staging_sale("101"), bad_customer, bad_date, campaign]);
    staging.customers.push(staging_customer("2", "1/15/2022"));
    staging.products.push(staging_product("2"));
    staging
}

#[test]
fn test_transform_partitions_staged_sales() {
    let staging = mixed_staging();
    let mut wh = Warehouse::new();

    let report = transform(&staging, &mut wh).unwrap();

    assert_eq!(report.facts.staged, 4);
    assert_eq!(report.facts.accepted, 2);
    assert_eq!(report.facts.rejected, 2);
    assert_eq!(report.facts.by_reason[&RejectReason::CustomerKeyNotFound], 1);
    assert_eq!(report.facts.by_reason[&RejectReason::DateKeyNotFound], 1);

    for tx in [101, 102, 103, 104] {
        assert!(wh.sales.exists(tx) ^ wh.rejects.exists(tx), "tx {}", tx);
    }

    let counts = wh.counts();
    assert_eq!(counts.customers, 2);
    assert_eq!(counts.products, 2);
    assert_eq!(counts.stores, 1);
    assert_eq!(counts.campaigns, 1);
    assert_eq!(counts.dates, 2);
    assert_eq!(wh.dates.get(20231231).unwrap().quarter, 4);
}

#[test]
fn test_transform_twice_changes_nothing() {
    let staging = mixed_staging();
    let mut wh = Warehouse::new();
    transform(&staging, &mut wh).unwrap();
    let snapshot = wh.clone();

    let report = transform(&staging, &mut wh).unwrap();

    assert_eq!(report.dimensions.total_inserted(), 0);
    assert_eq!(report.facts.accepted + report.facts.rejected, 0);
    assert_eq!(report.facts.already_loaded, 4);
    assert_eq!(wh.counts(), snapshot.counts());
    assert_eq!(wh.sales.get(101), snapshot.sales.get(101));
    assert_eq!(wh.rejects.get(102), snapshot.rejects.get(102));
}

#[test]
fn test_incremental_batch_extends_warehouse() {
    let mut wh = Warehouse::new();
    transform(&mixed_staging(), &mut wh).unwrap();

    let mut next = staging_sale("201");
    next.customer_id = "3".to_string();
    next.store_id = "4".to_string();
    let mut batch = staging_with_sales(vec![next]);
    batch.customers = vec![staging_customer("3", "")];
    batch.products.clear();

    let report = transform(&batch, &mut wh).unwrap();

    assert_eq!(report.facts.accepted, 1);
    assert_eq!(wh.customers.len(), 3);
    assert_eq!(wh.stores.keys().collect::<Vec<_>>(), vec![1, 4]);
    assert_eq!(wh.sales.len(), 3);
}

#[test]
fn test_empty_staging_is_a_noop() {
    let mut wh = Warehouse::new();

    let report = transform(&StagingData::default(), &mut wh).unwrap();

    assert_eq!(report.facts.staged, 0);
    assert_eq!(wh.counts(), Default::default());
}
