//! Append-only keyed tables.
//!
//! Every warehouse table is written through [`KeyedStore::insert_if_absent`],
//! so a key collision keeps the first row and the later one is dropped.
//! Rows are never updated in place.

use crate::models::{
    DimCampaign, DimCustomer, DimDate, DimProduct, DimStore, FactSale, FactSaleReject,
};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A row that owns its primary key
pub trait Keyed {
    type Key: Ord + Copy + Debug;

    fn key(&self) -> Self::Key;
}

/// Outcome of an insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    Inserted,
    AlreadyPresent,
}

/// Ignore-on-conflict storage for one entity
pub trait KeyedStore<R: Keyed> {
    fn insert_if_absent(&mut self, row: R) -> Insert;

    fn exists(&self, key: R::Key) -> bool;
}

/// In-memory table ordered by key
#[derive(Debug, Clone)]
pub struct Table<R: Keyed> {
    rows: BTreeMap<R::Key, R>,
}

impl<R: Keyed> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<R: Keyed> Table<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from persisted rows, first row wins on duplicate keys
    pub fn from_rows(rows: impl IntoIterator<Item = R>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.insert_if_absent(row);
        }
        table
    }

    pub fn get(&self, key: R::Key) -> Option<&R> {
        self.rows.get(&key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in key order
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = R::Key> + '_ {
        self.rows.keys().copied()
    }
}

impl<R: Keyed> KeyedStore<R> for Table<R> {
    fn insert_if_absent(&mut self, row: R) -> Insert {
        use std::collections::btree_map::Entry;

        match self.rows.entry(row.key()) {
            Entry::Vacant(slot) => {
                slot.insert(row);
                Insert::Inserted
            }
            Entry::Occupied(_) => Insert::AlreadyPresent,
        }
    }

    fn exists(&self, key: R::Key) -> bool {
        self.rows.contains_key(&key)
    }
}

impl Keyed for DimCustomer {
    type Key = i64;

    fn key(&self) -> i64 {
        self.customer_key
    }
}

impl Keyed for DimProduct {
    type Key = i64;

    fn key(&self) -> i64 {
        self.product_key
    }
}

impl Keyed for DimStore {
    type Key = i64;

    fn key(&self) -> i64 {
        self.store_key
    }
}

impl Keyed for DimCampaign {
    type Key = i64;

    fn key(&self) -> i64 {
        self.campaign_key
    }
}

impl Keyed for DimDate {
    type Key = i32;

    fn key(&self) -> i32 {
        self.date_key
    }
}

impl Keyed for FactSale {
    type Key = i64;

    fn key(&self) -> i64 {
        self.transaction_id
    }
}

impl Keyed for FactSaleReject {
    type Key = i64;

    fn key(&self) -> i64 {
        self.transaction_id
    }
}
