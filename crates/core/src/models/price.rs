use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::AssetField;

/// A single price observation (month → EUR unit price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Fetched EUR unit prices, per asset field per month.
///
/// Lives inside the persisted ledger so that prices fetched once stay
/// available offline. The valuation engine only reads from here — the
/// async refresh path is the only writer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceBook {
    /// field → price points sorted by date.
    entries: HashMap<AssetField, Vec<PricePoint>>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fetched EUR unit price for a field in a given month, if any.
    pub fn price(&self, field: AssetField, month: NaiveDate) -> Option<f64> {
        let points = self.entries.get(&field)?;
        points
            .binary_search_by_key(&month, |p| p.date)
            .ok()
            .map(|idx| points[idx].price)
    }

    /// Insert or replace the price for a field/month. Keeps the per-field
    /// vector sorted by date.
    pub fn set_price(&mut self, field: AssetField, month: NaiveDate, price: f64) {
        let points = self.entries.entry(field).or_default();
        match points.binary_search_by_key(&month, |p| p.date) {
            Ok(idx) => points[idx].price = price,
            Err(idx) => points.insert(idx, PricePoint { date: month, price }),
        }
    }

    /// Total number of stored price points.
    pub fn total_entries(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    /// Number of distinct fields with at least one price.
    pub fn field_count(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Per-date USD→EUR rates, cached so each date is resolved at most once.
///
/// An owned value passed to whoever needs it — never a process-wide
/// singleton.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateCache {
    rates: HashMap<NaiveDate, f64>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.rates.get(&date).copied()
    }

    pub fn set(&mut self, date: NaiveDate, rate: f64) {
        self.rates.insert(date, rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn clear(&mut self) {
        self.rates.clear();
    }
}
