use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entry::FinanceEntry;
use super::price::{PriceBook, RateCache};
use super::settings::Settings;
use super::snapshot::MonthlySnapshot;

/// The main data container. Everything in here gets serialized, encrypted,
/// and saved to the portable ledger file.
///
/// Snapshots are keyed by their normalized month and finance entries by
/// their date: inserting under an existing key replaces the record, which
/// is exactly the upsert semantics the dashboard needs, and iteration is
/// chronological for free.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Monthly portfolio snapshots, keyed by the first day of the month.
    pub snapshots: BTreeMap<NaiveDate, MonthlySnapshot>,

    /// Income/outcome records, keyed by date.
    pub entries: BTreeMap<NaiveDate, FinanceEntry>,

    /// User settings.
    pub settings: Settings,

    /// Fetched EUR unit prices — kept so past lookups work offline.
    pub price_book: PriceBook,

    /// Cached USD→EUR rates.
    pub rate_cache: RateCache,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }
}
