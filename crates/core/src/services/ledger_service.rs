use chrono::NaiveDate;

use crate::models::entry::FinanceEntry;
use crate::models::ledger::Ledger;
use crate::models::snapshot::{normalize_month, MonthlySnapshot};
use crate::models::summary::CashFlowPoint;

/// Manages the stored records: monthly snapshots and finance entries.
///
/// Pure business logic — no I/O, no API calls. Both record kinds live in
/// date-keyed maps, so an upsert is a plain insert: resubmitting a month
/// or date replaces the record, never duplicates it.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    // ── Snapshots ───────────────────────────────────────────────────

    /// Insert or replace the snapshot for its (normalized) month.
    /// The record is sanitized on the way in. Returns the stored snapshot.
    pub fn upsert_snapshot(
        &self,
        ledger: &mut Ledger,
        snapshot: MonthlySnapshot,
    ) -> MonthlySnapshot {
        let snapshot = snapshot.sanitized();
        ledger.snapshots.insert(snapshot.month, snapshot.clone());
        snapshot
    }

    /// The snapshot stored for the month containing `month`, if any.
    pub fn snapshot_for<'a>(
        &self,
        ledger: &'a Ledger,
        month: NaiveDate,
    ) -> Option<&'a MonthlySnapshot> {
        ledger.snapshots.get(&normalize_month(month))
    }

    /// Up to `n` most recent snapshots, newest first.
    pub fn latest_snapshots<'a>(&self, ledger: &'a Ledger, n: usize) -> Vec<&'a MonthlySnapshot> {
        ledger.snapshots.values().rev().take(n).collect()
    }

    // ── Finance entries ─────────────────────────────────────────────

    /// Insert or replace the entry for `date`. Returns the stored entry.
    pub fn upsert_entry(
        &self,
        ledger: &mut Ledger,
        date: NaiveDate,
        income: f64,
        outcome: f64,
    ) -> FinanceEntry {
        let entry = FinanceEntry::new(date, income, outcome);
        ledger.entries.insert(date, entry.clone());
        entry
    }

    /// Entries within an (optional) date range, oldest first.
    pub fn entries_in_range<'a>(
        &self,
        ledger: &'a Ledger,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<&'a FinanceEntry> {
        ledger
            .entries
            .values()
            .filter(|e| {
                start.map_or(true, |s| e.date >= s) && end.map_or(true, |t| e.date <= t)
            })
            .collect()
    }

    /// Total income/outcome of the entries recorded in one calendar month.
    /// A month with no entries totals to zero.
    pub fn entry_month_totals(&self, ledger: &Ledger, month: NaiveDate) -> (f64, f64) {
        let month = normalize_month(month);
        ledger
            .entries
            .values()
            .filter(|e| normalize_month(e.date) == month)
            .fold((0.0, 0.0), |(income, outcome), e| {
                (income + e.income, outcome + e.outcome)
            })
    }

    /// The most recent calendar month with at least one entry.
    pub fn latest_entry_month(&self, ledger: &Ledger) -> Option<NaiveDate> {
        ledger
            .entries
            .keys()
            .next_back()
            .map(|date| normalize_month(*date))
    }

    // ── Cash-flow projections ───────────────────────────────────────

    /// Finance entries as a chronological income/expense series.
    pub fn entry_cash_flows(&self, ledger: &Ledger) -> Vec<CashFlowPoint> {
        ledger
            .entries
            .values()
            .map(|e| CashFlowPoint {
                date: e.date,
                income: e.income,
                expenses: e.outcome,
            })
            .collect()
    }

    /// Snapshot income/expense fields as a chronological series
    /// (fixed + variable per month).
    pub fn snapshot_cash_flows(&self, ledger: &Ledger) -> Vec<CashFlowPoint> {
        ledger
            .snapshots
            .values()
            .map(|s| CashFlowPoint {
                date: s.month,
                income: s.income_total(),
                expenses: s.expense_total(),
            })
            .collect()
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
