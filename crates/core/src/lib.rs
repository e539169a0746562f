pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{Months, NaiveDate};

use config::FieldKind;
use errors::CoreError;
use models::{
    entry::FinanceEntry,
    ledger::Ledger,
    settings::Settings,
    snapshot::{normalize_month, MonthlySnapshot},
    summary::{
        AnnualMetric, CashFlowPoint, CategoryTotals, MonthlyComparison, PortfolioOverview,
        SmoothedPoint,
    },
};
use providers::registry::PriceProviderRegistry;
use services::{
    ledger_service::LedgerService, price_service::PriceService, rollup_service::RollupService,
    smoothing_service::SmoothingService, summary_service::SummaryService,
    valuation_service::ValuationService,
};
use storage::manager::StorageManager;

/// Main entry point for the finance dashboard core library.
/// Holds the ledger state and the services that operate on it.
#[must_use]
pub struct FinanceDashboard {
    ledger: Ledger,
    ledger_service: LedgerService,
    valuation_service: ValuationService,
    summary_service: SummaryService,
    rollup_service: RollupService,
    smoothing_service: SmoothingService,
    price_service: PriceService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for FinanceDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinanceDashboard")
            .field("snapshots", &self.ledger.snapshots.len())
            .field("entries", &self.ledger.entries.len())
            .field("settings", &self.ledger.settings)
            .field("fetched_prices", &self.ledger.price_book.total_entries())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl FinanceDashboard {
    /// Create a brand new empty ledger with default settings.
    pub fn create_new() -> Self {
        Self::build(Ledger::default(), PriceProviderRegistry::new_with_defaults())
    }

    /// Create an empty ledger wired to a custom provider registry.
    /// Intended for offline use and for tests with stub providers.
    pub fn with_registry(registry: PriceProviderRegistry) -> Self {
        Self::build(Ledger::default(), registry)
    }

    /// Load an existing ledger from encrypted bytes (password required).
    /// Use this for WASM / Tauri where the frontend handles file I/O.
    pub fn load_from_bytes(encrypted: &[u8], password: &str) -> Result<Self, CoreError> {
        let ledger = StorageManager::load_from_bytes(encrypted, password)?;
        Ok(Self::build(ledger, PriceProviderRegistry::new_with_defaults()))
    }

    /// Save the current ledger to encrypted bytes.
    /// Returns raw bytes that the frontend can write to a file.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = StorageManager::save_to_bytes(&self.ledger, password)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load from an encrypted file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str, password: &str) -> Result<Self, CoreError> {
        let ledger = StorageManager::load_from_file(path, password)?;
        Ok(Self::build(ledger, PriceProviderRegistry::new_with_defaults()))
    }

    /// Save to an encrypted file on disk (native only, not WASM).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&mut self, path: &str, password: &str) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.ledger, path, password)?;
        self.dirty = false;
        Ok(())
    }

    // ── Snapshots ───────────────────────────────────────────────────

    /// Insert or replace the snapshot for its month.
    ///
    /// The month is normalized to its first day and the record sanitized,
    /// so submitting the same month twice updates in place. Returns the
    /// snapshot as stored.
    pub fn upsert_snapshot(&mut self, snapshot: MonthlySnapshot) -> MonthlySnapshot {
        let stored = self.ledger_service.upsert_snapshot(&mut self.ledger, snapshot);
        self.dirty = true;
        stored
    }

    /// The snapshot for the month containing `month`, if recorded.
    #[must_use]
    pub fn get_snapshot(&self, month: NaiveDate) -> Option<&MonthlySnapshot> {
        self.ledger_service.snapshot_for(&self.ledger, month)
    }

    /// Up to `n` most recent snapshots, newest first.
    #[must_use]
    pub fn latest_snapshots(&self, n: usize) -> Vec<&MonthlySnapshot> {
        self.ledger_service.latest_snapshots(&self.ledger, n)
    }

    /// Number of recorded snapshot months.
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.ledger.snapshots.len()
    }

    // ── Finance entries ─────────────────────────────────────────────

    /// Insert or replace the income/outcome entry for `date`.
    pub fn upsert_entry(&mut self, date: NaiveDate, income: f64, outcome: f64) -> FinanceEntry {
        let stored = self
            .ledger_service
            .upsert_entry(&mut self.ledger, date, income, outcome);
        self.dirty = true;
        stored
    }

    /// Entries within an (optional) date range, oldest first.
    #[must_use]
    pub fn entries_in_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Vec<&FinanceEntry> {
        self.ledger_service.entries_in_range(&self.ledger, start, end)
    }

    /// Number of recorded finance entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.ledger.entries.len()
    }

    // ── Valuation & Overview ────────────────────────────────────────

    /// EUR value per category for the month containing `month`.
    /// An unrecorded month values to all zeros.
    #[must_use]
    pub fn category_totals_for(&self, month: NaiveDate) -> CategoryTotals {
        let snapshot = self.ledger_service.snapshot_for(&self.ledger, month);
        self.valuation_service
            .valuate(snapshot, &self.ledger.price_book)
    }

    /// Full portfolio overview as of the latest recorded month: per-category
    /// EUR totals, allocation percentages and month-over-month trends
    /// against the immediately preceding recorded month.
    #[must_use]
    pub fn portfolio_overview(&self) -> PortfolioOverview {
        let latest = self.ledger_service.latest_snapshots(&self.ledger, 2);
        let current = latest.first().copied();
        let previous = latest.get(1).copied();

        let current_totals =
            current.map(|s| self.valuation_service.valuate(Some(s), &self.ledger.price_book));
        let previous_totals =
            previous.map(|s| self.valuation_service.valuate(Some(s), &self.ledger.price_book));

        self.summary_service.overview(
            current.map(|s| s.month),
            current_totals.as_ref(),
            previous_totals.as_ref(),
        )
    }

    /// Income/outcome of the latest calendar month with finance entries,
    /// against the calendar month right before it. `None` until at least
    /// one entry exists; an empty previous month compares as zero and both
    /// trends are 0.
    #[must_use]
    pub fn monthly_comparison(&self) -> Option<MonthlyComparison> {
        let current_month = self.ledger_service.latest_entry_month(&self.ledger)?;
        let previous_month = normalize_month(current_month.pred_opt()?);

        let (current_income, current_outcome) = self
            .ledger_service
            .entry_month_totals(&self.ledger, current_month);
        let (previous_income, previous_outcome) = self
            .ledger_service
            .entry_month_totals(&self.ledger, previous_month);

        Some(MonthlyComparison {
            month: current_month,
            current_income,
            previous_income,
            income_change_pct: SummaryService::percent_change(previous_income, current_income),
            current_outcome,
            previous_outcome,
            outcome_change_pct: SummaryService::percent_change(previous_outcome, current_outcome),
        })
    }

    // ── Annual rollups ──────────────────────────────────────────────

    /// Per-year metrics from the finance entries, ascending by year.
    #[must_use]
    pub fn annual_metrics(&self) -> Vec<AnnualMetric> {
        let flows = self.ledger_service.entry_cash_flows(&self.ledger);
        self.rollup_service.rollup_annual(&flows)
    }

    /// Per-year metrics from the snapshots' budget fields (fixed plus
    /// variable income/expenses), ascending by year.
    #[must_use]
    pub fn annual_budget_metrics(&self) -> Vec<AnnualMetric> {
        let flows = self.ledger_service.snapshot_cash_flows(&self.ledger);
        self.rollup_service.rollup_annual(&flows)
    }

    /// Total entry income over the 12 months up to and including `as_of`.
    #[must_use]
    pub fn income_last_12_months(&self, as_of: NaiveDate) -> f64 {
        let start = as_of
            .checked_sub_months(Months::new(12))
            .and_then(|d| d.succ_opt())
            .unwrap_or(as_of);
        self.ledger_service
            .entries_in_range(&self.ledger, Some(start), Some(as_of))
            .iter()
            .map(|e| e.income)
            .sum()
    }

    /// Total entry income in `as_of`'s calendar month one year earlier.
    /// Zero when that month has no entries.
    #[must_use]
    pub fn income_same_month_last_year(&self, as_of: NaiveDate) -> f64 {
        normalize_month(as_of)
            .checked_sub_months(Months::new(12))
            .map(|month| self.ledger_service.entry_month_totals(&self.ledger, month).0)
            .unwrap_or(0.0)
    }

    // ── Smoothing ───────────────────────────────────────────────────

    /// Trailing moving average of the finance-entry cash flows with an
    /// explicit window (in months).
    pub fn smoothed_cash_flow(&self, window: usize) -> Result<Vec<SmoothedPoint>, CoreError> {
        let flows = self.ledger_service.entry_cash_flows(&self.ledger);
        self.smoothing_service.moving_average(&flows, window)
    }

    /// Trailing moving average using the window from settings.
    pub fn smoothed_cash_flow_default(&self) -> Result<Vec<SmoothedPoint>, CoreError> {
        self.smoothed_cash_flow(self.ledger.settings.smoothing_window)
    }

    /// Raw finance-entry cash flows, oldest first.
    #[must_use]
    pub fn cash_flows(&self) -> Vec<CashFlowPoint> {
        self.ledger_service.entry_cash_flows(&self.ledger)
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// Refresh fetched prices for every recorded snapshot month.
    ///
    /// Failures are logged and skipped per asset; the valuation for a
    /// missing price degrades to its fallback chain rather than aborting
    /// the refresh. Returns how many prices were written.
    pub async fn refresh_prices(&mut self) -> usize {
        let months: Vec<NaiveDate> = self.ledger.snapshots.keys().copied().collect();
        let mut updated = 0;

        for month in months {
            updated += self
                .price_service
                .refresh_month(
                    &mut self.ledger.price_book,
                    &mut self.ledger.rate_cache,
                    month,
                )
                .await;
        }

        if updated > 0 {
            self.dirty = true;
        }
        updated
    }

    /// Refresh fetched prices for a single month.
    pub async fn refresh_prices_for(&mut self, month: NaiveDate) -> usize {
        let month = normalize_month(month);
        let updated = self
            .price_service
            .refresh_month(
                &mut self.ledger.price_book,
                &mut self.ledger.rate_cache,
                month,
            )
            .await;
        if updated > 0 {
            self.dirty = true;
        }
        updated
    }

    /// A fetched price for a field in a month, if present in the book.
    #[must_use]
    pub fn fetched_price(&self, field: config::AssetField, month: NaiveDate) -> Option<f64> {
        self.ledger.price_book.price(field, normalize_month(month))
    }

    /// Manually insert a price into the book (offline use, historical
    /// import, tests).
    pub fn set_fetched_price(&mut self, field: config::AssetField, month: NaiveDate, price: f64) {
        self.ledger
            .price_book
            .set_price(field, normalize_month(month), price);
        self.dirty = true;
    }

    /// Total number of fetched price points across all fields.
    #[must_use]
    pub fn price_book_entries(&self) -> usize {
        self.ledger.price_book.total_entries()
    }

    /// Drop all fetched prices and cached FX rates.
    pub fn clear_price_data(&mut self) {
        self.ledger.price_book.clear();
        self.ledger.rate_cache.clear();
        self.dirty = true;
    }

    // ── Provider availability ───────────────────────────────────────

    /// Check if at least one price provider is available for a field kind.
    #[must_use]
    pub fn is_provider_available(&self, kind: FieldKind) -> bool {
        self.price_service.has_provider_for(kind)
    }

    /// Names of available providers for a field kind.
    #[must_use]
    pub fn provider_names(&self, kind: FieldKind) -> Vec<String> {
        self.price_service.provider_names(kind)
    }

    // ── Settings & dirty state ──────────────────────────────────────

    /// Set the moving-average window used by `smoothed_cash_flow_default`.
    pub fn set_smoothing_window(&mut self, window: usize) -> Result<(), CoreError> {
        if window == 0 {
            return Err(CoreError::ValidationError(
                "Smoothing window must be at least 1 month".into(),
            ));
        }
        self.ledger.settings.smoothing_window = window;
        self.dirty = true;
        Ok(())
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.ledger.settings
    }

    /// Returns `true` if the ledger has been modified since the last save
    /// or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Export all snapshots as a JSON string, oldest month first.
    pub fn export_snapshots_to_json(&self) -> Result<String, CoreError> {
        let snapshots: Vec<&MonthlySnapshot> = self.ledger.snapshots.values().collect();
        serde_json::to_string_pretty(&snapshots).map_err(|e| {
            CoreError::Serialization(format!("Failed to serialize snapshots to JSON: {e}"))
        })
    }

    /// Export the full ledger as JSON (unencrypted, for debugging/display).
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.ledger)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(ledger: Ledger, registry: PriceProviderRegistry) -> Self {
        Self {
            ledger,
            ledger_service: LedgerService::new(),
            valuation_service: ValuationService::new(),
            summary_service: SummaryService::new(),
            rollup_service: RollupService::new(),
            smoothing_service: SmoothingService::new(),
            price_service: PriceService::new(registry),
            dirty: false,
        }
    }
}
