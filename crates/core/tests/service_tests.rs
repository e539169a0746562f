// ═══════════════════════════════════════════════════════════════════
// Service & Integration Tests — LedgerService, ValuationService,
// SummaryService, RollupService, SmoothingService, FinanceDashboard
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use finance_dashboard_core::config::{AssetField, Category, FieldKind};
use finance_dashboard_core::errors::CoreError;
use finance_dashboard_core::models::ledger::Ledger;
use finance_dashboard_core::models::price::PriceBook;
use finance_dashboard_core::models::snapshot::MonthlySnapshot;
use finance_dashboard_core::models::summary::CashFlowPoint;
use finance_dashboard_core::providers::registry::PriceProviderRegistry;
use finance_dashboard_core::providers::traits::{MonthlyPriceProvider, QuoteCurrency};
use finance_dashboard_core::services::ledger_service::LedgerService;
use finance_dashboard_core::services::rollup_service::RollupService;
use finance_dashboard_core::services::smoothing_service::SmoothingService;
use finance_dashboard_core::services::summary_service::SummaryService;
use finance_dashboard_core::services::valuation_service::ValuationService;
use finance_dashboard_core::FinanceDashboard;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
}

// ═══════════════════════════════════════════════════════════════════
// Stub provider — fixed EUR quotes, no network
// ═══════════════════════════════════════════════════════════════════

struct StubProvider {
    prices: HashMap<String, f64>,
}

impl StubProvider {
    fn new() -> Self {
        let mut prices = HashMap::new();
        prices.insert("ETH".into(), 2500.0);
        prices.insert("SOL".into(), 120.0);
        prices.insert("LINK".into(), 15.0);
        prices.insert("OP".into(), 2.0);
        prices.insert("MWRD.MI".into(), 86.0);
        prices.insert("SMEA.L".into(), 33.0);
        prices.insert("XMME.DE".into(), 41.0);
        Self { prices }
    }
}

#[async_trait]
impl MonthlyPriceProvider for StubProvider {
    fn name(&self) -> &str {
        "Stub"
    }

    fn supported_kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::Crypto, FieldKind::Etf]
    }

    fn quote_currency(&self) -> QuoteCurrency {
        QuoteCurrency::Eur
    }

    async fn month_price(
        &self,
        symbol: &str,
        month: NaiveDate,
        _today: NaiveDate,
    ) -> Result<f64, CoreError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or(CoreError::PriceNotAvailable {
                symbol: symbol.to_string(),
                date: month.to_string(),
            })
    }
}

fn stub_registry() -> PriceProviderRegistry {
    let mut registry = PriceProviderRegistry::new();
    registry.register(Box::new(StubProvider::new()));
    registry
}

// ═══════════════════════════════════════════════════════════════════
// LedgerService
// ═══════════════════════════════════════════════════════════════════

mod ledger_service {
    use super::*;

    #[test]
    fn upsert_replaces_the_same_month() {
        let service = LedgerService::new();
        let mut ledger = Ledger::new();

        let mut first = MonthlySnapshot::new(date(2025, 1, 15));
        first.ing = 1000.0;
        service.upsert_snapshot(&mut ledger, first);

        let mut second = MonthlySnapshot::new(date(2025, 1, 28));
        second.ing = 1100.0;
        service.upsert_snapshot(&mut ledger, second);

        assert_eq!(ledger.snapshots.len(), 1);
        let stored = service.snapshot_for(&ledger, date(2025, 1, 3)).unwrap();
        assert_eq!(stored.ing, 1100.0);
        assert_eq!(stored.month, date(2025, 1, 1));
    }

    #[test]
    fn upsert_sanitizes_on_the_way_in() {
        let service = LedgerService::new();
        let mut ledger = Ledger::new();

        let mut snapshot = MonthlySnapshot::new(date(2025, 2, 1));
        snapshot.eth = -3.0;
        let stored = service.upsert_snapshot(&mut ledger, snapshot);
        assert_eq!(stored.eth, 0.0);
    }

    #[test]
    fn latest_snapshots_are_newest_first() {
        let service = LedgerService::new();
        let mut ledger = Ledger::new();
        for month in [date(2025, 1, 1), date(2025, 3, 1), date(2025, 2, 1)] {
            service.upsert_snapshot(&mut ledger, MonthlySnapshot::new(month));
        }

        let latest = service.latest_snapshots(&ledger, 2);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].month, date(2025, 3, 1));
        assert_eq!(latest[1].month, date(2025, 2, 1));
    }

    #[test]
    fn entries_in_range_is_inclusive() {
        let service = LedgerService::new();
        let mut ledger = Ledger::new();
        for day in [10, 15, 20] {
            service.upsert_entry(&mut ledger, date(2025, 1, day), 100.0, 50.0);
        }

        let within =
            service.entries_in_range(&ledger, Some(date(2025, 1, 10)), Some(date(2025, 1, 15)));
        assert_eq!(within.len(), 2);

        let all = service.entries_in_range(&ledger, None, None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].date, date(2025, 1, 10));
    }

    #[test]
    fn snapshot_cash_flows_use_budget_fields() {
        let service = LedgerService::new();
        let mut ledger = Ledger::new();

        let mut snapshot = MonthlySnapshot::new(date(2025, 1, 1));
        snapshot.fixed_income = 2000.0;
        snapshot.variable_income = 500.0;
        snapshot.fixed_expenses = 800.0;
        snapshot.variable_expenses = 200.0;
        service.upsert_snapshot(&mut ledger, snapshot);

        let flows = service.snapshot_cash_flows(&ledger);
        assert_eq!(flows.len(), 1);
        approx(flows[0].income, 2500.0);
        approx(flows[0].expenses, 1000.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// ValuationService
// ═══════════════════════════════════════════════════════════════════

mod valuation {
    use super::*;

    #[test]
    fn mixed_portfolio_with_estimates() {
        let mut snapshot = MonthlySnapshot::new(date(2025, 1, 1));
        snapshot.ing = 1000.0;
        snapshot.bbva = 500.0;
        snapshot.mwrd = 10.0; // estimate 85.5
        snapshot.eth = 2.0; // estimate 2450.0

        let totals = ValuationService::new().valuate(Some(&snapshot), &PriceBook::new());
        approx(totals.liquidity, 1500.0);
        approx(totals.stock, 855.0);
        approx(totals.crypto, 4900.0);
        approx(totals.bond, 0.0);
        approx(totals.pension, 0.0);
        approx(totals.total, 7255.0);
    }

    #[test]
    fn stored_price_beats_book_and_estimate() {
        let mut snapshot = MonthlySnapshot::new(date(2025, 1, 1));
        snapshot.eth = 1.0;
        snapshot.eth_price = Some(3000.0);

        let mut book = PriceBook::new();
        book.set_price(AssetField::Eth, date(2025, 1, 1), 2600.0);

        let totals = ValuationService::new().valuate(Some(&snapshot), &book);
        approx(totals.crypto, 3000.0);
    }

    #[test]
    fn book_price_beats_estimate() {
        let mut snapshot = MonthlySnapshot::new(date(2025, 1, 1));
        snapshot.sol = 2.0;

        let mut book = PriceBook::new();
        book.set_price(AssetField::Sol, date(2025, 1, 1), 100.0);

        let totals = ValuationService::new().valuate(Some(&snapshot), &book);
        approx(totals.crypto, 200.0);
    }

    #[test]
    fn stable_coin_uses_its_book_value() {
        let mut snapshot = MonthlySnapshot::new(date(2025, 1, 1));
        snapshot.usdt = 100.0;

        let totals = ValuationService::new().valuate(Some(&snapshot), &PriceBook::new());
        approx(totals.crypto, 90.0);
    }

    #[test]
    fn missing_snapshot_values_to_zero() {
        let totals = ValuationService::new().valuate(None, &PriceBook::new());
        approx(totals.total, 0.0);
        for category in Category::ALL {
            approx(totals.get(category), 0.0);
        }
    }

    #[test]
    fn categories_sum_to_the_grand_total() {
        let mut snapshot = MonthlySnapshot::new(date(2025, 1, 1));
        snapshot.ing = 123.45;
        snapshot.bond = 6000.0;
        snapshot.cometa = 7500.0;
        snapshot.smea = 3.0;
        snapshot.link = 50.0;
        snapshot.usdt = 20.0;

        let totals = ValuationService::new().valuate(Some(&snapshot), &PriceBook::new());
        let by_category: f64 = Category::ALL.iter().map(|c| totals.get(*c)).sum();
        approx(totals.total, by_category);
    }
}

// ═══════════════════════════════════════════════════════════════════
// SummaryService
// ═══════════════════════════════════════════════════════════════════

mod summary {
    use super::*;

    #[test]
    fn percent_change_basic() {
        approx(SummaryService::percent_change(1000.0, 1100.0), 10.0);
        approx(SummaryService::percent_change(1000.0, 900.0), -10.0);
        approx(SummaryService::percent_change(1000.0, 1000.0), 0.0);
    }

    #[test]
    fn zero_base_yields_zero_not_one_hundred() {
        approx(SummaryService::percent_change(0.0, 500.0), 0.0);
        approx(SummaryService::percent_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn allocations_sum_to_one_hundred() {
        let mut snapshot = MonthlySnapshot::new(date(2025, 1, 1));
        snapshot.ing = 1000.0;
        snapshot.bbva = 500.0;
        snapshot.mwrd = 10.0;
        snapshot.eth = 2.0;

        let totals = ValuationService::new().valuate(Some(&snapshot), &PriceBook::new());
        let summaries = SummaryService::new().summarize(Some(&totals), None);

        assert_eq!(summaries.len(), Category::ALL.len());
        let sum: f64 = summaries.iter().map(|s| s.allocation_pct).sum();
        approx(sum, 100.0);
        approx(summaries[0].total_value_eur, 1500.0);
        approx(summaries[0].allocation_pct, 1500.0 / 7255.0 * 100.0);
    }

    #[test]
    fn trends_against_the_previous_period() {
        let mut current = finance_dashboard_core::models::summary::CategoryTotals::default();
        current.liquidity = 1100.0;
        current.total = 1100.0;
        let mut previous = finance_dashboard_core::models::summary::CategoryTotals::default();
        previous.liquidity = 1000.0;
        previous.total = 1000.0;

        let summaries = SummaryService::new().summarize(Some(&current), Some(&previous));
        approx(summaries[0].trend_pct, 10.0);
        // Stock had no previous value: trend stays zero
        approx(summaries[1].trend_pct, 0.0);
    }

    #[test]
    fn no_current_period_means_empty_summaries() {
        let overview = SummaryService::new().overview(None, None, None);
        assert!(overview.summaries.is_empty());
        assert_eq!(overview.as_of_month, None);
        approx(overview.overall_trend_pct, 0.0);
        approx(overview.totals.total, 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// RollupService
// ═══════════════════════════════════════════════════════════════════

mod rollup {
    use super::*;

    fn flows() -> Vec<CashFlowPoint> {
        vec![
            CashFlowPoint {
                date: date(2024, 6, 1),
                income: 700.0,
                expenses: 350.0,
            },
            CashFlowPoint {
                date: date(2023, 3, 1),
                income: 1000.0,
                expenses: 400.0,
            },
            CashFlowPoint {
                date: date(2024, 1, 1),
                income: 500.0,
                expenses: 250.0,
            },
        ]
    }

    #[test]
    fn groups_by_year_ascending() {
        let metrics = RollupService::new().rollup_annual(&flows());
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].year, 2023);
        assert_eq!(metrics[1].year, 2024);

        approx(metrics[0].total_income, 1000.0);
        approx(metrics[0].total_expenses, 400.0);
        approx(metrics[1].total_income, 1200.0);
        approx(metrics[1].total_expenses, 600.0);
    }

    #[test]
    fn saving_rate_is_a_fraction() {
        let metrics = RollupService::new().rollup_annual(&flows());
        approx(metrics[0].saving_rate, 0.6);
        approx(metrics[1].saving_rate, 0.5);
        approx(metrics[0].net_savings, 600.0);
        approx(metrics[1].net_savings, 600.0);
    }

    #[test]
    fn year_over_year_deltas() {
        let metrics = RollupService::new().rollup_annual(&flows());
        // First year has no predecessor
        approx(metrics[0].income_yoy, 0.0);
        approx(metrics[0].expenses_yoy, 0.0);
        approx(metrics[1].income_yoy, 20.0);
        approx(metrics[1].expenses_yoy, 50.0);
    }

    #[test]
    fn zero_income_year_has_zero_rate() {
        let flows = vec![CashFlowPoint {
            date: date(2025, 1, 1),
            income: 0.0,
            expenses: 300.0,
        }];
        let metrics = RollupService::new().rollup_annual(&flows);
        approx(metrics[0].saving_rate, 0.0);
        approx(metrics[0].net_savings, -300.0);
    }

    #[test]
    fn empty_series_yields_no_metrics() {
        assert!(RollupService::new().rollup_annual(&[]).is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// SmoothingService
// ═══════════════════════════════════════════════════════════════════

mod smoothing {
    use super::*;

    fn series(values: &[f64]) -> Vec<CashFlowPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| CashFlowPoint {
                date: date(2025, i as u32 + 1, 1),
                income: *v,
                expenses: v / 2.0,
            })
            .collect()
    }

    #[test]
    fn window_zero_is_rejected() {
        let err = SmoothingService::new()
            .moving_average(&series(&[100.0]), 0)
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn first_point_equals_the_input() {
        let smoothed = SmoothingService::new()
            .moving_average(&series(&[100.0, 200.0, 300.0]), 3)
            .unwrap();
        approx(smoothed[0].income_avg, 100.0);
        approx(smoothed[0].expenses_avg, 50.0);
    }

    #[test]
    fn window_shrinks_at_the_start() {
        let smoothed = SmoothingService::new()
            .moving_average(&series(&[100.0, 200.0, 300.0, 400.0]), 3)
            .unwrap();
        assert_eq!(smoothed.len(), 4);
        approx(smoothed[1].income_avg, 150.0); // mean of first 2
        approx(smoothed[2].income_avg, 200.0); // mean of first 3
        approx(smoothed[3].income_avg, 300.0); // mean of points 2..4
    }

    #[test]
    fn window_one_is_the_identity() {
        let input = series(&[10.0, 20.0, 30.0]);
        let smoothed = SmoothingService::new().moving_average(&input, 1).unwrap();
        for (raw, point) in input.iter().zip(&smoothed) {
            approx(point.income_avg, raw.income);
            approx(point.expenses_avg, raw.expenses);
            assert_eq!(point.date, raw.date);
        }
    }

    #[test]
    fn empty_series_is_fine() {
        let smoothed = SmoothingService::new().moving_average(&[], 12).unwrap();
        assert!(smoothed.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// FinanceDashboard facade
// ═══════════════════════════════════════════════════════════════════

mod facade {
    use super::*;

    #[test]
    fn overview_against_the_previous_month() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());

        let mut january = MonthlySnapshot::new(date(2025, 1, 1));
        january.ing = 1000.0;
        dashboard.upsert_snapshot(january);

        let mut february = MonthlySnapshot::new(date(2025, 2, 1));
        february.ing = 1100.0;
        dashboard.upsert_snapshot(february);

        let overview = dashboard.portfolio_overview();
        assert_eq!(overview.as_of_month, Some(date(2025, 2, 1)));
        approx(overview.totals.liquidity, 1100.0);
        approx(overview.overall_trend_pct, 10.0);
        approx(overview.summaries[0].trend_pct, 10.0);
        approx(overview.summaries[0].allocation_pct, 100.0);
    }

    #[test]
    fn single_snapshot_has_zero_trend() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());
        let mut snapshot = MonthlySnapshot::new(date(2025, 1, 1));
        snapshot.ing = 500.0;
        dashboard.upsert_snapshot(snapshot);

        let overview = dashboard.portfolio_overview();
        approx(overview.overall_trend_pct, 0.0);
    }

    #[test]
    fn empty_dashboard_overview() {
        let dashboard = FinanceDashboard::with_registry(stub_registry());
        let overview = dashboard.portfolio_overview();
        assert_eq!(overview.as_of_month, None);
        assert!(overview.summaries.is_empty());
        assert!(dashboard.monthly_comparison().is_none());
    }

    #[test]
    fn monthly_comparison_between_entry_months() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());
        dashboard.upsert_entry(date(2025, 1, 10), 1000.0, 400.0);
        dashboard.upsert_entry(date(2025, 1, 25), 500.0, 100.0);
        dashboard.upsert_entry(date(2025, 2, 10), 1800.0, 750.0);

        let comparison = dashboard.monthly_comparison().unwrap();
        assert_eq!(comparison.month, date(2025, 2, 1));
        approx(comparison.current_income, 1800.0);
        approx(comparison.previous_income, 1500.0);
        approx(comparison.income_change_pct, 20.0);
        approx(comparison.current_outcome, 750.0);
        approx(comparison.previous_outcome, 500.0);
        approx(comparison.outcome_change_pct, 50.0);
    }

    #[test]
    fn monthly_comparison_uses_zero_base_rule() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());
        // No entries at all in the month before
        dashboard.upsert_entry(date(2025, 2, 10), 2000.0, 900.0);

        let comparison = dashboard.monthly_comparison().unwrap();
        assert_eq!(comparison.month, date(2025, 2, 1));
        approx(comparison.current_income, 2000.0);
        approx(comparison.previous_income, 0.0);
        // A zero previous month is "no trend yet", never +100%
        approx(comparison.income_change_pct, 0.0);
        approx(comparison.outcome_change_pct, 0.0);
    }

    #[test]
    fn annual_metrics_from_entries() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());
        dashboard.upsert_entry(date(2023, 5, 1), 1000.0, 400.0);
        dashboard.upsert_entry(date(2024, 5, 1), 1200.0, 600.0);

        let metrics = dashboard.annual_metrics();
        assert_eq!(metrics.len(), 2);
        approx(metrics[0].saving_rate, 0.6);
        approx(metrics[1].income_yoy, 20.0);
    }

    #[test]
    fn trailing_twelve_month_income() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());
        dashboard.upsert_entry(date(2024, 6, 10), 999.0, 0.0); // just outside the window
        dashboard.upsert_entry(date(2024, 7, 1), 1000.0, 0.0);
        dashboard.upsert_entry(date(2025, 1, 15), 1100.0, 0.0);
        dashboard.upsert_entry(date(2025, 6, 10), 1200.0, 0.0);

        approx(dashboard.income_last_12_months(date(2025, 6, 10)), 3300.0);
        approx(dashboard.income_last_12_months(date(2024, 6, 10)), 999.0);
    }

    #[test]
    fn income_of_the_same_month_last_year() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());
        dashboard.upsert_entry(date(2024, 3, 5), 800.0, 0.0);
        dashboard.upsert_entry(date(2024, 3, 20), 200.0, 0.0);
        dashboard.upsert_entry(date(2025, 3, 5), 1500.0, 0.0);

        approx(dashboard.income_same_month_last_year(date(2025, 3, 18)), 1000.0);
        approx(dashboard.income_same_month_last_year(date(2025, 4, 1)), 0.0);
    }

    #[test]
    fn smoothing_uses_the_settings_window() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());
        for month in 1..=3 {
            dashboard.upsert_entry(date(2025, month, 1), 100.0 * month as f64, 50.0);
        }

        dashboard.set_smoothing_window(2).unwrap();
        let smoothed = dashboard.smoothed_cash_flow_default().unwrap();
        approx(smoothed[2].income_avg, 250.0);

        assert!(matches!(
            dashboard.set_smoothing_window(0),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_prices_fills_the_book() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());

        let mut snapshot = MonthlySnapshot::new(date(2025, 1, 1));
        snapshot.eth = 2.0;
        snapshot.mwrd = 10.0;
        dashboard.upsert_snapshot(snapshot);

        let updated = dashboard.refresh_prices().await;
        // 4 crypto symbols + 3 ETF tickers, all served by the stub
        assert_eq!(updated, 7);
        assert_eq!(dashboard.fetched_price(AssetField::Eth, date(2025, 1, 1)), Some(2500.0));
        assert_eq!(dashboard.fetched_price(AssetField::Mwrd, date(2025, 1, 1)), Some(86.0));

        // Fetched prices now drive the valuation
        let totals = dashboard.category_totals_for(date(2025, 1, 1));
        approx(totals.crypto, 5000.0);
        approx(totals.stock, 860.0);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_skips_unavailable_symbols() {
        let mut registry = PriceProviderRegistry::new();
        registry.register(Box::new(StubProvider {
            prices: HashMap::from([("ETH".to_string(), 2500.0)]),
        }));
        let mut dashboard = FinanceDashboard::with_registry(registry);

        dashboard.upsert_snapshot(MonthlySnapshot::new(date(2025, 1, 1)));
        let updated = dashboard.refresh_prices().await;
        assert_eq!(updated, 1);
        assert_eq!(dashboard.fetched_price(AssetField::Sol, date(2025, 1, 1)), None);
    }

    #[test]
    fn dirty_flag_tracks_mutations() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());
        assert!(!dashboard.has_unsaved_changes());

        dashboard.upsert_entry(date(2025, 1, 10), 100.0, 50.0);
        assert!(dashboard.has_unsaved_changes());

        let bytes = dashboard.save_to_bytes("pw").unwrap();
        assert!(!dashboard.has_unsaved_changes());

        let restored = FinanceDashboard::load_from_bytes(&bytes, "pw").unwrap();
        assert_eq!(restored.entry_count(), 1);
        assert!(!restored.has_unsaved_changes());
    }

    #[test]
    fn provider_availability() {
        let dashboard = FinanceDashboard::with_registry(stub_registry());
        assert!(dashboard.is_provider_available(FieldKind::Crypto));
        assert!(dashboard.is_provider_available(FieldKind::Etf));
        assert!(!dashboard.is_provider_available(FieldKind::EurDenominated));
        assert_eq!(dashboard.provider_names(FieldKind::Crypto), vec!["Stub"]);
    }

    #[test]
    fn export_snapshots_to_json() {
        let mut dashboard = FinanceDashboard::with_registry(stub_registry());
        let mut snapshot = MonthlySnapshot::new(date(2025, 1, 1));
        snapshot.ing = 1000.0;
        dashboard.upsert_snapshot(snapshot);

        let json = dashboard.export_snapshots_to_json().unwrap();
        assert!(json.contains("\"ing\": 1000.0"));
        assert!(json.contains("2025-01-01"));
    }
}
