use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::Category;

/// Per-category EUR totals for one snapshot, plus the grand total.
///
/// Statically shaped: one field per category. Built by the valuation
/// engine via the category map and discarded after the response — never
/// persisted or cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub liquidity: f64,
    pub stock: f64,
    pub bond: f64,
    pub pension: f64,
    pub crypto: f64,
    /// Sum of all category totals.
    pub total: f64,
}

impl CategoryTotals {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Liquidity => self.liquidity,
            Category::Stock => self.stock,
            Category::Bond => self.bond,
            Category::Pension => self.pension,
            Category::Crypto => self.crypto,
        }
    }

    /// Add to one category total. Does not touch `total` — the valuation
    /// engine recomputes it once at the end.
    pub fn add(&mut self, category: Category, value: f64) {
        match category {
            Category::Liquidity => self.liquidity += value,
            Category::Stock => self.stock += value,
            Category::Bond => self.bond += value,
            Category::Pension => self.pension += value,
            Category::Crypto => self.crypto += value,
        }
    }
}

/// One category's slice of a reporting period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSummary {
    pub category: Category,

    /// EUR value of this category in the current period.
    pub total_value_eur: f64,

    /// Share of the grand total, 0–100. Zero when the portfolio is empty.
    pub allocation_pct: f64,

    /// Change vs. the previous period, percent. Zero when there is no
    /// previous period or the previous value was zero.
    pub trend_pct: f64,
}

/// Full portfolio view for one reporting period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioOverview {
    /// Month of the snapshot this overview was computed from, if any.
    pub as_of_month: Option<NaiveDate>,

    /// Per-category totals of the current period.
    pub totals: CategoryTotals,

    /// One entry per category, in reporting order.
    pub summaries: Vec<AssetSummary>,

    /// Grand-total change vs. the previous period, percent.
    pub overall_trend_pct: f64,
}

/// Income/expense rollup for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualMetric {
    pub year: i32,
    pub total_income: f64,
    pub total_expenses: f64,
    /// income − expenses.
    pub net_savings: f64,
    /// Fraction of income retained, 0–1. Zero when income is zero.
    /// Scaling to percent is a presentation concern.
    pub saving_rate: f64,
    /// Income change vs. the previous year, percent.
    pub income_yoy: f64,
    /// Expense change vs. the previous year, percent.
    pub expenses_yoy: f64,
}

/// One point of an income/expense time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub date: NaiveDate,
    pub income: f64,
    pub expenses: f64,
}

/// One point of a smoothed income/expense series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedPoint {
    pub date: NaiveDate,
    pub income_avg: f64,
    pub expenses_avg: f64,
}

/// Latest calendar month of finance entries against the month before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyComparison {
    /// First day of the month being compared.
    pub month: NaiveDate,
    pub current_income: f64,
    pub previous_income: f64,
    /// Percent change; zero when the previous month had no income.
    pub income_change_pct: f64,
    pub current_outcome: f64,
    pub previous_outcome: f64,
    /// Percent change; zero when the previous month had no outcome.
    pub outcome_change_pct: f64,
}
