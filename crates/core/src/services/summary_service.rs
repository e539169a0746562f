use chrono::NaiveDate;

use crate::config::Category;
use crate::models::summary::{AssetSummary, CategoryTotals, PortfolioOverview};

/// Computes allocation percentages and period-over-period trends from
/// already-valued snapshots.
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    /// Percentage change from `previous` to `current`.
    ///
    /// A zero (or negative) base yields 0 — never 100, never a division
    /// artifact. A category's first non-zero period is "no trend yet",
    /// not infinite growth.
    pub fn percent_change(previous: f64, current: f64) -> f64 {
        if previous > 0.0 {
            (current - previous) / previous * 100.0
        } else {
            0.0
        }
    }

    /// Per-category summaries for the current period against the previous.
    ///
    /// No current period → empty list. No previous period → all trends 0.
    pub fn summarize(
        &self,
        current: Option<&CategoryTotals>,
        previous: Option<&CategoryTotals>,
    ) -> Vec<AssetSummary> {
        let Some(current) = current else {
            return Vec::new();
        };

        Category::ALL
            .iter()
            .map(|&category| {
                let value = current.get(category);
                let allocation_pct = if current.total > 0.0 {
                    value / current.total * 100.0
                } else {
                    0.0
                };
                let trend_pct = previous
                    .map(|prev| Self::percent_change(prev.get(category), value))
                    .unwrap_or(0.0);

                AssetSummary {
                    category,
                    total_value_eur: value,
                    allocation_pct,
                    trend_pct,
                }
            })
            .collect()
    }

    /// Full overview: totals, per-category summaries and the grand-total
    /// trend, using the same zero-base rule throughout.
    pub fn overview(
        &self,
        as_of_month: Option<NaiveDate>,
        current: Option<&CategoryTotals>,
        previous: Option<&CategoryTotals>,
    ) -> PortfolioOverview {
        let totals = current.copied().unwrap_or_default();
        let overall_trend_pct = previous
            .map(|prev| Self::percent_change(prev.total, totals.total))
            .unwrap_or(0.0);

        PortfolioOverview {
            as_of_month,
            totals,
            summaries: self.summarize(current, previous),
            overall_trend_pct,
        }
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}
