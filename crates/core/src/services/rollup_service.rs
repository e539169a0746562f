use chrono::Datelike;
use std::collections::BTreeMap;

use crate::models::summary::{AnnualMetric, CashFlowPoint};

use super::summary_service::SummaryService;

/// Aggregates a monthly income/expense series into per-year metrics.
pub struct RollupService;

impl RollupService {
    pub fn new() -> Self {
        Self
    }

    /// Group by calendar year and compute totals, net savings, saving rate
    /// and year-over-year deltas. Output is ordered by ascending year, and
    /// "previous year" for YoY is always the immediately preceding element
    /// of that output — grouping goes through a `BTreeMap` so iteration
    /// order can never depend on insertion order.
    ///
    /// Saving rate is a 0–1 fraction (0 when the year had no income);
    /// scaling to percent belongs to the presentation layer.
    pub fn rollup_annual(&self, flows: &[CashFlowPoint]) -> Vec<AnnualMetric> {
        let mut years: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
        for flow in flows {
            let totals = years.entry(flow.date.year()).or_insert((0.0, 0.0));
            totals.0 += flow.income;
            totals.1 += flow.expenses;
        }

        let mut metrics = Vec::with_capacity(years.len());
        let mut previous: Option<(f64, f64)> = None;

        for (year, (income, expenses)) in years {
            let saving_rate = if income > 0.0 {
                (income - expenses) / income
            } else {
                0.0
            };
            let income_yoy = previous
                .map(|(prev_income, _)| SummaryService::percent_change(prev_income, income))
                .unwrap_or(0.0);
            let expenses_yoy = previous
                .map(|(_, prev_expenses)| SummaryService::percent_change(prev_expenses, expenses))
                .unwrap_or(0.0);

            metrics.push(AnnualMetric {
                year,
                total_income: income,
                total_expenses: expenses,
                net_savings: income - expenses,
                saving_rate,
                income_yoy,
                expenses_yoy,
            });

            previous = Some((income, expenses));
        }

        metrics
    }
}

impl Default for RollupService {
    fn default() -> Self {
        Self::new()
    }
}
