use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One income/outcome record, keyed by calendar date.
///
/// Finer-grained than a [`super::snapshot::MonthlySnapshot`] — historically
/// these were recorded per pay period. Upserting the same date replaces the
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceEntry {
    pub date: NaiveDate,
    /// Money in, EUR (non-negative).
    pub income: f64,
    /// Money out, EUR (non-negative).
    pub outcome: f64,
}

impl FinanceEntry {
    pub fn new(date: NaiveDate, income: f64, outcome: f64) -> Self {
        Self {
            date,
            income,
            outcome,
        }
        .sanitized()
    }

    /// Clamp non-finite or negative amounts to zero.
    pub fn sanitized(mut self) -> Self {
        if !self.income.is_finite() || self.income < 0.0 {
            self.income = 0.0;
        }
        if !self.outcome.is_finite() || self.outcome < 0.0 {
            self.outcome = 0.0;
        }
        self
    }

    /// Amount retained this period.
    pub fn saving(&self) -> f64 {
        self.income - self.outcome
    }
}
