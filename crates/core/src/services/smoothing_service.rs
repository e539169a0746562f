use crate::errors::CoreError;
use crate::models::summary::{CashFlowPoint, SmoothedPoint};

/// Trailing moving average over an income/expense series.
pub struct SmoothingService;

impl SmoothingService {
    pub fn new() -> Self {
        Self
    }

    /// Smooth a chronologically ascending series with a trailing window of
    /// `window` points. The window shrinks at the start of the series, so
    /// the first output point equals the first input point and every input
    /// point produces exactly one output point, in order.
    ///
    /// Pure: the input is not touched and the result depends on nothing
    /// but the arguments.
    pub fn moving_average(
        &self,
        series: &[CashFlowPoint],
        window: usize,
    ) -> Result<Vec<SmoothedPoint>, CoreError> {
        if window == 0 {
            return Err(CoreError::ValidationError(
                "Smoothing window must be at least 1 month".into(),
            ));
        }

        Ok(series
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let start = i.saturating_sub(window - 1);
                let tail = &series[start..=i];
                let n = tail.len() as f64;
                SmoothedPoint {
                    date: point.date,
                    income_avg: tail.iter().map(|p| p.income).sum::<f64>() / n,
                    expenses_avg: tail.iter().map(|p| p.expenses).sum::<f64>() / n,
                }
            })
            .collect())
    }
}

impl Default for SmoothingService {
    fn default() -> Self {
        Self::new()
    }
}
