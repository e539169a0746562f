use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

use crate::config::FieldKind;
use crate::errors::CoreError;

/// Currency a provider quotes prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteCurrency {
    Eur,
    Usd,
}

/// Trait abstraction for month-referenced price sources.
///
/// Each quote API (Yahoo Finance for ETFs, CoinCap for crypto) implements
/// this trait. The refresh pipeline never talks to an API directly — if a
/// source stops working, only its implementation changes.
///
/// `month` is always the first day of the target month; `today` anchors the
/// provider's own reference-date policy for the current month.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MonthlyPriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which field kinds this provider can quote.
    fn supported_kinds(&self) -> Vec<FieldKind>;

    /// Currency the returned prices are denominated in.
    fn quote_currency(&self) -> QuoteCurrency;

    /// Unit price of `symbol` for the given month.
    async fn month_price(
        &self,
        symbol: &str,
        month: NaiveDate,
        today: NaiveDate,
    ) -> Result<f64, CoreError>;
}

/// Last calendar day of the given month.
pub fn last_day_of_month(month: NaiveDate) -> NaiveDate {
    let first_of_next = if month.month() == 12 {
        NaiveDate::from_ymd_opt(month.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(month.year(), month.month() + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .unwrap_or(month)
}

/// Reference date for a crypto quote: the last day of the month, or
/// yesterday when the target month is still running.
pub fn crypto_reference_date(month: NaiveDate, today: NaiveDate) -> NaiveDate {
    if month.year() == today.year() && month.month() == today.month() {
        today.pred_opt().unwrap_or(today)
    } else {
        last_day_of_month(month)
    }
}
