use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use time::OffsetDateTime;

use crate::config::{self, FieldKind};
use crate::errors::CoreError;

use super::traits::{last_day_of_month, MonthlyPriceProvider, QuoteCurrency};

/// How many days before month end to search for the latest close.
/// Covers holiday bridges around a weekend month end.
const LOOKBACK_DAYS: i64 = 7;

/// Yahoo Finance provider for ETF month-end quotes.
///
/// - **Free**: no API key required (unofficial public API).
/// - **Policy**: latest close at or before the last day of the month,
///   searched backward up to [`LOOKBACK_DAYS`] days.
/// - **Unit quirk**: London listings quote in pence; raw closes for tickers
///   flagged in the listing table are divided by 100.
///
/// Not WASM-compatible (the `yahoo_finance_api` crate uses native
/// reqwest/tokio connectors).
pub struct YahooEtfProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooEtfProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// Convert a `chrono::NaiveDate` to `time::OffsetDateTime` (midnight UTC).
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let month = time::Month::try_from(date.month() as u8).map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Invalid month in {date}: {e}"),
        })?;

        let odt = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Invalid date {date}: {e}"),
            })?
            .midnight()
            .assume_utc();
        Ok(odt)
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }
}

#[async_trait]
impl MonthlyPriceProvider for YahooEtfProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn supported_kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::Etf]
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
        let month_end = last_day_of_month(month);
        let window_start = month_end - chrono::Duration::days(LOOKBACK_DAYS);

        let start = Self::to_offset_datetime(window_start)?;
        // End one day past month end so the month-end close itself is included
        let end = Self::to_offset_datetime(month_end + chrono::Duration::days(1))?;

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch history for {symbol} near {month_end}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to parse quotes for {symbol}: {e}"),
        })?;

        // Latest close at or before month end
        let quote = quotes
            .iter()
            .filter(|q| {
                Self::timestamp_to_naive_date(q.timestamp).is_some_and(|d| d <= month_end)
            })
            .max_by_key(|q| q.timestamp)
            .ok_or_else(|| CoreError::PriceNotAvailable {
                symbol: symbol.to_string(),
                date: month_end.to_string(),
            })?;

        Ok(correct_minor_units(symbol, quote.close))
    }
}

/// Divide a raw close by 100 when the listing quotes in minor units (pence).
pub fn correct_minor_units(ticker: &str, raw_close: f64) -> f64 {
    if config::quoted_in_minor_units(ticker) {
        raw_close / 100.0
    } else {
        raw_close
    }
}
