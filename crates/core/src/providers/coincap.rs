use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::config::FieldKind;
use crate::errors::CoreError;

use super::traits::{crypto_reference_date, MonthlyPriceProvider, QuoteCurrency};

const BASE_URL: &str = "https://api.coincap.io/v2";

/// CoinCap API provider for cryptocurrency prices.
///
/// - **Free**: no API key required.
/// - **Quotes in USD** — the refresh pipeline converts to EUR afterwards.
/// - **Reference date**: last day of the target month, or yesterday when
///   the target month is the current one (today's close does not exist yet).
///
/// CoinCap addresses assets by lowercase ids ("ethereum", not "ETH");
/// the tracked symbols are mapped statically.
pub struct CoinCapProvider {
    client: Client,
}

impl CoinCapProvider {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    /// Resolve a symbol like "ETH" to a CoinCap id like "ethereum".
    /// Unknown symbols fall back to their lowercase form, which matches
    /// CoinCap's naming for many single-word assets.
    pub fn resolve_id(symbol: &str) -> String {
        match symbol.to_uppercase().as_str() {
            "BTC" => "bitcoin".into(),
            "ETH" => "ethereum".into(),
            "SOL" => "solana".into(),
            "LINK" => "chainlink".into(),
            "OP" => "optimism".into(),
            "USDT" => "tether".into(),
            other => other.to_lowercase(),
        }
    }
}

impl Default for CoinCapProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── CoinCap API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct HistoryResponse {
    data: Vec<HistoryPoint>,
}

#[derive(Deserialize)]
struct HistoryPoint {
    #[serde(rename = "priceUsd")]
    price_usd: String,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MonthlyPriceProvider for CoinCapProvider {
    fn name(&self) -> &str {
        "CoinCap"
    }

    fn supported_kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::Crypto]
    }

    fn quote_currency(&self) -> QuoteCurrency {
        QuoteCurrency::Usd
    }

    async fn month_price(
        &self,
        symbol: &str,
        month: NaiveDate,
        today: NaiveDate,
    ) -> Result<f64, CoreError> {
        let reference = crypto_reference_date(month, today);
        let id = Self::resolve_id(symbol);

        let start = reference
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("Invalid reference date {reference}"),
            })?
            .and_utc()
            .timestamp_millis();
        let end = reference
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("Invalid reference date {reference}"),
            })?
            .and_utc()
            .timestamp_millis();

        let url = format!("{BASE_URL}/assets/{id}/history?interval=d1&start={start}&end={end}");

        let resp: HistoryResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("Failed to parse history for {symbol}: {e}"),
            })?;

        let price_usd: f64 = resp
            .data
            .first()
            .ok_or_else(|| CoreError::PriceNotAvailable {
                symbol: symbol.to_string(),
                date: reference.to_string(),
            })?
            .price_usd
            .parse()
            .map_err(|e| CoreError::Api {
                provider: "CoinCap".into(),
                message: format!("Invalid price format for {symbol}: {e}"),
            })?;

        Ok(price_usd)
    }
}
