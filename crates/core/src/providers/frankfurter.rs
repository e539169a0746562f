use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;

const BASE_URL: &str = "https://api.frankfurter.dev/v1";

/// Frankfurter API client for USD→EUR exchange rates.
///
/// - **Free**: no API key, no rate limits, ECB data.
/// - One endpoint is enough here: `/{date}?base=USD&symbols=EUR`.
///
/// This client only does the HTTP call. Caching and the yearly-average
/// fallback live in the currency service, which is why a failed lookup is
/// surfaced as an error rather than silently patched over.
pub struct FrankfurterClient {
    client: Client,
}

impl FrankfurterClient {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    /// USD→EUR rate on the given date.
    /// Frankfurter returns the closest prior banking day for weekends.
    pub async fn usd_to_eur(&self, date: NaiveDate) -> Result<f64, CoreError> {
        let date_str = date.format("%Y-%m-%d");
        let url = format!("{BASE_URL}/{date_str}?base=USD&symbols=EUR");

        let resp: RatesResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("Failed to parse USD/EUR rate for {date}: {e}"),
            })?;

        resp.rates
            .get("EUR")
            .copied()
            .ok_or_else(|| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("No EUR rate in response for {date}"),
            })
    }
}

impl Default for FrankfurterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}
