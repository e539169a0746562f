use chrono::{Datelike, NaiveDate};
use log::{debug, warn};

use crate::config;
use crate::models::price::RateCache;
use crate::providers::frankfurter::FrankfurterClient;

/// Resolves USD→EUR rates with caching and a static fallback.
///
/// Resolution order: the passed-in cache, then a live Frankfurter lookup,
/// then the configured yearly-average table. Rate resolution itself never
/// fails — a dead FX source degrades precision, not availability.
pub struct CurrencyService {
    frankfurter: FrankfurterClient,
}

impl CurrencyService {
    pub fn new() -> Self {
        Self {
            frankfurter: FrankfurterClient::new(),
        }
    }

    /// USD→EUR multiplier for the given date.
    ///
    /// Live rates are cached per date. The yearly fallback is NOT cached,
    /// so a later refresh can still pick up the live rate.
    pub async fn usd_to_eur(&self, cache: &mut RateCache, date: NaiveDate) -> f64 {
        if let Some(rate) = cache.get(date) {
            debug!("USD/EUR rate for {date} served from cache: {rate}");
            return rate;
        }

        match self.frankfurter.usd_to_eur(date).await {
            Ok(rate) if rate.is_finite() && rate > 0.0 => {
                cache.set(date, rate);
                rate
            }
            Ok(rate) => {
                warn!("Frankfurter returned unusable USD/EUR rate {rate} for {date}, using yearly fallback");
                config::fallback_usd_eur(date.year())
            }
            Err(e) => {
                warn!("USD/EUR lookup for {date} failed ({e}), using yearly fallback");
                config::fallback_usd_eur(date.year())
            }
        }
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
