use chrono::NaiveDate;
use futures::future::join_all;
use log::{debug, warn};

use crate::config::{self, AssetField, FieldKind, ETF_FETCH_DELAY_MS};
use crate::errors::CoreError;
use crate::models::price::{PriceBook, RateCache};
use crate::providers::registry::PriceProviderRegistry;
use crate::providers::traits::{crypto_reference_date, last_day_of_month, QuoteCurrency};

use super::currency_service::CurrencyService;

/// Fetches live asset prices into the ledger's price book.
///
/// Scheduling discipline lives here, not in the engines: crypto quotes are
/// independent and fetched in parallel, while ETF quotes go to a
/// rate-limited source and are fetched strictly one at a time with a pause
/// between calls. A failed lookup is logged and skipped — one bad price
/// degrades one term of a later valuation, never the whole refresh.
pub struct PriceService {
    registry: PriceProviderRegistry,
    currency: CurrencyService,
}

impl PriceService {
    pub fn new(registry: PriceProviderRegistry) -> Self {
        Self {
            registry,
            currency: CurrencyService::new(),
        }
    }

    /// Check if at least one provider is available for a field kind.
    pub fn has_provider_for(&self, kind: FieldKind) -> bool {
        self.registry.get_provider_for(kind).is_some()
    }

    /// Names of all providers available for a field kind.
    pub fn provider_names(&self, kind: FieldKind) -> Vec<String> {
        self.registry
            .get_providers_for(kind)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Refresh fetched prices for every priced holding of one month.
    /// Returns how many prices were written into the book.
    pub async fn refresh_month(
        &self,
        book: &mut PriceBook,
        rates: &mut RateCache,
        month: NaiveDate,
    ) -> usize {
        let today = chrono::Utc::now().date_naive();
        let mut updated = 0;

        // Crypto quotes are independent of each other — fetch in parallel.
        let crypto_fetches = AssetField::ALL
            .iter()
            .copied()
            .filter(|f| f.kind() == FieldKind::Crypto)
            .filter_map(|field| config::crypto_symbol(field).map(|symbol| (field, symbol)))
            .map(|(field, symbol)| async move {
                (
                    field,
                    self.fetch_with_fallback(FieldKind::Crypto, symbol, month, today)
                        .await,
                )
            });

        for (field, result) in join_all(crypto_fetches).await {
            match result {
                Ok((price, quote)) => {
                    let reference = crypto_reference_date(month, today);
                    let eur = self.to_eur(rates, price, quote, reference).await;
                    book.set_price(field, month, eur);
                    updated += 1;
                    debug!("Refreshed {field} for {month}: {eur} EUR");
                }
                Err(e) => warn!("Skipping crypto price for {field} ({month}): {e}"),
            }
        }

        // The ETF source throttles aggressively — one call at a time,
        // with a pause between consecutive calls.
        let mut first = true;
        for field in AssetField::ALL
            .iter()
            .copied()
            .filter(|f| f.kind() == FieldKind::Etf)
        {
            let Some(listing) = config::etf_listing(field) else {
                continue;
            };

            if !first {
                #[cfg(not(target_arch = "wasm32"))]
                tokio::time::sleep(std::time::Duration::from_millis(ETF_FETCH_DELAY_MS)).await;
            }
            first = false;

            match self
                .fetch_with_fallback(FieldKind::Etf, listing.ticker, month, today)
                .await
            {
                Ok((price, quote)) => {
                    let eur = self
                        .to_eur(rates, price, quote, last_day_of_month(month))
                        .await;
                    book.set_price(field, month, eur);
                    updated += 1;
                    debug!("Refreshed {field} for {month}: {eur} EUR");
                }
                Err(e) => warn!("Skipping ETF price for {field} ({month}): {e}"),
            }
        }

        updated
    }

    /// Convert a quoted price to EUR if needed.
    async fn to_eur(
        &self,
        rates: &mut RateCache,
        price: f64,
        quote: QuoteCurrency,
        reference: NaiveDate,
    ) -> f64 {
        match quote {
            QuoteCurrency::Eur => price,
            QuoteCurrency::Usd => price * self.currency.usd_to_eur(rates, reference).await,
        }
    }

    /// Fetch one price, trying providers in registration order.
    /// Validates that the returned price is finite and non-negative.
    async fn fetch_with_fallback(
        &self,
        kind: FieldKind,
        symbol: &str,
        month: NaiveDate,
        today: NaiveDate,
    ) -> Result<(f64, QuoteCurrency), CoreError> {
        let providers = self.registry.get_providers_for(kind);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(format!("{kind:?}")));
        }

        let mut last_error = None;
        for provider in &providers {
            match provider.month_price(symbol, month, today).await {
                Ok(price) => {
                    if !price.is_finite() || price < 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid price returned for {symbol}: {price} (must be finite and non-negative)"
                            ),
                        });
                        continue;
                    }
                    return Ok((price, provider.quote_currency()));
                }
                Err(e) => {
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(format!("{kind:?}"))))
    }
}
