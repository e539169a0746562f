use crate::config::FieldKind;

use super::coincap::CoinCapProvider;
use super::traits::MonthlyPriceProvider;
#[cfg(not(target_arch = "wasm32"))]
use super::yahoo_etf::YahooEtfProvider;

/// Registry of all available price providers.
///
/// Routes lookups to the right provider based on [`FieldKind`]. Providers
/// are tried in registration order, so a fallback source only needs to be
/// registered after the primary.
pub struct PriceProviderRegistry {
    providers: Vec<Box<dyn MonthlyPriceProvider>>,
}

impl PriceProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();

        // CoinCap — crypto, keyless
        registry.register(Box::new(CoinCapProvider::new()));

        // Yahoo Finance — ETF quotes, keyless.
        // Not available on WASM (uses native reqwest/tokio connectors).
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(yahoo) = YahooEtfProvider::new() {
                registry.register(Box::new(yahoo));
            }
        }

        registry
    }

    /// Register a new price provider.
    pub fn register(&mut self, provider: Box<dyn MonthlyPriceProvider>) {
        self.providers.push(provider);
    }

    /// First provider that can quote the given field kind.
    pub fn get_provider_for(&self, kind: FieldKind) -> Option<&dyn MonthlyPriceProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_kinds().contains(&kind))
            .map(|p| p.as_ref())
    }

    /// All providers for a field kind, in registration order.
    pub fn get_providers_for(&self, kind: FieldKind) -> Vec<&dyn MonthlyPriceProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_kinds().contains(&kind))
            .map(|p| p.as_ref())
            .collect()
    }
}

impl Default for PriceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
