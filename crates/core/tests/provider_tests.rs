// ═══════════════════════════════════════════════════════════════════
// Provider Tests — reference dates, unit correction, registry routing
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;

use finance_dashboard_core::config::FieldKind;
use finance_dashboard_core::errors::CoreError;
use finance_dashboard_core::providers::coincap::CoinCapProvider;
use finance_dashboard_core::providers::registry::PriceProviderRegistry;
use finance_dashboard_core::providers::traits::{
    crypto_reference_date, last_day_of_month, MonthlyPriceProvider, QuoteCurrency,
};
use finance_dashboard_core::providers::yahoo_etf::correct_minor_units;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Reference dates
// ═══════════════════════════════════════════════════════════════════

mod reference_dates {
    use super::*;

    #[test]
    fn last_day_of_common_months() {
        assert_eq!(last_day_of_month(date(2025, 1, 1)), date(2025, 1, 31));
        assert_eq!(last_day_of_month(date(2025, 4, 1)), date(2025, 4, 30));
        assert_eq!(last_day_of_month(date(2025, 12, 1)), date(2025, 12, 31));
    }

    #[test]
    fn february_respects_leap_years() {
        assert_eq!(last_day_of_month(date(2024, 2, 1)), date(2024, 2, 29));
        assert_eq!(last_day_of_month(date(2025, 2, 1)), date(2025, 2, 28));
    }

    #[test]
    fn closed_month_references_its_last_day() {
        let reference = crypto_reference_date(date(2025, 1, 1), date(2025, 6, 15));
        assert_eq!(reference, date(2025, 1, 31));
    }

    #[test]
    fn running_month_references_yesterday() {
        let reference = crypto_reference_date(date(2025, 6, 1), date(2025, 6, 15));
        assert_eq!(reference, date(2025, 6, 14));
    }

    #[test]
    fn running_month_on_the_first_crosses_into_the_previous_month() {
        let reference = crypto_reference_date(date(2025, 6, 1), date(2025, 6, 1));
        assert_eq!(reference, date(2025, 5, 31));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Minor-unit correction
// ═══════════════════════════════════════════════════════════════════

mod minor_units {
    use super::*;

    #[test]
    fn pence_listing_is_divided_by_one_hundred() {
        assert_eq!(correct_minor_units("SMEA.L", 3300.0), 33.0);
    }

    #[test]
    fn major_unit_listings_pass_through() {
        assert_eq!(correct_minor_units("MWRD.MI", 86.0), 86.0);
        assert_eq!(correct_minor_units("XMME.DE", 41.0), 41.0);
        assert_eq!(correct_minor_units("SOMETHING.ELSE", 100.0), 100.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// CoinCap symbol resolution
// ═══════════════════════════════════════════════════════════════════

mod coincap_ids {
    use super::*;

    #[test]
    fn tracked_symbols_map_to_coincap_ids() {
        assert_eq!(CoinCapProvider::resolve_id("ETH"), "ethereum");
        assert_eq!(CoinCapProvider::resolve_id("SOL"), "solana");
        assert_eq!(CoinCapProvider::resolve_id("LINK"), "chainlink");
        assert_eq!(CoinCapProvider::resolve_id("OP"), "optimism");
        assert_eq!(CoinCapProvider::resolve_id("USDT"), "tether");
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert_eq!(CoinCapProvider::resolve_id("eth"), "ethereum");
        assert_eq!(CoinCapProvider::resolve_id("Sol"), "solana");
    }

    #[test]
    fn unknown_symbols_fall_back_to_lowercase() {
        assert_eq!(CoinCapProvider::resolve_id("DOGE"), "doge");
    }

    #[test]
    fn coincap_quotes_in_usd() {
        let provider = CoinCapProvider::new();
        assert_eq!(provider.quote_currency(), QuoteCurrency::Usd);
        assert_eq!(provider.supported_kinds(), vec![FieldKind::Crypto]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Registry routing
// ═══════════════════════════════════════════════════════════════════

struct NamedStub {
    stub_name: &'static str,
    kinds: Vec<FieldKind>,
}

#[async_trait]
impl MonthlyPriceProvider for NamedStub {
    fn name(&self) -> &str {
        self.stub_name
    }

    fn supported_kinds(&self) -> Vec<FieldKind> {
        self.kinds.clone()
    }

    fn quote_currency(&self) -> QuoteCurrency {
        QuoteCurrency::Eur
    }

    async fn month_price(
        &self,
        _symbol: &str,
        _month: NaiveDate,
        _today: NaiveDate,
    ) -> Result<f64, CoreError> {
        Ok(1.0)
    }
}

mod registry {
    use super::*;

    #[test]
    fn routes_by_field_kind() {
        let mut registry = PriceProviderRegistry::new();
        registry.register(Box::new(NamedStub {
            stub_name: "crypto-source",
            kinds: vec![FieldKind::Crypto],
        }));
        registry.register(Box::new(NamedStub {
            stub_name: "etf-source",
            kinds: vec![FieldKind::Etf],
        }));

        assert_eq!(
            registry.get_provider_for(FieldKind::Crypto).map(|p| p.name()),
            Some("crypto-source")
        );
        assert_eq!(
            registry.get_provider_for(FieldKind::Etf).map(|p| p.name()),
            Some("etf-source")
        );
        assert!(registry.get_provider_for(FieldKind::StableCoin).is_none());
    }

    #[test]
    fn fallbacks_preserve_registration_order() {
        let mut registry = PriceProviderRegistry::new();
        registry.register(Box::new(NamedStub {
            stub_name: "primary",
            kinds: vec![FieldKind::Crypto],
        }));
        registry.register(Box::new(NamedStub {
            stub_name: "fallback",
            kinds: vec![FieldKind::Crypto, FieldKind::Etf],
        }));

        let names: Vec<&str> = registry
            .get_providers_for(FieldKind::Crypto)
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["primary", "fallback"]);
    }

    #[test]
    fn empty_registry_has_no_providers() {
        let registry = PriceProviderRegistry::new();
        assert!(registry.get_providers_for(FieldKind::Crypto).is_empty());
    }

    #[test]
    fn defaults_cover_crypto() {
        let registry = PriceProviderRegistry::new_with_defaults();
        assert!(registry.get_provider_for(FieldKind::Crypto).is_some());
    }
}
