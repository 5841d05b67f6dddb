// ═══════════════════════════════════════════════════════════════════
// Price Tests — response parsing, fallback tiers, quote publishing,
// background refresh lifecycle
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crypto_portfolio_core::errors::CoreError;
use crypto_portfolio_core::models::quote::{QuoteSource, DEMO_PRICE_INR, DEMO_PRICE_USD};
use crypto_portfolio_core::models::settings::Settings;
use crypto_portfolio_core::providers::coingecko::{parse_simple_price, SimplePriceBody};
use crypto_portfolio_core::providers::registry::QuoteProviderRegistry;
use crypto_portfolio_core::providers::traits::{QuoteProvider, RawQuote};
use crypto_portfolio_core::services::price_service::PriceService;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// A provider that answers every fetch with the same fixed quote.
struct StaticProvider {
    name: &'static str,
    tier: QuoteSource,
    raw: RawQuote,
}

impl StaticProvider {
    fn new(name: &'static str, tier: QuoteSource, usd: f64, inr: f64, change: Option<f64>) -> Self {
        let mut prices = HashMap::new();
        prices.insert("usd".to_string(), usd);
        prices.insert("inr".to_string(), inr);
        let mut changes_24h = HashMap::new();
        changes_24h.insert("usd_24h".to_string(), change.unwrap_or(0.0));
        changes_24h.insert("inr_24h".to_string(), change.unwrap_or(0.0));
        Self {
            name,
            tier,
            raw: RawQuote {
                prices,
                changes_24h,
            },
        }
    }
}

#[async_trait]
impl QuoteProvider for StaticProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn tier(&self) -> QuoteSource {
        self.tier
    }

    async fn fetch_quote(
        &self,
        _asset: &str,
        _currencies: &[String],
    ) -> Result<RawQuote, CoreError> {
        Ok(self.raw.clone())
    }
}

/// A provider that always fails, simulating an unreachable upstream.
struct UnreachableProvider {
    tier: QuoteSource,
}

#[async_trait]
impl QuoteProvider for UnreachableProvider {
    fn name(&self) -> &str {
        "Unreachable"
    }

    fn tier(&self) -> QuoteSource {
        self.tier
    }

    async fn fetch_quote(
        &self,
        _asset: &str,
        _currencies: &[String],
    ) -> Result<RawQuote, CoreError> {
        Err(CoreError::Network("connection timed out".into()))
    }
}

fn service_with(providers: Vec<Box<dyn QuoteProvider>>) -> PriceService {
    let mut registry = QuoteProviderRegistry::new();
    for provider in providers {
        registry.register(provider);
    }
    PriceService::new(registry, &Settings::default())
}

// ═══════════════════════════════════════════════════════════════════
// Response parsing
// ═══════════════════════════════════════════════════════════════════

mod parsing {
    use super::*;

    #[test]
    fn primary_body_with_change() {
        let body: SimplePriceBody = serde_json::from_str(
            r#"{"bitcoin":{"usd":109270,"inr":9633503,"usd_24h_change":1.2}}"#,
        )
        .unwrap();
        let currencies = vec!["usd".to_string(), "inr".to_string()];

        let raw = parse_simple_price(&body, "CoinGecko", "bitcoin", &currencies).unwrap();
        assert_eq!(raw.prices["usd"], 109270.0);
        assert_eq!(raw.prices["inr"], 9633503.0);
        assert_eq!(raw.changes_24h["usd_24h"], 1.2);
        // Change field missing from the body defaults to 0.
        assert_eq!(raw.changes_24h["inr_24h"], 0.0);
    }

    #[test]
    fn fallback_body_without_change() {
        let body: SimplePriceBody =
            serde_json::from_str(r#"{"bitcoin":{"usd":108000,"inr":9500000}}"#).unwrap();
        let currencies = vec!["usd".to_string(), "inr".to_string()];

        let raw = parse_simple_price(&body, "CoinGecko (simple)", "bitcoin", &currencies).unwrap();
        assert_eq!(raw.prices["usd"], 108000.0);
        assert_eq!(raw.changes_24h["usd_24h"], 0.0);
        assert_eq!(raw.changes_24h["inr_24h"], 0.0);
    }

    #[test]
    fn missing_asset_key_is_an_error() {
        let body: SimplePriceBody =
            serde_json::from_str(r#"{"ethereum":{"usd":2500}}"#).unwrap();
        let err = parse_simple_price(&body, "CoinGecko", "bitcoin", &["usd".to_string()])
            .unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
    }

    #[test]
    fn missing_currency_is_an_error() {
        let body: SimplePriceBody =
            serde_json::from_str(r#"{"bitcoin":{"usd":109270}}"#).unwrap();
        let currencies = vec!["usd".to_string(), "inr".to_string()];
        let err = parse_simple_price(&body, "CoinGecko", "bitcoin", &currencies).unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Fallback tiers
// ═══════════════════════════════════════════════════════════════════

mod fallback_tiers {
    use super::*;

    #[tokio::test]
    async fn primary_success_publishes_primary_quote() {
        let service = service_with(vec![
            Box::new(StaticProvider::new(
                "Primary",
                QuoteSource::Primary,
                109_270.0,
                9_633_503.0,
                Some(1.2),
            )),
            Box::new(StaticProvider::new(
                "Fallback",
                QuoteSource::Fallback,
                1.0,
                1.0,
                None,
            )),
        ]);

        let quote = service.refresh_quote().await;
        assert_eq!(quote.source, QuoteSource::Primary);
        assert_eq!(quote.price("usd"), Some(109_270.0));
        assert_eq!(quote.price("inr"), Some(9_633_503.0));
        assert_eq!(quote.change_24h("usd"), 1.2);
    }

    #[tokio::test]
    async fn primary_failure_falls_back_with_zero_change() {
        let service = service_with(vec![
            Box::new(UnreachableProvider {
                tier: QuoteSource::Primary,
            }),
            Box::new(StaticProvider::new(
                "Fallback",
                QuoteSource::Fallback,
                108_000.0,
                9_500_000.0,
                None,
            )),
        ]);

        let quote = service.refresh_quote().await;
        assert_eq!(quote.source, QuoteSource::Fallback);
        assert_eq!(quote.price("usd"), Some(108_000.0));
        assert_eq!(quote.change_24h("usd"), 0.0);
    }

    #[tokio::test]
    async fn all_tiers_down_degrades_to_demo() {
        let service = service_with(vec![
            Box::new(UnreachableProvider {
                tier: QuoteSource::Primary,
            }),
            Box::new(UnreachableProvider {
                tier: QuoteSource::Fallback,
            }),
        ]);

        let quote = service.refresh_quote().await;
        assert_eq!(quote.source, QuoteSource::Demo);
        assert_eq!(quote.price("usd"), Some(DEMO_PRICE_USD));
        assert_eq!(quote.price("inr"), Some(DEMO_PRICE_INR));
    }

    #[tokio::test]
    async fn empty_registry_degrades_to_demo() {
        let service = service_with(Vec::new());
        let quote = service.refresh_quote().await;
        assert_eq!(quote.source, QuoteSource::Demo);
    }

    #[tokio::test]
    async fn invalid_price_moves_to_next_tier() {
        let service = service_with(vec![
            Box::new(StaticProvider::new(
                "Broken",
                QuoteSource::Primary,
                f64::NAN,
                9_500_000.0,
                None,
            )),
            Box::new(StaticProvider::new(
                "Fallback",
                QuoteSource::Fallback,
                108_000.0,
                9_500_000.0,
                None,
            )),
        ]);

        let quote = service.refresh_quote().await;
        assert_eq!(quote.source, QuoteSource::Fallback);
    }

    #[tokio::test]
    async fn negative_price_moves_to_next_tier() {
        let service = service_with(vec![
            Box::new(StaticProvider::new(
                "Broken",
                QuoteSource::Primary,
                -1.0,
                9_500_000.0,
                None,
            )),
            Box::new(StaticProvider::new(
                "Fallback",
                QuoteSource::Fallback,
                108_000.0,
                9_500_000.0,
                None,
            )),
        ]);

        let quote = service.refresh_quote().await;
        assert_eq!(quote.source, QuoteSource::Fallback);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Publishing
// ═══════════════════════════════════════════════════════════════════

mod publishing {
    use super::*;

    #[test]
    fn initial_quote_is_demo_with_every_currency() {
        let service = service_with(Vec::new());
        let quote = service.current_quote();
        assert_eq!(quote.source, QuoteSource::Demo);
        assert!(quote.price("usd").is_some());
        assert!(quote.price("inr").is_some());
    }

    #[tokio::test]
    async fn later_refresh_replaces_the_published_quote() {
        // Two refreshes against tiers of different quality: the later
        // completion wins wholesale, whatever its tier (last-write-wins).
        let primary = service_with(vec![Box::new(StaticProvider::new(
            "Primary",
            QuoteSource::Primary,
            109_270.0,
            9_633_503.0,
            Some(1.2),
        ))]);
        primary.refresh_quote().await;
        assert_eq!(primary.current_quote().source, QuoteSource::Primary);

        let degraded = service_with(vec![Box::new(UnreachableProvider {
            tier: QuoteSource::Primary,
        })]);
        degraded.refresh_quote().await;
        assert_eq!(degraded.current_quote().source, QuoteSource::Demo);
    }

    #[tokio::test]
    async fn refresh_returns_what_it_published() {
        let service = service_with(vec![Box::new(StaticProvider::new(
            "Primary",
            QuoteSource::Primary,
            109_270.0,
            9_633_503.0,
            Some(1.2),
        ))]);

        let returned = service.refresh_quote().await;
        let published = service.current_quote();
        assert_eq!(returned.prices, published.prices);
        assert_eq!(returned.source, published.source);
        assert_eq!(returned.fetched_at, published.fetched_at);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Background refresh
// ═══════════════════════════════════════════════════════════════════

mod background_refresh {
    use super::*;

    #[tokio::test]
    async fn periodic_task_publishes_quotes() {
        let service = Arc::new(service_with(vec![Box::new(StaticProvider::new(
            "Primary",
            QuoteSource::Primary,
            109_270.0,
            9_633_503.0,
            Some(1.2),
        ))]));

        let handle =
            PriceService::start_auto_refresh(Arc::clone(&service), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(service.current_quote().source, QuoteSource::Primary);
        assert!(handle.is_running());
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_task() {
        let service = Arc::new(service_with(Vec::new()));
        let handle =
            PriceService::start_auto_refresh(Arc::clone(&service), Duration::from_millis(10));
        handle.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_running());
    }
}
