use super::coingecko::CoinGeckoProvider;
use super::coingecko_simple::CoinGeckoSimpleProvider;
use super::traits::QuoteProvider;

/// Ordered list of quote upstreams.
///
/// Registration order is fallback order: the first provider that
/// returns a complete quote wins. The demo tier is not a provider —
/// `PriceService` synthesizes it when every registered provider fails.
pub struct QuoteProviderRegistry {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Registry with the default fallback sequence: CoinGecko with 24h
    /// change (primary), then the bare simple-price call (fallback).
    #[must_use]
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CoinGeckoProvider::new()));
        registry.register(Box::new(CoinGeckoSimpleProvider::new()));
        registry
    }

    /// Append a provider at the end of the fallback order.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// Providers in fallback order.
    #[must_use]
    pub fn providers(&self) -> &[Box<dyn QuoteProvider>] {
        &self.providers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for QuoteProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
