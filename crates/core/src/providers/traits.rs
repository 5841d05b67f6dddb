use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::quote::QuoteSource;

/// Price data as returned by one upstream call, before it is stamped
/// into a published [`crate::models::quote::PriceQuote`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    /// Currency code → price. Must cover every requested currency.
    pub prices: HashMap<String, f64>,
    /// "<currency>_24h" → percent change. Missing entries default to 0.
    pub changes_24h: HashMap<String, f64>,
}

/// Trait abstraction for quote upstreams.
///
/// Each tier of the fallback sequence (primary endpoint, secondary
/// endpoint) implements this trait. If an upstream changes or goes
/// away, only its implementation is touched — the fallback logic in
/// `PriceService` stays the same.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which tier this provider fills in the published quote.
    fn tier(&self) -> QuoteSource;

    /// Fetch the current quote for `asset` in all `currencies`.
    ///
    /// Implementations must fail (rather than return a partial quote)
    /// when any requested currency is missing from the response.
    async fn fetch_quote(
        &self,
        asset: &str,
        currencies: &[String],
    ) -> Result<RawQuote, CoreError>;
}
