use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a published quote came from, in descending order of quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteSource {
    /// The primary upstream (price + 24h change in one call).
    Primary,
    /// The secondary upstream (prices only; change defaults to 0).
    Fallback,
    /// Fixed demo data — both upstreams were unreachable.
    Demo,
}

impl std::fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteSource::Primary => write!(f, "Primary"),
            QuoteSource::Fallback => write!(f, "Fallback"),
            QuoteSource::Demo => write!(f, "Demo"),
        }
    }
}

/// Demo quote used when no upstream is reachable, so consumers always
/// have a usable value.
pub const DEMO_PRICE_USD: f64 = 109_270.00;
pub const DEMO_PRICE_INR: f64 = 9_633_503.00;
pub const DEMO_CHANGE_24H: f64 = 2.45;

/// The latest known price-and-change snapshot for the tracked asset.
///
/// A quote is replaced wholesale on every successful refresh — it is
/// never partially updated, so a reader can never observe a price from
/// one fetch combined with a change from another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Upstream asset id, e.g. "bitcoin".
    pub asset: String,
    /// Currency code (lowercase, e.g. "usd") → price. Always contains a
    /// value for every configured currency.
    pub prices: HashMap<String, f64>,
    /// "<currency>_24h" (e.g. "usd_24h") → percent change, defaulting
    /// to 0 when the upstream omits it.
    pub changes_24h: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
    pub source: QuoteSource,
}

/// Key under which a currency's 24h change is stored, matching the
/// upstream relay response shape ("usd_24h", "inr_24h").
#[must_use]
pub fn change_key(currency: &str) -> String {
    format!("{}_24h", currency.to_lowercase())
}

impl PriceQuote {
    /// Synthesize the fixed demo quote for the given asset/currencies.
    ///
    /// Only usd and inr have real demo figures; any other configured
    /// currency falls back to the usd figure so the invariant "every
    /// configured currency has a price" still holds.
    #[must_use]
    pub fn demo(asset: &str, currencies: &[String]) -> Self {
        let mut prices = HashMap::new();
        let mut changes_24h = HashMap::new();
        for currency in currencies {
            let code = currency.to_lowercase();
            let price = match code.as_str() {
                "usd" => DEMO_PRICE_USD,
                "inr" => DEMO_PRICE_INR,
                _ => DEMO_PRICE_USD,
            };
            prices.insert(code.clone(), price);
            changes_24h.insert(change_key(&code), DEMO_CHANGE_24H);
        }
        Self {
            asset: asset.to_string(),
            prices,
            changes_24h,
            fetched_at: Utc::now(),
            source: QuoteSource::Demo,
        }
    }

    /// Price in the given currency, if configured.
    #[must_use]
    pub fn price(&self, currency: &str) -> Option<f64> {
        self.prices.get(&currency.to_lowercase()).copied()
    }

    /// 24h change for the given currency; 0 when absent.
    #[must_use]
    pub fn change_24h(&self, currency: &str) -> f64 {
        self.changes_24h
            .get(&change_key(currency))
            .copied()
            .unwrap_or(0.0)
    }
}
