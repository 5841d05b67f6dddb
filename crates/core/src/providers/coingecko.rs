use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::quote::{change_key, QuoteSource};

use super::traits::{QuoteProvider, RawQuote};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Bounded timeout for the primary call before falling back.
const PRIMARY_TIMEOUT_SECS: u64 = 10;

/// Body shape of the CoinGecko simple-price endpoint: asset id →
/// { "usd": 109270.0, "usd_24h_change": 1.2, ... }.
pub type SimplePriceBody = HashMap<String, HashMap<String, f64>>;

/// Turn a simple-price response body into a [`RawQuote`].
///
/// Fails when the asset key is absent or any requested currency has no
/// price — a partial response counts as a provider failure so the next
/// tier gets a chance. 24h-change fields are optional and default to 0.
pub fn parse_simple_price(
    body: &SimplePriceBody,
    provider: &str,
    asset: &str,
    currencies: &[String],
) -> Result<RawQuote, CoreError> {
    let entry = body.get(asset).ok_or_else(|| CoreError::Api {
        provider: provider.to_string(),
        message: format!("response has no entry for asset '{asset}'"),
    })?;

    let mut prices = HashMap::new();
    let mut changes_24h = HashMap::new();
    for currency in currencies {
        let code = currency.to_lowercase();
        let price = entry.get(&code).copied().ok_or_else(|| CoreError::Api {
            provider: provider.to_string(),
            message: format!("no {code} price for '{asset}' in response"),
        })?;
        prices.insert(code.clone(), price);

        let change = entry
            .get(&format!("{code}_24h_change"))
            .copied()
            .unwrap_or(0.0);
        changes_24h.insert(change_key(&code), change);
    }

    Ok(RawQuote {
        prices,
        changes_24h,
    })
}

/// Primary quote upstream: CoinGecko simple-price with 24h change,
/// fetched in a single call with a bounded timeout.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the provider at a different endpoint (tests, self-hosted
    /// price relay).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(PRIMARY_TIMEOUT_SECS));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
        }
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    fn tier(&self) -> QuoteSource {
        QuoteSource::Primary
    }

    async fn fetch_quote(
        &self,
        asset: &str,
        currencies: &[String],
    ) -> Result<RawQuote, CoreError> {
        let vs = currencies
            .iter()
            .map(|c| c.to_lowercase())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/simple/price?ids={asset}&vs_currencies={vs}&include_24hr_change=true",
            self.base_url
        );

        let body: SimplePriceBody = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinGecko".into(),
                message: format!("failed to parse response for {asset}: {e}"),
            })?;

        parse_simple_price(&body, "CoinGecko", asset, currencies)
    }
}
