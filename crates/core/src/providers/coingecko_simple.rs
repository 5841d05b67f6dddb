use async_trait::async_trait;
use reqwest::Client;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::quote::QuoteSource;

use super::coingecko::{parse_simple_price, SimplePriceBody};
use super::traits::{QuoteProvider, RawQuote};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Secondary quote upstream: the bare simple-price call without 24h
/// change fields. Used when the primary times out or fails; the change
/// figures of the resulting quote default to 0.
pub struct CoinGeckoSimpleProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoSimpleProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
        }
    }
}

impl Default for CoinGeckoSimpleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for CoinGeckoSimpleProvider {
    fn name(&self) -> &str {
        "CoinGecko (simple)"
    }

    fn tier(&self) -> QuoteSource {
        QuoteSource::Fallback
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
        let url = format!("{}/simple/price?ids={asset}&vs_currencies={vs}", self.base_url);

        let body: SimplePriceBody = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinGecko (simple)".into(),
                message: format!("failed to parse response for {asset}: {e}"),
            })?;

        parse_simple_price(&body, "CoinGecko (simple)", asset, currencies)
    }
}
