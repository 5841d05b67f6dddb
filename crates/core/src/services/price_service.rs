use chrono::Utc;
use std::sync::RwLock;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::models::quote::{PriceQuote, QuoteSource};
use crate::models::settings::Settings;
use crate::providers::registry::QuoteProviderRegistry;
use crate::providers::traits::RawQuote;

/// Acquires the current quote through the fallback tier sequence
/// {Primary, Fallback, Demo} and publishes it to consumers.
///
/// `refresh_quote` never fails: when every registered provider is
/// unreachable it degrades to the fixed demo quote instead of
/// surfacing a network error. The published quote is replaced
/// wholesale under the lock, so readers never observe a half-written
/// quote. Concurrent refreshes are last-write-wins with no ordering
/// token — under network reordering an older completion can overwrite
/// a newer one.
pub struct PriceService {
    registry: QuoteProviderRegistry,
    asset: String,
    currencies: Vec<String>,
    latest: RwLock<PriceQuote>,
}

impl PriceService {
    /// Build a service for the configured asset/currencies.
    ///
    /// The published quote starts out as the demo quote so consumers
    /// have a usable value before the first refresh completes.
    #[must_use]
    pub fn new(registry: QuoteProviderRegistry, settings: &Settings) -> Self {
        let currencies: Vec<String> = settings
            .currencies
            .iter()
            .map(|c| c.to_lowercase())
            .collect();
        let latest = PriceQuote::demo(&settings.asset, &currencies);
        Self {
            registry,
            asset: settings.asset.clone(),
            currencies,
            latest: RwLock::new(latest),
        }
    }

    /// The asset this service tracks.
    #[must_use]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Currency codes every published quote carries.
    #[must_use]
    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    /// The most recently published quote.
    #[must_use]
    pub fn current_quote(&self) -> PriceQuote {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Fetch a fresh quote through the fallback tiers and publish it.
    ///
    /// Tries providers in registration order; a provider response
    /// missing any configured currency, carrying a non-finite or
    /// negative price, or failing outright moves on to the next tier.
    /// When all tiers fail the demo quote is published instead.
    pub async fn refresh_quote(&self) -> PriceQuote {
        for provider in self.registry.providers() {
            match provider.fetch_quote(&self.asset, &self.currencies).await {
                Ok(raw) => {
                    if let Some(bad) = invalid_price(&raw) {
                        log::warn!(
                            "{} returned invalid price {bad} for {}, trying next tier",
                            provider.name(),
                            self.asset
                        );
                        continue;
                    }
                    let quote = self.stamp(raw, provider.tier());
                    self.publish(quote.clone());
                    return quote;
                }
                Err(e) => {
                    log::warn!("{} failed ({e}), trying next tier", provider.name());
                }
            }
        }

        log::warn!("all quote providers failed, publishing demo data");
        let quote = PriceQuote::demo(&self.asset, &self.currencies);
        self.publish(quote.clone());
        quote
    }

    fn stamp(&self, raw: RawQuote, source: QuoteSource) -> PriceQuote {
        PriceQuote {
            asset: self.asset.clone(),
            prices: raw.prices,
            changes_24h: raw.changes_24h,
            fetched_at: Utc::now(),
            source,
        }
    }

    /// Replace the published quote as a whole.
    fn publish(&self, quote: PriceQuote) {
        let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
        *latest = quote;
    }

    /// Spawn the periodic refresh loop (native only).
    ///
    /// The first refresh fires immediately, then every `period`. The
    /// task is bound to the returned handle: dropping or stopping the
    /// handle cancels it, so repeated construction in tests cannot
    /// leak timers.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn start_auto_refresh(service: Arc<PriceService>, period: Duration) -> RefreshHandle {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let quote = service.refresh_quote().await;
                log::debug!(
                    "published {} quote for {} at {}",
                    quote.source,
                    quote.asset,
                    quote.fetched_at
                );
            }
        });
        RefreshHandle { task }
    }
}

fn invalid_price(raw: &RawQuote) -> Option<f64> {
    raw.prices
        .values()
        .find(|p| !p.is_finite() || **p < 0.0)
        .copied()
}

/// Handle to the background refresh task. The task stops when the
/// handle is dropped or `stop` is called.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct RefreshHandle {
    task: tokio::task::JoinHandle<()>,
}

#[cfg(not(target_arch = "wasm32"))]
impl RefreshHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    /// `true` while the refresh loop is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
