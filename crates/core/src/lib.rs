pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use uuid::Uuid;

use errors::CoreError;
use models::{
    portfolio::{Calculation, SavedPortfolio},
    quote::PriceQuote,
    session::Session,
    settings::Settings,
    user::{Owner, User},
};
use providers::registry::QuoteProviderRegistry;
use services::{
    auth_service::AuthService, portfolio_service::PortfolioService, price_service::PriceService,
};
#[cfg(not(target_arch = "wasm32"))]
use services::price_service::RefreshHandle;
use storage::kv::KeyValueStore;
use storage::memory_store::MemoryStore;

/// Main entry point for the Crypto Portfolio core library.
///
/// One explicitly constructed instance wires the identity layer, the
/// price service, and the portfolio store together — there are no
/// process-wide singletons, so tests can build isolated instances.
/// The facade also holds the working-context calculation that
/// `save_portfolio` persists.
#[must_use]
pub struct CryptoPortfolio {
    settings: Settings,
    auth: AuthService,
    portfolios: PortfolioService,
    prices: Arc<PriceService>,
    current_calculation: Option<Calculation>,
}

impl std::fmt::Debug for CryptoPortfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoPortfolio")
            .field("asset", &self.settings.asset)
            .field("currencies", &self.settings.currencies)
            .field("logged_in", &self.auth.is_logged_in())
            .field("has_calculation", &self.current_calculation.is_some())
            .finish()
    }
}

impl CryptoPortfolio {
    /// Build with default settings and the default provider fallback
    /// sequence. `persistent` backs the user registry, the remembered
    /// session, and the portfolio collection; the volatile session
    /// slot lives in a fresh in-memory store.
    pub fn new(persistent: Arc<dyn KeyValueStore>) -> Result<Self, CoreError> {
        Self::with_parts(
            Settings::default(),
            QuoteProviderRegistry::new_with_defaults(),
            persistent,
            Arc::new(MemoryStore::new()),
        )
    }

    /// Fully injected construction, used by tests to swap in mock
    /// providers and stores.
    pub fn with_parts(
        settings: Settings,
        registry: QuoteProviderRegistry,
        persistent: Arc<dyn KeyValueStore>,
        volatile: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CoreError> {
        let prices = Arc::new(PriceService::new(registry, &settings));
        let auth = AuthService::new(Arc::clone(&persistent), volatile)?;
        let portfolios = PortfolioService::new(persistent);
        Ok(Self {
            settings,
            auth,
            portfolios,
            prices,
            current_calculation: None,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Identity ────────────────────────────────────────────────────

    /// Register a new account; on success the new user is logged in.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
        agree_to_terms: bool,
    ) -> Result<User, CoreError> {
        self.auth
            .register(name, email, password, confirm_password, agree_to_terms)
    }

    pub fn login(&self, email: &str, password: &str, remember: bool) -> Result<Session, CoreError> {
        self.auth.login(email, password, remember)
    }

    pub fn logout(&self) {
        self.auth.logout();
    }

    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.auth.current_session()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.auth.current_user()
    }

    #[must_use]
    pub fn current_owner(&self) -> Owner {
        self.auth.current_owner()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    // ── Quotes ──────────────────────────────────────────────────────

    /// The most recently published quote. Always available — the
    /// service starts out on demo data.
    #[must_use]
    pub fn current_quote(&self) -> PriceQuote {
        self.prices.current_quote()
    }

    /// Fetch through the fallback tiers and publish the result.
    pub async fn refresh_quote(&self) -> PriceQuote {
        self.prices.refresh_quote().await
    }

    /// Start the periodic background refresh at the configured
    /// interval. The task stops when the returned handle is dropped.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn start_auto_refresh(&self) -> RefreshHandle {
        PriceService::start_auto_refresh(
            Arc::clone(&self.prices),
            Duration::from_secs(self.settings.refresh_interval_secs),
        )
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Value `amount` of the tracked asset against the current quote
    /// and keep the result as the working-context calculation.
    pub fn calculate(&mut self, amount: f64) -> Result<&Calculation, CoreError> {
        let quote = self.prices.current_quote();
        let calculation = PortfolioService::calculate(amount, &quote)?;
        Ok(self.current_calculation.insert(calculation))
    }

    /// The working-context calculation, if any.
    #[must_use]
    pub fn current_calculation(&self) -> Option<&Calculation> {
        self.current_calculation.as_ref()
    }

    // ── Saved portfolios ────────────────────────────────────────────

    /// Save the working-context calculation under a name for the
    /// current owner. Fails with `NoCalculation` when nothing has been
    /// calculated yet.
    pub fn save_portfolio(&self, name: &str) -> Result<SavedPortfolio, CoreError> {
        let calculation = self
            .current_calculation
            .as_ref()
            .ok_or(CoreError::NoCalculation)?;
        self.portfolios
            .save(name, calculation, &self.auth.current_owner())
    }

    /// Saved valuations of the current owner, insertion order.
    #[must_use]
    pub fn list_portfolios(&self) -> Vec<SavedPortfolio> {
        self.portfolios.list(&self.auth.current_owner())
    }

    /// Delete one of the current owner's saved valuations. Foreign or
    /// unknown ids are a no-op.
    pub fn delete_portfolio(&self, id: Uuid) -> Result<(), CoreError> {
        self.portfolios.delete(id, &self.auth.current_owner())
    }

    /// Re-hydrate a saved amount and re-value it against the *current*
    /// quote (the historical valuation is not replayed). Returns
    /// `None` when the id is unknown.
    pub fn load_portfolio(&mut self, id: Uuid) -> Result<Option<&Calculation>, CoreError> {
        let Some(amount) = self.portfolios.load(id) else {
            return Ok(None);
        };
        self.calculate(amount).map(Some)
    }

    /// Export the current owner's valuations as a self-describing JSON
    /// document.
    pub fn export_portfolios(&self) -> Result<String, CoreError> {
        self.portfolios.export_all(&self.auth.current_owner())
    }

    /// Import a previously exported document for the current owner.
    /// Returns the number of entries merged.
    pub fn import_portfolios(&self, document: &str) -> Result<usize, CoreError> {
        self.portfolios.import_all(document, &self.auth.current_owner())
    }
}
