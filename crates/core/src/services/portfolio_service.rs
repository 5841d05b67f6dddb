use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::{Calculation, ExportDocument, SavedPortfolio, EXPORT_FORMAT};
use crate::models::quote::PriceQuote;
use crate::models::user::Owner;
use crate::storage::kv::{KeyValueStore, KeyValueStoreExt};

/// Composite value holding every saved valuation, all owners mixed.
pub const PORTFOLIOS_KEY: &str = "crypto_portfolio_saved";

/// CRUD over named valuations, each owned by a user or the guest
/// sentinel, stored as one composite collection value.
///
/// Mutations are synchronous read-modify-write of the whole
/// collection; none of them suspends mid-mutation.
pub struct PortfolioService {
    store: Arc<dyn KeyValueStore>,
}

impl PortfolioService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Value `amount` of the tracked asset against `quote`. Pure:
    /// `valuation[c] = amount * quote.prices[c]` for every currency
    /// the quote carries.
    pub fn calculate(amount: f64, quote: &PriceQuote) -> Result<Calculation, CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::InvalidAmount);
        }

        let valuation = quote
            .prices
            .iter()
            .map(|(currency, price)| (currency.clone(), amount * price))
            .collect();

        Ok(Calculation {
            amount,
            valuation,
            quote: quote.clone(),
            computed_at: Utc::now(),
        })
    }

    // ── CRUD ────────────────────────────────────────────────────────

    /// Persist a calculation under a name for `owner`. The entry gets
    /// a fresh id and is appended to the collection.
    pub fn save(
        &self,
        name: &str,
        calculation: &Calculation,
        owner: &Owner,
    ) -> Result<SavedPortfolio, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::EmptyName);
        }

        let entry = SavedPortfolio::from_calculation(name.to_string(), owner.clone(), calculation);
        let mut collection = self.load_collection();
        collection.push(entry.clone());
        self.save_collection(&collection)?;
        Ok(entry)
    }

    /// Saved valuations belonging to `owner`, insertion order
    /// preserved. Never returns another owner's entries.
    #[must_use]
    pub fn list(&self, owner: &Owner) -> Vec<SavedPortfolio> {
        self.load_collection()
            .into_iter()
            .filter(|p| &p.owner == owner)
            .collect()
    }

    /// Remove the entry with `id` if it belongs to `owner`.
    ///
    /// An absent id or one owned by someone else is a deliberate
    /// no-op (scoping guard), not an error; only a failed persist
    /// surfaces.
    pub fn delete(&self, id: Uuid, owner: &Owner) -> Result<(), CoreError> {
        let mut collection = self.load_collection();
        let Some(idx) = collection
            .iter()
            .position(|p| p.id == id && &p.owner == owner)
        else {
            return Ok(());
        };
        collection.remove(idx);
        self.save_collection(&collection)
    }

    /// Re-hydrate the saved amount for `id` so the caller can re-run
    /// `calculate` against the current quote. The historical valuation
    /// is not replayed.
    #[must_use]
    pub fn load(&self, id: Uuid) -> Option<f64> {
        self.load_collection()
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| p.amount)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Serialize the owner-scoped collection as a self-describing JSON
    /// document.
    pub fn export_all(&self, owner: &Owner) -> Result<String, CoreError> {
        let document = ExportDocument::new(self.list(owner));
        serde_json::to_string_pretty(&document)
            .map_err(|e| CoreError::Serialization(format!("failed to serialize export: {e}")))
    }

    /// Merge a previously exported document into the collection.
    ///
    /// Rejected wholesale on any defect (parse failure, wrong format
    /// marker, invalid entry) — no partial import. Every accepted
    /// entry is re-stamped with the importing owner and a fresh id, so
    /// imports can neither collide with existing ids nor smuggle in
    /// another owner.
    pub fn import_all(&self, document: &str, owner: &Owner) -> Result<usize, CoreError> {
        let parsed: ExportDocument = serde_json::from_str(document)
            .map_err(|e| CoreError::MalformedImport(e.to_string()))?;
        if parsed.format != EXPORT_FORMAT {
            return Err(CoreError::MalformedImport(format!(
                "unrecognized format marker '{}'",
                parsed.format
            )));
        }
        if let Some(bad) = parsed
            .portfolios
            .iter()
            .find(|p| !p.amount.is_finite() || p.amount <= 0.0 || p.name.trim().is_empty())
        {
            return Err(CoreError::MalformedImport(format!(
                "entry '{}' has an invalid name or amount",
                bad.name
            )));
        }

        let mut collection = self.load_collection();
        let count = parsed.portfolios.len();
        for mut entry in parsed.portfolios {
            entry.owner = owner.clone();
            entry.id = Uuid::new_v4();
            collection.push(entry);
        }
        self.save_collection(&collection)?;
        Ok(count)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn load_collection(&self) -> Vec<SavedPortfolio> {
        self.store.get(PORTFOLIOS_KEY).unwrap_or_default()
    }

    fn save_collection(&self, collection: &[SavedPortfolio]) -> Result<(), CoreError> {
        self.store.set(PORTFOLIOS_KEY, &collection)
    }
}
