use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::quote::PriceQuote;
use super::user::Owner;

/// The result of valuing an amount of the tracked asset against a
/// quote. Lives in the working context until saved under a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calculation {
    /// Amount of the tracked asset, in asset units. Always > 0.
    pub amount: f64,
    /// Currency code → amount * price.
    pub valuation: HashMap<String, f64>,
    /// The quote the valuation was computed against.
    pub quote: PriceQuote,
    pub computed_at: DateTime<Utc>,
}

/// A named valuation persisted for its owner.
///
/// Immutable once saved, except for deletion. Visibility is always
/// filtered by owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPortfolio {
    pub id: Uuid,
    pub name: String,
    pub owner: Owner,
    pub amount: f64,
    pub valuation: HashMap<String, f64>,
    /// Snapshot of the quote in effect at save time.
    pub price_at_save: PriceQuote,
    pub created_at: DateTime<Utc>,
}

impl SavedPortfolio {
    pub fn from_calculation(name: String, owner: Owner, calculation: &Calculation) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            owner,
            amount: calculation.amount,
            valuation: calculation.valuation.clone(),
            price_at_save: calculation.quote.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Format marker embedded in every export document.
pub const EXPORT_FORMAT: &str = "crypto-portfolio-export";

/// Current export document version.
pub const EXPORT_VERSION: u32 = 1;

/// Self-describing container for bulk export/import of saved
/// valuations. Imports that don't carry the expected marker are
/// rejected wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub format: String,
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub portfolios: Vec<SavedPortfolio>,
}

impl ExportDocument {
    #[must_use]
    pub fn new(portfolios: Vec<SavedPortfolio>) -> Self {
        Self {
            format: EXPORT_FORMAT.to_string(),
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            portfolios,
        }
    }
}
