use serde::{Deserialize, Serialize};

/// Configuration for the tracked asset and quote refresh behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Upstream asset id (e.g. "bitcoin").
    pub asset: String,

    /// Currency codes every quote must carry a price for (lowercase).
    pub currencies: Vec<String>,

    /// Period of the background quote refresh, in seconds.
    pub refresh_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            asset: "bitcoin".to_string(),
            currencies: vec!["usd".to_string(), "inr".to_string()],
            refresh_interval_secs: 30,
        }
    }
}
