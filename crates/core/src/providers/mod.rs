pub mod registry;
pub mod traits;

// Upstream integrations
pub mod coingecko;
pub mod coingecko_simple;
pub mod identity_api;
