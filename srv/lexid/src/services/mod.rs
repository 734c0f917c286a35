pub mod fallback;
pub mod generator;
pub mod rate_limiter;
pub mod registry;
pub mod scorer;
pub mod settings;
pub mod word_ledger;
pub mod word_source;
