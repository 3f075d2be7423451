//! Services that reach outside the pure analysis core

pub mod date_lookup;
pub mod enrichment;

pub use date_lookup::{LookupError, PublishDateLookup, SimulatedDateLookup};
pub use enrichment::{load_cache, save_cache, DateCache, PublishDateEnricher, DEFAULT_DELAY};
