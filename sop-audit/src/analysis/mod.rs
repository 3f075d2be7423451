//! Pure analysis functions over page-record snapshots
//!
//! Nothing here suspends or keeps state between calls: every run takes an
//! input slice and returns freshly built items.

pub mod content_inventory;
pub mod quartiles;
pub mod time_based;

pub use content_inventory::{ContentInventory, ContentInventoryItem, InventoryAnalyzer};
pub use quartiles::{
    calculate_quartiles, get_quartile, get_rd_per_visit_quartile, get_traffic_quartile, Quartiles,
};
pub use time_based::{
    AnalysisStrategy, PerformanceStats, TimeBasedAnalysis, TimeBasedAnalysisItem,
};
