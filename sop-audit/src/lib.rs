//! sop-audit library interface
//!
//! Content-audit engine behind the SEO SOP wizards:
//! - CSV parsing of page-performance exports into [`PageRecord`]s
//! - Quartile-based content inventory ranking
//! - Time-based performance index against previously published content
//! - Rate-limited publish date enrichment
//! - CSV export of both analyses

pub mod analysis;
pub mod error;
pub mod export;
pub mod models;
pub mod parsing;
pub mod services;

pub use crate::analysis::{
    AnalysisStrategy, ContentInventory, ContentInventoryItem, InventoryAnalyzer,
    PerformanceStats, TimeBasedAnalysis, TimeBasedAnalysisItem,
};
pub use crate::error::{AuditError, AuditResult};
pub use crate::models::{EnrichmentProgress, PageRecord};
pub use crate::parsing::parse_csv_content;
pub use crate::services::{PublishDateEnricher, PublishDateLookup, SimulatedDateLookup};
