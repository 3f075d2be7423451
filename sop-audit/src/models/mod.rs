//! Data model for exported page-performance data

pub mod page_record;
pub mod progress;

pub use page_record::{filter_pages_with_dates, group_by_date, sort_by_date, PageRecord};
pub use progress::EnrichmentProgress;
