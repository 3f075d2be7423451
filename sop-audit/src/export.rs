//! CSV export of analysis results
//!
//! Every cell is wrapped in double quotes and embedded quotes are doubled
//! (RFC 4180). Rows keep the order of the exported slice. An empty slice
//! exports as an empty string, without a header.

use crate::analysis::{ContentInventoryItem, TimeBasedAnalysisItem};
use crate::error::AuditResult;
use crate::models::PageRecord;
use std::path::Path;
use tracing::info;

/// Content inventory export columns
pub const INVENTORY_HEADERS: [&str; 10] = [
    "URL",
    "Publish Date",
    "Page Title",
    "Composite Score",
    "Referring Domains",
    "RD Quartile",
    "Referring Domains per Visit",
    "RD per Visit Quartile",
    "Organic Traffic",
    "Traffic Quartile",
];

/// Time-based analysis export columns
pub const TIME_BASED_HEADERS: [&str; 5] = [
    "URL",
    "Title",
    "Referring Domains",
    "Time-Based Index",
    "Publish Date",
];

/// Page record export columns; readable by the CSV parser
pub const PAGE_RECORD_HEADERS: [&str; 5] =
    ["URL", "Title", "Referring domains", "Traffic", "Publish date"];

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn render<I>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let header_line = headers.iter().map(|h| quote(h)).collect::<Vec<_>>().join(",");
    std::iter::once(header_line)
        .chain(rows.into_iter().map(|row| {
            row.iter().map(|cell| quote(cell)).collect::<Vec<_>>().join(",")
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize content inventory items (score to 1 decimal, ratio to 4)
pub fn inventory_to_csv(items: &[ContentInventoryItem]) -> String {
    if items.is_empty() {
        return String::new();
    }

    render(
        &INVENTORY_HEADERS,
        items.iter().map(|item| {
            vec![
                item.url.clone(),
                item.publish_date.clone().unwrap_or_default(),
                item.page_title.clone(),
                format!("{:.1}", item.composite_score),
                item.referring_domains.to_string(),
                item.rd_quartile.to_string(),
                format!("{:.4}", item.referring_domains_per_visit),
                item.rd_per_visit_quartile.to_string(),
                item.organic_traffic.to_string(),
                item.traffic_quartile.to_string(),
            ]
        }),
    )
}

/// Serialize time-based items (index to 4 decimals)
pub fn time_based_to_csv(items: &[TimeBasedAnalysisItem]) -> String {
    if items.is_empty() {
        return String::new();
    }

    render(
        &TIME_BASED_HEADERS,
        items.iter().map(|item| {
            vec![
                item.url.clone(),
                item.title.clone(),
                item.referring_domains.to_string(),
                format!("{:.4}", item.time_based_index),
                item.publish_date.clone(),
            ]
        }),
    )
}

/// Serialize page records, e.g. after enrichment
pub fn pages_to_csv(pages: &[PageRecord]) -> String {
    if pages.is_empty() {
        return String::new();
    }

    render(
        &PAGE_RECORD_HEADERS,
        pages.iter().map(|page| {
            vec![
                page.url.clone(),
                page.page_title.clone(),
                page.referring_domains.to_string(),
                page.organic_traffic.to_string(),
                page.publish_date.clone().unwrap_or_default(),
            ]
        }),
    )
}

/// Write exported CSV content to disk
pub fn write_csv_file(path: &Path, content: &str) -> AuditResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    info!(path = %path.display(), bytes = content.len(), "CSV exported");
    Ok(())
}
