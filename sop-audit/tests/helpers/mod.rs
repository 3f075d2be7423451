//! Shared helpers for sop-audit integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use sop_audit::services::{LookupError, PublishDateLookup};
use sop_audit::PageRecord;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Header row of a minimal export
pub const HEADER: &str = "URL,Title,Referring domains,Traffic";

/// Build CSV text from (url, title, referring domains, traffic) rows
pub fn csv_from_rows(rows: &[(&str, &str, &str, &str)]) -> String {
    let mut lines = vec![HEADER.to_string()];
    for (url, title, rd, traffic) in rows {
        lines.push(format!("{},{},{},{}", url, title, rd, traffic));
    }
    lines.join("\n")
}

/// Dated page shorthand
pub fn dated(url: &str, referring_domains: u64, date: &str) -> PageRecord {
    PageRecord::new(url, url.to_uppercase(), referring_domains, 100).with_publish_date(date)
}

/// Lookup returning a fixed date, failing for URLs containing "broken"
pub struct FixedLookup {
    date: String,
    calls: AtomicUsize,
}

impl FixedLookup {
    pub fn new(date: &str) -> Self {
        Self {
            date: date.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublishDateLookup for FixedLookup {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn find_publish_date(&self, url: &str) -> Result<String, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("broken") {
            return Err(LookupError::Network(format!("connection reset for {}", url)));
        }
        Ok(self.date.clone())
    }
}
