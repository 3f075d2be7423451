//! Page record value object
//!
//! One row of an SEO tool's "top pages" export: URL, title, referring-domain
//! count, organic traffic and an optional ISO-8601 publish date.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single page's performance data
///
/// Valid records carry a non-empty `url` and `page_title` (after trimming).
/// Publish dates are `YYYY-MM-DD` strings, so lexicographic order is
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    pub page_title: String,
    pub referring_domains: u64,
    pub organic_traffic: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
}

impl PageRecord {
    /// Create a record without a publish date
    pub fn new(
        url: impl Into<String>,
        page_title: impl Into<String>,
        referring_domains: u64,
        organic_traffic: u64,
    ) -> Self {
        Self {
            url: url.into(),
            page_title: page_title.into(),
            referring_domains,
            organic_traffic,
            publish_date: None,
        }
    }

    /// Copy of this record carrying `publish_date`
    ///
    /// An empty (or whitespace) date clears the field.
    pub fn with_publish_date(&self, publish_date: impl Into<String>) -> Self {
        let publish_date = publish_date.into();
        let publish_date = publish_date.trim();
        Self {
            publish_date: (!publish_date.is_empty()).then(|| publish_date.to_string()),
            ..self.clone()
        }
    }

    /// True when url and title are both non-empty after trimming
    pub fn is_valid(&self) -> bool {
        !self.url.trim().is_empty() && !self.page_title.trim().is_empty()
    }

    pub fn has_publish_date(&self) -> bool {
        self.publish_date.is_some()
    }

    /// Referring domains divided by organic traffic
    ///
    /// 0.0 whenever either count is zero.
    pub fn referring_domains_per_visit(&self) -> f64 {
        if self.organic_traffic == 0 || self.referring_domains == 0 {
            return 0.0;
        }
        self.referring_domains as f64 / self.organic_traffic as f64
    }
}

/// Records that carry a publish date, in input order
pub fn filter_pages_with_dates(pages: &[PageRecord]) -> Vec<&PageRecord> {
    pages.iter().filter(|p| p.has_publish_date()).collect()
}

/// Dated records sorted ascending by publish date
///
/// Stable: records sharing a date keep their input order. Undated records are dropped.
pub fn sort_by_date(pages: &[PageRecord]) -> Vec<&PageRecord> {
    let mut dated = filter_pages_with_dates(pages);
    dated.sort_by(|a, b| a.publish_date.cmp(&b.publish_date));
    dated
}

/// Dated records grouped by publish date, dates in ascending order
pub fn group_by_date(pages: &[PageRecord]) -> BTreeMap<&str, Vec<&PageRecord>> {
    let mut groups: BTreeMap<&str, Vec<&PageRecord>> = BTreeMap::new();
    for page in pages {
        if let Some(date) = page.publish_date.as_deref() {
            groups.entry(date).or_default().push(page);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rd_per_visit_zero_safe() {
        assert_eq!(PageRecord::new("a", "A", 5, 0).referring_domains_per_visit(), 0.0);
        assert_eq!(PageRecord::new("a", "A", 0, 100).referring_domains_per_visit(), 0.0);
        assert_eq!(PageRecord::new("a", "A", 5, 100).referring_domains_per_visit(), 0.05);
    }

    #[test]
    fn test_with_publish_date() {
        let page = PageRecord::new("https://x.test/a", "A", 1, 1);
        let dated = page.with_publish_date("2024-03-01");
        assert_eq!(dated.publish_date.as_deref(), Some("2024-03-01"));
        assert_eq!(dated.url, page.url);
        assert!(page.publish_date.is_none());

        let cleared = dated.with_publish_date("  ");
        assert!(cleared.publish_date.is_none());
    }

    #[test]
    fn test_is_valid() {
        assert!(PageRecord::new("u", "t", 0, 0).is_valid());
        assert!(!PageRecord::new(" ", "t", 0, 0).is_valid());
        assert!(!PageRecord::new("u", "", 0, 0).is_valid());
    }

    #[test]
    fn test_sort_and_group_by_date() {
        let pages = vec![
            PageRecord::new("c", "C", 3, 0).with_publish_date("2024-02-01"),
            PageRecord::new("x", "X", 9, 0),
            PageRecord::new("a", "A", 1, 0).with_publish_date("2024-01-01"),
            PageRecord::new("b", "B", 2, 0).with_publish_date("2024-02-01"),
        ];

        let sorted: Vec<&str> = sort_by_date(&pages).iter().map(|p| p.url.as_str()).collect();
        assert_eq!(sorted, vec!["a", "c", "b"]);

        let groups = group_by_date(&pages);
        let dates: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-02-01"]);
        assert_eq!(groups["2024-02-01"].len(), 2);
    }
}
