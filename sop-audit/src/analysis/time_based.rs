//! Time-based performance analysis
//!
//! Each dated page is compared against the content published before it:
//! its referring-domain count is divided by the median (or average) of the
//! referring-domain counts of all pages with a strictly earlier publish date.
//!
//! Pages on the earliest date have no prior pool, so their index is the raw
//! referring-domain count. The same fallback applies whenever the prior
//! aggregate is 0. Those indexes are not comparable to the rest of the run.

use crate::error::AuditError;
use crate::export;
use crate::models::{group_by_date, sort_by_date, PageRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Out/underperformer threshold used by default and by [`PerformanceStats`]
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Measure of central tendency for the prior pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStrategy {
    #[default]
    Median,
    Average,
}

impl AnalysisStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStrategy::Median => "median",
            AnalysisStrategy::Average => "average",
        }
    }

    /// Aggregate arbitrary values with this strategy (0 for no values)
    pub fn aggregate(&self, values: &[f64]) -> f64 {
        match self {
            AnalysisStrategy::Median => calculate_median(values),
            AnalysisStrategy::Average => calculate_average(values),
        }
    }
}

impl fmt::Display for AnalysisStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisStrategy {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "median" => Ok(AnalysisStrategy::Median),
            "average" | "mean" => Ok(AnalysisStrategy::Average),
            other => Err(AuditError::InvalidInput(format!(
                "Unknown analysis strategy '{}' (expected 'median' or 'average')",
                other
            ))),
        }
    }
}

/// Median; even-length input averages the two central values
pub fn calculate_median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    median_of_sorted(&sorted)
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let middle = n / 2;
    if n % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    }
}

/// Arithmetic mean (0 for no values)
pub fn calculate_average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Referring domains relative to the prior aggregate
///
/// Falls back to the raw count when the aggregate is 0.
pub fn calculate_time_based_index(referring_domains: u64, prior_aggregate: f64) -> f64 {
    if prior_aggregate == 0.0 {
        return referring_domains as f64;
    }
    referring_domains as f64 / prior_aggregate
}

/// Running pool of referring-domain counts, kept sorted
#[derive(Debug, Default)]
struct PriorPool {
    sorted: Vec<f64>,
    sum: f64,
}

impl PriorPool {
    fn insert(&mut self, value: f64) {
        let index = self.sorted.partition_point(|v| *v <= value);
        self.sorted.insert(index, value);
        self.sum += value;
    }

    fn aggregate(&self, strategy: AnalysisStrategy) -> f64 {
        match strategy {
            AnalysisStrategy::Median => median_of_sorted(&self.sorted),
            AnalysisStrategy::Average if self.sorted.is_empty() => 0.0,
            AnalysisStrategy::Average => self.sum / self.sorted.len() as f64,
        }
    }
}

/// Prior aggregate for every publish date
///
/// The value for a date only sees pages from strictly earlier dates; the
/// first date maps to 0. Undated pages are ignored.
pub fn calculate_prior_aggregates(
    pages: &[PageRecord],
    strategy: AnalysisStrategy,
) -> BTreeMap<String, f64> {
    let mut aggregates = BTreeMap::new();
    let mut pool = PriorPool::default();

    for (date, cohort) in group_by_date(pages) {
        let prior = pool.aggregate(strategy);
        debug!(date, prior, pool_size = pool.sorted.len(), "Prior aggregate");
        aggregates.insert(date.to_string(), prior);

        for page in cohort {
            pool.insert(page.referring_domains as f64);
        }
    }

    aggregates
}

/// One dated page with its time-based index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBasedAnalysisItem {
    pub url: String,
    pub title: String,
    pub referring_domains: u64,
    pub time_based_index: f64,
    pub publish_date: String,
}

/// Summary over a full time-based result set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub total_pages: usize,
    pub outperformers: usize,
    pub underperformers: usize,
    pub average_index: f64,
    pub median_index: f64,
}

impl PerformanceStats {
    /// Compute stats with the fixed 1.0 threshold
    pub fn from_items(items: &[TimeBasedAnalysisItem]) -> Self {
        if items.is_empty() {
            return Self::default();
        }

        let indices: Vec<f64> = items.iter().map(|i| i.time_based_index).collect();

        Self {
            total_pages: items.len(),
            outperformers: indices.iter().filter(|i| **i > DEFAULT_THRESHOLD).count(),
            underperformers: indices.iter().filter(|i| **i < DEFAULT_THRESHOLD).count(),
            average_index: calculate_average(&indices),
            median_index: calculate_median(&indices),
        }
    }
}

/// Chronological time-based analysis produced by one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeBasedAnalysis {
    strategy: AnalysisStrategy,
    items: Vec<TimeBasedAnalysisItem>,
}

impl TimeBasedAnalysis {
    /// Analyze the dated subset of `pages`
    ///
    /// Items come out in ascending publish-date order; pages sharing a date
    /// keep their input order.
    pub fn from_pages(pages: &[PageRecord], strategy: AnalysisStrategy) -> Self {
        let dated = sort_by_date(pages);
        if dated.is_empty() {
            debug!(pages = pages.len(), "No dated pages for time-based analysis");
            return Self {
                strategy,
                items: Vec::new(),
            };
        }

        let aggregates = calculate_prior_aggregates(pages, strategy);

        let items: Vec<TimeBasedAnalysisItem> = dated
            .into_iter()
            .filter_map(|page| {
                let date = page.publish_date.as_deref()?;
                let prior = aggregates.get(date).copied().unwrap_or(0.0);
                Some(TimeBasedAnalysisItem {
                    url: page.url.clone(),
                    title: page.page_title.clone(),
                    referring_domains: page.referring_domains,
                    time_based_index: calculate_time_based_index(page.referring_domains, prior),
                    publish_date: date.to_string(),
                })
            })
            .collect();

        info!(
            items = items.len(),
            skipped_undated = pages.len() - items.len(),
            strategy = %strategy,
            "Time-based analysis complete"
        );

        Self { strategy, items }
    }

    pub fn strategy(&self) -> AnalysisStrategy {
        self.strategy
    }

    pub fn items(&self) -> &[TimeBasedAnalysisItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<TimeBasedAnalysisItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items with an index strictly above `threshold`
    pub fn outperformers(&self, threshold: f64) -> Vec<&TimeBasedAnalysisItem> {
        self.items
            .iter()
            .filter(|i| i.time_based_index > threshold)
            .collect()
    }

    /// Items with an index strictly below `threshold`
    pub fn underperformers(&self, threshold: f64) -> Vec<&TimeBasedAnalysisItem> {
        self.items
            .iter()
            .filter(|i| i.time_based_index < threshold)
            .collect()
    }

    /// Items published within `start..=end` (string comparison)
    pub fn by_date_range(&self, start: &str, end: &str) -> Vec<&TimeBasedAnalysisItem> {
        self.items
            .iter()
            .filter(|i| i.publish_date.as_str() >= start && i.publish_date.as_str() <= end)
            .collect()
    }

    pub fn performance_stats(&self) -> PerformanceStats {
        PerformanceStats::from_items(&self.items)
    }

    /// Export in chronological order
    pub fn to_csv(&self) -> String {
        export::time_based_to_csv(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(calculate_median(&[]), 0.0);
        assert_eq!(calculate_median(&[3.0]), 3.0);
        assert_eq!(calculate_median(&[9.0, 1.0, 5.0]), 5.0);
        assert_eq!(calculate_median(&[4.0, 1.0, 2.0, 10.0]), 3.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(calculate_average(&[]), 0.0);
        assert_eq!(calculate_average(&[1.0, 2.0, 6.0]), 3.0);
    }

    #[test]
    fn test_index_fallback() {
        assert_eq!(calculate_time_based_index(7, 0.0), 7.0);
        assert_eq!(calculate_time_based_index(10, 4.0), 2.5);
        assert_eq!(calculate_time_based_index(0, 4.0), 0.0);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("median".parse::<AnalysisStrategy>().unwrap(), AnalysisStrategy::Median);
        assert_eq!(" Average ".parse::<AnalysisStrategy>().unwrap(), AnalysisStrategy::Average);
        assert!("mode".parse::<AnalysisStrategy>().is_err());
        assert_eq!(AnalysisStrategy::default(), AnalysisStrategy::Median);
        assert_eq!(AnalysisStrategy::Average.to_string(), "average");
    }

    #[test]
    fn test_pool_matches_free_functions() {
        let values = [5.0, 1.0, 8.0, 3.0, 3.0];
        let mut pool = PriorPool::default();
        for v in values {
            pool.insert(v);
        }
        assert_eq!(pool.aggregate(AnalysisStrategy::Median), calculate_median(&values));
        assert_eq!(pool.aggregate(AnalysisStrategy::Average), calculate_average(&values));
        assert_eq!(PriorPool::default().aggregate(AnalysisStrategy::Average), 0.0);
    }

    #[test]
    fn test_prior_aggregates_exclude_same_date() {
        let pages = vec![
            PageRecord::new("a", "A", 10, 0).with_publish_date("2024-01-01"),
            PageRecord::new("b", "B", 20, 0).with_publish_date("2024-01-01"),
            PageRecord::new("c", "C", 40, 0).with_publish_date("2024-02-01"),
            PageRecord::new("d", "D", 99, 0).with_publish_date("2024-02-01"),
            PageRecord::new("e", "E", 5, 0).with_publish_date("2024-03-01"),
        ];

        let medians = calculate_prior_aggregates(&pages, AnalysisStrategy::Median);
        assert_eq!(medians["2024-01-01"], 0.0);
        assert_eq!(medians["2024-02-01"], 15.0);
        assert_eq!(medians["2024-03-01"], 30.0);

        let averages = calculate_prior_aggregates(&pages, AnalysisStrategy::Average);
        assert_eq!(averages["2024-03-01"], 42.25);
    }
}
