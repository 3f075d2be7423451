//! Content inventory ranking
//!
//! Every page is classified into quartiles for referring domains, organic
//! traffic and referring domains per visit. The first two combine into a
//! weighted composite score that ranks the inventory.

use crate::analysis::quartiles::{
    calculate_quartiles, get_quartile, get_rd_per_visit_quartile, get_traffic_quartile, Quartiles,
};
use crate::error::{AuditError, AuditResult};
use crate::export;
use crate::models::PageRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Default number of rows returned by [`ContentInventory::top_performers`]
pub const DEFAULT_TOP_N: usize = 10;

/// One classified page of the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInventoryItem {
    pub url: String,
    pub publish_date: Option<String>,
    pub page_title: String,
    pub composite_score: f64,
    pub referring_domains: u64,
    pub rd_quartile: u8,
    pub referring_domains_per_visit: f64,
    pub rd_per_visit_quartile: u8,
    pub organic_traffic: u64,
    pub traffic_quartile: u8,
}

/// Weighted sum of the referring-domains and traffic quartiles
pub fn calculate_composite_score(
    rd_quartile: u8,
    traffic_quartile: u8,
    rd_weight: f64,
    traffic_weight: f64,
) -> f64 {
    f64::from(rd_quartile) * rd_weight + f64::from(traffic_quartile) * traffic_weight
}

/// Ranking order: composite score descending, then publish date descending
///
/// Dated items precede undated ones on equal scores; remaining ties keep
/// input order because the sort is stable.
fn ranking_order(a: &ContentInventoryItem, b: &ContentInventoryItem) -> Ordering {
    b.composite_score
        .total_cmp(&a.composite_score)
        .then_with(|| b.publish_date.cmp(&a.publish_date))
}

/// Sort items into ranking order in place
pub fn sort_by_composite_score(items: &mut [ContentInventoryItem]) {
    items.sort_by(ranking_order);
}

/// Content inventory analyzer with composite score weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventoryAnalyzer {
    rd_weight: f64,
    traffic_weight: f64,
}

impl Default for InventoryAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryAnalyzer {
    /// Create analyzer with both weights at 1.0
    pub fn new() -> Self {
        Self {
            rd_weight: 1.0,
            traffic_weight: 1.0,
        }
    }

    /// Set the referring-domains quartile weight
    pub fn with_rd_weight(mut self, weight: f64) -> AuditResult<Self> {
        self.rd_weight = validate_weight("rd_weight", weight)?;
        Ok(self)
    }

    /// Set the traffic quartile weight
    pub fn with_traffic_weight(mut self, weight: f64) -> AuditResult<Self> {
        self.traffic_weight = validate_weight("traffic_weight", weight)?;
        Ok(self)
    }

    pub fn rd_weight(&self) -> f64 {
        self.rd_weight
    }

    pub fn traffic_weight(&self) -> f64 {
        self.traffic_weight
    }

    /// Classify every page, preserving input order
    pub fn analyze(&self, pages: &[PageRecord]) -> Vec<ContentInventoryItem> {
        if pages.is_empty() {
            return Vec::new();
        }

        let rd_values: Vec<f64> = pages.iter().map(|p| p.referring_domains as f64).collect();
        let traffic_values: Vec<f64> = pages.iter().map(|p| p.organic_traffic as f64).collect();
        let rd_per_visit_values: Vec<f64> =
            pages.iter().map(PageRecord::referring_domains_per_visit).collect();

        let rd_quartiles = calculate_quartiles(&rd_values);
        let traffic_quartiles = calculate_quartiles(&traffic_values);
        let rd_per_visit_quartiles = calculate_quartiles(&rd_per_visit_values);

        debug!(
            ?rd_quartiles,
            ?traffic_quartiles,
            ?rd_per_visit_quartiles,
            "Computed inventory quartile boundaries"
        );

        pages
            .iter()
            .zip(rd_per_visit_values)
            .map(|(page, rd_per_visit)| {
                self.classify(
                    page,
                    rd_per_visit,
                    &rd_quartiles,
                    &traffic_quartiles,
                    &rd_per_visit_quartiles,
                )
            })
            .collect()
    }

    /// Classify and rank pages
    pub fn run(&self, pages: &[PageRecord]) -> ContentInventory {
        let mut items = self.analyze(pages);
        sort_by_composite_score(&mut items);
        info!(items = items.len(), "Content inventory analysis complete");
        ContentInventory { items }
    }

    fn classify(
        &self,
        page: &PageRecord,
        rd_per_visit: f64,
        rd_quartiles: &Quartiles,
        traffic_quartiles: &Quartiles,
        rd_per_visit_quartiles: &Quartiles,
    ) -> ContentInventoryItem {
        let rd_quartile = get_quartile(page.referring_domains as f64, rd_quartiles);
        let traffic_quartile = get_traffic_quartile(page.organic_traffic, traffic_quartiles);
        let rd_per_visit_quartile = get_rd_per_visit_quartile(
            page.organic_traffic,
            page.referring_domains,
            rd_per_visit_quartiles,
        );

        ContentInventoryItem {
            url: page.url.clone(),
            publish_date: page.publish_date.clone(),
            page_title: page.page_title.clone(),
            composite_score: calculate_composite_score(
                rd_quartile,
                traffic_quartile,
                self.rd_weight,
                self.traffic_weight,
            ),
            referring_domains: page.referring_domains,
            rd_quartile,
            referring_domains_per_visit: rd_per_visit,
            rd_per_visit_quartile,
            organic_traffic: page.organic_traffic,
            traffic_quartile,
        }
    }
}

fn validate_weight(name: &str, weight: f64) -> AuditResult<f64> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(AuditError::InvalidInput(format!(
            "{} must be a finite non-negative number, got {}",
            name, weight
        )));
    }
    Ok(weight)
}

/// Ranked content inventory produced by one analysis run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentInventory {
    items: Vec<ContentInventoryItem>,
}

impl ContentInventory {
    /// Rank pages with default weights
    pub fn from_pages(pages: &[PageRecord]) -> Self {
        InventoryAnalyzer::new().run(pages)
    }

    pub fn items(&self) -> &[ContentInventoryItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ContentInventoryItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First `limit` items in ranking order
    pub fn top_performers(&self, limit: usize) -> &[ContentInventoryItem] {
        &self.items[..limit.min(self.items.len())]
    }

    /// Items whose RD quartile or traffic quartile equals `quartile`
    pub fn by_quartile(&self, quartile: u8) -> Vec<&ContentInventoryItem> {
        self.items
            .iter()
            .filter(|item| item.rd_quartile == quartile || item.traffic_quartile == quartile)
            .collect()
    }

    /// Export in ranking order
    pub fn to_csv(&self) -> String {
        export::inventory_to_csv(&self.items)
    }
}
