//! Publish date lookup collaborator
//!
//! The enrichment pipeline only sees the [`PublishDateLookup`] trait. A real
//! deployment would fetch the page and read its meta tags or JSON-LD; the
//! bundled [`SimulatedDateLookup`] stands in for that.

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use thiserror::Error;

/// ISO-8601 calendar date format used for publish dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Failure of a single publish date lookup
#[derive(Debug, Error)]
pub enum LookupError {
    /// Request could not be completed
    #[error("Network error: {0}")]
    Network(String),

    /// Page has no discoverable publish date
    #[error("Publish date not found: {0}")]
    NotFound(String),

    /// Page content could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Source of publish dates for page URLs
#[async_trait]
pub trait PublishDateLookup: Send + Sync {
    /// Lookup name for log output
    fn name(&self) -> &'static str;

    /// Find the publish date of `url` as `YYYY-MM-DD`
    async fn find_publish_date(&self, url: &str) -> Result<String, LookupError>;
}

/// Simulated lookup returning a date within the year before a reference date
pub struct SimulatedDateLookup {
    reference_date: NaiveDate,
    max_age_days: i64,
    rng: Mutex<StdRng>,
}

impl Default for SimulatedDateLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDateLookup {
    /// Dates relative to today, unseeded
    pub fn new() -> Self {
        Self {
            reference_date: Local::now().date_naive(),
            max_age_days: 365,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of dates
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..Self::new()
        }
    }

    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }
}

#[async_trait]
impl PublishDateLookup for SimulatedDateLookup {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn find_publish_date(&self, _url: &str) -> Result<String, LookupError> {
        let days_ago = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen_range(0..self.max_age_days)
        };

        let date = self.reference_date - Duration::days(days_ago);
        Ok(date.format(DATE_FORMAT).to_string())
    }
}
