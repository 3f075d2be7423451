//! Publish date enrichment pipeline
//!
//! Records are processed strictly one at a time, with a fixed delay awaited
//! between remote lookups (never after the last record, never after a cache
//! hit). A failed lookup keeps the record undated and the batch continues.
//!
//! Progress is reported once before the first record, once per processed
//! record and once more after the last one.

use crate::error::AuditResult;
use crate::models::{EnrichmentProgress, PageRecord};
use crate::services::date_lookup::PublishDateLookup;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Default pause between lookups
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Lower bound on the elapsed time used for rate calculation (seconds)
const MIN_RATE_WINDOW_SECS: f64 = 0.1;

/// URL → publish date cache, shared across runs by a single caller
pub type DateCache = HashMap<String, String>;

/// Load a JSON date cache; a missing file yields an empty cache
pub fn load_cache(path: &Path) -> AuditResult<DateCache> {
    if !path.exists() {
        debug!(path = %path.display(), "No date cache file yet");
        return Ok(DateCache::new());
    }
    let content = std::fs::read_to_string(path)?;
    let cache: DateCache = serde_json::from_str(&content)?;
    info!(path = %path.display(), entries = cache.len(), "Loaded date cache");
    Ok(cache)
}

/// Save a JSON date cache
pub fn save_cache(cache: &DateCache, path: &Path) -> AuditResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(cache)?)?;
    info!(path = %path.display(), entries = cache.len(), "Saved date cache");
    Ok(())
}

fn progress_snapshot(
    completed: usize,
    total: usize,
    current_url: &str,
    elapsed: Duration,
) -> EnrichmentProgress {
    let elapsed_time = elapsed.as_secs_f64();
    let rate = completed as f64 / elapsed_time.max(MIN_RATE_WINDOW_SECS);
    let remaining = total.saturating_sub(completed);
    let estimated_time_remaining = if remaining > 0 && rate > 0.0 {
        remaining as f64 / rate
    } else {
        0.0
    };

    EnrichmentProgress {
        completed,
        total,
        current_url: current_url.to_string(),
        rate,
        estimated_time_remaining,
        elapsed_time,
    }
}

/// Sequential, rate-limited publish date enricher
pub struct PublishDateEnricher {
    lookup: Arc<dyn PublishDateLookup>,
    delay: Duration,
}

impl PublishDateEnricher {
    /// Create enricher with the default 500ms delay
    pub fn new(lookup: Arc<dyn PublishDateLookup>) -> Self {
        Self {
            lookup,
            delay: DEFAULT_DELAY,
        }
    }

    /// Set the pause between lookups
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Augment records with publish dates
    ///
    /// Output order matches input order. Records that already carry a date,
    /// and URLs found in `cache`, skip the lookup and the delay. Fresh
    /// results are written back into `cache`.
    ///
    /// The pause follows every lookup except one on the final record, even
    /// when only cache hits or dated records remain after it.
    ///
    /// Dropping the returned future stops the run; results gathered so far
    /// are lost but `cache` keeps every date fetched before the drop.
    pub async fn enrich<F>(
        &self,
        pages: &[PageRecord],
        cache: Option<&mut DateCache>,
        mut on_progress: F,
    ) -> Vec<PageRecord>
    where
        F: FnMut(&EnrichmentProgress),
    {
        let mut local_cache = DateCache::new();
        let cache = match cache {
            Some(cache) => cache,
            None => &mut local_cache,
        };

        let total = pages.len();
        let start = Instant::now();
        let mut enriched = Vec::with_capacity(total);
        let mut completed = 0usize;
        let (mut fetched, mut cache_hits, mut failures) = (0usize, 0usize, 0usize);

        info!(
            total,
            lookup = self.lookup.name(),
            delay_ms = self.delay.as_millis() as u64,
            "Starting publish date enrichment"
        );

        on_progress(&EnrichmentProgress {
            completed: 0,
            total,
            current_url: pages
                .first()
                .map(|p| p.url.clone())
                .unwrap_or_else(|| "Starting...".to_string()),
            rate: 0.0,
            estimated_time_remaining: 0.0,
            elapsed_time: 0.0,
        });

        for (index, page) in pages.iter().enumerate() {
            if page.has_publish_date() {
                enriched.push(page.clone());
                completed += 1;
                on_progress(&progress_snapshot(completed, total, &page.url, start.elapsed()));
                continue;
            }

            if let Some(date) = cache.get(&page.url) {
                debug!(url = %page.url, date = %date, "Publish date cache hit");
                enriched.push(page.with_publish_date(date.as_str()));
                cache_hits += 1;
                completed += 1;
                on_progress(&progress_snapshot(completed, total, &page.url, start.elapsed()));
                continue;
            }

            match self.lookup.find_publish_date(&page.url).await {
                Ok(date) => {
                    debug!(url = %page.url, date = %date, "Publish date found");
                    enriched.push(page.with_publish_date(date.as_str()));
                    cache.insert(page.url.clone(), date);
                    fetched += 1;
                }
                Err(e) => {
                    warn!(url = %page.url, error = %e, "Failed to find published date");
                    enriched.push(page.clone());
                    failures += 1;
                }
            }

            completed += 1;
            on_progress(&progress_snapshot(completed, total, &page.url, start.elapsed()));

            if !self.delay.is_zero() && index + 1 < total {
                sleep(self.delay).await;
            }
        }

        on_progress(&EnrichmentProgress {
            estimated_time_remaining: 0.0,
            ..progress_snapshot(total, total, "Completed", start.elapsed())
        });

        info!(
            total,
            fetched,
            cache_hits,
            failures,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Publish date enrichment complete"
        );

        enriched
    }
}
