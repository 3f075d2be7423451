//! Enrichment progress snapshots

use serde::{Deserialize, Serialize};

/// Progress of an active publish-date enrichment run
///
/// `completed` never decreases and never exceeds `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentProgress {
    pub completed: usize,
    pub total: usize,
    pub current_url: String,
    /// Records per second
    pub rate: f64,
    /// Seconds
    pub estimated_time_remaining: f64,
    /// Seconds
    pub elapsed_time: f64,
}

impl EnrichmentProgress {
    /// Percentage complete (0.0-100.0); an empty run counts as complete
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    /// Single-line status for log output
    pub fn display_string(&self) -> String {
        format!(
            "{} of {} ({:.0}%) - {:.2}/s, ~{:.1}s remaining - {}",
            self.completed,
            self.total,
            self.percent(),
            self.rate,
            self.estimated_time_remaining,
            self.current_url
        )
    }
}
