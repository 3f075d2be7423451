//! Quartile boundaries and classification
//!
//! Boundaries are nearest-rank cut points over the non-zero values only.
//! Classification reserves quartile 1 for "no signal" (a zero value):
//!
//! | value          | quartile |
//! |----------------|----------|
//! | `0`            | 1        |
//! | `<= q1`        | 2        |
//! | `<= q2`        | 3        |
//! | anything above | 4        |
//!
//! Traffic and referring-domains-per-visit apply extra rules on top, see
//! [`get_traffic_quartile`] and [`get_rd_per_visit_quartile`].

use serde::{Deserialize, Serialize};

/// Lowest quartile
pub const MIN_QUARTILE: u8 = 1;

/// Highest quartile
pub const MAX_QUARTILE: u8 = 4;

/// Quartile cut points (q1 <= q2 <= q3)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn new(q1: f64, q2: f64, q3: f64) -> Self {
        Self { q1, q2, q3 }
    }

    /// True when computed from an all-zero (or empty) distribution
    pub fn is_empty(&self) -> bool {
        self.q1 == 0.0 && self.q2 == 0.0 && self.q3 == 0.0
    }
}

/// Compute nearest-rank quartile cut points
///
/// Zeros are excluded before ranking. With no non-zero values the result
/// is `(0, 0, 0)`. Cut points sit at sorted indexes `floor(n * 0.25)`,
/// `floor(n * 0.5)` and `floor(n * 0.75)`.
pub fn calculate_quartiles(values: &[f64]) -> Quartiles {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    if sorted.is_empty() {
        return Quartiles::default();
    }

    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let at = |fraction: f64| sorted[((n as f64 * fraction).floor() as usize).min(n - 1)];

    Quartiles::new(at(0.25), at(0.5), at(0.75))
}

/// Classify a value against quartile boundaries
pub fn get_quartile(value: f64, quartiles: &Quartiles) -> u8 {
    if value == 0.0 {
        return MIN_QUARTILE;
    }
    if value <= quartiles.q1 {
        2
    } else if value <= quartiles.q2 {
        3
    } else {
        MAX_QUARTILE
    }
}

/// Classify organic traffic
///
/// Zero traffic is always quartile 1 so a page without visits never
/// outranks one with real traffic.
pub fn get_traffic_quartile(traffic: u64, quartiles: &Quartiles) -> u8 {
    if traffic == 0 {
        return MIN_QUARTILE;
    }
    get_quartile(traffic as f64, quartiles)
}

/// Classify referring domains per visit
///
/// 1. No traffic: quartile 1 whatever the referring-domain count.
/// 2. Traffic without referring domains: quartile 4.
/// 3. Otherwise `referring_domains / traffic` through the boundaries.
pub fn get_rd_per_visit_quartile(traffic: u64, referring_domains: u64, quartiles: &Quartiles) -> u8 {
    if traffic == 0 {
        return MIN_QUARTILE;
    }
    if referring_domains == 0 {
        return MAX_QUARTILE;
    }
    get_quartile(referring_domains as f64 / traffic as f64, quartiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quartiles_exclude_zeros() {
        let q = calculate_quartiles(&[0.0, 0.0, 10.0, 20.0, 30.0, 40.0]);
        // n = 4 non-zero values: indexes 1, 2, 3
        assert_eq!(q, Quartiles::new(20.0, 30.0, 40.0));
    }

    #[test]
    fn test_quartiles_empty_and_all_zero() {
        assert_eq!(calculate_quartiles(&[]), Quartiles::default());
        assert_eq!(calculate_quartiles(&[0.0, 0.0]), Quartiles::default());
        assert!(calculate_quartiles(&[0.0]).is_empty());
    }

    #[test]
    fn test_quartiles_single_value() {
        let q = calculate_quartiles(&[7.0]);
        assert_eq!(q, Quartiles::new(7.0, 7.0, 7.0));
    }

    #[test]
    fn test_quartiles_unsorted_input() {
        let q = calculate_quartiles(&[100.0, 1.0, 50.0, 5.0, 10.0]);
        // sorted [1, 5, 10, 50, 100], indexes 1, 2, 3
        assert_eq!(q, Quartiles::new(5.0, 10.0, 50.0));
    }

    #[test]
    fn test_get_quartile_buckets() {
        let q = Quartiles::new(5.0, 10.0, 50.0);
        assert_eq!(get_quartile(0.0, &q), 1);
        assert_eq!(get_quartile(1.0, &q), 2);
        assert_eq!(get_quartile(5.0, &q), 2);
        assert_eq!(get_quartile(6.0, &q), 3);
        assert_eq!(get_quartile(10.0, &q), 3);
        assert_eq!(get_quartile(11.0, &q), 4);
        assert_eq!(get_quartile(50.0, &q), 4);
        assert_eq!(get_quartile(1000.0, &q), 4);
    }

    #[test]
    fn test_traffic_quartile_zero_is_worst() {
        let q = Quartiles::new(5.0, 10.0, 50.0);
        assert_eq!(get_traffic_quartile(0, &q), 1);
        assert_eq!(get_traffic_quartile(100, &q), 4);
    }

    #[test]
    fn test_rd_per_visit_tiers() {
        let q = Quartiles::new(0.01, 0.1, 0.5);
        // No traffic: forced to 1 even with many referring domains
        assert_eq!(get_rd_per_visit_quartile(0, 500, &q), 1);
        // Traffic without referring domains: forced to 4
        assert_eq!(get_rd_per_visit_quartile(1000, 0, &q), 4);
        // Ratio 0.005 <= q1
        assert_eq!(get_rd_per_visit_quartile(1000, 5, &q), 2);
        // Ratio 1.0 above q3
        assert_eq!(get_rd_per_visit_quartile(10, 10, &q), 4);
    }
}
