//! # Dataset Statistics
//!
//! Scalar summaries and critical-section locations for a validated
//! [`Dataset`]. Everything here is a pure function of the dataset.
//!
//! ## Location Rules
//!
//! - Zero shear: the sample whose |V| is smallest. No root is interpolated;
//!   the report states "zero shear occurs at X" for that sample.
//! - Maximum moment: the sample with the largest M.
//! - Maximum shear magnitude: the sample with the largest |V|.
//!
//! Ties always resolve to the lowest index.
//!
//! ## Example
//!
//! ```rust
//! use report_core::dataset::Dataset;
//! use report_core::statistics::summarize;
//!
//! let dataset = Dataset::new(
//!     vec![0.0, 1.0, 2.0, 3.0, 4.0],
//!     vec![10.0, 5.0, 0.0, -5.0, -10.0],
//!     vec![0.0, 8.0, 12.0, 8.0, 0.0],
//! ).unwrap();
//!
//! let stats = summarize(&dataset);
//! assert_eq!(stats.zero_shear_index, 2);
//! assert_eq!(stats.moment.max, 12.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Max/min/range of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub max: f64,
    pub min: f64,
    pub range: f64,
}

impl SeriesSummary {
    /// Summarize a non-empty series. An empty slice yields all zeros.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return SeriesSummary {
                max: 0.0,
                min: 0.0,
                range: 0.0,
            };
        }
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        SeriesSummary {
            max,
            min,
            range: max - min,
        }
    }
}

/// Derived, read-only statistics for one report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub shear: SeriesSummary,
    pub moment: SeriesSummary,
    /// Index of the sample with the smallest |V|
    pub zero_shear_index: usize,
    /// Index of the largest bending moment
    pub max_moment_index: usize,
    /// Index of the largest |V|
    pub max_abs_shear_index: usize,
    /// Largest position in the dataset
    pub span_length: f64,
    /// Bending moment at the first sample
    pub left_support_moment: f64,
    /// Bending moment at the last sample
    pub right_support_moment: f64,
}

impl Statistics {
    /// Position of the near-zero shear sample
    pub fn zero_shear_position(&self, dataset: &Dataset) -> f64 {
        dataset.positions()[self.zero_shear_index]
    }

    /// Position of the maximum bending moment
    pub fn max_moment_position(&self, dataset: &Dataset) -> f64 {
        dataset.positions()[self.max_moment_index]
    }

    /// Position of the largest shear magnitude
    pub fn max_abs_shear_position(&self, dataset: &Dataset) -> f64 {
        dataset.positions()[self.max_abs_shear_index]
    }

    /// Largest shear magnitude
    pub fn max_abs_shear(&self, dataset: &Dataset) -> f64 {
        dataset.shear_forces()[self.max_abs_shear_index].abs()
    }

    /// True when the zero-shear sample is also the maximum-moment sample
    pub fn zero_shear_at_max_moment(&self) -> bool {
        self.zero_shear_index == self.max_moment_index
    }
}

/// Compute statistics for a dataset.
pub fn summarize(dataset: &Dataset) -> Statistics {
    let shear = dataset.shear_forces();
    let moment = dataset.bending_moments();

    Statistics {
        shear: SeriesSummary::of(shear),
        moment: SeriesSummary::of(moment),
        zero_shear_index: first_index_by(shear, |a, b| a.abs() < b.abs()),
        max_moment_index: first_index_by(moment, |a, b| a > b),
        max_abs_shear_index: first_index_by(shear, |a, b| a.abs() > b.abs()),
        span_length: SeriesSummary::of(dataset.positions()).max,
        left_support_moment: moment.first().copied().unwrap_or(0.0),
        right_support_moment: moment.last().copied().unwrap_or(0.0),
    }
}

/// Index of the first element that no later element beats.
///
/// `better(candidate, best)` must be a strict comparison so that equal values
/// keep the earlier index.
fn first_index_by(values: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if better(value, values[best]) {
            best = i;
        }
    }
    best
}

/// Whether the moment distribution mirrors itself about mid-span.
///
/// Compares `M[i]` with `M[n-1-i]` against a tolerance scaled to the
/// largest moment magnitude.
pub fn is_moment_symmetric(dataset: &Dataset) -> bool {
    let moments = dataset.bending_moments();
    let scale = moments.iter().fold(1.0_f64, |acc, m| acc.max(m.abs()));
    let tolerance = 1e-3 * scale;
    moments
        .iter()
        .zip(moments.iter().rev())
        .all(|(left, right)| (left - right).abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn beam() -> Dataset {
        Dataset::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![10.0, 5.0, 0.0, -5.0, -10.0],
            vec![0.0, 8.0, 12.0, 8.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_beam_statistics() {
        let dataset = beam();
        let stats = summarize(&dataset);

        assert_eq!(stats.shear.max, 10.0);
        assert_eq!(stats.shear.min, -10.0);
        assert_eq!(stats.shear.range, 20.0);
        assert_eq!(stats.moment.max, 12.0);
        assert_eq!(stats.moment.min, 0.0);

        assert_eq!(stats.zero_shear_index, 2);
        assert_eq!(stats.zero_shear_position(&dataset), 2.0);
        assert_eq!(stats.max_moment_index, 2);
        assert_eq!(stats.max_moment_position(&dataset), 2.0);
        assert!(stats.zero_shear_at_max_moment());
        assert_eq!(stats.span_length, 4.0);
        assert_eq!(stats.left_support_moment, 0.0);
        assert_eq!(stats.right_support_moment, 0.0);
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let dataset = Dataset::new(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![-10.0, 1.0, -1.0, 10.0],
            vec![5.0, 9.0, 9.0, 5.0],
        )
        .unwrap();
        let stats = summarize(&dataset);

        // |1| and |-1| tie for the smallest shear magnitude
        assert_eq!(stats.zero_shear_index, 1);
        assert_eq!(stats.max_moment_index, 1);
        // |-10| and |10| tie for the largest
        assert_eq!(stats.max_abs_shear_index, 0);
        assert_eq!(stats.max_abs_shear(&dataset), 10.0);
    }

    #[test]
    fn test_zero_shear_is_nearest_sample_not_interpolated() {
        let dataset = Dataset::new(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![6.0, 2.0, -3.0, -7.0],
            vec![0.0, 4.0, 3.5, 0.0],
        )
        .unwrap();
        let stats = summarize(&dataset);
        assert_eq!(stats.zero_shear_position(&dataset), 1.0);
    }

    #[test]
    fn test_single_record() {
        let dataset = Dataset::new(vec![2.5], vec![-3.0], vec![7.0]).unwrap();
        let stats = summarize(&dataset);
        assert_eq!(stats.zero_shear_index, 0);
        assert_eq!(stats.max_moment_index, 0);
        assert_eq!(stats.shear.range, 0.0);
        assert_eq!(stats.left_support_moment, stats.right_support_moment);
    }

    #[test]
    fn test_symmetry() {
        assert!(is_moment_symmetric(&beam()));

        let lopsided = Dataset::new(
            vec![0.0, 1.0, 2.0],
            vec![4.0, -1.0, -2.0],
            vec![0.0, 6.0, 1.0],
        )
        .unwrap();
        assert!(!is_moment_symmetric(&lopsided));
    }

    fn dataset_strategy() -> impl Strategy<Value = Dataset> {
        (1usize..40).prop_flat_map(|n| {
            (
                prop::collection::vec(-1.0e4f64..1.0e4, n),
                prop::collection::vec(-1.0e4f64..1.0e4, n),
            )
                .prop_map(move |(shear, moment)| {
                    let positions = (0..n).map(|i| i as f64 * 0.5).collect();
                    Dataset::new(positions, shear, moment).unwrap()
                })
        })
    }

    proptest! {
        #[test]
        fn prop_summary_is_ordered_and_in_bounds(dataset in dataset_strategy()) {
            let stats = summarize(&dataset);
            prop_assert!(stats.shear.min <= stats.shear.max);
            prop_assert!(stats.moment.min <= stats.moment.max);
            prop_assert!(stats.zero_shear_index < dataset.len());
            prop_assert!(stats.max_moment_index < dataset.len());
            prop_assert!(stats.max_abs_shear_index < dataset.len());
            prop_assert_eq!(dataset.bending_moments()[stats.max_moment_index], stats.moment.max);
        }
    }
}
