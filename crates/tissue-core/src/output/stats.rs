//! Attribute Statistics
//!
//! Summary statistics over one custom attribute of a cell population.

use serde::Serialize;
use std::fmt;

use tissue_events::AttributeSummarySnapshot;

/// Added to denominators so one- and zero-cell populations stay finite
pub const DENOMINATOR_EPSILON: f64 = 1e-15;

/// Count, mean, sample standard deviation, and range of one attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttributeSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl AttributeSummary {
    /// Summarize `values`, or `None` when there are none
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;

        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        let mean = sum / (n + DENOMINATOR_EPSILON);

        let squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std_dev = (squares / (n - 1.0 + DENOMINATOR_EPSILON)).sqrt();

        Some(Self {
            count: values.len(),
            mean,
            std_dev,
            min,
            max,
        })
    }

    pub fn to_snapshot(&self) -> AttributeSummarySnapshot {
        AttributeSummarySnapshot {
            count: self.count,
            mean: self.mean,
            std_dev: self.std_dev,
            min: self.min,
            max: self.max,
        }
    }
}

impl fmt::Display for AttributeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mean: {}", self.mean)?;
        writeln!(f, "standard deviation: {}", self.std_dev)?;
        write!(f, "[min max]: [{} {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_two_three() {
        let summary = AttributeSummary::from_values(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 2.0).abs() < 1e-12);
        assert!((summary.std_dev - 1.0).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
    }

    #[test]
    fn test_single_value_is_finite() {
        let summary = AttributeSummary::from_values(&[4.0]).unwrap();
        assert!((summary.mean - 4.0).abs() < 1e-12);
        assert!(summary.std_dev.is_finite());
        assert!(summary.std_dev < 1e-6);
    }

    #[test]
    fn test_empty_has_no_summary() {
        assert!(AttributeSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_display_lists_range() {
        let summary = AttributeSummary::from_values(&[1.0, 3.0]).unwrap();
        let text = summary.to_string();
        assert!(text.contains("[min max]: [1 3]"));
    }
}
