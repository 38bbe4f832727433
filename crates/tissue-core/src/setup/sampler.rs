//! Attribute Sampler
//!
//! Draws per-cell scalar attributes from a clamped normal distribution.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::SeedError;

/// Parameters of a bounded normal distribution.
///
/// Construction guarantees `lower <= upper` and a finite, non-negative
/// standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingSpec {
    mean: f64,
    std_dev: f64,
    lower: f64,
    upper: f64,
}

impl SamplingSpec {
    pub fn new(mean: f64, std_dev: f64, lower: f64, upper: f64) -> Result<Self, SeedError> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(SeedError::InvalidSamplingBounds { lower, upper });
        }
        if !std_dev.is_finite() || std_dev < 0.0 || !mean.is_finite() {
            return Err(SeedError::InvalidStdDev(std_dev));
        }
        Ok(Self {
            mean,
            std_dev,
            lower,
            upper,
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }
}

/// Clamped normal sampler for one [`SamplingSpec`]
#[derive(Debug, Clone, Copy)]
pub struct AttributeSampler {
    spec: SamplingSpec,
    normal: Normal<f64>,
}

impl AttributeSampler {
    pub fn new(spec: SamplingSpec) -> Result<Self, SeedError> {
        let normal = Normal::new(spec.mean, spec.std_dev)
            .map_err(|_| SeedError::InvalidStdDev(spec.std_dev))?;
        Ok(Self { spec, normal })
    }

    pub fn spec(&self) -> &SamplingSpec {
        &self.spec
    }

    /// One draw, clamped into `[lower, upper]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.normal
            .sample(rng)
            .clamp(self.spec.lower, self.spec.upper)
    }
}
