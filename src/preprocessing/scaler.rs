//! Standardization and min-max normalization over ndarray matrices

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Per-column mean and population variance, frozen once fitted.
///
/// A zero-variance column divides by zero during standardization and produces
/// NaN/Inf — intentionally unguarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMoments {
    pub mean: Array1<f64>,
    pub variance: Array1<f64>,
}

impl FeatureMoments {
    /// Compute moments from a training feature matrix
    pub fn fit(x: &Array2<f64>) -> Self {
        Self {
            mean: x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols())),
            variance: x.var_axis(Axis(0), 0.0),
        }
    }
}

/// Per-column min and max, frozen once fitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: Array1<f64>,
    pub max: Array1<f64>,
}

impl FeatureRange {
    /// Compute the range from a training feature matrix
    pub fn fit(x: &Array2<f64>) -> Self {
        let min = x.fold_axis(Axis(0), f64::INFINITY, |acc, &v| acc.min(v));
        let max = x.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &v| acc.max(v));
        Self { min, max }
    }
}

/// `(x - mean) / sqrt(variance)` per column
pub fn standardize(x: &Array2<f64>, moments: &FeatureMoments) -> Array2<f64> {
    let centered = x - &moments.mean.clone().insert_axis(Axis(0));
    let scale = moments.variance.mapv(f64::sqrt).insert_axis(Axis(0));
    &centered / &scale
}

/// `(x - min) / (max - min)` per column
pub fn normalize(x: &Array2<f64>, range: &FeatureRange) -> Array2<f64> {
    let shifted = x - &range.min.clone().insert_axis(Axis(0));
    let span = (&range.max - &range.min).insert_axis(Axis(0));
    &shifted / &span
}

/// A fitted scaling bundle, persisted alongside the model that was trained
/// with it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Scaling {
    Standard(FeatureMoments),
    MinMax(FeatureRange),
}

impl Scaling {
    /// Apply the stored statistics to a feature batch
    pub fn apply(&self, x: &Array2<f64>) -> Array2<f64> {
        match self {
            Scaling::Standard(moments) => standardize(x, moments),
            Scaling::MinMax(range) => normalize(x, range),
        }
    }
}
