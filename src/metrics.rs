//! Evaluation metrics shared by the experiments

use ndarray::Array1;

/// Classification accuracy from the misclassification count:
/// `(total - incorrect) / total`
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    let incorrect: f64 = y_pred
        .iter()
        .zip(y_true.iter())
        .map(|(p, t)| (p - t).abs())
        .sum();
    (n - incorrect) / n
}

/// Coefficient of determination: `1 - SS_residual / SS_total`.
///
/// A constant target makes SS_total zero and the result non-finite; callers
/// selecting between models are expected to guard against degenerate scores.
pub fn r_squared(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let mean = y_true.sum() / y_true.len() as f64;
    let ss_residual: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_total: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    1.0 - ss_residual / ss_total
}
