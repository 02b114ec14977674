//! Hand-rolled logistic regression
//!
//! Mini-batch gradient descent over a cross-entropy loss, with an adaptive
//! learning rate: halve after a cost regression, grow by 1.05 after an
//! improvement. The hysteresis damps divergence rather than optimizing
//! convergence speed; it is kept exactly as designed.

use crate::error::{EmissionsError, Result};
use crate::metrics;
use crate::preprocessing::{standardize, FeatureMoments};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Trainer configuration. Only the learning rate changes after construction,
/// driven by the adaptive-rate rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub decision_boundary: f64,
    pub batch_size: usize,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 1000,
            decision_boundary: 0.5,
            batch_size: 32,
        }
    }
}

impl LogisticRegressionConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_decision_boundary(mut self, decision_boundary: f64) -> Self {
        self.decision_boundary = decision_boundary;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Binary classifier over standardized features with a folded-in bias term.
///
/// Construction standardizes the training features with moments that stay
/// frozen for the lifetime of the model; every later batch — test set, new
/// observations — is scaled with the same statistics.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    config: LogisticRegressionConfig,
    features: Array2<f64>,
    labels: Array1<f64>,
    moments: FeatureMoments,
    weights: Array1<f64>,
    cost_history: Vec<f64>,
}

impl LogisticRegression {
    /// Build a trainer from raw features and 0/1 labels.
    ///
    /// Weights start at zero, shaped for the feature count plus the bias
    /// column.
    pub fn new(
        features: &Array2<f64>,
        labels: &Array1<f64>,
        config: LogisticRegressionConfig,
    ) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(EmissionsError::ShapeError {
                expected: format!("{} labels", features.nrows()),
                actual: format!("{} labels", labels.len()),
            });
        }
        if config.batch_size == 0 {
            return Err(EmissionsError::InvalidParameter {
                name: "batch_size".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let moments = FeatureMoments::fit(features);
        let features = with_bias_column(&standardize(features, &moments));
        let weights = Array1::zeros(features.ncols());

        Ok(Self {
            config,
            features,
            labels: labels.clone(),
            moments,
            weights,
            cost_history: Vec::new(),
        })
    }

    /// Run the configured number of epochs of mini-batch gradient descent.
    ///
    /// Batches are contiguous slices of `batch_size` rows; rows beyond the
    /// last full batch are dropped. Calling `train` again continues from the
    /// current weights.
    pub fn train(&mut self) {
        let batch_size = self.config.batch_size;
        let batch_quantity = self.batches_per_epoch();

        for _epoch in 0..self.config.epochs {
            for batch in 0..batch_quantity {
                let start = batch * batch_size;
                let batch_features = self.features.slice(s![start..start + batch_size, ..]);
                let batch_labels = self.labels.slice(s![start..start + batch_size]);
                gradient_step(
                    &mut self.weights,
                    batch_features,
                    batch_labels,
                    self.config.learning_rate,
                );
            }
            self.record_cost();
            self.update_learning_rate();
        }
    }

    /// Number of full batches consumed per epoch; the remainder is dropped
    pub fn batches_per_epoch(&self) -> usize {
        self.features.nrows() / self.config.batch_size
    }

    /// Classify observations: sigmoid of the linear score, thresholded at the
    /// decision boundary
    pub fn predict(&self, observations: &Array2<f64>) -> Array1<f64> {
        let features = with_bias_column(&standardize(observations, &self.moments));
        let boundary = self.config.decision_boundary;
        sigmoid(&features.dot(&self.weights)).mapv(|p| if p > boundary { 1.0 } else { 0.0 })
    }

    /// Accuracy over a held-out set
    pub fn test(&self, test_features: &Array2<f64>, test_labels: &Array1<f64>) -> f64 {
        let predictions = self.predict(test_features);
        metrics::accuracy(test_labels, &predictions)
    }

    /// Per-epoch cross-entropy costs, most recent first
    pub fn cost_history(&self) -> &[f64] {
        &self.cost_history
    }

    /// Current learning rate after any adaptive adjustments
    pub fn learning_rate(&self) -> f64 {
        self.config.learning_rate
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Cross-entropy over the full training set, prepended to the history:
    /// `-(yᵗ·ln g + (1-y)ᵗ·ln(1-g)) / N`
    fn record_cost(&mut self) {
        let guesses = sigmoid(&self.features.dot(&self.weights));
        let n = self.features.nrows() as f64;
        let left = self.labels.dot(&guesses.mapv(f64::ln));
        let right = (1.0 - &self.labels).dot(&guesses.mapv(|g| (1.0 - g).ln()));
        let cost = -(left + right) / n;
        self.cost_history.insert(0, cost);
    }

    /// Halve the rate when cost regressed, grow it by 1.05 otherwise
    fn update_learning_rate(&mut self) {
        if self.cost_history.len() < 2 {
            return;
        }
        if self.cost_history[0] > self.cost_history[1] {
            self.config.learning_rate /= 2.0;
        } else {
            self.config.learning_rate *= 1.05;
        }
    }
}

/// One gradient-descent step on the cross-entropy loss over a single batch
fn gradient_step(
    weights: &mut Array1<f64>,
    features: ArrayView2<'_, f64>,
    labels: ArrayView1<'_, f64>,
    learning_rate: f64,
) {
    let guesses = sigmoid(&features.dot(weights));
    let differences = &guesses - &labels;
    let slopes = features.t().dot(&differences) / features.nrows() as f64;
    *weights -= &(slopes * learning_rate);
}

fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
    z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

/// Prepend a constant column of 1s for the bias term
fn with_bias_column(x: &Array2<f64>) -> Array2<f64> {
    let mut out = Array2::ones((x.nrows(), x.ncols() + 1));
    out.slice_mut(s![.., 1..]).assign(x);
    out
}
