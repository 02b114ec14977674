//! Small dense feedforward network for regression
//!
//! Two linear layers: the first as wide as the input, the second a single
//! regression output. Trained with mini-batch Adam on mean-squared error.

use crate::error::{EmissionsError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Optimizer configuration (Adam)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    /// Seed for weight initialization and batch shuffling
    pub random_state: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            random_state: 42,
        }
    }
}

/// Two-layer dense network with linear activations throughout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseNetwork {
    config: NetworkConfig,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    n_features: usize,
}

impl DenseNetwork {
    /// Build a fresh network with Xavier-initialized weights
    pub fn new(n_features: usize, config: NetworkConfig) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.random_state);
        let layer_sizes = [n_features, n_features, 1];

        let mut weights = Vec::with_capacity(2);
        let mut biases = Vec::with_capacity(2);
        for i in 0..layer_sizes.len() - 1 {
            let n_in = layer_sizes[i];
            let n_out = layer_sizes[i + 1];
            let scale = (2.0 / (n_in + n_out) as f64).sqrt();
            let values: Vec<f64> = (0..n_in * n_out)
                .map(|_| rng.gen::<f64>() * 2.0 * scale - scale)
                .collect();
            weights.push(Array2::from_shape_vec((n_in, n_out), values).expect("layer shape"));
            biases.push(Array1::zeros(n_out));
        }

        Self {
            config,
            weights,
            biases,
            n_features,
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Train with mini-batch Adam on mean-squared error.
    ///
    /// Rows are shuffled each epoch with the seeded RNG; the trailing partial
    /// batch is consumed, not dropped.
    pub fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        batch_size: usize,
        epochs: usize,
    ) -> Result<()> {
        let n = x.nrows();
        if n != y.len() {
            return Err(EmissionsError::ShapeError {
                expected: format!("{} targets", n),
                actual: format!("{} targets", y.len()),
            });
        }
        if batch_size == 0 {
            return Err(EmissionsError::InvalidParameter {
                name: "batch_size".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);

        // Adam state, one slot per layer
        let mut m_w: Vec<Array2<f64>> = self.weights.iter().map(|w| Array2::zeros(w.raw_dim())).collect();
        let mut v_w: Vec<Array2<f64>> = self.weights.iter().map(|w| Array2::zeros(w.raw_dim())).collect();
        let mut m_b: Vec<Array1<f64>> = self.biases.iter().map(|b| Array1::zeros(b.len())).collect();
        let mut v_b: Vec<Array1<f64>> = self.biases.iter().map(|b| Array1::zeros(b.len())).collect();
        let mut t = 0i32;

        let lr = self.config.learning_rate;
        let b1 = self.config.beta1;
        let b2 = self.config.beta2;
        let eps = self.config.epsilon;

        for _epoch in 0..epochs {
            let mut indices: Vec<usize> = (0..n).collect();
            indices.shuffle(&mut rng);

            for batch_start in (0..n).step_by(batch_size) {
                let batch_end = (batch_start + batch_size).min(n);
                let batch = &indices[batch_start..batch_end];

                let x_batch = gather_rows(x, batch);
                let y_batch: Array1<f64> = batch.iter().map(|&i| y[i]).collect();

                let activations = self.forward(&x_batch);
                let gradients = self.backward(&y_batch, &activations);

                t += 1;
                let bc1 = 1.0 - b1.powi(t);
                let bc2 = 1.0 - b2.powi(t);

                for (i, (grad_w, grad_b)) in gradients.into_iter().enumerate() {
                    m_w[i] = &m_w[i] * b1 + &grad_w * (1.0 - b1);
                    v_w[i] = &v_w[i] * b2 + &grad_w.mapv(|g| g * g) * (1.0 - b2);
                    m_b[i] = &m_b[i] * b1 + &grad_b * (1.0 - b1);
                    v_b[i] = &v_b[i] * b2 + &grad_b.mapv(|g| g * g) * (1.0 - b2);

                    let w_step = (&m_w[i] / bc1) / &((&v_w[i] / bc2).mapv(f64::sqrt) + eps);
                    let b_step = (&m_b[i] / bc1) / &((&v_b[i] / bc2).mapv(f64::sqrt) + eps);
                    self.weights[i] = &self.weights[i] - &(w_step * lr);
                    self.biases[i] = &self.biases[i] - &(b_step * lr);
                }
            }
        }

        Ok(())
    }

    /// Predict target values for scaled features
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let activations = self.forward(x);
        activations.last().expect("forward output").column(0).to_owned()
    }

    fn forward(&self, x: &Array2<f64>) -> Vec<Array2<f64>> {
        let mut activations = vec![x.clone()];
        for (w, b) in self.weights.iter().zip(self.biases.iter()) {
            let z = activations.last().expect("layer input").dot(w) + b;
            activations.push(z);
        }
        activations
    }

    fn backward(
        &self,
        y: &Array1<f64>,
        activations: &[Array2<f64>],
    ) -> Vec<(Array2<f64>, Array1<f64>)> {
        let n = y.len() as f64;
        let y_2d = y.clone().insert_axis(Axis(1));
        let output = activations.last().expect("forward output");

        // MSE gradient at the output; all layers are linear
        let mut delta = (output - &y_2d) / n;
        let mut gradients = Vec::with_capacity(self.weights.len());

        for i in (0..self.weights.len()).rev() {
            let a_prev = &activations[i];
            gradients.push((a_prev.t().dot(&delta), delta.sum_axis(Axis(0))));
            if i > 0 {
                delta = delta.dot(&self.weights[i].t());
            }
        }

        gradients.reverse();
        gradients
    }
}

fn gather_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    let n_cols = x.ncols();
    let mut rows = Vec::with_capacity(indices.len() * n_cols);
    for &i in indices {
        rows.extend(x.row(i).iter().copied());
    }
    Array2::from_shape_vec((indices.len(), n_cols), rows).expect("gathered batch shape")
}
