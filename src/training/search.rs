//! Brute-force model search over batch size and epoch count
//!
//! Trains a fresh network for every (batch size, epochs) pair under both
//! scaling strategies and keeps the best held-out R² per strategy. This is
//! O(batch_limit × epoch_limit) full training runs — meant to run once
//! offline, with the winner persisted for reuse.

use crate::error::{EmissionsError, Result};
use crate::metrics;
use crate::preprocessing::{FeatureMoments, FeatureRange, Scaling};
use crate::training::network::{DenseNetwork, NetworkConfig};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Scaling strategy swept by the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingStrategy {
    MinMax,
    Standard,
}

/// Search configuration. Batch sizes and epoch counts sweep `1..limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub batch_limit: usize,
    pub epoch_limit: usize,
    pub network: NetworkConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_limit: 25,
            epoch_limit: 25,
            network: NetworkConfig::default(),
        }
    }
}

/// A trained network bundled with the scaling statistics it was trained
/// under. Predictions always reuse those statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub network: DenseNetwork,
    pub scaling: Scaling,
}

impl TrainedModel {
    /// Scale raw features with the stored statistics and run the network
    pub fn predict(&self, features: &Array2<f64>) -> Array1<f64> {
        self.network.predict(&self.scaling.apply(features))
    }

    /// Persist topology, weights, and scaling statistics
    pub fn save(&self, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a persisted model by path
    pub fn load(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&json)?;
        Ok(model)
    }
}

/// One evaluated combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    pub strategy: ScalingStrategy,
    pub batch_size: usize,
    pub epochs: usize,
    pub accuracy: f64,
}

/// The winning combination, with its model
#[derive(Debug, Clone)]
pub struct SearchCandidate {
    pub model: TrainedModel,
    pub strategy: ScalingStrategy,
    pub batch_size: usize,
    pub epochs: usize,
    pub accuracy: f64,
}

/// Search results: the cross-strategy winner plus every trial evaluated
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: SearchCandidate,
    pub trials: Vec<TrialRecord>,
    pub duration_secs: f64,
}

/// Train one candidate and score it on the held-out set
fn fit_candidate(
    features: &Array2<f64>,
    labels: &Array1<f64>,
    test_features: &Array2<f64>,
    test_labels: &Array1<f64>,
    strategy: ScalingStrategy,
    batch_size: usize,
    epochs: usize,
    network_config: &NetworkConfig,
) -> Result<SearchCandidate> {
    let scaling = match strategy {
        ScalingStrategy::MinMax => Scaling::MinMax(FeatureRange::fit(features)),
        ScalingStrategy::Standard => Scaling::Standard(FeatureMoments::fit(features)),
    };

    let scaled = scaling.apply(features);
    let mut network = DenseNetwork::new(features.ncols(), network_config.clone());
    network.fit(&scaled, labels, batch_size, epochs)?;

    let predictions = network.predict(&scaling.apply(test_features));
    let accuracy = metrics::r_squared(test_labels, &predictions);

    Ok(SearchCandidate {
        model: TrainedModel { network, scaling },
        strategy,
        batch_size,
        epochs,
        accuracy,
    })
}

/// Strictly better than the best so far, and not degenerate.
///
/// The `<= 1` bound rejects NaN and the impossible R² a pathological model can
/// report, so a broken fit never corrupts the search result.
fn improves(best: &Option<SearchCandidate>, candidate: &SearchCandidate) -> bool {
    let best_accuracy = best.as_ref().map(|b| b.accuracy).unwrap_or(0.0);
    candidate.accuracy > best_accuracy && candidate.accuracy <= 1.0
}

/// Sweep the (batch size, epochs) grid under both scaling strategies and
/// return the overall best model by held-out R²
pub fn build_best_model(
    features: &Array2<f64>,
    labels: &Array1<f64>,
    test_features: &Array2<f64>,
    test_labels: &Array1<f64>,
    config: &SearchConfig,
) -> Result<SearchOutcome> {
    let start = Instant::now();
    let mut best_normalized: Option<SearchCandidate> = None;
    let mut best_standardized: Option<SearchCandidate> = None;
    let mut trials = Vec::new();

    for batch_size in 1..config.batch_limit {
        for epochs in 1..config.epoch_limit {
            for strategy in [ScalingStrategy::MinMax, ScalingStrategy::Standard] {
                let candidate = fit_candidate(
                    features,
                    labels,
                    test_features,
                    test_labels,
                    strategy,
                    batch_size,
                    epochs,
                    &config.network,
                )?;

                debug!(
                    ?strategy,
                    batch_size, epochs, accuracy = candidate.accuracy, "evaluated combination"
                );
                trials.push(TrialRecord {
                    strategy,
                    batch_size,
                    epochs,
                    accuracy: candidate.accuracy,
                });

                let best = match strategy {
                    ScalingStrategy::MinMax => &mut best_normalized,
                    ScalingStrategy::Standard => &mut best_standardized,
                };
                if improves(best, &candidate) {
                    *best = Some(candidate);
                }
            }
        }
    }

    // Standardized wins only when strictly better
    let best = match (best_standardized, best_normalized) {
        (Some(s), Some(n)) => {
            if s.accuracy > n.accuracy {
                s
            } else {
                n
            }
        }
        (Some(s), None) => s,
        (None, Some(n)) => n,
        (None, None) => {
            return Err(EmissionsError::TrainingError(
                "model search produced no candidate with a usable score".to_string(),
            ))
        }
    };

    let duration_secs = start.elapsed().as_secs_f64();
    info!(
        strategy = ?best.strategy,
        batch_size = best.batch_size,
        epochs = best.epochs,
        accuracy = best.accuracy,
        duration_secs,
        "model search complete"
    );

    Ok(SearchOutcome {
        best,
        trials,
        duration_secs,
    })
}

/// Load a previously searched model, or run the search and persist the winner
pub fn load_or_search(
    path: &str,
    features: &Array2<f64>,
    labels: &Array1<f64>,
    test_features: &Array2<f64>,
    test_labels: &Array1<f64>,
    config: &SearchConfig,
) -> Result<TrainedModel> {
    if Path::new(path).exists() {
        info!(path, "loading existing model, skipping search");
        return TrainedModel::load(path);
    }

    let outcome = build_best_model(features, labels, test_features, test_labels, config)?;
    outcome.best.model.save(path)?;
    info!(path, "saved searched model");
    Ok(outcome.best.model)
}
