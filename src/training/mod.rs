//! Model training for the three experiments
//!
//! - K-nearest-neighbor classification of the emissions flag
//! - A hand-rolled logistic-regression trainer with mini-batch gradient
//!   descent and an adaptive learning rate
//! - A small dense network for MPG regression, selected by brute-force grid
//!   search over batch size and epoch count

pub mod knn;
pub mod logistic;
pub mod network;
pub mod search;

pub use knn::KnnClassifier;
pub use logistic::{LogisticRegression, LogisticRegressionConfig};
pub use network::{DenseNetwork, NetworkConfig};
pub use search::{
    build_best_model, load_or_search, ScalingStrategy, SearchCandidate, SearchConfig,
    SearchOutcome, TrainedModel, TrialRecord,
};
