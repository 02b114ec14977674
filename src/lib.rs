//! emissions-ml — ML experiments on the vehicle-emissions dataset
//!
//! Three pipelines over the same CSV of vehicles (horsepower, weight,
//! displacement, MPG, and a passed-emissions flag):
//! - [`training::knn`] — k-nearest-neighbor classification of the flag
//! - [`training::logistic`] — a hand-rolled logistic-regression trainer
//! - [`training::search`] — brute-force grid search over a small dense
//!   regression network predicting MPG
//!
//! Shared plumbing:
//! - [`dataset`] — CSV loading and seeded train/test splitting
//! - [`preprocessing`] — standardization and min-max scaling with statistics
//!   frozen at fit time
//! - [`metrics`] — accuracy and R²

pub mod cli;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod preprocessing;
pub mod training;

pub use error::{EmissionsError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::dataset::{DatasetLoader, SplitData, Splitter};
    pub use crate::error::{EmissionsError, Result};
    pub use crate::preprocessing::{FeatureMoments, FeatureRange, Scaling};
    pub use crate::training::{
        build_best_model, load_or_search, DenseNetwork, KnnClassifier, LogisticRegression,
        LogisticRegressionConfig, NetworkConfig, SearchConfig, TrainedModel,
    };
}
