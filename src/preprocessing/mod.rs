//! Feature scaling with statistics frozen at fit time
//!
//! Statistics are computed once from training features and carried as explicit
//! immutable bundles through training and inference — never recomputed on a
//! later batch. This is what keeps test-set and sample-vehicle predictions on
//! the same footing as the data the model was trained on.

mod scaler;

pub use scaler::{normalize, standardize, FeatureMoments, FeatureRange, Scaling};
