//! Command-line entrypoints for the three experiments

use clap::{Parser, Subcommand};
use ndarray::Array2;
use std::path::PathBuf;
use tracing::info;

use crate::dataset::{DatasetLoader, Splitter};
use crate::error::{EmissionsError, Result};
use crate::training::{
    load_or_search, KnnClassifier, LogisticRegression, LogisticRegressionConfig, SearchConfig,
};

#[derive(Parser)]
#[command(name = "emissions-ml")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Machine-learning experiments on the vehicle-emissions dataset")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify the emissions flag with k-nearest neighbors
    Knn {
        /// Vehicle CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Number of neighbors to vote
        #[arg(short = 'k', long, default_value = "3")]
        neighbors: usize,
    },

    /// Train the hand-rolled logistic-regression classifier
    Logistic {
        /// Vehicle CSV file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Search for the best MPG regression network and predict sample vehicles
    Linear {
        /// Vehicle CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Directory holding the persisted model
        #[arg(short, long, default_value = "models/linear-regression")]
        model_dir: PathBuf,

        /// Exclusive upper bound of the batch-size sweep
        #[arg(long, default_value = "25")]
        batch_limit: usize,

        /// Exclusive upper bound of the epoch sweep
        #[arg(long, default_value = "25")]
        epoch_limit: usize,
    },
}

/// KNN experiment: features [horsepower, weight, mpg], label passedemissions
pub fn cmd_knn(data: &str, neighbors: usize) -> Result<()> {
    let loader = DatasetLoader::new();
    let probe = loader.file_info(data)?;
    info!(rows = probe.n_rows, cols = probe.n_cols, "loading dataset");

    let df = loader.load(data)?;
    let split = Splitter::new().split(
        &df,
        &["horsepower", "weight", "mpg"],
        &["passedemissions"],
        25,
    )?;
    let labels = split.labels.column(0).to_owned();

    let mut classifier = KnnClassifier::new(neighbors);
    classifier.fit(&split.features, &labels)?;

    println!("Classes: {}", classifier.n_classes());
    for (class, count) in classifier.class_counts() {
        let outcome = if class == 0 { "Failed" } else { "Passed" };
        println!("{} Emissions Examples: {}", outcome, count);
    }

    let predictions = classifier.predict(&split.test_features)?;
    let test_labels = split.test_labels.column(0);
    let correct = predictions
        .iter()
        .zip(test_labels.iter())
        .filter(|(p, t)| (*p - *t).abs() < 0.5)
        .count();
    let incorrect = predictions.len() - correct;

    println!("Correct Predictions: {}", correct);
    println!("Incorrect Predictions: {}", incorrect);
    println!("Accuracy: {}", correct as f64 / predictions.len() as f64);
    Ok(())
}

/// Logistic-regression experiment on the same feature set as KNN
pub fn cmd_logistic(data: &str) -> Result<()> {
    let loader = DatasetLoader::new();
    let df = loader.load(data)?;
    let split = Splitter::new().split(
        &df,
        &["horsepower", "weight", "mpg"],
        &["passedemissions"],
        25,
    )?;
    let labels = split.labels.column(0).to_owned();
    let test_labels = split.test_labels.column(0).to_owned();

    let config = LogisticRegressionConfig::default()
        .with_learning_rate(0.5)
        .with_epochs(100)
        .with_batch_size(50)
        .with_decision_boundary(0.53);

    let mut model = LogisticRegression::new(&split.features, &labels, config)?;
    model.train();

    let accuracy = model.test(&split.test_features, &test_labels);
    println!("Accuracy: {}", accuracy);

    // History is stored most-recent-first; display oldest-first
    println!("Cost history:");
    for (epoch, cost) in model.cost_history().iter().rev().enumerate() {
        println!("  epoch {:>3}  cost {:.6}", epoch + 1, cost);
    }
    Ok(())
}

/// Known vehicles used as fixed prediction samples: horsepower, displacement,
/// weight, and the published MPG for comparison
const SAMPLE_VEHICLES: [(&str, [f64; 3], f64); 4] = [
    ("2021 Lexus RX 450h L", [308.0, 211.0, 2.18], 28.5),
    ("2021 Toyota Camry LE", [208.0, 152.0, 1.48], 32.0),
    ("2005 Toyota Camry LE", [160.0, 145.0, 1.38], 29.0),
    ("1995 Ford Bronco XLT 4WD", [205.0, 302.0, 2.06], 14.0),
];

/// Linear-regression experiment: grid-search (or load) the MPG model, then
/// predict the sample vehicles
pub fn cmd_linear(data: &str, model_dir: &str, batch_limit: usize, epoch_limit: usize) -> Result<()> {
    let loader = DatasetLoader::new();
    let df = loader.load(data)?;
    let split = Splitter::new().split(
        &df,
        &["horsepower", "displacement", "weight"],
        &["mpg"],
        50,
    )?;
    let labels = split.labels.column(0).to_owned();
    let test_labels = split.test_labels.column(0).to_owned();

    let config = SearchConfig {
        batch_limit,
        epoch_limit,
        ..Default::default()
    };
    let model_path = format!("{}/model.json", model_dir);
    let model = load_or_search(
        &model_path,
        &split.features,
        &labels,
        &split.test_features,
        &test_labels,
        &config,
    )?;

    for (name, features, actual_mpg) in SAMPLE_VEHICLES {
        let x = Array2::from_shape_vec((1, 3), features.to_vec()).map_err(|e| {
            EmissionsError::ShapeError {
                expected: "(1, 3)".to_string(),
                actual: e.to_string(),
            }
        })?;
        let predicted = model.predict(&x);
        println!(
            "{}: predicted {:.1} mpg (actual {})",
            name, predicted[0], actual_mpg
        );
    }
    Ok(())
}
