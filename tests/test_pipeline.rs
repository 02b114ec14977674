//! Integration tests: CSV → split → classify, end to end

use emissions_ml::dataset::{DatasetLoader, Splitter};
use emissions_ml::training::{KnnClassifier, LogisticRegression, LogisticRegressionConfig};
use std::io::Write;
use tempfile::NamedTempFile;

/// Synthetic vehicle CSV with a clean emissions split: gas guzzlers fail,
/// economical cars pass.
fn write_cars_csv(rows_per_class: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "horsepower,weight,mpg,displacement,passedemissions").unwrap();
    for i in 0..rows_per_class {
        let jitter = (i % 7) as f64;
        // Failing vehicles: heavy, thirsty
        writeln!(
            file,
            "{},{:.2},{},{},FALSE",
            220 + i % 40,
            2.0 + jitter * 0.05,
            12 + i % 5,
            300 + i % 20,
        )
        .unwrap();
        // Passing vehicles: light, economical
        writeln!(
            file,
            "{},{:.2},{},{},TRUE",
            90 + i % 40,
            1.0 + jitter * 0.05,
            28 + i % 5,
            120 + i % 20,
        )
        .unwrap();
    }
    file
}

#[test]
fn test_split_from_csv_is_deterministic() {
    let file = write_cars_csv(30);
    let path = file.path().to_str().unwrap();
    let loader = DatasetLoader::new();

    let df_a = loader.load(path).unwrap();
    let df_b = loader.load(path).unwrap();

    let splitter = Splitter::new();
    let a = splitter
        .split(&df_a, &["horsepower", "weight", "mpg"], &["passedemissions"], 10)
        .unwrap();
    let b = splitter
        .split(&df_b, &["horsepower", "weight", "mpg"], &["passedemissions"], 10)
        .unwrap();

    assert_eq!(a.features, b.features);
    assert_eq!(a.test_labels, b.test_labels);
    assert_eq!(a.features.nrows() + a.test_features.nrows(), 60);
}

#[test]
fn test_knn_experiment_end_to_end() {
    let file = write_cars_csv(30);
    let loader = DatasetLoader::new();
    let df = loader.load(file.path().to_str().unwrap()).unwrap();

    let split = Splitter::new()
        .split(&df, &["horsepower", "weight", "mpg"], &["passedemissions"], 10)
        .unwrap();
    let labels = split.labels.column(0).to_owned();

    let mut classifier = KnnClassifier::new(3);
    classifier.fit(&split.features, &labels).unwrap();

    assert_eq!(classifier.n_classes(), 2);
    let counts = classifier.class_counts();
    assert_eq!(counts.iter().map(|(_, c)| c).sum::<usize>(), 50);

    let predictions = classifier.predict(&split.test_features).unwrap();
    let test_labels = split.test_labels.column(0);
    let correct = predictions
        .iter()
        .zip(test_labels.iter())
        .filter(|(p, t)| (*p - *t).abs() < 0.5)
        .count();
    let accuracy = correct as f64 / predictions.len() as f64;
    assert!(accuracy >= 0.9, "accuracy = {}", accuracy);
}

#[test]
fn test_logistic_experiment_end_to_end() {
    let file = write_cars_csv(30);
    let loader = DatasetLoader::new();
    let df = loader.load(file.path().to_str().unwrap()).unwrap();

    let split = Splitter::new()
        .split(&df, &["horsepower", "weight", "mpg"], &["passedemissions"], 10)
        .unwrap();
    let labels = split.labels.column(0).to_owned();
    let test_labels = split.test_labels.column(0).to_owned();

    let config = LogisticRegressionConfig::default()
        .with_learning_rate(0.5)
        .with_epochs(50)
        .with_batch_size(10);
    let mut model = LogisticRegression::new(&split.features, &labels, config).unwrap();
    model.train();

    assert_eq!(model.cost_history().len(), 50);
    let accuracy = model.test(&split.test_features, &test_labels);
    assert!(accuracy >= 0.9, "accuracy = {}", accuracy);
}

#[test]
fn test_flag_column_coercion_flows_through_split() {
    let file = write_cars_csv(10);
    let loader = DatasetLoader::new();
    let df = loader.load(file.path().to_str().unwrap()).unwrap();

    let split = Splitter::new()
        .split(&df, &["horsepower"], &["passedemissions"], 0)
        .unwrap();

    // Every label is exactly 0.0 or 1.0 after coercion
    assert!(split.labels.iter().all(|&v| v == 0.0 || v == 1.0));
    // Both classes survive the shuffle
    let passed: f64 = split.labels.column(0).sum();
    assert_eq!(passed, 10.0);
}
