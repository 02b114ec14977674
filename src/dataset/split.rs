//! Seeded shuffle and train/test splitting

use crate::error::{EmissionsError, Result};
use ndarray::{s, Array2};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed phrase used by every experiment so splits line up across runs
pub const DEFAULT_SEED_PHRASE: &str = "phrase";

/// A deterministic partition of the shuffled row set.
///
/// The first `test_split` rows (post-shuffle) are the test set; the rest is
/// training data. Row counts always sum to the original row count.
#[derive(Debug, Clone)]
pub struct SplitData {
    pub features: Array2<f64>,
    pub labels: Array2<f64>,
    pub test_features: Array2<f64>,
    pub test_labels: Array2<f64>,
}

/// Shuffles rows with a seeded RNG and projects named columns into matrices
pub struct Splitter {
    seed_phrase: String,
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Splitter {
    /// Create a splitter with the default seed phrase
    pub fn new() -> Self {
        Self {
            seed_phrase: DEFAULT_SEED_PHRASE.to_string(),
        }
    }

    /// Override the seed phrase
    pub fn with_seed_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.seed_phrase = phrase.into();
        self
    }

    /// Shuffle, project, and slice the DataFrame.
    ///
    /// Feature and label vectors are built by projecting the named columns in
    /// list order. Missing or misnamed columns silently project to NaN; the
    /// caller is responsible for supplying correct names.
    pub fn split(
        &self,
        df: &DataFrame,
        feature_columns: &[&str],
        label_columns: &[&str],
        test_split: usize,
    ) -> Result<SplitData> {
        let n_rows = df.height();
        if test_split > n_rows {
            return Err(EmissionsError::InvalidParameter {
                name: "test_split".to_string(),
                value: test_split.to_string(),
                reason: format!("must not exceed row count ({})", n_rows),
            });
        }

        let mut order: Vec<usize> = (0..n_rows).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed_from_phrase(&self.seed_phrase));
        order.shuffle(&mut rng);

        let features = project(df, feature_columns, &order)?;
        let labels = project(df, label_columns, &order)?;

        Ok(SplitData {
            test_features: features.slice(s![..test_split, ..]).to_owned(),
            test_labels: labels.slice(s![..test_split, ..]).to_owned(),
            features: features.slice(s![test_split.., ..]).to_owned(),
            labels: labels.slice(s![test_split.., ..]).to_owned(),
        })
    }
}

/// Stable FNV-1a hash of the seed phrase
fn seed_from_phrase(phrase: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in phrase.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Project named columns into a row-major matrix, rows in shuffled order
fn project(df: &DataFrame, columns: &[&str], order: &[usize]) -> Result<Array2<f64>> {
    let n_rows = order.len();
    let n_cols = columns.len();

    let column_data: Vec<Vec<f64>> = columns
        .iter()
        .map(|name| column_values(df, name, n_rows))
        .collect();

    let mut data = Vec::with_capacity(n_rows * n_cols);
    for &row in order {
        for column in &column_data {
            data.push(column[row]);
        }
    }

    Array2::from_shape_vec((n_rows, n_cols), data).map_err(|e| EmissionsError::ShapeError {
        expected: format!("({}, {})", n_rows, n_cols),
        actual: e.to_string(),
    })
}

/// Values of one column as f64, NaN for nulls and absent columns
fn column_values(df: &DataFrame, name: &str, n_rows: usize) -> Vec<f64> {
    let series = match df.column(name) {
        Ok(column) => column.as_materialized_series().clone(),
        Err(_) => return vec![f64::NAN; n_rows],
    };

    match series.cast(&DataType::Float64) {
        Ok(cast) => match cast.f64() {
            Ok(ca) => ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
            Err(_) => vec![f64::NAN; n_rows],
        },
        Err(_) => vec![f64::NAN; n_rows],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_df() -> DataFrame {
        df!(
            "horsepower" => &[100.0, 110.0, 120.0, 130.0, 140.0, 150.0, 160.0, 170.0, 180.0, 190.0],
            "weight" => &[1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9],
            "mpg" => &[30.0, 29.0, 28.0, 27.0, 26.0, 25.0, 24.0, 23.0, 22.0, 21.0]
        )
        .unwrap()
    }

    #[test]
    fn test_split_is_deterministic() {
        let df = create_test_df();
        let splitter = Splitter::new();

        let a = splitter
            .split(&df, &["horsepower", "weight"], &["mpg"], 3)
            .unwrap();
        let b = splitter
            .split(&df, &["horsepower", "weight"], &["mpg"], 3)
            .unwrap();

        assert_eq!(a.features, b.features);
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.test_features, b.test_features);
        assert_eq!(a.test_labels, b.test_labels);
    }

    #[test]
    fn test_row_counts_sum_to_total() {
        let df = create_test_df();
        let split = Splitter::new()
            .split(&df, &["horsepower"], &["mpg"], 4)
            .unwrap();

        assert_eq!(split.test_features.nrows(), 4);
        assert_eq!(
            split.features.nrows() + split.test_features.nrows(),
            df.height()
        );
        assert_eq!(
            split.labels.nrows() + split.test_labels.nrows(),
            df.height()
        );
    }

    #[test]
    fn test_projection_preserves_column_order() {
        let df = create_test_df();
        let split = Splitter::new()
            .split(&df, &["weight", "horsepower"], &["mpg"], 0)
            .unwrap();

        // weight values are all < 2, horsepower all >= 100
        for row in split.features.rows() {
            assert!(row[0] < 2.0);
            assert!(row[1] >= 100.0);
        }
    }

    #[test]
    fn test_different_seed_changes_order() {
        let df = create_test_df();
        let a = Splitter::new()
            .split(&df, &["horsepower"], &["mpg"], 5)
            .unwrap();
        let b = Splitter::new()
            .with_seed_phrase("another phrase")
            .split(&df, &["horsepower"], &["mpg"], 5)
            .unwrap();

        assert_ne!(a.test_features, b.test_features);
    }

    #[test]
    fn test_missing_column_projects_nan() {
        let df = create_test_df();
        let split = Splitter::new()
            .split(&df, &["horsepower", "nosuchcolumn"], &["mpg"], 2)
            .unwrap();

        assert!(split.features.column(1).iter().all(|v| v.is_nan()));
        assert!(split.features.column(0).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_test_split_exceeding_rows_is_rejected() {
        let df = create_test_df();
        let result = Splitter::new().split(&df, &["horsepower"], &["mpg"], 11);
        assert!(result.is_err());
    }
}
