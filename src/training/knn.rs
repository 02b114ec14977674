//! K-nearest-neighbor classifier
//!
//! Stores the training matrix and classifies by majority vote over the k
//! nearest rows by Euclidean distance. Prediction parallelizes over test rows.

use crate::error::{EmissionsError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// KNN classifier over raw feature rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    k: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
    classes: Vec<i64>,
}

impl KnnClassifier {
    /// Create a classifier voting over `k` neighbors
    pub fn new(k: usize) -> Self {
        Self {
            k,
            x_train: None,
            y_train: None,
            classes: Vec::new(),
        }
    }

    /// Store the training examples and record the distinct classes
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(EmissionsError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }

        let mut classes: Vec<i64> = y.iter().map(|&v| v as i64).collect();
        classes.sort_unstable();
        classes.dedup();
        self.classes = classes;

        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    /// Classify each row by majority vote over its k nearest training rows
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or(EmissionsError::ModelNotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(EmissionsError::ModelNotFitted)?;
        let k = self.k;

        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let neighbors = nearest_labels(row.as_slice().unwrap(), x_train, y_train, k);
                majority_vote(&neighbors)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Number of distinct classes seen during fit
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Stored example count per class, in class order
    pub fn class_counts(&self) -> Vec<(i64, usize)> {
        let Some(y_train) = self.y_train.as_ref() else {
            return Vec::new();
        };
        self.classes
            .iter()
            .map(|&class| {
                let count = y_train.iter().filter(|&&v| v as i64 == class).count();
                (class, count)
            })
            .collect()
    }
}

/// Max-heap entry keeping the k smallest distances
#[derive(PartialEq)]
struct DistLabel(f64, f64);

impl Eq for DistLabel {}
impl PartialOrd for DistLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}
impl Ord for DistLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Labels of the k nearest training rows — O(n log k) partial sort
fn nearest_labels(
    point: &[f64],
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
) -> Vec<(f64, f64)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let dist = euclidean(point, row.as_slice().unwrap());
        if heap.len() < k {
            heap.push(DistLabel(dist, y_train[i]));
        } else if let Some(top) = heap.peek() {
            if dist < top.0 {
                heap.pop();
                heap.push(DistLabel(dist, y_train[i]));
            }
        }
    }

    heap.into_iter().map(|dl| (dl.0, dl.1)).collect()
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| {
            let d = ai - bi;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

fn majority_vote(neighbors: &[(f64, f64)]) -> f64 {
    let mut votes: HashMap<i64, usize> = HashMap::new();
    for &(_, label) in neighbors {
        *votes.entry(label as i64).or_insert(0) += 1;
    }
    votes
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|(label, _)| label as f64)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emissions_like_data() -> (Array2<f64>, Array1<f64>) {
        // Failed tests cluster at high horsepower, passed at low
        let x = Array2::from_shape_vec(
            (10, 2),
            vec![
                200.0, 2.0, 210.0, 2.1, 220.0, 2.2, 205.0, 1.9, 215.0, 2.05, //
                90.0, 1.1, 95.0, 1.2, 100.0, 1.0, 85.0, 1.15, 92.0, 1.05,
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn test_classifies_separable_clusters() {
        let (x, y) = emissions_like_data();
        let mut knn = KnnClassifier::new(3);
        knn.fit(&x, &y).unwrap();

        let predictions = knn.predict(&x).unwrap();
        let correct = y
            .iter()
            .zip(predictions.iter())
            .filter(|(t, p)| (*t - *p).abs() < 0.5)
            .count();
        assert_eq!(correct, 10);
    }

    #[test]
    fn test_class_counts() {
        let (x, y) = emissions_like_data();
        let mut knn = KnnClassifier::new(3);
        knn.fit(&x, &y).unwrap();

        assert_eq!(knn.n_classes(), 2);
        assert_eq!(knn.class_counts(), vec![(0, 5), (1, 5)]);
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let knn = KnnClassifier::new(3);
        let x = Array2::zeros((2, 2));
        assert!(knn.predict(&x).is_err());
    }

    #[test]
    fn test_euclidean_distance() {
        assert!((euclidean(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }
}
