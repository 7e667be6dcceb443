//! Batch sources feeding the feature extractor.
//!
//! Real experiments stream decoded image batches from a loader owned by
//! the training harness; this crate only consumes the iterator contract.
//! Ordering is an external invariant: a source must yield samples in a
//! deterministic dataset order, and `num_samples` must equal the total
//! row count its batches produce. The extractor asserts the count, not
//! the order.

use crate::primitives::Matrix;

/// One mini-batch of flattened samples, one sample per row.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Sample data, shape (batch_size, input_dim).
    pub images: Matrix<f32>,
    /// Optional class labels, one per row.
    pub labels: Option<Vec<i64>>,
}

/// A finite, deterministically ordered supply of batches with a total
/// sample count known in advance.
pub trait BatchSource {
    /// Total number of samples across all batches.
    fn num_samples(&self) -> usize;

    /// Iterates the batches in dataset order.
    fn batches(&self) -> Box<dyn Iterator<Item = Batch> + '_>;
}

/// A batch source over an in-memory sample matrix.
///
/// # Examples
///
/// ```
/// use trazador::dataset::{BatchSource, InMemoryDataset};
/// use trazador::primitives::Matrix;
///
/// let samples = Matrix::from_vec(4, 2, vec![1.0; 8]).expect("4*2=8 elements");
/// let dataset = InMemoryDataset::new(samples).with_batch_size(3);
/// assert_eq!(dataset.num_samples(), 4);
/// assert_eq!(dataset.batches().count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    samples: Matrix<f32>,
    labels: Option<Vec<i64>>,
    batch_size: usize,
}

impl InMemoryDataset {
    /// Wraps a sample matrix (one sample per row) with the default batch
    /// size of 256.
    #[must_use]
    pub fn new(samples: Matrix<f32>) -> Self {
        Self {
            samples,
            labels: None,
            batch_size: 256,
        }
    }

    /// Attaches per-sample labels.
    ///
    /// # Panics
    ///
    /// Panics if the label count differs from the sample count.
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<i64>) -> Self {
        assert_eq!(
            labels.len(),
            self.samples.n_rows(),
            "one label per sample required"
        );
        self.labels = Some(labels);
        self
    }

    /// Sets the batch size.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be positive");
        self.batch_size = batch_size;
        self
    }
}

impl BatchSource for InMemoryDataset {
    fn num_samples(&self) -> usize {
        self.samples.n_rows()
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Batch> + '_> {
        let n = self.samples.n_rows();
        let cols = self.samples.n_cols();
        let batch_size = self.batch_size;
        Box::new((0..n).step_by(batch_size).map(move |start| {
            let end = (start + batch_size).min(n);
            let mut images = Matrix::zeros(end - start, cols);
            for (out_row, src_row) in (start..end).enumerate() {
                images.set_row(out_row, self.samples.row_slice(src_row));
            }
            let labels = self
                .labels
                .as_ref()
                .map(|labels| labels[start..end].to_vec());
            Batch { images, labels }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix(n: usize, d: usize) -> Matrix<f32> {
        let data: Vec<f32> = (0..n * d).map(|i| i as f32).collect();
        Matrix::from_vec(n, d, data).expect("n*d elements")
    }

    #[test]
    fn test_batch_row_counts_sum_to_n() {
        let dataset = InMemoryDataset::new(sample_matrix(10, 3)).with_batch_size(4);
        let total: usize = dataset.batches().map(|b| b.images.n_rows()).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_last_batch_is_partial() {
        let dataset = InMemoryDataset::new(sample_matrix(10, 3)).with_batch_size(4);
        let sizes: Vec<usize> = dataset.batches().map(|b| b.images.n_rows()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_order_preserved() {
        let dataset = InMemoryDataset::new(sample_matrix(5, 2)).with_batch_size(2);
        let mut seen = Vec::new();
        for batch in dataset.batches() {
            for i in 0..batch.images.n_rows() {
                seen.push(batch.images.get(i, 0));
            }
        }
        assert_eq!(seen, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_labels_follow_batches() {
        let dataset = InMemoryDataset::new(sample_matrix(5, 2))
            .with_labels(vec![0, 1, 2, 3, 4])
            .with_batch_size(2);
        let labels: Vec<i64> = dataset
            .batches()
            .flat_map(|b| b.labels.expect("labels attached"))
            .collect();
        assert_eq!(labels, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "one label per sample")]
    fn test_label_count_mismatch_panics() {
        let _ = InMemoryDataset::new(sample_matrix(5, 2)).with_labels(vec![0, 1]);
    }
}
