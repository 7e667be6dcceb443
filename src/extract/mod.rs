//! Feature extraction over a frozen network.
//!
//! Streams every batch of a [`BatchSource`] through a [`FeatureNetwork`]
//! and collects the outputs into one preallocated feature matrix, one row
//! per sample in dataset order. The container is written once per row and
//! immutable downstream.

use crate::dataset::{Batch, BatchSource};
use crate::error::{Result, TrazadorError};
use crate::network::FeatureNetwork;
use crate::primitives::Matrix;
use std::time::Instant;
use tracing::debug;

/// Features (and optionally labels) collected over a full dataset.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// N×d feature matrix, row order equal to dataset order.
    pub features: Matrix<f32>,
    /// Labels in the same order, present when every batch carried them.
    pub labels: Option<Vec<i64>>,
}

/// Runs a frozen network over a dataset and collects feature vectors.
///
/// The feature dimensionality is discovered from the first batch's output
/// width; every later batch must match it. The total row count must equal
/// `source.num_samples()` exactly, both checked fatally.
///
/// # Examples
///
/// ```
/// use trazador::dataset::InMemoryDataset;
/// use trazador::extract::FeatureExtractor;
/// use trazador::network::LinearNetwork;
/// use trazador::primitives::Matrix;
///
/// let samples = Matrix::from_vec(4, 2, vec![1.0; 8]).expect("4*2=8 elements");
/// let net = LinearNetwork::new(Matrix::eye(2));
/// let extraction = FeatureExtractor::new()
///     .extract(&InMemoryDataset::new(samples), &net)
///     .expect("counts match");
/// assert_eq!(extraction.features.shape(), (4, 2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    report_every: Option<usize>,
}

impl FeatureExtractor {
    /// Creates an extractor with throughput reporting disabled.
    #[must_use]
    pub fn new() -> Self {
        Self { report_every: None }
    }

    /// Emits a throughput/ETA debug event every `batches` batches.
    /// Cosmetic only.
    #[must_use]
    pub fn with_report_every(mut self, batches: usize) -> Self {
        self.report_every = Some(batches);
        self
    }

    /// Extracts features for every sample of `source`.
    ///
    /// # Errors
    ///
    /// - `Precondition` if the network is not in inference mode, if the
    ///   batches supply more rows than `num_samples()`, or if the final
    ///   row count falls short of it.
    /// - `DimensionMismatch` if a batch's feature width differs from the
    ///   width discovered on the first batch, if a batch carries a label
    ///   count different from its row count, or labels appear for only
    ///   part of the dataset.
    pub fn extract(
        &self,
        source: &dyn BatchSource,
        network: &dyn FeatureNetwork,
    ) -> Result<Extraction> {
        if !network.inference_mode() {
            return Err(TrazadorError::precondition(
                "feature extraction requires the network in inference mode",
            ));
        }

        let n = source.num_samples();
        let mut features: Option<Matrix<f32>> = None;
        let mut labels: Vec<i64> = Vec::new();
        let mut offset = 0usize;
        let start = Instant::now();

        for (batch_idx, batch) in source.batches().enumerate() {
            let Batch { images, labels: batch_labels } = batch;
            let sz = images.n_rows();
            let ft = network.forward(&images)?;
            if ft.n_rows() != sz {
                return Err(TrazadorError::dimension_mismatch(
                    format!("{sz} feature rows for a {sz}-sample batch"),
                    format!("{}", ft.n_rows()),
                ));
            }

            if let Some(existing) = features.as_ref() {
                if ft.n_cols() != existing.n_cols() {
                    return Err(TrazadorError::dimension_mismatch(
                        format!("feature width {}", existing.n_cols()),
                        format!("{} in batch {batch_idx}", ft.n_cols()),
                    ));
                }
            }
            let out = features.get_or_insert_with(|| Matrix::zeros(n, ft.n_cols()));

            if offset + sz > n {
                return Err(TrazadorError::precondition(format!(
                    "batches supplied more than the declared {n} samples"
                )));
            }
            for i in 0..sz {
                out.set_row(offset + i, ft.row_slice(i));
            }

            match batch_labels {
                Some(mut batch_labels) => {
                    if labels.len() != offset {
                        return Err(TrazadorError::dimension_mismatch(
                            "labels on every batch or none".to_string(),
                            format!("labels missing before batch {batch_idx}"),
                        ));
                    }
                    if batch_labels.len() != sz {
                        return Err(TrazadorError::dimension_mismatch(
                            format!("{sz} labels for a {sz}-sample batch"),
                            format!("{} in batch {batch_idx}", batch_labels.len()),
                        ));
                    }
                    labels.append(&mut batch_labels);
                }
                None => {
                    if !labels.is_empty() {
                        return Err(TrazadorError::dimension_mismatch(
                            "labels on every batch or none".to_string(),
                            format!("no labels in batch {batch_idx}"),
                        ));
                    }
                }
            }

            offset += sz;
            if let Some(every) = self.report_every {
                if every > 0 && (batch_idx + 1) % every == 0 {
                    let elapsed = start.elapsed().as_secs_f64().max(1e-9);
                    let speed = offset as f64 / elapsed;
                    let eta = (n - offset) as f64 / speed.max(1e-9);
                    debug!(samples = offset, speed, eta, "extraction progress");
                }
            }
        }

        if offset != n {
            return Err(TrazadorError::precondition(format!(
                "extracted {offset} samples but the dataset declared {n}"
            )));
        }

        let features = features.unwrap_or_else(|| Matrix::zeros(0, 0));
        debug!(
            samples = n,
            dim = features.n_cols(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "feature extraction complete"
        );

        Ok(Extraction {
            features,
            labels: if labels.is_empty() { None } else { Some(labels) },
        })
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
