//! Frozen feature-producing networks.
//!
//! The detector never trains anything: networks enter the pipeline frozen,
//! and the explicit inference flag is a hard precondition checked by the
//! extractor before any forward pass. Real deployments implement
//! [`FeatureNetwork`] over their inference runtime; [`LinearNetwork`] is
//! the reference implementation used in tests and small offline runs.

use crate::error::{Result, TrazadorError};
use crate::primitives::Matrix;

/// A frozen network mapping a batch of samples to feature vectors.
pub trait FeatureNetwork {
    /// Runs the forward pass over a batch (one sample per row), returning
    /// one feature vector per row.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch width doesn't match the network input.
    fn forward(&self, images: &Matrix<f32>) -> Result<Matrix<f32>>;

    /// True when the network is in inference mode (no gradient state).
    /// The extractor refuses networks that report false.
    fn inference_mode(&self) -> bool;
}

/// A single frozen linear layer: features = images · Wᵀ.
///
/// Stands in for a headless classifier backbone (final layer removed);
/// the feature dimensionality is the row count of the weight matrix.
#[derive(Debug, Clone)]
pub struct LinearNetwork {
    /// Weight matrix, shape (feature_dim, input_dim).
    weights: Matrix<f32>,
    inference: bool,
}

impl LinearNetwork {
    /// Wraps a weight matrix as a frozen network in inference mode.
    #[must_use]
    pub fn new(weights: Matrix<f32>) -> Self {
        Self {
            weights,
            inference: true,
        }
    }

    /// Overrides the inference flag. Exists so the extractor's
    /// inference-mode precondition can be exercised.
    #[must_use]
    pub fn with_inference_mode(mut self, inference: bool) -> Self {
        self.inference = inference;
        self
    }

    /// Feature dimensionality of the output space.
    #[must_use]
    pub fn feature_dim(&self) -> usize {
        self.weights.n_rows()
    }
}

impl FeatureNetwork for LinearNetwork {
    fn forward(&self, images: &Matrix<f32>) -> Result<Matrix<f32>> {
        if images.n_cols() != self.weights.n_cols() {
            return Err(TrazadorError::dimension_mismatch(
                format!("batch width {}", self.weights.n_cols()),
                format!("{}", images.n_cols()),
            ));
        }
        Ok(images.matmul(&self.weights.transpose())?)
    }

    fn inference_mode(&self) -> bool {
        self.inference
    }
}
