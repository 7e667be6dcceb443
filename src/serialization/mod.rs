//! Carrier and checkpoint files.
//!
//! A minimal `SafeTensors`-style container:
//!
//! ```text
//! [8-byte header: u64 metadata length (little-endian)]
//! [JSON metadata: tensor names -> {dtype, shape, data_offsets},
//!  plus optional "__metadata__" string map]
//! [Raw tensor data: F32 values in little-endian]
//! ```
//!
//! Carriers and checkpoints are stored as named tensors plus string
//! metadata (`epoch`, `test_accuracy`). Only F32 is supported; anything
//! else in a file is a format error.

mod tensor_file;

pub use tensor_file::TensorFile;

use crate::error::{Result, TrazadorError};
use crate::primitives::Matrix;
use std::path::Path;
use tracing::debug;

/// Tolerance for the unit-norm check on loaded carriers.
const CARRIER_NORM_TOL: f32 = 1e-3;

/// An ordered set of per-class carrier unit vectors.
///
/// Row c is the carrier for class c; all rows are unit vectors in the
/// marking network's feature space.
#[derive(Debug, Clone)]
pub struct CarrierSet {
    carriers: Matrix<f32>,
}

impl CarrierSet {
    /// Wraps a carrier matrix, enforcing the unit-norm invariant.
    ///
    /// # Errors
    ///
    /// - `ZeroNorm` if any row has zero norm.
    /// - `FormatError` if any row's norm deviates from 1 beyond tolerance.
    pub fn new(carriers: Matrix<f32>) -> Result<Self> {
        for c in 0..carriers.n_rows() {
            let norm = carriers.row(c).norm();
            if norm == 0.0 || !norm.is_finite() {
                return Err(TrazadorError::zero_norm(format!("carrier {c}")));
            }
            if (norm - 1.0).abs() > CARRIER_NORM_TOL {
                return Err(TrazadorError::format(format!(
                    "carrier {c} has norm {norm}, expected a unit vector"
                )));
            }
        }
        Ok(Self { carriers })
    }

    /// Loads the `carriers` tensor from a tensor file.
    ///
    /// # Errors
    ///
    /// Missing file, missing tensor, wrong rank, or non-unit rows are all
    /// fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let file = TensorFile::load(path)?;
        let carriers = file.matrix("carriers")?;
        debug!(
            classes = carriers.n_rows(),
            dim = carriers.n_cols(),
            path = %path.display(),
            "loaded carriers"
        );
        Self::new(carriers)
    }

    /// Writes the carrier matrix to a tensor file.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file = TensorFile::new();
        file.add_matrix("carriers", &self.carriers);
        file.save(path)
    }

    /// The C×d carrier matrix.
    #[must_use]
    pub fn carriers(&self) -> &Matrix<f32> {
        &self.carriers
    }

    /// Number of classes (carrier rows).
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.carriers.n_rows()
    }

    /// Carrier dimensionality (the marking network's feature dim).
    #[must_use]
    pub fn dim(&self) -> usize {
        self.carriers.n_cols()
    }
}

/// A trained target-network checkpoint: the final-layer weights plus the
/// bookkeeping the training harness recorded.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    /// Final-layer classifier weights, shape (num_classes, feature_dim).
    pub fc_weight: Matrix<f32>,
    /// Training epoch the checkpoint was taken at.
    pub epoch: u32,
    /// Test accuracy recorded at checkpoint time.
    pub test_accuracy: f32,
}

impl Checkpoint {
    /// Loads a checkpoint: tensor `fc.weight` plus `epoch` and
    /// `test_accuracy` metadata.
    ///
    /// # Errors
    ///
    /// Missing file, missing tensor, or unparseable metadata are fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let file = TensorFile::load(path)?;
        let fc_weight = file.matrix("fc.weight")?;
        let epoch = file
            .metadata("epoch")
            .ok_or_else(|| TrazadorError::format("checkpoint missing 'epoch' metadata"))?
            .parse::<u32>()
            .map_err(|e| TrazadorError::format(format!("bad 'epoch' metadata: {e}")))?;
        let test_accuracy = file
            .metadata("test_accuracy")
            .ok_or_else(|| TrazadorError::format("checkpoint missing 'test_accuracy' metadata"))?
            .parse::<f32>()
            .map_err(|e| TrazadorError::format(format!("bad 'test_accuracy' metadata: {e}")))?;
        debug!(
            classes = fc_weight.n_rows(),
            dim = fc_weight.n_cols(),
            epoch,
            test_accuracy,
            path = %path.display(),
            "loaded checkpoint"
        );
        Ok(Self {
            fc_weight,
            epoch,
            test_accuracy,
        })
    }

    /// Writes the checkpoint to a tensor file.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut file = TensorFile::new();
        file.add_matrix("fc.weight", &self.fc_weight);
        file.set_metadata("epoch", self.epoch.to_string());
        file.set_metadata("test_accuracy", self.test_accuracy.to_string());
        file.save(path)
    }
}

#[cfg(test)]
#[path = "serialization_tests.rs"]
mod tests;
