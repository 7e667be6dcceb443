//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use trazador::prelude::*;
//! ```

pub use crate::align::{Alignment, SpaceAligner};
pub use crate::context::RunContext;
pub use crate::dataset::{Batch, BatchSource, InMemoryDataset};
pub use crate::detect::{
    detect_radioactivity, run_detection, Detection, DetectionConfig, DetectionReport,
};
pub use crate::error::{Result, TrazadorError};
pub use crate::extract::{Extraction, FeatureExtractor};
pub use crate::network::{FeatureNetwork, LinearNetwork};
pub use crate::primitives::{Matrix, Vector};
pub use crate::serialization::{CarrierSet, Checkpoint, TensorFile};
pub use crate::stats::{combine_pvalues, cosine_pvalue};
