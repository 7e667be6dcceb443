//! Trazador: statistical detection of radioactive data in neural classifiers.
//!
//! A network trained on subtly marked images encodes a directional bias
//! toward per-class carrier unit vectors. Trazador tests a trained
//! classifier for that bias: it extracts features for a held-out dataset
//! under both the marking network and the target network, aligns the two
//! embedding spaces with a least-squares linear map, pulls the target's
//! final-layer weights back into carrier space, and turns the per-class
//! cosine similarities into one combined p-value.
//!
//! # Quick Start
//!
//! ```
//! use trazador::prelude::*;
//!
//! // Identical architectures, weights equal to the carriers: a maximally
//! // marked network.
//! let dim = 16;
//! let mut carrier_rows = Matrix::zeros(2, dim);
//! carrier_rows.set(0, 0, 1.0);
//! carrier_rows.set(1, 1, 1.0);
//! let carriers = CarrierSet::new(carrier_rows.clone()).unwrap();
//!
//! let net = LinearNetwork::new(Matrix::eye(dim));
//! let samples = Matrix::from_vec(4, dim, vec![0.25; 4 * dim]).unwrap();
//! let source = InMemoryDataset::new(samples);
//!
//! let config = DetectionConfig { align_spaces: false, ..Default::default() };
//! let detection = detect_radioactivity(
//!     &RunContext::ephemeral(),
//!     &carriers,
//!     &carrier_rows,
//!     &net,
//!     &net,
//!     &source,
//!     &config,
//! ).unwrap();
//! assert!(detection.combined_p_value < 1e-6);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`dataset`]: Batch sources over the held-out dataset
//! - [`network`]: Frozen feature-network interface
//! - [`extract`]: Feature extraction into a preallocated container
//! - [`align`]: Least-squares alignment between embedding spaces
//! - [`stats`]: Cosine significance and p-value combination
//! - [`serialization`]: Carrier and checkpoint tensor files
//! - [`detect`]: Pipeline orchestration and entry points
//! - [`context`]: Run-scoped output paths and logging span
//! - [`error`]: Error taxonomy (all fatal, fail-fast)

pub mod align;
pub mod context;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod network;
pub mod prelude;
pub mod primitives;
pub mod serialization;
pub mod stats;

/// Pipeline orchestration (the detection entry points).
pub mod detect;
