//! Top-level radioactivity detection pipeline.
//!
//! Linear state machine, fail-fast at every step:
//!
//! 1. LOAD carriers and the target checkpoint (file entry point only).
//! 2. EXTRACT features from the held-out dataset, once per network.
//! 3. ALIGN the marking and target feature spaces (or use identity).
//! 4. PROJECT classifier weight rows into marking space and normalize.
//! 5. SCORE each class against its carrier.
//! 6. SIGNIFICANCE: per-class cosine p-values.
//! 7. COMBINE into one joint p-value.
//! 8. WRITE the result as `detection.json` when the context has an
//!    output directory.
//!
//! No retries and no partial results: any failure before scoring aborts
//! the whole run.

use crate::align::{Alignment, SpaceAligner};
use crate::context::RunContext;
use crate::dataset::BatchSource;
use crate::error::{Result, TrazadorError};
use crate::extract::FeatureExtractor;
use crate::network::FeatureNetwork;
use crate::primitives::{Matrix, Vector};
use crate::serialization::{CarrierSet, Checkpoint};
use crate::stats::{combine_pvalues, cosine_pvalue};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Knobs for one detection run.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Fit the least-squares alignment between the two feature spaces.
    /// Disable only when the architectures are known identical; the
    /// identity map is used instead.
    pub align_spaces: bool,
    /// Throughput reporting interval for feature extraction, in batches.
    pub report_every: Option<usize>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            align_spaces: true,
            report_every: None,
        }
    }
}

/// Result of the core detection pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    /// Per-class cosine similarity between the aligned, normalized
    /// classifier weight row and its carrier.
    pub scores: Vector<f32>,
    /// Per-class tail probabilities of the scores.
    pub p_values: Vector<f32>,
    /// Joint p-value over all classes (Fisher's method).
    pub combined_p_value: f32,
    /// Squared residual of the space alignment; None when alignment was
    /// skipped.
    pub alignment_residual: Option<f32>,
}

/// Result of the file-level entry point: the detection plus the
/// bookkeeping recorded in the checkpoint.
#[derive(Debug, Clone)]
pub struct DetectionReport {
    /// The core detection result.
    pub detection: Detection,
    /// Training epoch of the examined checkpoint.
    pub epoch: u32,
    /// Test accuracy recorded with the checkpoint.
    pub test_accuracy: f32,
    /// Mean score expressed in multiples of the null standard deviation,
    /// `mean(scores) · sqrt(C·d)`.
    pub mean_score_sigmas: f32,
}

/// Runs the core detection pipeline over already-loaded inputs.
///
/// `carriers` live in the marking network's feature space (C×dM rows of
/// unit norm, enforced by [`CarrierSet`]); `classifier_weights` is the
/// target network's final layer (C×dT).
///
/// # Errors
///
/// Dimensional inconsistency between carriers, classifier and the
/// discovered feature spaces, a non-inference network, extraction count
/// mismatches, alignment failures and zero-norm weight rows are all
/// fatal.
pub fn detect_radioactivity(
    ctx: &RunContext,
    carriers: &CarrierSet,
    classifier_weights: &Matrix<f32>,
    marking_network: &dyn FeatureNetwork,
    target_network: &dyn FeatureNetwork,
    source: &dyn BatchSource,
    config: &DetectionConfig,
) -> Result<Detection> {
    let _guard = ctx.span().entered();

    let num_classes = carriers.num_classes();
    let carrier_dim = carriers.dim();
    if classifier_weights.n_rows() != num_classes {
        return Err(TrazadorError::dimension_mismatch(
            format!("{num_classes} classifier rows to match the carrier set"),
            format!("{}", classifier_weights.n_rows()),
        ));
    }

    // EXTRACT: same source, same deterministic order, once per network.
    let mut extractor = FeatureExtractor::new();
    if let Some(every) = config.report_every {
        extractor = extractor.with_report_every(every);
    }
    info!(samples = source.num_samples(), "extracting marking-network features");
    let marking = extractor.extract(source, marking_network)?;
    info!(samples = source.num_samples(), "extracting target-network features");
    let target = extractor.extract(source, target_network)?;

    let marking_dim = marking.features.n_cols();
    let target_dim = target.features.n_cols();
    if marking_dim != carrier_dim {
        return Err(TrazadorError::dimension_mismatch(
            format!("marking features of width {carrier_dim} to match the carriers"),
            format!("{marking_dim}"),
        ));
    }
    if classifier_weights.n_cols() != target_dim {
        return Err(TrazadorError::dimension_mismatch(
            format!("classifier width {target_dim} to match the target features"),
            format!("{}", classifier_weights.n_cols()),
        ));
    }

    // ALIGN
    let alignment = if config.align_spaces {
        SpaceAligner::new().fit(&marking.features, &target.features)?
    } else {
        if marking_dim != target_dim {
            return Err(TrazadorError::dimension_mismatch(
                format!("equal feature dims ({marking_dim}) with alignment disabled"),
                format!("{target_dim}"),
            ));
        }
        Alignment::identity(marking_dim)
    };
    let alignment_residual = config.align_spaces.then_some(alignment.residual);

    // PROJECT: pull each weight row back into marking space, then
    // normalize. W is C×dT, T is dM×dT, so W·Tᵀ is C×dM.
    let projected = classifier_weights.matmul(&alignment.transform.transpose())?;
    let mut normalized = Matrix::zeros(num_classes, carrier_dim);
    for c in 0..num_classes {
        let row = projected.row(c).normalize().map_err(|_| {
            TrazadorError::zero_norm(format!("projected classifier weight row {c}"))
        })?;
        normalized.set_row(c, row.as_slice());
    }

    // SCORE + SIGNIFICANCE
    let mut scores = Vector::zeros(num_classes);
    let mut p_values = Vector::zeros(num_classes);
    for c in 0..num_classes {
        let score = normalized.row(c).dot(&carriers.carriers().row(c));
        // Cosines of unit vectors; shave off rounding spill past ±1.
        scores[c] = score.clamp(-1.0, 1.0);
        p_values[c] = cosine_pvalue(scores[c], carrier_dim)?;
    }

    // COMBINE
    let combined_p_value = combine_pvalues(p_values.as_slice())?;
    info!(
        classes = num_classes,
        combined_p_value,
        log10_p = combined_p_value.max(f32::MIN_POSITIVE).log10(),
        "detection complete"
    );

    let detection = Detection {
        scores,
        p_values,
        combined_p_value,
        alignment_residual,
    };
    if let Some(path) = ctx.path("detection.json") {
        fs::write(&path, serde_json::to_string_pretty(&detection)?)?;
        info!(path = %path.display(), "detection written");
    }
    Ok(detection)
}

/// File-level entry point: loads the carrier set and target checkpoint,
/// then runs the detection pipeline.
///
/// # Errors
///
/// Missing or corrupt carrier/checkpoint files are fatal, as is
/// everything [`detect_radioactivity`] rejects.
pub fn run_detection(
    ctx: &RunContext,
    carrier_path: &Path,
    checkpoint_path: &Path,
    marking_network: &dyn FeatureNetwork,
    target_network: &dyn FeatureNetwork,
    source: &dyn BatchSource,
    config: &DetectionConfig,
) -> Result<DetectionReport> {
    let carriers = CarrierSet::load(carrier_path)?;
    let checkpoint = Checkpoint::load(checkpoint_path)?;

    let detection = detect_radioactivity(
        ctx,
        &carriers,
        &checkpoint.fc_weight,
        marking_network,
        target_network,
        source,
        config,
    )?;

    let c = carriers.num_classes() as f32;
    let d = carriers.dim() as f32;
    let mean_score_sigmas = detection.scores.mean() * (c * d).sqrt();
    info!(
        epoch = checkpoint.epoch,
        test_accuracy = checkpoint.test_accuracy,
        mean_score_sigmas,
        "detection report"
    );

    Ok(DetectionReport {
        detection,
        epoch: checkpoint.epoch,
        test_accuracy: checkpoint.test_accuracy,
        mean_score_sigmas,
    })
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
