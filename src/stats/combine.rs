//! Combining independent p-values into one joint significance value.

use super::special::gamma_q;
use crate::error::{Result, TrazadorError};

/// Combines independent p-values with Fisher's method.
///
/// Under the joint null hypothesis the statistic `-2 Σ ln pᵢ` follows a
/// chi-square distribution with 2k degrees of freedom, so the combined
/// p-value is its survival function, `Q(k, -Σ ln pᵢ)`.
///
/// Properties relied on downstream:
///
/// - Monotonic: lowering any single input cannot raise the output.
/// - `combine_pvalues(&[p]) == p` for a single input.
/// - All inputs at 1.0 yield exactly 1.0 (no evidence combines to none).
/// - An input of exactly 0 saturates the output toward 0 instead of
///   producing NaN; inputs are clamped to `f32::MIN_POSITIVE` before the
///   log.
///
/// Fisher rather than Stouffer is the reference behavior here; the two are
/// not equivalent and the choice is part of the crate contract.
///
/// # Errors
///
/// - `Precondition` on an empty input slice.
/// - `NumericDomain` if any p is NaN or outside `[0, 1]`.
///
/// # Examples
///
/// ```
/// use trazador::stats::combine_pvalues;
///
/// let strong = combine_pvalues(&[0.01, 0.02]).expect("valid p-values");
/// let weak = combine_pvalues(&[0.6, 0.7]).expect("valid p-values");
/// assert!(strong < weak);
/// ```
pub fn combine_pvalues(p_values: &[f32]) -> Result<f32> {
    if p_values.is_empty() {
        return Err(TrazadorError::precondition(
            "cannot combine an empty collection of p-values",
        ));
    }

    let mut statistic = 0.0_f32;
    for (i, &p) in p_values.iter().enumerate() {
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return Err(TrazadorError::numeric_domain(
                format!("p_values[{i}]"),
                p,
                "[0, 1]",
            ));
        }
        // ln(0) would poison the statistic; clamping saturates the
        // combined value toward 0 instead.
        statistic -= p.max(f32::MIN_POSITIVE).ln();
    }

    if statistic == 0.0 {
        return Ok(1.0);
    }
    Ok(gamma_q(p_values.len() as f32, statistic))
}

#[cfg(test)]
#[path = "combine_tests.rs"]
mod tests;
