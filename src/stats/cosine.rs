//! Closed-form tail probability for cosine similarity of random unit vectors.

use super::special::betainc;
use crate::error::{Result, TrazadorError};

/// Probability that the cosine similarity between a fixed unit vector and a
/// uniformly random unit vector in `d` dimensions is at least `c`.
///
/// For c >= 0 this is the exact one-sided tail
///
/// ```text
/// P(cos θ >= c) = 1/2 · I_{1-c²}((d-1)/2, 1/2)
/// ```
///
/// where I is the regularized incomplete beta function. For c < 0 the value
/// is defined by reflection as `1 - cosine_pvalue(-c, d)`; the closed form
/// above is only derived for non-negative arguments, and the reflection is
/// what makes the two-sided tail come out right.
///
/// Exact values: `cosine_pvalue(0, d) == 0.5`, `cosine_pvalue(1, d) == 0.0`,
/// `cosine_pvalue(-1, d) == 1.0`.
///
/// # Errors
///
/// - `NumericDomain` if `c` is NaN or outside `[-1, 1]`.
/// - `Precondition` if `d < 2` (no direction to deviate in).
///
/// # Examples
///
/// ```
/// use trazador::stats::cosine_pvalue;
///
/// let p = cosine_pvalue(0.0, 512).expect("0 is a valid correlation");
/// assert!((p - 0.5).abs() < 1e-6);
/// ```
pub fn cosine_pvalue(c: f32, d: usize) -> Result<f32> {
    if d < 2 {
        return Err(TrazadorError::precondition(format!(
            "cosine p-value requires dimensionality >= 2, got {d}"
        )));
    }
    if c.is_nan() {
        return Err(TrazadorError::numeric_domain(
            "c",
            "NaN",
            "a real number in [-1, 1]",
        ));
    }
    if !(-1.0..=1.0).contains(&c) {
        return Err(TrazadorError::numeric_domain("c", c, "[-1, 1]"));
    }

    if c < 0.0 {
        return Ok(1.0 - cosine_pvalue(-c, d)?);
    }

    let a = (d as f32 - 1.0) / 2.0;
    let b = 0.5;
    Ok(0.5 * betainc(a, b, 1.0 - c * c))
}

#[cfg(test)]
#[path = "cosine_tests.rs"]
mod tests;
