//! Least-squares alignment of two feature embedding spaces.
//!
//! Two networks of different architecture embed the same samples into
//! different spaces. The aligner fits the linear map T minimizing
//! ‖A·T − B‖²_F over paired feature matrices, so classifier weights learned
//! in the target space can be pulled back into the marking space where the
//! carriers live.

mod svd;

use crate::error::{Result, TrazadorError};
use crate::primitives::Matrix;
use svd::jacobi_svd;
use tracing::debug;

/// A fitted linear map from one feature space into another.
///
/// Derived data: recomputed per detection run, never persisted.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// The dA×dB transform; marking-space rows right-multiply into
    /// target space.
    pub transform: Matrix<f32>,
    /// Squared Frobenius norm of the residual A·T − B.
    pub residual: f32,
    /// Numerical rank of A at the solver tolerance.
    pub rank: usize,
}

impl Alignment {
    /// Identity alignment for architecturally identical networks.
    #[must_use]
    pub fn identity(dim: usize) -> Self {
        Self {
            transform: Matrix::eye(dim),
            residual: 0.0,
            rank: dim,
        }
    }
}

/// Ordinary least-squares aligner between paired feature matrices.
///
/// # Examples
///
/// ```
/// use trazador::align::SpaceAligner;
/// use trazador::primitives::Matrix;
///
/// let a = Matrix::from_vec(3, 2, vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).expect("3*2=6 elements");
/// let alignment = SpaceAligner::new().fit(&a, &a).expect("identical spaces align");
/// assert!(alignment.residual < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpaceAligner;

impl SpaceAligner {
    /// Creates an aligner with the default rank tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fits T minimizing ‖A·T − B‖²_F for A (N×dA) and B (N×dB) over the
    /// same N samples in the same order.
    ///
    /// Solved through the SVD pseudo-inverse: singular values below
    /// `σ_max · ε · max(N, dA)` are treated as zero, so a rank-deficient A
    /// deterministically yields the minimum-norm solution instead of
    /// failing.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if the sample counts differ.
    /// - `Precondition` on empty inputs.
    /// - `ConvergenceFailure` if the SVD fails to converge.
    pub fn fit(&self, a: &Matrix<f32>, b: &Matrix<f32>) -> Result<Alignment> {
        let (n, d_a) = a.shape();
        let (n_b, d_b) = b.shape();
        if n != n_b {
            return Err(TrazadorError::dimension_mismatch(
                format!("{n} paired samples"),
                format!("{n_b} samples in second space"),
            ));
        }
        if n == 0 || d_a == 0 || d_b == 0 {
            return Err(TrazadorError::precondition(
                "alignment requires non-empty feature matrices",
            ));
        }

        let transform = lstsq(a, b)?;
        let residual = a
            .matmul(&transform.solution)?
            .sub(b)?
            .frobenius_norm()
            .powi(2);

        debug!(
            rows = n,
            dim_a = d_a,
            dim_b = d_b,
            rank = transform.rank,
            residual,
            "feature spaces aligned"
        );

        Ok(Alignment {
            transform: transform.solution,
            residual,
            rank: transform.rank,
        })
    }
}

struct LstsqOutput {
    solution: Matrix<f32>,
    rank: usize,
}

/// Minimum-norm least-squares solve of A·X = B via the SVD of A.
fn lstsq(a: &Matrix<f32>, b: &Matrix<f32>) -> Result<LstsqOutput> {
    let (m, n) = a.shape();

    // One-sided Jacobi wants tall input; wide systems decompose Aᵀ.
    // A = U Σ Vᵀ either way, with pinv(A) = V Σ⁺ Uᵀ.
    let (u, sigma, v) = if m >= n {
        let svd = jacobi_svd(a)?;
        (svd.u, svd.sigma, svd.v)
    } else {
        let svd = jacobi_svd(&a.transpose())?;
        (svd.v, svd.sigma, svd.u)
    };

    let sigma_max = sigma.first().copied().unwrap_or(0.0);
    let tol = sigma_max * f32::EPSILON * m.max(n) as f32;
    let rank = sigma.iter().filter(|&&s| s > tol).count();

    // X = V Σ⁺ (Uᵀ B); rank-deficient directions contribute nothing,
    // which is exactly the minimum-norm solution.
    let mut ut_b = u.transpose().matmul(b)?;
    for (i, &s) in sigma.iter().enumerate() {
        let inv = if s > tol { 1.0 / s } else { 0.0 };
        for j in 0..ut_b.n_cols() {
            ut_b.set(i, j, ut_b.get(i, j) * inv);
        }
    }
    let solution = v.matmul(&ut_b)?;

    Ok(LstsqOutput { solution, rank })
}

#[cfg(test)]
#[path = "align_tests.rs"]
mod tests;
