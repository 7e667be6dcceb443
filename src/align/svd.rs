//! Thin singular value decomposition via one-sided Jacobi rotations.
//!
//! Chosen over normal equations because the aligner has to stay stable
//! when the sample count is comparable to the feature dimensionality, and
//! it yields the pseudo-inverse (minimum-norm) solution for rank-deficient
//! inputs for free.

use crate::error::{Result, TrazadorError};
use crate::primitives::Matrix;

const MAX_SWEEPS: usize = 60;
// Kept above f32 machine epsilon so rotations cannot jitter forever.
const ORTHO_TOL: f32 = 1e-6;

/// Thin SVD of an m×n matrix with m >= n: A = U Σ Vᵀ.
///
/// `u` is m×n with orthonormal columns (zero columns where σ = 0),
/// `sigma` holds the n singular values in descending order, `v` is n×n
/// orthogonal.
pub(crate) struct Svd {
    pub u: Matrix<f32>,
    pub sigma: Vec<f32>,
    pub v: Matrix<f32>,
}

/// One-sided Jacobi SVD. Requires m >= n; callers with wide matrices
/// decompose the transpose instead.
///
/// Deterministic: fixed cyclic sweep order, stable descending sort of the
/// singular values with ties broken by original column index.
pub(crate) fn jacobi_svd(a: &Matrix<f32>) -> Result<Svd> {
    let (m, n) = a.shape();
    assert!(m >= n, "jacobi_svd requires rows >= cols");

    // Working copy, column major: rotations touch column pairs.
    let mut w: Vec<Vec<f32>> = (0..n)
        .map(|j| (0..m).map(|i| a.get(i, j)).collect())
        .collect();
    let mut v: Vec<Vec<f32>> = (0..n)
        .map(|j| {
            let mut col = vec![0.0; n];
            col[j] = 1.0;
            col
        })
        .collect();

    let mut converged = false;
    for _sweep in 0..MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..n.saturating_sub(1) {
            for q in (p + 1)..n {
                let alpha: f32 = w[p].iter().map(|x| x * x).sum();
                let beta: f32 = w[q].iter().map(|x| x * x).sum();
                let gamma: f32 = w[p].iter().zip(&w[q]).map(|(x, y)| x * y).sum();

                if alpha == 0.0 || beta == 0.0 {
                    continue;
                }
                if gamma.abs() <= ORTHO_TOL * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                // Jacobi rotation zeroing the (p, q) inner product.
                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;

                for i in 0..m {
                    let wp = w[p][i];
                    let wq = w[q][i];
                    w[p][i] = c * wp - s * wq;
                    w[q][i] = s * wp + c * wq;
                }
                for i in 0..n {
                    let vp = v[p][i];
                    let vq = v[q][i];
                    v[p][i] = c * vp - s * vq;
                    v[q][i] = s * vp + c * vq;
                }
            }
        }
        if !rotated {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(TrazadorError::ConvergenceFailure {
            iterations: MAX_SWEEPS,
        });
    }

    // Column norms are the singular values; sort descending.
    let mut order: Vec<usize> = (0..n).collect();
    let norms: Vec<f32> = w
        .iter()
        .map(|col| col.iter().map(|x| x * x).sum::<f32>().sqrt())
        .collect();
    order.sort_by(|&i, &j| norms[j].partial_cmp(&norms[i]).unwrap_or(std::cmp::Ordering::Equal));

    let mut u = Matrix::zeros(m, n);
    let mut sigma = vec![0.0; n];
    let mut v_out = Matrix::zeros(n, n);
    for (out_j, &src_j) in order.iter().enumerate() {
        let s = norms[src_j];
        sigma[out_j] = s;
        if s > 0.0 {
            for i in 0..m {
                u.set(i, out_j, w[src_j][i] / s);
            }
        }
        for i in 0..n {
            v_out.set(i, out_j, v[src_j][i]);
        }
    }

    Ok(Svd {
        u,
        sigma,
        v: v_out,
    })
}
