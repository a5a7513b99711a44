//! Dense symmetric matrices for covariance handling.
//!
//! Covers what the simulation engine needs from linear algebra:
//! building a covariance matrix from correlations and volatilities, taking
//! its lower Cholesky factor, and repairing estimated matrices that are not
//! positive semi-definite.
//!
//! ```
//! use riskbook_core::math::linalg::SquareMatrix;
//!
//! let corr = SquareMatrix::from_rows(&[vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
//! let cov = corr.scaled_by(&[0.2, 0.1]).unwrap();
//! let l = cov.cholesky().unwrap();
//!
//! let w = l.transform(&[1.0, 0.0]);
//! assert!((w[0] - 0.2).abs() < 1e-12);
//! assert!((w[1] - 0.05).abs() < 1e-12);
//! ```

use super::LinalgError;

const MAX_JACOBI_SWEEPS: usize = 100;

/// Off-diagonal mass, relative to the Frobenius norm, at which Jacobi stops.
const JACOBI_TOLERANCE: f64 = 1e-13;

/// Relative pivot tolerance for the semidefinite Cholesky.
const PSD_PIVOT_TOLERANCE: f64 = 1e-12;

/// Square matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    /// Wraps row-major data of a `dim × dim` matrix.
    pub fn new(data: Vec<f64>, dim: usize) -> Result<Self, LinalgError> {
        if data.len() != dim * dim {
            return Err(LinalgError::DimensionMismatch {
                expected: dim * dim,
                got: data.len(),
            });
        }
        Ok(Self { dim, data })
    }

    /// Builds a matrix from rows; every row must have as many entries as there are rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, LinalgError> {
        let dim = rows.len();
        let mut data = Vec::with_capacity(dim * dim);
        for row in rows {
            if row.len() != dim {
                return Err(LinalgError::DimensionMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { dim, data })
    }

    /// Identity matrix.
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { dim, data }
    }

    /// Equicorrelation matrix `rho·J + (1 − rho)·I`.
    pub fn equicorrelation(dim: usize, rho: f64) -> Self {
        let mut data = vec![rho; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { dim, data }
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at row `i`, column `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Sets the element at row `i`, column `j`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.dim + j] = value;
    }

    /// Row-major view of the data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// `D·M·D` with `D = diag(scales)`.
    ///
    /// Applied to a correlation matrix and a volatility vector this is the
    /// covariance matrix.
    pub fn scaled_by(&self, scales: &[f64]) -> Result<Self, LinalgError> {
        if scales.len() != self.dim {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dim,
                got: scales.len(),
            });
        }
        let n = self.dim;
        let mut data = self.data.clone();
        for i in 0..n {
            for j in 0..n {
                data[i * n + j] *= scales[i] * scales[j];
            }
        }
        Ok(Self { dim: n, data })
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        let n = self.dim;
        (0..n)
            .map(|i| (0..n).map(|j| self.data[i * n + j] * x[j]).sum())
            .collect()
    }

    /// Quadratic form `xᵀ·M·x`.
    pub fn quadratic_form(&self, x: &[f64]) -> f64 {
        self.mul_vec(x).iter().zip(x).map(|(a, b)| a * b).sum()
    }

    /// `(M + Mᵀ)/2`.
    pub fn symmetrized(&self) -> Self {
        let n = self.dim;
        let mut data = self.data.clone();
        for i in 0..n {
            for j in (i + 1)..n {
                let avg = 0.5 * (self.data[i * n + j] + self.data[j * n + i]);
                data[i * n + j] = avg;
                data[j * n + i] = avg;
            }
        }
        Self { dim: n, data }
    }

    /// Lower Cholesky factor `L` with `M = L·Lᵀ`.
    ///
    /// Fails on the first non-positive pivot.
    pub fn cholesky(&self) -> Result<CholeskyFactor, LinalgError> {
        self.decompose(None)
    }

    /// Cholesky factor of a positive semi-definite matrix.
    ///
    /// Pivots within a small relative tolerance of zero produce a zero
    /// column instead of an error; clearly negative pivots still fail.
    pub fn cholesky_semidefinite(&self) -> Result<CholeskyFactor, LinalgError> {
        self.decompose(Some(PSD_PIVOT_TOLERANCE))
    }

    fn decompose(&self, tolerance: Option<f64>) -> Result<CholeskyFactor, LinalgError> {
        let n = self.dim;
        let scale = (0..n).map(|i| self.get(i, i).abs()).fold(1.0_f64, f64::max);
        let mut lower = vec![0.0; n * n];

        for j in 0..n {
            let sum: f64 = (0..j).map(|k| lower[j * n + k] * lower[j * n + k]).sum();
            let pivot = self.get(j, j) - sum;

            let l_jj = if pivot > 0.0 && tolerance.map_or(true, |tol| pivot > tol * scale) {
                pivot.sqrt()
            } else {
                match tolerance {
                    Some(tol) if pivot >= -tol * scale => 0.0,
                    _ => {
                        return Err(LinalgError::NotPositiveDefinite {
                            pivot: j,
                            value: pivot,
                        })
                    }
                }
            };
            lower[j * n + j] = l_jj;

            for i in (j + 1)..n {
                if l_jj == 0.0 {
                    continue;
                }
                let sum: f64 = (0..j).map(|k| lower[i * n + k] * lower[j * n + k]).sum();
                lower[i * n + j] = (self.get(i, j) - sum) / l_jj;
            }
        }

        Ok(CholeskyFactor { dim: n, data: lower })
    }

    /// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
    ///
    /// Returns the eigenvalues and a matrix whose columns are the matching
    /// unit eigenvectors. Only the symmetric part of `self` is used.
    pub fn symmetric_eigen(&self) -> Result<(Vec<f64>, SquareMatrix), LinalgError> {
        let n = self.dim;
        let mut a = self.symmetrized().data;
        let mut v = SquareMatrix::identity(n).data;

        let frobenius: f64 = a.iter().map(|x| x * x).sum();
        let threshold = JACOBI_TOLERANCE * JACOBI_TOLERANCE * frobenius.max(f64::MIN_POSITIVE);

        for _ in 0..MAX_JACOBI_SWEEPS {
            let off: f64 = (0..n)
                .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
                .map(|(i, j)| a[i * n + j] * a[i * n + j])
                .sum();
            if off <= threshold {
                let values = (0..n).map(|i| a[i * n + i]).collect();
                return Ok((values, SquareMatrix { dim: n, data: v }));
            }

            for p in 0..n {
                for q in (p + 1)..n {
                    let apq = a[p * n + q];
                    if apq == 0.0 {
                        continue;
                    }
                    let theta = (a[q * n + q] - a[p * n + p]) / (2.0 * apq);
                    let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                    let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
                    let c = 1.0 / (t * t + 1.0).sqrt();
                    let s = t * c;

                    for k in 0..n {
                        let akp = a[k * n + p];
                        let akq = a[k * n + q];
                        a[k * n + p] = c * akp - s * akq;
                        a[k * n + q] = s * akp + c * akq;
                    }
                    for k in 0..n {
                        let apk = a[p * n + k];
                        let aqk = a[q * n + k];
                        a[p * n + k] = c * apk - s * aqk;
                        a[q * n + k] = s * apk + c * aqk;
                    }
                    a[p * n + q] = 0.0;
                    a[q * n + p] = 0.0;
                    for k in 0..n {
                        let vkp = v[k * n + p];
                        let vkq = v[k * n + q];
                        v[k * n + p] = c * vkp - s * vkq;
                        v[k * n + q] = s * vkp + c * vkq;
                    }
                }
            }
        }

        Err(LinalgError::NoConvergence {
            sweeps: MAX_JACOBI_SWEEPS,
        })
    }

    /// Nearest positive semi-definite matrix.
    ///
    /// With `M = V·Λ·Vᵀ`, the polar factor of `M` is `H = V·|Λ|·Vᵀ` and the
    /// repaired matrix is `(M + H)/2`, which clips negative eigenvalues to zero.
    pub fn nearest_psd(&self) -> Result<SquareMatrix, LinalgError> {
        let n = self.dim;
        let sym = self.symmetrized();
        let (values, vectors) = sym.symmetric_eigen()?;

        let mut polar = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                polar[i * n + j] = (0..n)
                    .map(|k| vectors.get(i, k) * values[k].abs() * vectors.get(j, k))
                    .sum();
            }
        }

        let data = sym
            .data
            .iter()
            .zip(&polar)
            .map(|(m, h)| 0.5 * (m + h))
            .collect();
        Ok(SquareMatrix { dim: n, data }.symmetrized())
    }

    /// Cholesky factor, repairing the matrix first when it is not positive definite.
    ///
    /// The returned flag is `true` when the repair was needed.
    pub fn cholesky_with_repair(&self) -> Result<(CholeskyFactor, bool), LinalgError> {
        match self.cholesky() {
            Ok(l) => Ok((l, false)),
            Err(LinalgError::NotPositiveDefinite { pivot, value }) => {
                tracing::warn!(
                    pivot,
                    value,
                    "covariance matrix not positive definite, repairing"
                );
                let repaired = self.nearest_psd()?;
                Ok((repaired.cholesky_semidefinite()?, true))
            }
            Err(e) => Err(e),
        }
    }
}

/// Lower triangular Cholesky factor, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CholeskyFactor {
    dim: usize,
    data: Vec<f64>,
}

impl CholeskyFactor {
    /// Dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at row `i`, column `j` (zero above the diagonal).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Maps independent standard normals `z` to correlated draws `L·z`.
    pub fn transform(&self, z: &[f64]) -> Vec<f64> {
        let n = self.dim;
        (0..n)
            .map(|i| (0..=i).map(|j| self.data[i * n + j] * z[j]).sum())
            .collect()
    }

    /// `L·Lᵀ`.
    pub fn reconstruct(&self) -> SquareMatrix {
        let n = self.dim;
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                data[i * n + j] = (0..=i.min(j)).map(|k| self.get(i, k) * self.get(j, k)).sum();
            }
        }
        SquareMatrix { dim: n, data }
    }
}
