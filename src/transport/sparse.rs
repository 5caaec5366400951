//! Sparse linear solvers.
//!
//! Solvers are chosen by name once, when the algorithm is configured, and
//! then used through the [`SparseSolver`] trait:
//!
//! | Name | Solver |
//! |------|--------|
//! | `lu`, `direct`, `spsolve` | [`LuSolver`], dense LU with partial pivoting |
//! | `bicgstab` | [`BiCgStabSolver`], Jacobi-preconditioned BiCGStab |
//! | `cg`, `pcg` | [`CgSolver`], Jacobi-preconditioned conjugate gradients |
//!
//! None of them retry or fall back to another method. A singular matrix,
//! an iterative breakdown or an exhausted iteration budget is returned as a
//! [`SolverError`].

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::csr::CsrMatrix;

use super::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::error::{SolverError, TransportError};

/// Below this |inner product| an iterative method is considered broken down.
const BREAKDOWN: f64 = 1e-300;

/// Cosine between the shadow residual and `r` below which BiCGStab restarts.
const SHADOW_COLLAPSE: f64 = 1e-12;

/// Residual growth over the initial residual treated as divergence.
const DIVERGENCE_FACTOR: f64 = 1e8;

/// Diagnostics from one solve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolveStats {
    /// Iterations used (zero for direct solvers)
    pub iterations: usize,
    /// Final residual norm ‖Ax − b‖
    pub residual_norm: f64,
}

/// Solve `Ax = b` for sparse `A`.
pub trait SparseSolver: fmt::Debug {
    /// Solve the system, returning the solution and diagnostics.
    fn solve(
        &self,
        a: &CsrMatrix<f64>,
        b: &DVector<f64>,
    ) -> Result<(DVector<f64>, SolveStats), SolverError>;

    /// Solver name for logging.
    fn name(&self) -> &'static str;
}

/// Registry of available solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    /// Dense LU with partial pivoting
    #[default]
    Lu,
    /// Jacobi-preconditioned BiCGStab
    BiCgStab,
    /// Jacobi-preconditioned conjugate gradients
    ConjugateGradient,
}

impl SolverKind {
    /// Instantiate the solver.
    pub fn build(self, config: IterativeConfig) -> Box<dyn SparseSolver> {
        match self {
            SolverKind::Lu => Box::new(LuSolver),
            SolverKind::BiCgStab => Box::new(BiCgStabSolver::new(config)),
            SolverKind::ConjugateGradient => Box::new(CgSolver::new(config)),
        }
    }
}

impl FromStr for SolverKind {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lu" | "direct" | "spsolve" => Ok(Self::Lu),
            "bicgstab" => Ok(Self::BiCgStab),
            "cg" | "pcg" => Ok(Self::ConjugateGradient),
            _ => Err(TransportError::UnknownSolver {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverKind::Lu => write!(f, "lu"),
            SolverKind::BiCgStab => write!(f, "bicgstab"),
            SolverKind::ConjugateGradient => write!(f, "cg"),
        }
    }
}

/// Stopping rule for iterative solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterativeConfig {
    /// Iteration budget
    pub max_iterations: usize,
    /// Relative tolerance on the Jacobi-scaled residual ‖D⁻¹r‖ / ‖D⁻¹b‖
    pub tolerance: f64,
}

impl Default for IterativeConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl IterativeConfig {
    fn threshold(&self, reference: f64) -> f64 {
        (self.tolerance * reference).max(f64::MIN_POSITIVE)
    }
}

/// Baseline direct solver: converts to dense and factors with `nalgebra`'s
/// LU. Fine for networks up to a few thousand pores.
///
/// Rows are scaled to unit max-norm before factoring, so the singularity
/// check does not depend on the magnitude of the conductances.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuSolver;

impl SparseSolver for LuSolver {
    fn solve(
        &self,
        a: &CsrMatrix<f64>,
        b: &DVector<f64>,
    ) -> Result<(DVector<f64>, SolveStats), SolverError> {
        check_dimensions(a, b)?;
        let n = a.nrows();
        if n == 0 {
            return Ok((DVector::zeros(0), SolveStats::default()));
        }

        let mut dense = DMatrix::<f64>::zeros(n, n);
        for (i, j, &v) in a.triplet_iter() {
            dense[(i, j)] += v;
        }
        let mut rhs = b.clone();
        for i in 0..n {
            let scale = dense.row(i).amax();
            if scale > 0.0 {
                let mut row = dense.row_mut(i);
                row /= scale;
                rhs[i] /= scale;
            }
        }

        let lu = dense.lu();
        let u = lu.u();
        let pivot = (0..n).map(|k| u[(k, k)].abs()).fold(f64::INFINITY, f64::min);
        if !(pivot > n as f64 * f64::EPSILON) {
            return Err(SolverError::SingularMatrix { pivot });
        }

        let x = lu.solve(&rhs).ok_or(SolverError::SingularMatrix { pivot })?;
        if x.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::SingularMatrix { pivot });
        }
        let residual_norm = residual(a, &x, b).norm();
        Ok((
            x,
            SolveStats {
                iterations: 0,
                residual_norm,
            },
        ))
    }

    fn name(&self) -> &'static str {
        "LU"
    }
}

/// Jacobi-preconditioned conjugate gradients.
///
/// Only meaningful for symmetric positive definite systems. Eliminating
/// Dirichlet rows breaks symmetry; CG may then fail to converge, which is
/// reported rather than hidden.
#[derive(Debug, Clone, Copy)]
pub struct CgSolver {
    config: IterativeConfig,
}

impl CgSolver {
    pub fn new(config: IterativeConfig) -> Self {
        Self { config }
    }
}

impl SparseSolver for CgSolver {
    fn solve(
        &self,
        a: &CsrMatrix<f64>,
        b: &DVector<f64>,
    ) -> Result<(DVector<f64>, SolveStats), SolverError> {
        check_dimensions(a, b)?;
        let n = b.len();
        let inv_diag = jacobi(a);

        let mut x = DVector::<f64>::zeros(n);
        let mut r = b.clone();
        let mut z = r.component_mul(&inv_diag);
        let tol = self.config.threshold(z.norm());
        if z.norm() <= tol {
            return Ok((x, SolveStats::default()));
        }

        let mut p = z.clone();
        let mut rz_old = r.dot(&z);
        let mut ap = DVector::<f64>::zeros(n);

        for iter in 0..self.config.max_iterations {
            spmv(a, &p, &mut ap);
            let denom = p.dot(&ap);
            if denom.abs() < BREAKDOWN {
                return Err(SolverError::Breakdown {
                    solver: self.name(),
                    iteration: iter,
                });
            }

            let alpha = rz_old / denom;
            x.axpy(alpha, &p, 1.0);
            r.axpy(-alpha, &ap, 1.0);

            z = r.component_mul(&inv_diag);
            let z_norm = z.norm();
            log::trace!("CG iter {}: scaled residual = {:.6e}", iter + 1, z_norm);
            if z_norm <= tol {
                return Ok((
                    x,
                    SolveStats {
                        iterations: iter + 1,
                        residual_norm: r.norm(),
                    },
                ));
            }

            let rz_new = r.dot(&z);
            let beta = rz_new / rz_old;
            p = &z + p * beta;
            rz_old = rz_new;
        }

        Err(SolverError::ConvergenceFailure {
            iterations: self.config.max_iterations,
            residual: r.norm(),
        })
    }

    fn name(&self) -> &'static str {
        "CG"
    }
}

/// Jacobi-preconditioned BiCGStab for general (non-symmetric) systems.
///
/// The shadow residual starts as `b`. Once it becomes orthogonal to the
/// current residual (after one step on a system with Dirichlet rows, the
/// residual vanishes on exactly the rows where `b` is nonzero) the method
/// restarts with the current residual as the new shadow. A collapse that
/// survives a restart is a breakdown.
#[derive(Debug, Clone, Copy)]
pub struct BiCgStabSolver {
    config: IterativeConfig,
}

impl BiCgStabSolver {
    pub fn new(config: IterativeConfig) -> Self {
        Self { config }
    }
}

impl SparseSolver for BiCgStabSolver {
    fn solve(
        &self,
        a: &CsrMatrix<f64>,
        b: &DVector<f64>,
    ) -> Result<(DVector<f64>, SolveStats), SolverError> {
        check_dimensions(a, b)?;
        let n = b.len();
        let inv_diag = jacobi(a);
        let b_scaled = b.component_mul(&inv_diag).norm();
        let tol = self.config.threshold(b_scaled);

        let mut x = DVector::<f64>::zeros(n);
        let mut r = b.clone();
        let initial_norm = r.norm();
        if b_scaled <= tol {
            return Ok((x, SolveStats::default()));
        }

        let mut r0 = r.clone();
        let mut rho_old = 1.0;
        let mut alpha = 1.0;
        let mut omega = 1.0;
        let mut p = DVector::<f64>::zeros(n);
        let mut v = DVector::<f64>::zeros(n);
        let mut t = DVector::<f64>::zeros(n);

        for iter in 0..self.config.max_iterations {
            let mut rho = r0.dot(&r);
            if !(rho.abs() > SHADOW_COLLAPSE * r0.norm() * r.norm()) {
                log::trace!("BiCGStab iter {}: restarting shadow residual", iter);
                r0.copy_from(&r);
                p.fill(0.0);
                v.fill(0.0);
                rho_old = 1.0;
                alpha = 1.0;
                omega = 1.0;
                rho = r0.dot(&r);
                if !(rho.abs() > BREAKDOWN) {
                    return Err(SolverError::Breakdown {
                        solver: self.name(),
                        iteration: iter,
                    });
                }
            }

            // p and v are zero on the first pass and after a restart
            let beta = (rho / rho_old) * (alpha / omega);
            rho_old = rho;

            // p = r + beta * (p - omega * v)
            p = &r + (&p - &v * omega) * beta;
            let p_hat = p.component_mul(&inv_diag);
            spmv(a, &p_hat, &mut v);

            let r0v = r0.dot(&v);
            if r0v.abs() < BREAKDOWN {
                return Err(SolverError::Breakdown {
                    solver: self.name(),
                    iteration: iter,
                });
            }
            alpha = rho / r0v;

            let s = &r - &v * alpha;
            let s_hat = s.component_mul(&inv_diag);
            if s_hat.norm() <= tol {
                x.axpy(alpha, &p_hat, 1.0);
                return Ok((
                    x,
                    SolveStats {
                        iterations: iter + 1,
                        residual_norm: s.norm(),
                    },
                ));
            }

            spmv(a, &s_hat, &mut t);
            let tt = t.dot(&t);
            if tt.abs() < BREAKDOWN {
                return Err(SolverError::Breakdown {
                    solver: self.name(),
                    iteration: iter,
                });
            }
            omega = t.dot(&s) / tt;

            x.axpy(alpha, &p_hat, 1.0);
            x.axpy(omega, &s_hat, 1.0);
            r = &s - &t * omega;

            let r_norm = r.norm();
            let r_scaled = r.component_mul(&inv_diag).norm();
            log::trace!("BiCGStab iter {}: scaled residual = {:.6e}", iter + 1, r_scaled);
            if r_scaled <= tol {
                return Ok((
                    x,
                    SolveStats {
                        iterations: iter + 1,
                        residual_norm: r_norm,
                    },
                ));
            }
            if r_norm > initial_norm * DIVERGENCE_FACTOR {
                return Err(SolverError::Diverged {
                    solver: self.name(),
                    iteration: iter + 1,
                    residual: r_norm,
                });
            }
            if omega.abs() < BREAKDOWN {
                return Err(SolverError::Breakdown {
                    solver: self.name(),
                    iteration: iter + 1,
                });
            }
        }

        Err(SolverError::ConvergenceFailure {
            iterations: self.config.max_iterations,
            residual: r.norm(),
        })
    }

    fn name(&self) -> &'static str {
        "BiCGStab"
    }
}

fn check_dimensions(a: &CsrMatrix<f64>, b: &DVector<f64>) -> Result<(), SolverError> {
    if a.nrows() != a.ncols() {
        return Err(SolverError::InvalidSystem {
            message: format!("matrix must be square, got {}x{}", a.nrows(), a.ncols()),
        });
    }
    if a.nrows() != b.len() {
        return Err(SolverError::InvalidSystem {
            message: format!(
                "matrix has {} rows but right-hand side has {} entries",
                a.nrows(),
                b.len()
            ),
        });
    }
    Ok(())
}

/// y = A x
fn spmv(a: &CsrMatrix<f64>, x: &DVector<f64>, y: &mut DVector<f64>) {
    for (i, row) in a.row_iter().enumerate() {
        y[i] = row
            .col_indices()
            .iter()
            .zip(row.values())
            .map(|(&j, &v)| v * x[j])
            .sum();
    }
}

/// Inverse diagonal; rows without a usable diagonal are left unscaled.
fn jacobi(a: &CsrMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(
        a.nrows(),
        a.row_iter().enumerate().map(|(i, row)| {
            let d: f64 = row
                .col_indices()
                .iter()
                .zip(row.values())
                .filter(|&(&j, _)| j == i)
                .map(|(_, &v)| v)
                .sum();
            if d.abs() > 1e-300 {
                1.0 / d
            } else {
                1.0
            }
        }),
    )
}

/// r = A x − b
pub(crate) fn residual(a: &CsrMatrix<f64>, x: &DVector<f64>, b: &DVector<f64>) -> DVector<f64> {
    let mut ax = DVector::<f64>::zeros(b.len());
    spmv(a, x, &mut ax);
    ax - b
}
