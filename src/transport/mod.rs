//! Steady-state transport solver.
//!
//! This module assembles and solves the linear system of a pore network
//! transport problem.
//!
//! ## Network Transport
//!
//! Each throat `t` joining pores `i` and `j` carries a rate proportional to
//! the quantity difference across it:
//!
//! ```text
//! q_t = g_t (x_j - x_i)
//! ```
//!
//! Conservation at every pore gives `A x = b` where `A` is the conductance
//! weighted graph Laplacian:
//!
//! ```text
//! A[i, i] =  sum of g over throats at i
//! A[i, j] = -sum of g over throats joining i and j
//! ```
//!
//! and `b` is zero except where boundary conditions apply:
//! - Dirichlet pores fix `x` (their row of `A` becomes a unit row)
//! - Neumann pores fix the net rate (their entry of `b` is the rate)
//!
//! Exactly one linear system is solved per [`GenericTransport::run`].

mod algorithm;
mod bc;
mod settings;
mod sparse;
mod system;

pub use algorithm::{GenericTransport, RateMode, Results};
pub use bc::{BcKind, BcMode, BcValues, BoundaryCondition, BoundaryConditions};
pub use settings::TransportSettings;
pub use sparse::{
    BiCgStabSolver, CgSolver, IterativeConfig, LuSolver, SolveStats, SolverKind, SparseSolver,
};
pub use system::{laplacian, LinearSystem};

/// Relative residual tolerance for iterative solvers.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Iteration budget for iterative solvers.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
