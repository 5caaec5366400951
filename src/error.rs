//! Error types for the pnflow transport solver.
//!
//! This module provides a unified error type [`TransportError`] that covers
//! all error conditions that can occur while describing a network, setting
//! boundary conditions, assembling and solving the linear system, and
//! post-processing the solution.
//!
//! Failures of the sparse solvers themselves are reported as [`SolverError`]
//! and wrapped verbatim into [`TransportError::Numerical`].

use thiserror::Error;

/// Result type alias using [`TransportError`].
pub type Result<T> = std::result::Result<T, TransportError>;

/// Failures reported by a sparse linear solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Matrix is singular or numerically singular
    #[error("singular matrix (smallest pivot {pivot:.2e})")]
    SingularMatrix { pivot: f64 },

    /// Iterative solver ran out of iterations
    #[error("no convergence after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceFailure { iterations: usize, residual: f64 },

    /// Iterative solver hit a zero inner product
    #[error("{solver} breakdown at iteration {iteration}")]
    Breakdown { solver: &'static str, iteration: usize },

    /// Residual grew beyond the divergence limit
    #[error("{solver} diverged at iteration {iteration} (residual: {residual:.2e})")]
    Diverged {
        solver: &'static str,
        iteration: usize,
        residual: f64,
    },

    /// Matrix and right-hand side do not describe a square system
    #[error("invalid system: {message}")]
    InvalidSystem { message: String },
}

/// Unified error type for all pnflow operations.
#[derive(Error, Debug)]
pub enum TransportError {
    // ============ Description Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Pore label referenced before being declared
    #[error("Pore '{pore}' not found in network")]
    PoreNotFound { pore: String },

    /// Duplicate pore label
    #[error("Duplicate pore label '{name}'")]
    DuplicatePore { name: String },

    // ============ Network Errors ============
    /// Invalid network topology
    #[error("Invalid network topology: {message}")]
    InvalidTopology { message: String },

    /// Pore index outside the network
    #[error("Pore index {index} out of range for network with {count} pores")]
    PoreOutOfRange { index: usize, count: usize },

    /// Throat index outside the network
    #[error("Throat index {index} out of range for network with {count} throats")]
    ThroatOutOfRange { index: usize, count: usize },

    /// Field array has the wrong length for its element kind
    #[error("Field '{name}' has {actual} values, expected {expected}")]
    FieldLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Named field not present on the phase
    #[error("Field '{name}' not found on phase '{phase}'")]
    UnknownField { name: String, phase: String },

    /// Algorithm configured for a different phase
    #[error("Algorithm is configured for phase '{expected}', got '{actual}'")]
    PhaseMismatch { expected: String, actual: String },

    /// Domain face has no measurable extent
    #[error("Degenerate domain geometry: {message}")]
    DegenerateDomain { message: String },

    // ============ Boundary Condition Errors ============
    /// Boundary values do not match the target pores
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Unknown boundary condition kind or mode keyword
    #[error("Unknown {what} '{name}'")]
    UnknownKeyword { what: &'static str, name: String },

    // ============ Solver Errors ============
    /// Solver name not in the registry
    #[error("Unknown solver '{name}' (expected one of: lu, direct, spsolve, bicgstab, cg, pcg)")]
    UnknownSolver { name: String },

    /// Solve requested before A and b were assembled
    #[error("The {which} has not been built yet")]
    UnsolvedSystem { which: &'static str },

    /// Numerical failure inside the sparse solver
    #[error("Numerical error: {0}")]
    Numerical(#[from] SolverError),

    // ============ Post-processing Errors ============
    /// Derived quantity requested before a successful run
    #[error("The algorithm has not been run yet; '{quantity}' is not available")]
    NotRun { quantity: String },

    /// Effective property requested without Dirichlet conditions
    #[error("No Dirichlet boundary conditions are set; cannot determine inlets and outlets")]
    NoDirichletConditions,

    /// All Dirichlet conditions share one value
    #[error("All Dirichlet conditions have the same value ({value}); inlet and outlet coincide")]
    DegenerateBoundaryValues { value: f64 },

    // ============ I/O Errors ============
    /// Error reading a network description file
    #[error("Failed to read network file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an invalid topology error
    pub fn topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Create a degenerate domain error
    pub fn degenerate_domain(message: impl Into<String>) -> Self {
        Self::DegenerateDomain {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_errors_convert_into_numerical() {
        let err: TransportError = SolverError::SingularMatrix { pivot: 0.0 }.into();
        assert!(matches!(
            err,
            TransportError::Numerical(SolverError::SingularMatrix { .. })
        ));
        assert!(err.to_string().contains("singular"));
    }

    #[test]
    fn test_not_run_message_names_the_quantity() {
        let err = TransportError::NotRun {
            quantity: "pore.pressure".to_string(),
        };
        assert!(err.to_string().contains("pore.pressure"));
    }
}
