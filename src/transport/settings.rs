//! Algorithm configuration.

use super::sparse::{IterativeConfig, SolverKind};
use super::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::error::Result;

/// Configuration for a transport algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSettings {
    /// Name of the phase conductances are read from.
    pub phase: String,
    /// Name of the throat conductance field.
    pub conductance: String,
    /// Name the solved pore field is stored under.
    pub quantity: String,
    /// Sparse solver used by `run`.
    pub solver: SolverKind,
    /// Iteration budget for iterative solvers.
    pub max_iterations: usize,
    /// Relative residual tolerance for iterative solvers.
    pub tolerance: f64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            phase: "phase".to_string(),
            conductance: "throat.conductance".to_string(),
            quantity: "pore.quantity".to_string(),
            solver: SolverKind::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl TransportSettings {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the phase name.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Set the conductance field name.
    pub fn with_conductance(mut self, conductance: impl Into<String>) -> Self {
        self.conductance = conductance.into();
        self
    }

    /// Set the quantity field name (e.g. `"pore.pressure"`).
    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = quantity.into();
        self
    }

    /// Select the solver.
    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Select the solver by name; unknown names fail here, not at `run`.
    pub fn with_solver_name(mut self, name: &str) -> Result<Self> {
        self.solver = name.parse()?;
        Ok(self)
    }

    /// Set the iteration budget for iterative solvers.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the relative (Jacobi-scaled) residual tolerance for iterative solvers.
    ///
    /// - 1e-10 (default): effectively exact for well-conditioned networks
    /// - 1e-6: enough for rate and effective-property estimates
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Stopping rule handed to iterative solvers.
    pub fn iterative(&self) -> IterativeConfig {
        IterativeConfig {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let settings = TransportSettings::new()
            .with_phase("air")
            .with_quantity("pore.concentration")
            .with_solver_name("bicgstab")
            .unwrap()
            .with_tolerance(1e-6);
        assert_eq!(settings.phase, "air");
        assert_eq!(settings.quantity, "pore.concentration");
        assert_eq!(settings.solver, SolverKind::BiCgStab);
        assert_eq!(settings.iterative().tolerance, 1e-6);
    }

    #[test]
    fn test_unknown_solver_fails_at_configuration() {
        assert!(TransportSettings::new().with_solver_name("umfpack").is_err());
    }
}
