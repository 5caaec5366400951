//! Generic steady-state transport algorithm.

use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;
use nalgebra_sparse::csr::CsrMatrix;

use super::bc::{BcKind, BcMode, BcValues, BoundaryConditions};
use super::settings::TransportSettings;
use super::sparse::SparseSolver;
use super::system::LinearSystem;
use crate::error::{Result, TransportError};
use crate::network::{
    check_pores, DomainGeometry, Element, FieldId, NeighborMode, Network, Phase, Topology,
};

/// How [`GenericTransport::rate`] aggregates rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateMode {
    /// One net rate into the whole pore set
    #[default]
    Group,
    /// One rate per pore
    Single,
}

impl FromStr for RateMode {
    type Err = TransportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "group" => Ok(Self::Group),
            "single" => Ok(Self::Single),
            _ => Err(TransportError::UnknownKeyword {
                what: "rate mode",
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateMode::Group => write!(f, "group"),
            RateMode::Single => write!(f, "single"),
        }
    }
}

/// The solved quantity together with the name it is stored under.
#[derive(Debug, Clone, Copy)]
pub struct Results<'a> {
    pub quantity: &'a str,
    pub values: &'a DVector<f64>,
}

/// Steady-state transport on a pore network.
///
/// Owns the network, the phase supplying conductances, the boundary
/// conditions and the assembled system. One linear system is solved per
/// [`run`](Self::run).
#[derive(Debug)]
pub struct GenericTransport<N = Network> {
    network: N,
    phase: Phase,
    settings: TransportSettings,
    /// Conductance field, resolved once
    conductance: FieldId,
    bcs: BoundaryConditions,
    system: LinearSystem,
    solver: Box<dyn SparseSolver>,
    /// Solution of the last successful run
    quantity: Option<DVector<f64>>,
}

impl<N: Topology + DomainGeometry> GenericTransport<N> {
    /// Create an algorithm for `network` and `phase`.
    ///
    /// The phase must carry the configured name and a throat conductance
    /// field under the configured conductance name.
    pub fn new(network: N, phase: Phase, settings: TransportSettings) -> Result<Self> {
        if phase.name() != settings.phase {
            return Err(TransportError::PhaseMismatch {
                expected: settings.phase.clone(),
                actual: phase.name().to_string(),
            });
        }
        if phase.num_pores() != network.num_pores() || phase.num_throats() != network.num_throats()
        {
            return Err(TransportError::validation(format!(
                "phase '{}' is sized for {} pores and {} throats, network has {} and {}",
                phase.name(),
                phase.num_pores(),
                phase.num_throats(),
                network.num_pores(),
                network.num_throats()
            )));
        }

        let conductance = phase.field_id(&settings.conductance)?;
        if conductance.element() != Element::Throat {
            return Err(TransportError::validation(format!(
                "conductance '{}' must be a throat field, found a {} field",
                settings.conductance,
                conductance.element()
            )));
        }
        if settings.quantity == settings.conductance {
            return Err(TransportError::validation(format!(
                "quantity and conductance cannot share the name '{}'",
                settings.quantity
            )));
        }

        let solver = settings.solver.build(settings.iterative());
        let bcs = BoundaryConditions::new(network.num_pores());

        Ok(Self {
            network,
            phase,
            settings,
            conductance,
            bcs,
            system: LinearSystem::new(),
            solver,
            quantity: None,
        })
    }

    // ============ Boundary conditions ============

    /// Apply boundary conditions of `kind` to `pores`.
    pub fn set_bc(
        &mut self,
        pores: &[usize],
        kind: BcKind,
        values: impl Into<BcValues>,
        mode: BcMode,
    ) -> Result<()> {
        self.bcs.set(pores, kind, values, mode)
    }

    /// Fix the quantity at `pores` (merge mode).
    pub fn set_dirichlet_bc(&mut self, pores: &[usize], values: impl Into<BcValues>) -> Result<()> {
        self.set_bc(pores, BcKind::Dirichlet, values, BcMode::Merge)
    }

    /// Fix the net rate at `pores` (merge mode).
    pub fn set_neumann_bc(&mut self, pores: &[usize], values: impl Into<BcValues>) -> Result<()> {
        self.set_bc(pores, BcKind::Neumann, values, BcMode::Merge)
    }

    /// Remove every condition at `pores`, or everywhere when `None`.
    pub fn remove_bc(&mut self, pores: Option<&[usize]>) -> Result<()> {
        self.bcs.remove(pores)
    }

    pub fn bcs(&self) -> &BoundaryConditions {
        &self.bcs
    }

    // ============ Assembly ============

    /// Conductance Laplacian, cached after the first build.
    pub fn build_pure_a(&mut self, force: bool) -> Result<CsrMatrix<f64>> {
        self.system
            .build_pure_a(&self.network, &self.phase, self.conductance, force)
    }

    /// Zero right-hand side, cached after the first build.
    pub fn build_pure_b(&mut self, force: bool) -> DVector<f64> {
        self.system.build_pure_b(self.network.num_pores(), force)
    }

    /// Assemble the working system from the cached pure one and the
    /// current boundary conditions.
    pub fn apply_boundary_conditions(&mut self) -> Result<()> {
        self.system
            .apply_boundary_conditions(&self.network, &self.phase, self.conductance, &self.bcs)
    }

    /// Drop the cached pure system so the next assembly rereads conductance.
    pub fn invalidate(&mut self) {
        self.system.invalidate();
    }

    /// True when conductance changed since the cached `A` was built.
    pub fn is_stale(&self) -> bool {
        self.system.is_stale(&self.phase, self.conductance)
    }

    /// Working system of the last assembly.
    pub fn system(&self) -> &LinearSystem {
        &self.system
    }

    // ============ Solving ============

    /// Solve the assembled working system without storing the result.
    pub fn solve(&self) -> Result<DVector<f64>> {
        let a = self
            .system
            .a()
            .ok_or(TransportError::UnsolvedSystem { which: "A matrix" })?;
        let b = self
            .system
            .b()
            .ok_or(TransportError::UnsolvedSystem { which: "b matrix" })?;
        self.solve_system(a, b)
    }

    /// Solve an explicit system with the configured solver.
    pub fn solve_system(&self, a: &CsrMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
        let (x, stats) = self.solver.solve(a, b)?;
        log::debug!(
            "{} solved {} unknown(s) in {} iteration(s), residual {:.3e}",
            self.solver.name(),
            b.len(),
            stats.iterations,
            stats.residual_norm
        );
        Ok(x)
    }

    /// Assemble, solve, and store the quantity field.
    ///
    /// On failure the previously stored quantity (if any) is left untouched.
    pub fn run(&mut self) -> Result<()> {
        log::info!(
            "running transport of '{}' on phase '{}' ({} pores, {} throats, solver {})",
            self.settings.quantity,
            self.phase.name(),
            self.network.num_pores(),
            self.network.num_throats(),
            self.settings.solver
        );

        self.warn_isolated_pores()?;
        self.apply_boundary_conditions()?;
        let x = self.solve()?;
        self.quantity = Some(x);

        log::info!("transport of '{}' finished", self.settings.quantity);
        Ok(())
    }

    fn warn_isolated_pores(&self) -> Result<()> {
        let all: Vec<usize> = (0..self.network.num_pores()).collect();
        let isolated = self
            .network
            .find_neighbor_throats_per_pore(&all)?
            .iter()
            .zip(&all)
            .filter(|&(throats, &pore)| throats.is_empty() && self.bcs.get(pore).is_none())
            .count();
        if isolated > 0 {
            log::warn!(
                "{} isolated pore(s) without a boundary condition; the system is singular",
                isolated
            );
        }
        Ok(())
    }

    // ============ Results ============

    /// The solved quantity and its name.
    pub fn results(&self) -> Result<Results<'_>> {
        Ok(Results {
            quantity: &self.settings.quantity,
            values: self.stored_quantity()?,
        })
    }

    /// Solved quantity, if `run` has succeeded.
    pub fn quantity(&self) -> Option<&DVector<f64>> {
        self.quantity.as_ref()
    }

    /// Copy the solved quantity into the phase as a pore field.
    pub fn write_results(&mut self) -> Result<FieldId> {
        let values = self.stored_quantity()?.iter().copied().collect();
        self.phase
            .set_pore_field(self.settings.quantity.clone(), values)
    }

    /// Net rate into `pores`.
    ///
    /// Each crossing throat is oriented so `pore1` is inside the set and
    /// contributes `g * (x[pore2] - x[pore1])`. A negative rate means the
    /// quantity leaves the set.
    pub fn rate(&self, pores: &[usize], mode: RateMode) -> Result<Vec<f64>> {
        let x = self.stored_quantity()?;
        check_pores(pores, self.network.num_pores())?;
        let g = self.phase.values(self.conductance);

        match mode {
            RateMode::Group => {
                let mut inside = vec![false; self.network.num_pores()];
                for &p in pores {
                    inside[p] = true;
                }
                let throats = self
                    .network
                    .find_neighbor_throats(pores, NeighborMode::ExclusiveOr)?;
                let rate = self.net_rate(&throats, g, x, |p| inside[p])?;
                Ok(vec![rate])
            }
            RateMode::Single => {
                let per_pore = self.network.find_neighbor_throats_per_pore(pores)?;
                pores
                    .iter()
                    .zip(&per_pore)
                    .map(|(&pore, throats)| self.net_rate(throats, g, x, |p| p == pore))
                    .collect()
            }
        }
    }

    fn net_rate(
        &self,
        throats: &[usize],
        g: &[f64],
        x: &DVector<f64>,
        is_inside: impl Fn(usize) -> bool,
    ) -> Result<f64> {
        let conns = self.network.find_connected_pores(throats)?;
        Ok(throats
            .iter()
            .zip(conns)
            .map(|(&t, [p1, p2])| {
                let (inner, outer) = if is_inside(p1) { (p1, p2) } else { (p2, p1) };
                g[t] * (x[outer] - x[inner])
            })
            .sum())
    }

    /// Effective transport coefficient between the Dirichlet extremes.
    ///
    /// Inlets are the pores held at the largest Dirichlet value, outlets
    /// those at the smallest:
    ///
    /// ```text
    /// D = rate(inlets) * L / (A * (min - max))
    /// ```
    ///
    /// Inflow through the inlets is negative, so `(min - max)` makes the
    /// coefficient positive for physical flow.
    pub fn effective_property(&self) -> Result<f64> {
        self.stored_quantity()?;

        let dirichlet: Vec<(usize, f64)> = self
            .bcs
            .iter()
            .filter(|(_, bc)| bc.kind() == BcKind::Dirichlet)
            .map(|(pore, bc)| (pore, bc.value()))
            .collect();
        if dirichlet.is_empty() {
            return Err(TransportError::NoDirichletConditions);
        }

        let max = dirichlet.iter().map(|&(_, v)| v).fold(f64::MIN, f64::max);
        let min = dirichlet.iter().map(|&(_, v)| v).fold(f64::MAX, f64::min);
        if max == min {
            return Err(TransportError::DegenerateBoundaryValues { value: max });
        }

        let inlets: Vec<usize> = dirichlet
            .iter()
            .filter(|&&(_, v)| v == max)
            .map(|&(p, _)| p)
            .collect();
        let outlets: Vec<usize> = dirichlet
            .iter()
            .filter(|&&(_, v)| v == min)
            .map(|&(p, _)| p)
            .collect();

        let area = self.network.domain_area(&inlets)?;
        let length = self.network.domain_length(&inlets, &outlets)?;
        let flow: f64 = self.rate(&inlets, RateMode::Group)?.iter().sum();

        let coefficient = flow * length / (area * (min - max));
        log::debug!(
            "effective property {:.6e} (rate {:.6e}, area {:.6e}, length {:.6e})",
            coefficient,
            flow,
            area,
            length
        );
        Ok(coefficient)
    }

    // ============ Accessors ============

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Mutable phase access; changed conductances need [`invalidate`](Self::invalidate).
    pub fn phase_mut(&mut self) -> &mut Phase {
        &mut self.phase
    }

    pub fn conductance(&self) -> FieldId {
        self.conductance
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    fn stored_quantity(&self) -> Result<&DVector<f64>> {
        self.quantity.as_ref().ok_or_else(|| TransportError::NotRun {
            quantity: self.settings.quantity.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::SolverError;
    use crate::network::Face;
    use crate::transport::SolverKind;

    fn chain(conductance: &[f64]) -> GenericTransport {
        chain_with(conductance, TransportSettings::default())
    }

    fn chain_with(conductance: &[f64], settings: TransportSettings) -> GenericTransport {
        let n = conductance.len() + 1;
        let coords = (0..n).map(|i| [i as f64, 0.0, 0.0]).collect();
        let conns = (0..n - 1).map(|i| [i, i + 1]).collect();
        let net = Network::new(coords, conns).unwrap().with_spacing([1.0; 3]);
        let mut phase = Phase::for_network(settings.phase.clone(), &net);
        phase
            .set_throat_field(settings.conductance.clone(), conductance.to_vec())
            .unwrap();
        GenericTransport::new(net, phase, settings).unwrap()
    }

    fn cubic(n: usize, spacing: f64, g: f64, settings: TransportSettings) -> GenericTransport {
        let net = Network::cubic([n, n, n], spacing).unwrap();
        let mut phase = Phase::for_network(settings.phase.clone(), &net);
        phase
            .set_throat_field(settings.conductance.clone(), vec![g; net.num_throats()])
            .unwrap();
        GenericTransport::new(net, phase, settings).unwrap()
    }

    fn face(alg: &GenericTransport, face: Face) -> Vec<usize> {
        alg.network().face_pores(face).unwrap().to_vec()
    }

    #[test]
    fn test_three_pore_chain() {
        let mut alg = chain(&[1.0, 1.0]);
        alg.set_dirichlet_bc(&[0], 1.0).unwrap();
        alg.set_dirichlet_bc(&[2], 0.0).unwrap();
        alg.run().unwrap();

        let x = alg.quantity().unwrap();
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(x[2], 0.0);
        assert_relative_eq!(alg.rate(&[0], RateMode::Group).unwrap()[0], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_chain_conserves_flow() {
        let mut alg = chain(&[2.0; 9]);
        alg.set_dirichlet_bc(&[0], 3.0).unwrap();
        alg.set_dirichlet_bc(&[9], 1.0).unwrap();
        alg.run().unwrap();

        let x = alg.quantity().unwrap();
        for i in 0..10 {
            assert_relative_eq!(x[i], 3.0 - 2.0 * i as f64 / 9.0, epsilon = 1e-10);
        }
        let inlet = alg.rate(&[0], RateMode::Group).unwrap()[0];
        let outlet = alg.rate(&[9], RateMode::Group).unwrap()[0];
        assert_relative_eq!(inlet, -outlet, epsilon = 1e-10);

        // Interior pores have no net accumulation
        for rate in alg.rate(&[1, 4, 8], RateMode::Single).unwrap() {
            assert_relative_eq!(rate, 0.0, epsilon = 1e-10);
        }
        // A cut containing an interior segment sees the same flow as the inlet
        let cut = alg.rate(&[0, 1, 2, 3], RateMode::Group).unwrap()[0];
        assert_relative_eq!(cut, inlet, epsilon = 1e-10);
    }

    #[test]
    fn test_dirichlet_values_are_exact() {
        let mut alg = cubic(4, 1.0, 0.7, TransportSettings::default());
        let front = face(&alg, Face::Front);
        let back = face(&alg, Face::Back);
        alg.set_dirichlet_bc(&front, 0.25).unwrap();
        alg.set_dirichlet_bc(&back, -1.5).unwrap();
        alg.run().unwrap();

        let x = alg.quantity().unwrap();
        for &p in &front {
            assert_relative_eq!(x[p], 0.25, epsilon = 1e-14);
        }
        for &p in &back {
            assert_relative_eq!(x[p], -1.5, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_effective_property_of_uniform_lattice() {
        let mut alg = cubic(3, 0.5, 2.0, TransportSettings::default());
        let front = face(&alg, Face::Front);
        let back = face(&alg, Face::Back);
        alg.set_dirichlet_bc(&front, 1.0).unwrap();
        alg.set_dirichlet_bc(&back, 0.0).unwrap();
        alg.run().unwrap();
        assert_relative_eq!(alg.effective_property().unwrap(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_effective_property_of_chain() {
        let mut alg = chain(&[3.0, 3.0, 3.0]);
        alg.set_dirichlet_bc(&[3], 5.0).unwrap();
        alg.set_dirichlet_bc(&[0], 2.0).unwrap();
        alg.run().unwrap();
        assert_relative_eq!(alg.effective_property().unwrap(), 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_post_processing_before_run() {
        let mut alg = chain(&[1.0, 1.0]);
        assert!(matches!(
            alg.rate(&[0], RateMode::Group),
            Err(TransportError::NotRun { .. })
        ));
        assert!(matches!(
            alg.effective_property(),
            Err(TransportError::NotRun { .. })
        ));
        assert!(alg.results().is_err());
        assert!(alg.write_results().is_err());
    }

    #[test]
    fn test_effective_property_needs_two_dirichlet_values() {
        let mut alg = chain(&[1.0, 1.0]);
        alg.set_neumann_bc(&[0], 1.0).unwrap();
        alg.set_dirichlet_bc(&[2], 0.0).unwrap();
        alg.run().unwrap();
        assert!(matches!(
            alg.effective_property(),
            Err(TransportError::DegenerateBoundaryValues { .. })
        ));

        let mut alg = chain(&[1.0, 1.0]);
        alg.set_dirichlet_bc(&[0, 2], 1.0).unwrap();
        alg.run().unwrap();
        alg.remove_bc(None).unwrap();
        assert!(matches!(
            alg.effective_property(),
            Err(TransportError::NoDirichletConditions)
        ));
    }

    #[test]
    fn test_removed_conditions_leave_singular_system() {
        let mut alg = chain(&[1.0, 1.0]);
        alg.set_dirichlet_bc(&[0, 2], vec![1.0, 0.0]).unwrap();
        alg.run().unwrap();
        alg.remove_bc(None).unwrap();
        assert!(alg.bcs().is_empty());

        let err = alg.run().unwrap_err();
        assert!(matches!(
            err,
            TransportError::Numerical(SolverError::SingularMatrix { .. })
        ));
        // The previous solution survives the failed run
        assert_relative_eq!(alg.quantity().unwrap()[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_neumann_inflow() {
        let mut alg = chain(&[1.0, 1.0]);
        alg.set_neumann_bc(&[0], 1.0).unwrap();
        alg.set_dirichlet_bc(&[2], 0.0).unwrap();
        alg.run().unwrap();

        let x = alg.quantity().unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(alg.rate(&[0], RateMode::Group).unwrap()[0], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stale_conductance_needs_invalidate() {
        let mut alg = chain(&[1.0, 1.0]);
        alg.set_dirichlet_bc(&[0], 1.0).unwrap();
        alg.set_dirichlet_bc(&[2], 0.0).unwrap();
        alg.run().unwrap();

        let id = alg.conductance();
        alg.phase_mut().values_mut(id)[0] = 3.0;
        assert!(alg.is_stale());
        alg.run().unwrap();
        assert_relative_eq!(alg.quantity().unwrap()[1], 0.5, epsilon = 1e-12);

        alg.invalidate();
        alg.run().unwrap();
        assert!(!alg.is_stale());
        assert_relative_eq!(alg.quantity().unwrap()[1], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_single_rates_per_pore() {
        let mut alg = chain(&[1.0, 1.0, 1.0]);
        alg.set_dirichlet_bc(&[0], 3.0).unwrap();
        alg.set_dirichlet_bc(&[3], 0.0).unwrap();
        alg.run().unwrap();

        let rates = alg.rate(&[0, 3, 1], RateMode::Single).unwrap();
        assert_eq!(rates.len(), 3);
        assert_relative_eq!(rates[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(rates[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(rates[2], 0.0, epsilon = 1e-12);

        assert_eq!(alg.rate(&[], RateMode::Group).unwrap(), vec![0.0]);
        assert!(alg.rate(&[], RateMode::Single).unwrap().is_empty());
        assert!(matches!(
            alg.rate(&[7], RateMode::Group),
            Err(TransportError::PoreOutOfRange { .. })
        ));
    }

    #[test]
    fn test_iterative_solver_matches_direct() {
        let settings = TransportSettings::new().with_solver(SolverKind::BiCgStab);
        let mut iterative = cubic(4, 1.0, 1.5, settings);
        let mut direct = cubic(4, 1.0, 1.5, TransportSettings::default());
        for alg in [&mut iterative, &mut direct] {
            let left = face(alg, Face::Left);
            let right = face(alg, Face::Right);
            alg.set_dirichlet_bc(&left, 2.0).unwrap();
            alg.set_dirichlet_bc(&right, 1.0).unwrap();
            alg.run().unwrap();
        }

        let a = iterative.quantity().unwrap();
        let b = direct.quantity().unwrap();
        for i in 0..a.len() {
            assert_relative_eq!(a[i], b[i], epsilon = 1e-8);
        }
    }

    #[test]
    fn test_physically_sized_conductances() {
        for g in [1e-15, 1e-18] {
            let mut alg = chain(&[g, g]);
            alg.set_dirichlet_bc(&[0, 2], vec![1.0, 0.0]).unwrap();
            alg.run().unwrap();
            assert_relative_eq!(alg.quantity().unwrap()[1], 0.5, epsilon = 1e-12);
            assert_relative_eq!(
                alg.rate(&[0], RateMode::Group).unwrap()[0],
                -0.5 * g,
                max_relative = 1e-10
            );
        }
    }

    #[test]
    fn test_solution_ignores_uniform_conductance_scaling() {
        let conductance = [1.0, 2.0, 0.5, 1.0];
        for kind in [SolverKind::Lu, SolverKind::BiCgStab] {
            let mut solved = Vec::new();
            for scale in [1.0, 1e-16] {
                let g: Vec<f64> = conductance.iter().map(|g| g * scale).collect();
                let mut alg = chain_with(&g, TransportSettings::new().with_solver(kind));
                alg.set_dirichlet_bc(&[0, 4], vec![1.0, 0.0]).unwrap();
                alg.run().unwrap();
                let rate = alg.rate(&[0], RateMode::Group).unwrap()[0];
                solved.push((alg.quantity().unwrap().clone(), rate));
            }

            let (x, rate) = &solved[0];
            let (x_small, rate_small) = &solved[1];
            for i in 0..x.len() {
                assert_relative_eq!(x[i], x_small[i], epsilon = 1e-8);
            }
            assert_relative_eq!(*rate_small, rate * 1e-16, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_solve_before_assembly() {
        let alg = chain(&[1.0]);
        assert!(matches!(
            alg.solve(),
            Err(TransportError::UnsolvedSystem { which: "A matrix" })
        ));
    }

    #[test]
    fn test_write_results_to_phase() {
        let settings = TransportSettings::new().with_quantity("pore.pressure");
        let mut alg = cubic(2, 1.0, 1.0, settings);
        let top = face(&alg, Face::Top);
        let bottom = face(&alg, Face::Bottom);
        alg.set_dirichlet_bc(&top, 1.0).unwrap();
        alg.set_dirichlet_bc(&bottom, 0.0).unwrap();
        alg.run().unwrap();

        assert_eq!(alg.results().unwrap().quantity, "pore.pressure");
        let id = alg.write_results().unwrap();
        assert_eq!(id.element(), Element::Pore);
        assert_eq!(alg.phase().get("pore.pressure").unwrap().len(), 8);
    }

    #[test]
    fn test_construction_checks() {
        let net = Network::cubic([2, 1, 1], 1.0).unwrap();
        let mut phase = Phase::for_network("water", &net);
        phase.set_throat_field("throat.conductance", vec![1.0]).unwrap();

        let err = GenericTransport::new(net.clone(), phase.clone(), TransportSettings::default())
            .unwrap_err();
        assert!(matches!(err, TransportError::PhaseMismatch { .. }));

        let settings = TransportSettings::new()
            .with_phase("water")
            .with_conductance("throat.diffusive_conductance");
        let err = GenericTransport::new(net.clone(), phase.clone(), settings).unwrap_err();
        assert!(matches!(err, TransportError::UnknownField { .. }));

        phase.set_pore_field("pore.g", vec![1.0, 1.0]).unwrap();
        let settings = TransportSettings::new()
            .with_phase("water")
            .with_conductance("pore.g");
        assert!(GenericTransport::new(net, phase, settings).is_err());
    }

    #[test]
    fn test_rate_mode_names() {
        assert_eq!("Group".parse::<RateMode>().unwrap(), RateMode::Group);
        assert_eq!("single".parse::<RateMode>().unwrap(), RateMode::Single);
        assert!("each".parse::<RateMode>().is_err());
    }
}
