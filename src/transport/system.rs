//! Linear system assembly.
//!
//! The "pure" system is the conductance-weighted graph Laplacian `A` and a
//! zero right-hand side `b`. Both are built lazily and cached; the cache is
//! only dropped by an explicit `force` or [`LinearSystem::invalidate`].
//! Changing conductance values on the phase does not rebuild the cache,
//! it only makes [`LinearSystem::is_stale`] report true.
//!
//! The working system is copied from the pure one on every assembly and then
//! receives the boundary conditions:
//!
//! ```text
//! Neumann pore k:    b[k] = rate
//! Dirichlet pore k:  b[k] = value,  A[k, :] = 0,  A[k, k] = 1
//! ```

use nalgebra::DVector;
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csr::CsrMatrix;

use super::bc::{BcKind, BoundaryConditions};
use crate::error::Result;
use crate::network::{FieldId, Phase, Topology};

/// Weighted graph Laplacian of a symmetric adjacency matrix.
///
/// Off-diagonals are the negated weights, the diagonal holds the row sums
/// of the adjacency. Duplicate entries are summed.
pub fn laplacian(adjacency: &CooMatrix<f64>) -> CsrMatrix<f64> {
    let n = adjacency.nrows();
    let mut coo = CooMatrix::new(n, n);
    for (i, j, &w) in adjacency.triplet_iter() {
        coo.push(i, j, -w);
        coo.push(i, i, w);
    }
    CsrMatrix::from(&coo)
}

/// Cached pure system plus the working copy of the last assembly.
#[derive(Debug, Clone, Default)]
pub struct LinearSystem {
    pure_a: Option<CsrMatrix<f64>>,
    pure_b: Option<DVector<f64>>,
    /// Conductance generation the cached `pure_a` was built from
    built_from: Option<u64>,
    a: Option<CsrMatrix<f64>>,
    b: Option<DVector<f64>>,
}

impl LinearSystem {
    /// Create an empty system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Conductance Laplacian, built on first use or when `force` is set.
    ///
    /// Returns an owned copy; the cache itself is never handed out mutably.
    pub fn build_pure_a<T: Topology + ?Sized>(
        &mut self,
        network: &T,
        phase: &Phase,
        conductance: FieldId,
        force: bool,
    ) -> Result<CsrMatrix<f64>> {
        if force {
            self.pure_a = None;
        }

        match &self.pure_a {
            Some(cached) => {
                if self.is_stale(phase, conductance) {
                    log::warn!(
                        "conductance on phase '{}' changed since A was built; \
                         call invalidate() or build with force to pick it up",
                        phase.name()
                    );
                }
                Ok(cached.clone())
            }
            None => {
                let adjacency = network.create_adjacency_matrix(phase.values(conductance))?;
                let a = laplacian(&adjacency);
                log::debug!(
                    "built pure A: {}x{} with {} non-zeros",
                    a.nrows(),
                    a.ncols(),
                    a.nnz()
                );
                self.built_from = Some(phase.generation(conductance));
                self.pure_a = Some(a.clone());
                Ok(a)
            }
        }
    }

    /// Zero right-hand side, built on first use or when `force` is set.
    pub fn build_pure_b(&mut self, num_pores: usize, force: bool) -> DVector<f64> {
        if force {
            self.pure_b = None;
        }
        self.pure_b
            .get_or_insert_with(|| DVector::zeros(num_pores))
            .clone()
    }

    /// Assemble the working system from the pure one and the boundary
    /// conditions.
    pub fn apply_boundary_conditions<T: Topology + ?Sized>(
        &mut self,
        network: &T,
        phase: &Phase,
        conductance: FieldId,
        bcs: &BoundaryConditions,
    ) -> Result<()> {
        let mut a = self.build_pure_a(network, phase, conductance, false)?;
        let mut b = self.build_pure_b(network.num_pores(), false);

        let mut dirichlet = vec![false; network.num_pores()];
        for (pore, bc) in bcs.iter() {
            b[pore] = bc.value();
            if bc.kind() == BcKind::Dirichlet {
                dirichlet[pore] = true;
            }
        }

        let num_dirichlet = dirichlet.iter().filter(|&&d| d).count();
        if num_dirichlet > 0 {
            a = eliminate_rows(&a, &dirichlet);
        }

        log::debug!(
            "applied {} Dirichlet and {} Neumann condition(s)",
            num_dirichlet,
            bcs.count(BcKind::Neumann)
        );

        self.a = Some(a);
        self.b = Some(b);
        Ok(())
    }

    /// Drop the cached pure system.
    pub fn invalidate(&mut self) {
        self.pure_a = None;
        self.pure_b = None;
        self.built_from = None;
    }

    /// True when the cached `A` predates the last write to the conductance.
    pub fn is_stale(&self, phase: &Phase, conductance: FieldId) -> bool {
        match self.built_from {
            Some(generation) => generation != phase.generation(conductance),
            None => false,
        }
    }

    /// True when a pure `A` is cached.
    pub fn is_cached(&self) -> bool {
        self.pure_a.is_some()
    }

    /// Working matrix of the last assembly.
    pub fn a(&self) -> Option<&CsrMatrix<f64>> {
        self.a.as_ref()
    }

    /// Working right-hand side of the last assembly.
    pub fn b(&self) -> Option<&DVector<f64>> {
        self.b.as_ref()
    }
}

/// Replace the flagged rows with unit rows and drop explicit zeros.
fn eliminate_rows(a: &CsrMatrix<f64>, rows: &[bool]) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(a.nrows(), a.ncols());
    for (i, j, &v) in a.triplet_iter() {
        if !rows[i] && v != 0.0 {
            coo.push(i, j, v);
        }
    }
    for (k, _) in rows.iter().enumerate().filter(|&(_, &flag)| flag) {
        coo.push(k, k, 1.0);
    }
    CsrMatrix::from(&coo)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::network::Network;
    use crate::transport::bc::BcMode;

    fn entry(a: &CsrMatrix<f64>, i: usize, j: usize) -> f64 {
        a.triplet_iter()
            .filter(|&(r, c, _)| r == i && c == j)
            .map(|(_, _, v)| *v)
            .sum()
    }

    fn setup() -> (Network, Phase, FieldId) {
        let net = Network::cubic([3, 2, 2], 1.0).unwrap();
        let mut phase = Phase::for_network("water", &net);
        let g: Vec<f64> = (0..net.num_throats()).map(|t| 1.0 + t as f64).collect();
        let id = phase.set_throat_field("throat.conductance", g).unwrap();
        (net, phase, id)
    }

    #[test]
    fn test_laplacian_is_symmetric_with_zero_row_sums() {
        let (net, phase, id) = setup();
        let mut system = LinearSystem::new();
        let a = system.build_pure_a(&net, &phase, id, false).unwrap();
        let n = net.num_pores();
        for i in 0..n {
            let row_sum: f64 = (0..n).map(|j| entry(&a, i, j)).sum();
            assert_relative_eq!(row_sum, 0.0, epsilon = 1e-12);
            for j in 0..n {
                assert_relative_eq!(entry(&a, i, j), entry(&a, j, i));
            }
        }
    }

    #[test]
    fn test_laplacian_entries() {
        let net = Network::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            vec![[0, 1], [1, 2]],
        )
        .unwrap();
        let a = laplacian(&net.create_adjacency_matrix(&[2.0, 3.0]).unwrap());
        assert_relative_eq!(entry(&a, 0, 0), 2.0);
        assert_relative_eq!(entry(&a, 1, 1), 5.0);
        assert_relative_eq!(entry(&a, 1, 2), -3.0);
        assert_relative_eq!(entry(&a, 0, 2), 0.0);
    }

    #[test]
    fn test_pure_b_is_zero() {
        let mut system = LinearSystem::new();
        let b = system.build_pure_b(4, false);
        assert_eq!(b.len(), 4);
        assert!(b.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_dirichlet_row_becomes_unit_row() {
        let (net, phase, id) = setup();
        let mut bcs = BoundaryConditions::new(net.num_pores());
        bcs.set(&[4], BcKind::Dirichlet, 3.5, BcMode::Merge).unwrap();

        let mut system = LinearSystem::new();
        system
            .apply_boundary_conditions(&net, &phase, id, &bcs)
            .unwrap();
        let a = system.a().unwrap().clone();
        assert_eq!(system.b().unwrap()[4], 3.5);

        let row = a.row(4);
        assert_eq!(row.col_indices(), &[4]);
        assert_eq!(row.values(), &[1.0]);
        // Columns of other rows are untouched
        let pure = system.build_pure_a(&net, &phase, id, false).unwrap();
        assert_relative_eq!(entry(&a, 3, 4), entry(&pure, 3, 4));
    }

    #[test]
    fn test_neumann_overwrites_b() {
        let (net, phase, id) = setup();
        let mut bcs = BoundaryConditions::new(net.num_pores());
        bcs.set(&[0, 1], BcKind::Neumann, vec![0.25, -0.5], BcMode::Merge)
            .unwrap();
        let mut system = LinearSystem::new();
        system
            .apply_boundary_conditions(&net, &phase, id, &bcs)
            .unwrap();
        let b = system.b().unwrap().clone();
        assert_eq!(b[0], 0.25);
        assert_eq!(b[1], -0.5);
        let working_nnz = system.a().unwrap().nnz();
        let pure = system.build_pure_a(&net, &phase, id, false).unwrap();
        assert_eq!(working_nnz, pure.nnz());
    }

    #[test]
    fn test_cache_is_not_mutated_by_assembly() {
        let (net, phase, id) = setup();
        let mut system = LinearSystem::new();
        let before = system.build_pure_a(&net, &phase, id, false).unwrap();
        let mut bcs = BoundaryConditions::new(net.num_pores());
        bcs.set(&[0], BcKind::Dirichlet, 1.0, BcMode::Merge).unwrap();
        system
            .apply_boundary_conditions(&net, &phase, id, &bcs)
            .unwrap();
        let after = system.build_pure_a(&net, &phase, id, false).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_stale_cache_needs_explicit_invalidation() {
        let (net, mut phase, id) = setup();
        let mut system = LinearSystem::new();
        let first = system.build_pure_a(&net, &phase, id, false).unwrap();

        phase.values_mut(id).iter_mut().for_each(|g| *g *= 2.0);
        assert!(system.is_stale(&phase, id));
        let cached = system.build_pure_a(&net, &phase, id, false).unwrap();
        assert_eq!(first, cached);

        system.invalidate();
        let rebuilt = system.build_pure_a(&net, &phase, id, false).unwrap();
        assert_relative_eq!(entry(&rebuilt, 0, 0), 2.0 * entry(&first, 0, 0));
        assert!(!system.is_stale(&phase, id));

        phase.values_mut(id)[0] = 0.0;
        let forced = system.build_pure_a(&net, &phase, id, true).unwrap();
        assert!(entry(&forced, 0, 0) < entry(&rebuilt, 0, 0));
    }
}
