//! Contracts the transport algorithm needs from a network.

use nalgebra_sparse::coo::CooMatrix;

use super::types::NeighborMode;
use crate::error::Result;

/// Connectivity queries over pores and throats.
///
/// Pores and throats are dense indices in `[0, num_pores)` and
/// `[0, num_throats)`. Every throat joins two distinct pores.
pub trait Topology {
    /// Number of pores.
    fn num_pores(&self) -> usize;

    /// Number of throats.
    fn num_throats(&self) -> usize;

    /// Symmetric weighted adjacency matrix.
    ///
    /// Entry `(i, j)` and `(j, i)` each receive the weight of every throat
    /// joining `i` and `j`; parallel throats appear as duplicate entries
    /// that sum on conversion to a compressed format.
    fn create_adjacency_matrix(&self, weights: &[f64]) -> Result<CooMatrix<f64>>;

    /// Throats adjacent to a pore set, flattened and sorted.
    fn find_neighbor_throats(&self, pores: &[usize], mode: NeighborMode) -> Result<Vec<usize>>;

    /// Throats incident to each pore, one list per input pore.
    fn find_neighbor_throats_per_pore(&self, pores: &[usize]) -> Result<Vec<Vec<usize>>>;

    /// The two pores joined by each throat.
    fn find_connected_pores(&self, throats: &[usize]) -> Result<Vec<[usize; 2]>>;
}

/// Geometric extent of the domain spanned by a network.
pub trait DomainGeometry {
    /// Cross-sectional area of the face formed by `face` pores.
    fn domain_area(&self, face: &[usize]) -> Result<f64>;

    /// Distance between two faces.
    fn domain_length(&self, face_1: &[usize], face_2: &[usize]) -> Result<f64>;
}
