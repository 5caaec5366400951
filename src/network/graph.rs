//! Pore network graph structure.

use std::collections::HashMap;

use nalgebra_sparse::coo::CooMatrix;

use super::topology::{DomainGeometry, Topology};
use super::types::{Face, NeighborMode};
use super::validate::{check_pores, check_throats, validate_connections};
use crate::error::{Result, TransportError};

/// A pore network: pore coordinates plus throat connections.
#[derive(Debug, Clone)]
pub struct Network {
    /// Pore centre coordinates
    coords: Vec<[f64; 3]>,

    /// Pore pairs joined by each throat
    conns: Vec<[usize; 2]>,

    /// Lattice spacing per axis (zero when the network is irregular)
    spacing: [f64; 3],

    /// Named pore sets (cubic faces, user labels)
    labels: HashMap<String, Vec<usize>>,

    /// Throats incident to each pore
    incidence: Vec<Vec<usize>>,
}

impl Network {
    /// Build a network from coordinates and throat connections.
    pub fn new(coords: Vec<[f64; 3]>, conns: Vec<[usize; 2]>) -> Result<Self> {
        validate_connections(coords.len(), &conns)?;

        let mut incidence = vec![Vec::new(); coords.len()];
        for (t, &[p1, p2]) in conns.iter().enumerate() {
            incidence[p1].push(t);
            incidence[p2].push(t);
        }

        Ok(Self {
            coords,
            conns,
            spacing: [0.0; 3],
            labels: HashMap::new(),
            incidence,
        })
    }

    /// Generate a simple cubic lattice of `shape[0] × shape[1] × shape[2]`
    /// pores, `spacing` apart, with the six boundary faces labelled.
    ///
    /// Pores are numbered x-fastest. Throats are listed x-direction first,
    /// then y, then z.
    pub fn cubic(shape: [usize; 3], spacing: f64) -> Result<Self> {
        if shape.iter().any(|&n| n == 0) {
            return Err(TransportError::topology(format!(
                "cubic shape must be positive in every direction, got {:?}",
                shape
            )));
        }
        if !(spacing > 0.0) {
            return Err(TransportError::topology(format!(
                "lattice spacing must be positive, got {}",
                spacing
            )));
        }

        let [nx, ny, nz] = shape;
        let index = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);

        let mut coords = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    coords.push([
                        (i as f64 + 0.5) * spacing,
                        (j as f64 + 0.5) * spacing,
                        (k as f64 + 0.5) * spacing,
                    ]);
                }
            }
        }

        let mut conns = Vec::new();
        for axis in 0..3 {
            for k in 0..nz {
                for j in 0..ny {
                    for i in 0..nx {
                        let next = match axis {
                            0 if i + 1 < nx => Some(index(i + 1, j, k)),
                            1 if j + 1 < ny => Some(index(i, j + 1, k)),
                            2 if k + 1 < nz => Some(index(i, j, k + 1)),
                            _ => None,
                        };
                        if let Some(other) = next {
                            conns.push([index(i, j, k), other]);
                        }
                    }
                }
            }
        }

        let mut network = Self::new(coords, conns)?;
        network.spacing = [spacing; 3];

        for face in Face::ALL {
            let axis = face.axis();
            let target = if face.is_min() { 0 } else { shape[axis] - 1 };
            let mut pores = Vec::new();
            for k in 0..nz {
                for j in 0..ny {
                    for i in 0..nx {
                        if [i, j, k][axis] == target {
                            pores.push(index(i, j, k));
                        }
                    }
                }
            }
            network.labels.insert(face.label().to_string(), pores);
        }

        Ok(network)
    }

    /// Set the lattice spacing used for face areas.
    pub fn with_spacing(mut self, spacing: [f64; 3]) -> Self {
        self.spacing = spacing;
        self
    }

    /// Lattice spacing per axis.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Pore coordinates.
    pub fn coords(&self) -> &[[f64; 3]] {
        &self.coords
    }

    /// Throat connections.
    pub fn conns(&self) -> &[[usize; 2]] {
        &self.conns
    }

    /// Attach a label to a set of pores, replacing any previous set.
    pub fn set_label(&mut self, name: impl Into<String>, pores: Vec<usize>) -> Result<()> {
        check_pores(&pores, self.coords.len())?;
        self.labels.insert(name.into(), pores);
        Ok(())
    }

    /// Pores carrying a label.
    pub fn pores(&self, label: &str) -> Option<&[usize]> {
        self.labels.get(label).map(Vec::as_slice)
    }

    /// Pores on a cubic boundary face.
    pub fn face_pores(&self, face: Face) -> Option<&[usize]> {
        self.pores(face.label())
    }

    /// Pores without any throat.
    pub fn isolated_pores(&self) -> Vec<usize> {
        self.incidence
            .iter()
            .enumerate()
            .filter(|(_, throats)| throats.is_empty())
            .map(|(p, _)| p)
            .collect()
    }

    fn centroid(&self, pores: &[usize]) -> [f64; 3] {
        let mut c = [0.0; 3];
        for &p in pores {
            for (axis, value) in c.iter_mut().enumerate() {
                *value += self.coords[p][axis];
            }
        }
        let n = pores.len() as f64;
        c.map(|v| v / n)
    }

    fn extent(&self, pores: &[usize]) -> [f64; 3] {
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for &p in pores {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(self.coords[p][axis]);
                hi[axis] = hi[axis].max(self.coords[p][axis]);
            }
        }
        [hi[0] - lo[0], hi[1] - lo[1], hi[2] - lo[2]]
    }
}

impl Topology for Network {
    fn num_pores(&self) -> usize {
        self.coords.len()
    }

    fn num_throats(&self) -> usize {
        self.conns.len()
    }

    fn create_adjacency_matrix(&self, weights: &[f64]) -> Result<CooMatrix<f64>> {
        if weights.len() != self.conns.len() {
            return Err(TransportError::FieldLength {
                name: "adjacency weights".to_string(),
                expected: self.conns.len(),
                actual: weights.len(),
            });
        }

        let n = self.coords.len();
        let mut adjacency = CooMatrix::new(n, n);
        for (&[p1, p2], &w) in self.conns.iter().zip(weights) {
            adjacency.push(p1, p2, w);
            adjacency.push(p2, p1, w);
        }
        Ok(adjacency)
    }

    fn find_neighbor_throats(&self, pores: &[usize], mode: NeighborMode) -> Result<Vec<usize>> {
        check_pores(pores, self.coords.len())?;

        let mut inside = vec![false; self.coords.len()];
        for &p in pores {
            inside[p] = true;
        }

        let mut candidates: Vec<usize> = pores
            .iter()
            .flat_map(|&p| self.incidence[p].iter().copied())
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        Ok(candidates
            .into_iter()
            .filter(|&t| {
                let [p1, p2] = self.conns[t];
                let ends = inside[p1] as u8 + inside[p2] as u8;
                match mode {
                    NeighborMode::Union => ends >= 1,
                    NeighborMode::Intersection => ends == 2,
                    NeighborMode::ExclusiveOr => ends == 1,
                }
            })
            .collect())
    }

    fn find_neighbor_throats_per_pore(&self, pores: &[usize]) -> Result<Vec<Vec<usize>>> {
        check_pores(pores, self.coords.len())?;
        Ok(pores.iter().map(|&p| self.incidence[p].clone()).collect())
    }

    fn find_connected_pores(&self, throats: &[usize]) -> Result<Vec<[usize; 2]>> {
        check_throats(throats, self.conns.len())?;
        Ok(throats.iter().map(|&t| self.conns[t]).collect())
    }
}

impl DomainGeometry for Network {
    /// Area of the bounding rectangle of the face, padded by half a lattice
    /// spacing on each side.
    ///
    /// The face normal is taken as the axis along which the face pores are
    /// flattest.
    fn domain_area(&self, face: &[usize]) -> Result<f64> {
        if face.is_empty() {
            return Err(TransportError::degenerate_domain("face has no pores"));
        }
        check_pores(face, self.coords.len())?;

        let extent = self.extent(face);
        let normal = (0..3)
            .min_by(|&a, &b| extent[a].total_cmp(&extent[b]))
            .unwrap_or(0);

        let area: f64 = (0..3)
            .filter(|&axis| axis != normal)
            .map(|axis| extent[axis] + self.spacing[axis])
            .product();

        if area > 0.0 {
            Ok(area)
        } else {
            Err(TransportError::degenerate_domain(format!(
                "face of {} pore(s) has zero area; set a lattice spacing",
                face.len()
            )))
        }
    }

    /// Centroid separation along the axis where the faces are furthest apart.
    fn domain_length(&self, face_1: &[usize], face_2: &[usize]) -> Result<f64> {
        if face_1.is_empty() || face_2.is_empty() {
            return Err(TransportError::degenerate_domain("face has no pores"));
        }
        check_pores(face_1, self.coords.len())?;
        check_pores(face_2, self.coords.len())?;

        let c1 = self.centroid(face_1);
        let c2 = self.centroid(face_2);
        let length = (0..3)
            .map(|axis| (c2[axis] - c1[axis]).abs())
            .fold(0.0, f64::max);

        if length > 0.0 {
            Ok(length)
        } else {
            Err(TransportError::degenerate_domain(
                "inlet and outlet faces coincide",
            ))
        }
    }
}
