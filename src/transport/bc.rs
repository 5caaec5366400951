//! Boundary condition store.
//!
//! Each pore holds at most one [`BoundaryCondition`]. Setting a condition
//! of either kind on a pore replaces whatever the pore held before, so a
//! pore can never be fixed-value and fixed-rate at the same time.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TransportError};
use crate::network::check_pores;

/// A constraint on one pore.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCondition {
    /// Fixed quantity value
    Dirichlet(f64),
    /// Fixed rate of the quantity into the pore
    Neumann(f64),
}

impl BoundaryCondition {
    /// Kind of this condition.
    pub fn kind(&self) -> BcKind {
        match self {
            BoundaryCondition::Dirichlet(_) => BcKind::Dirichlet,
            BoundaryCondition::Neumann(_) => BcKind::Neumann,
        }
    }

    /// Prescribed value.
    pub fn value(&self) -> f64 {
        match *self {
            BoundaryCondition::Dirichlet(v) | BoundaryCondition::Neumann(v) => v,
        }
    }
}

/// Boundary condition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BcKind {
    Dirichlet,
    Neumann,
}

impl BcKind {
    /// Build a condition of this kind.
    pub fn with_value(self, value: f64) -> BoundaryCondition {
        match self {
            BcKind::Dirichlet => BoundaryCondition::Dirichlet(value),
            BcKind::Neumann => BoundaryCondition::Neumann(value),
        }
    }
}

impl FromStr for BcKind {
    type Err = TransportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dirichlet" => Ok(Self::Dirichlet),
            "neumann" => Ok(Self::Neumann),
            _ => Err(TransportError::UnknownKeyword {
                what: "boundary condition type",
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for BcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BcKind::Dirichlet => write!(f, "dirichlet"),
            BcKind::Neumann => write!(f, "neumann"),
        }
    }
}

/// How [`BoundaryConditions::set`] combines new conditions with existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BcMode {
    /// Add to existing conditions
    #[default]
    Merge,
    /// Clear every condition of the kind first
    Overwrite,
    /// Clear conditions of the kind at the given pores
    Remove,
}

impl FromStr for BcMode {
    type Err = TransportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "overwrite" => Ok(Self::Overwrite),
            "remove" => Ok(Self::Remove),
            _ => Err(TransportError::UnknownKeyword {
                what: "boundary condition mode",
                name: s.to_string(),
            }),
        }
    }
}

/// Boundary values: one value for all pores, or one per pore.
#[derive(Debug, Clone, PartialEq)]
pub enum BcValues {
    Scalar(f64),
    PerPore(Vec<f64>),
}

impl BcValues {
    /// Expand to exactly `count` values.
    ///
    /// A one-element vector broadcasts like a scalar.
    fn expand(self, count: usize) -> Result<Vec<f64>> {
        match self {
            BcValues::Scalar(v) => Ok(vec![v; count]),
            BcValues::PerPore(values) if values.len() == 1 => Ok(vec![values[0]; count]),
            BcValues::PerPore(values) if values.len() == count => Ok(values),
            BcValues::PerPore(values) => Err(TransportError::validation(format!(
                "the number of boundary values ({}) must match the number of locations ({})",
                values.len(),
                count
            ))),
        }
    }
}

impl From<f64> for BcValues {
    fn from(value: f64) -> Self {
        BcValues::Scalar(value)
    }
}

impl From<Vec<f64>> for BcValues {
    fn from(values: Vec<f64>) -> Self {
        BcValues::PerPore(values)
    }
}

impl From<&[f64]> for BcValues {
    fn from(values: &[f64]) -> Self {
        BcValues::PerPore(values.to_vec())
    }
}

/// Per-pore boundary conditions for one network.
#[derive(Debug, Clone)]
pub struct BoundaryConditions {
    num_pores: usize,
    /// Allocated on first write
    conditions: Vec<Option<BoundaryCondition>>,
}

impl BoundaryConditions {
    /// Create an empty store for `num_pores` pores.
    pub fn new(num_pores: usize) -> Self {
        Self {
            num_pores,
            conditions: Vec::new(),
        }
    }

    /// Apply a condition of `kind` to `pores`.
    ///
    /// NaN values clear the condition at that pore.
    pub fn set(
        &mut self,
        pores: &[usize],
        kind: BcKind,
        values: impl Into<BcValues>,
        mode: BcMode,
    ) -> Result<()> {
        check_pores(pores, self.num_pores)?;

        if mode == BcMode::Remove {
            self.clear_kind_at(pores, kind);
            return Ok(());
        }

        let values = values.into().expand(pores.len())?;
        self.ensure_allocated();

        if mode == BcMode::Overwrite {
            for slot in &mut self.conditions {
                if slot.is_some_and(|bc| bc.kind() == kind) {
                    *slot = None;
                }
            }
        }

        for (&pore, &value) in pores.iter().zip(&values) {
            let slot = &mut self.conditions[pore];
            if value.is_nan() {
                *slot = None;
                continue;
            }
            if let Some(previous) = *slot {
                if previous.kind() != kind {
                    log::warn!(
                        "pore {} had a {} condition; replacing it with {}",
                        pore,
                        previous.kind(),
                        kind
                    );
                }
            }
            *slot = Some(kind.with_value(value));
        }

        log::debug!("set {} {} condition(s) ({:?})", pores.len(), kind, mode);
        Ok(())
    }

    /// Clear every condition at `pores`, or everywhere when `None`.
    pub fn remove(&mut self, pores: Option<&[usize]>) -> Result<()> {
        match pores {
            None => self.conditions.clear(),
            Some(pores) => {
                check_pores(pores, self.num_pores)?;
                if !self.conditions.is_empty() {
                    for &pore in pores {
                        self.conditions[pore] = None;
                    }
                }
            }
        }
        Ok(())
    }

    /// Condition at one pore.
    pub fn get(&self, pore: usize) -> Option<BoundaryCondition> {
        self.conditions.get(pore).copied().flatten()
    }

    /// All conditions in pore order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, BoundaryCondition)> + '_ {
        self.conditions
            .iter()
            .enumerate()
            .filter_map(|(pore, bc)| bc.map(|bc| (pore, bc)))
    }

    /// Pores carrying a condition of `kind`.
    pub fn pores(&self, kind: BcKind) -> Vec<usize> {
        self.iter()
            .filter(|(_, bc)| bc.kind() == kind)
            .map(|(pore, _)| pore)
            .collect()
    }

    /// Flag array for `kind`, one entry per pore.
    pub fn flags(&self, kind: BcKind) -> Vec<bool> {
        (0..self.num_pores)
            .map(|pore| self.get(pore).is_some_and(|bc| bc.kind() == kind))
            .collect()
    }

    /// Value array for `kind`, NaN where the pore has no such condition.
    pub fn values(&self, kind: BcKind) -> Vec<f64> {
        (0..self.num_pores)
            .map(|pore| match self.get(pore) {
                Some(bc) if bc.kind() == kind => bc.value(),
                _ => f64::NAN,
            })
            .collect()
    }

    /// Number of conditions of `kind`.
    pub fn count(&self, kind: BcKind) -> usize {
        self.iter().filter(|(_, bc)| bc.kind() == kind).count()
    }

    /// True when no pore carries a condition.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Number of pores the store covers.
    pub fn num_pores(&self) -> usize {
        self.num_pores
    }

    fn ensure_allocated(&mut self) {
        if self.conditions.len() != self.num_pores {
            self.conditions.resize(self.num_pores, None);
        }
    }

    fn clear_kind_at(&mut self, pores: &[usize], kind: BcKind) {
        if self.conditions.is_empty() {
            return;
        }
        for &pore in pores {
            if self.conditions[pore].is_some_and(|bc| bc.kind() == kind) {
                self.conditions[pore] = None;
            }
        }
    }
}
