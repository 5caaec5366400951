//! Abstract Syntax Tree types for the network DSL.

use crate::transport::{BcKind, RateMode, SolverKind};

/// Complete AST representation of a parsed network description.
#[derive(Debug, Clone, Default)]
pub struct NetworkAst {
    /// Generated cubic lattice, exclusive with explicit pores
    pub lattice: Option<LatticeDef>,
    /// Explicitly declared pores, in declaration order
    pub pores: Vec<PoreDef>,
    /// Explicitly declared throats
    pub throats: Vec<ThroatDef>,
    /// Lattice spacing override (needed by irregular networks for areas)
    pub spacing: Option<[f64; 3]>,
    /// Phase name
    pub phase: Option<String>,
    /// Name of the solved quantity
    pub quantity: Option<String>,
    /// Solver selection
    pub solver: Option<SolverDef>,
    /// Boundary conditions, applied in order
    pub conditions: Vec<ConditionDef>,
    /// Requested rate reports
    pub rates: Vec<RateDef>,
    /// Whether the effective property is requested
    pub effective: bool,
}

impl NetworkAst {
    /// Create a new empty AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// `.cubic nx ny nz spacing [g=value]`
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeDef {
    pub shape: [usize; 3],
    pub spacing: f64,
    /// Uniform throat conductance
    pub conductance: f64,
    pub line: usize,
}

/// `pore name x y z`
#[derive(Debug, Clone, PartialEq)]
pub struct PoreDef {
    pub name: String,
    pub coords: [f64; 3],
    pub line: usize,
}

/// `throat pore1 pore2 conductance`
#[derive(Debug, Clone, PartialEq)]
pub struct ThroatDef {
    pub pores: [String; 2],
    pub conductance: f64,
    pub line: usize,
}

/// A set of pores named in a directive.
#[derive(Debug, Clone, PartialEq)]
pub enum PoreRef {
    /// A label (`left`, `top`, ...) or a declared pore name
    Name(String),
    /// A pore index
    Index(usize),
}

impl std::fmt::Display for PoreRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoreRef::Name(name) => write!(f, "{}", name),
            PoreRef::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// `.solver name [tol=value] [maxiter=n]`
#[derive(Debug, Clone, PartialEq)]
pub struct SolverDef {
    pub kind: SolverKind,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
    pub line: usize,
}

/// `.dirichlet target value` or `.neumann target value`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionDef {
    pub kind: BcKind,
    pub target: PoreRef,
    pub value: f64,
    pub line: usize,
}

/// `.rate target [single]`
#[derive(Debug, Clone, PartialEq)]
pub struct RateDef {
    pub target: PoreRef,
    pub mode: RateMode,
    pub line: usize,
}
