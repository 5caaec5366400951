//! Core types for network representation.

use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// How neighbour throats of a pore set are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborMode {
    /// Throats with at least one end in the set.
    Union,
    /// Throats with both ends in the set.
    Intersection,
    /// Throats with exactly one end in the set (the set's cut).
    #[default]
    ExclusiveOr,
}

impl FromStr for NeighborMode {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "union" | "or" | "any" => Ok(Self::Union),
            "intersection" | "and" => Ok(Self::Intersection),
            "xor" | "exclusive_or" | "not_intersection" => Ok(Self::ExclusiveOr),
            _ => Err(TransportError::UnknownKeyword {
                what: "neighbor mode",
                name: s.to_string(),
            }),
        }
    }
}

/// Which element a field is defined on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// One value per pore
    Pore,
    /// One value per throat
    Throat,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Pore => write!(f, "pore"),
            Element::Throat => write!(f, "throat"),
        }
    }
}

/// Boundary faces of a cubic lattice.
///
/// `Front`/`Back` bound the x axis, `Left`/`Right` the y axis and
/// `Bottom`/`Top` the z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
    Left,
    Right,
    Bottom,
    Top,
}

impl Face {
    /// All six faces.
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
        Face::Bottom,
        Face::Top,
    ];

    /// Coordinate axis normal to this face.
    pub fn axis(&self) -> usize {
        match self {
            Face::Front | Face::Back => 0,
            Face::Left | Face::Right => 1,
            Face::Bottom | Face::Top => 2,
        }
    }

    /// True for the face at the low end of its axis.
    pub fn is_min(&self) -> bool {
        matches!(self, Face::Front | Face::Left | Face::Bottom)
    }

    /// Label under which the face pores are stored.
    pub fn label(&self) -> &'static str {
        match self {
            Face::Front => "front",
            Face::Back => "back",
            Face::Left => "left",
            Face::Right => "right",
            Face::Bottom => "bottom",
            Face::Top => "top",
        }
    }
}

impl FromStr for Face {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Face::ALL
            .into_iter()
            .find(|face| face.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| TransportError::UnknownKeyword {
                what: "face",
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
