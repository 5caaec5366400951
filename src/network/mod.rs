//! Pore network representation.
//!
//! This module provides the graph the transport algorithm runs on and the
//! field store it reads conductances from. The algorithm itself only relies
//! on the [`Topology`] and [`DomainGeometry`] traits; [`Network`] is the
//! in-crate implementation, including a cubic lattice generator.

mod graph;
mod phase;
mod topology;
mod types;
mod validate;

pub use graph::Network;
pub use phase::{FieldId, Phase};
pub use topology::{DomainGeometry, Topology};
pub use types::*;
pub use validate::{check_pores, check_throats, validate_connections};
