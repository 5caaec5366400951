//! # Pnflow Core
//!
//! A steady-state transport solver for pore networks.
//!
//! This library provides:
//! - A pore network representation with a cubic lattice generator
//! - Conductance-weighted Laplacian assembly with Dirichlet and Neumann
//!   boundary conditions
//! - Pluggable sparse solvers (direct LU, BiCGStab, conjugate gradients)
//! - Net rates through pore sets and effective transport coefficients
//! - A custom DSL for describing networks and the outputs to report
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`network`] - Network topology, domain geometry and phase fields
//! - [`transport`] - Boundary conditions, system assembly, solvers, post-processing
//! - [`dsl`] - Parser for the network description language
//! - [`model`] - Ready-to-run models built from a parsed description
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! pnflow -v network.pn
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use pnflow_core::{GenericTransport, Network, Phase, RateMode, TransportSettings};
//! use pnflow_core::network::{Face, Topology};
//!
//! # fn main() -> pnflow_core::Result<()> {
//! let network = Network::cubic([10, 10, 10], 1e-4)?;
//! let mut phase = Phase::for_network("phase", &network);
//! phase.set_throat_field("throat.conductance", vec![1e-9; network.num_throats()])?;
//!
//! let inlet = network.face_pores(Face::Left).unwrap_or_default().to_vec();
//! let outlet = network.face_pores(Face::Right).unwrap_or_default().to_vec();
//!
//! let mut alg = GenericTransport::new(network, phase, TransportSettings::default())?;
//! alg.set_dirichlet_bc(&inlet, 1.0)?;
//! alg.set_dirichlet_bc(&outlet, 0.0)?;
//! alg.run()?;
//!
//! let rate = alg.rate(&inlet, RateMode::Group)?;
//! let diffusivity = alg.effective_property()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmTransport } from 'pnflow_core';
//!
//! const alg = new WasmTransport(networkDsl);
//! alg.run();
//! const pressure = alg.quantity();
//! ```
//!
//! ## Solution Method
//!
//! For each throat joining pores `i` and `j` with conductance `g`, the rate
//! is `g (x_j - x_i)`. Requiring zero net rate at every free pore gives
//! `A x = b` with `A` the weighted graph Laplacian:
//!
//! 1. Assemble the pure Laplacian and a zero right-hand side (cached)
//! 2. Overwrite Neumann entries of `b`, replace Dirichlet rows of `A`
//!    with unit rows and their `b` entries with the fixed values
//! 3. Solve once with the configured sparse solver

pub mod dsl;
pub mod error;
pub mod model;
pub mod network;
pub mod transport;

// Re-export main types for convenience
pub use error::{Result, SolverError, TransportError};
pub use model::{Model, Report};
pub use network::{Network, Phase};
pub use transport::{BcKind, BcMode, GenericTransport, RateMode, SolverKind, TransportSettings};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmTransport;
