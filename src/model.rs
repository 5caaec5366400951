//! Ready-to-run transport models built from a parsed description.

use std::collections::HashMap;

use crate::dsl::{NetworkAst, PoreRef};
use crate::error::{Result, TransportError};
use crate::network::{Network, Phase, Topology};
use crate::transport::{BcMode, GenericTransport, RateMode, TransportSettings};

/// A rate the description asked to report.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRequest {
    /// Target as written in the description
    pub target: String,
    pub pores: Vec<usize>,
    pub mode: RateMode,
}

/// One reported rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RateReport {
    pub target: String,
    pub mode: RateMode,
    pub values: Vec<f64>,
}

/// Everything a run of a [`Model`] produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub quantity: String,
    pub values: Vec<f64>,
    pub rates: Vec<RateReport>,
    pub effective_property: Option<f64>,
}

/// A transport algorithm with its boundary conditions applied and the
/// requested outputs resolved to pore sets.
#[derive(Debug)]
pub struct Model {
    transport: GenericTransport,
    rates: Vec<RateRequest>,
    effective: bool,
}

impl Model {
    /// Build a model from a parsed AST.
    pub fn from_ast(ast: NetworkAst) -> Result<Self> {
        let (network, conductance, pore_names) = build_network(&ast)?;

        let mut settings = TransportSettings::new();
        if let Some(phase) = &ast.phase {
            settings = settings.with_phase(phase.as_str());
        }
        if let Some(quantity) = &ast.quantity {
            settings = settings.with_quantity(quantity.as_str());
        }
        if let Some(solver) = &ast.solver {
            settings = settings.with_solver(solver.kind);
            if let Some(tolerance) = solver.tolerance {
                settings = settings.with_tolerance(tolerance);
            }
            if let Some(max_iterations) = solver.max_iterations {
                settings = settings.with_max_iterations(max_iterations);
            }
        }

        let mut phase = Phase::for_network(settings.phase.clone(), &network);
        phase.set_throat_field(settings.conductance.clone(), conductance)?;

        let resolve = |target: &PoreRef| -> Result<Vec<usize>> {
            match target {
                PoreRef::Index(index) => Ok(vec![*index]),
                PoreRef::Name(name) => network
                    .pores(name)
                    .map(<[usize]>::to_vec)
                    .or_else(|| pore_names.get(name).map(|&p| vec![p]))
                    .ok_or_else(|| TransportError::PoreNotFound { pore: name.clone() }),
            }
        };

        let conditions = ast
            .conditions
            .iter()
            .map(|c| Ok((resolve(&c.target)?, c.kind, c.value)))
            .collect::<Result<Vec<_>>>()?;
        let rates = ast
            .rates
            .iter()
            .map(|r| {
                Ok(RateRequest {
                    target: r.target.to_string(),
                    pores: resolve(&r.target)?,
                    mode: r.mode,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut transport = GenericTransport::new(network, phase, settings)?;
        for (pores, kind, value) in conditions {
            transport.set_bc(&pores, kind, value, BcMode::Merge)?;
        }

        log::debug!(
            "model: {} pores, {} throats, {} condition(s), {} rate request(s)",
            transport.network().num_pores(),
            transport.network().num_throats(),
            ast.conditions.len(),
            rates.len()
        );

        Ok(Self {
            transport,
            rates,
            effective: ast.effective,
        })
    }

    /// Run the transport algorithm and collect the requested outputs.
    pub fn run(&mut self) -> Result<Report> {
        self.transport.run()?;

        let rates = self
            .rates
            .iter()
            .map(|request| {
                Ok(RateReport {
                    target: request.target.clone(),
                    mode: request.mode,
                    values: self.transport.rate(&request.pores, request.mode)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let effective_property = if self.effective {
            Some(self.transport.effective_property()?)
        } else {
            None
        };

        let results = self.transport.results()?;
        Ok(Report {
            quantity: results.quantity.to_string(),
            values: results.values.iter().copied().collect(),
            rates,
            effective_property,
        })
    }

    pub fn transport(&self) -> &GenericTransport {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut GenericTransport {
        &mut self.transport
    }

    pub fn rate_requests(&self) -> &[RateRequest] {
        &self.rates
    }
}

/// Network, per-throat conductance and the pore name table.
fn build_network(ast: &NetworkAst) -> Result<(Network, Vec<f64>, HashMap<String, usize>)> {
    let mut pore_names = HashMap::new();

    let network = match &ast.lattice {
        Some(lattice) => Network::cubic(lattice.shape, lattice.spacing)?,
        None => {
            if ast.pores.is_empty() {
                return Err(TransportError::topology(
                    "no pores declared; use .cubic or pore statements",
                ));
            }
            for (index, pore) in ast.pores.iter().enumerate() {
                pore_names.insert(pore.name.clone(), index);
            }
            let lookup = |name: &String| {
                pore_names
                    .get(name)
                    .copied()
                    .ok_or_else(|| TransportError::PoreNotFound { pore: name.clone() })
            };
            let conns = ast
                .throats
                .iter()
                .map(|t| Ok([lookup(&t.pores[0])?, lookup(&t.pores[1])?]))
                .collect::<Result<Vec<_>>>()?;
            Network::new(ast.pores.iter().map(|p| p.coords).collect(), conns)?
        }
    };

    let conductance = match &ast.lattice {
        Some(lattice) => vec![lattice.conductance; network.num_throats()],
        None => ast.throats.iter().map(|t| t.conductance).collect(),
    };

    let network = match ast.spacing {
        Some(spacing) => network.with_spacing(spacing),
        None => network,
    };

    Ok((network, conductance, pore_names))
}
