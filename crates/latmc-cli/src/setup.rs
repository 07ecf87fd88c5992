use crate::config::FileConfig;
use crate::error::{CliError, Result};
use latmc::core::lattice::PeriodicBox;
use latmc::core::models::{Attributes, Monomer, MonomerGraph};
use latmc::core::potentials::{BendingTable, InteractionEnergies};
use latmc::engine::error::EngineError;
use latmc::engine::features::{
    BendingPotential, BondVectorSet, ExcludedVolume, LabelBookkeeping, NearestNeighborInteraction,
    ReactiveBondConfig, ReactiveBonds,
};
use latmc::engine::simulation::Simulation;
use nalgebra::Vector3;
use std::num::NonZeroU8;
use tracing::info;

/// Builds the fully configured simulation: initial chains plus the
/// feature set the configuration enables.
pub fn build_simulation(config: &FileConfig) -> Result<Simulation> {
    let geometry = PeriodicBox::new(
        config.simulation_box.x,
        config.simulation_box.y,
        config.simulation_box.z,
    )
    .map_err(EngineError::from)?;

    let graph = build_initial_graph(config, &geometry)?;
    info!(
        monomers = graph.len(),
        bonds = graph.bonds().count(),
        "initial system built"
    );

    let mut builder = Simulation::builder()
        .graph(graph)
        .register(ExcludedVolume::new(geometry))
        .register(BondVectorSet::new(geometry))
        .register(LabelBookkeeping::new());

    if let Some(interaction) = &config.interaction {
        let mut energies = match &interaction.energies_csv {
            Some(path) => InteractionEnergies::load_csv(path).map_err(EngineError::from)?,
            None => InteractionEnergies::new(),
        };
        for pair in &interaction.pairs {
            let (a, b) = match (NonZeroU8::new(pair.type_a), NonZeroU8::new(pair.type_b)) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(CliError::Config(
                        "interaction pairs cannot name species 0 (vacant)".into(),
                    ));
                }
            };
            energies.set_energy(a, b, pair.energy);
        }
        builder = builder.register(NearestNeighborInteraction::new(geometry, energies));
    }

    if let Some(bending) = &config.bending {
        let mut table = BendingTable::new();
        for angle in &bending.angles {
            table
                .set_factor(
                    Vector3::from(angle.first),
                    Vector3::from(angle.second),
                    angle.factor,
                )
                .map_err(EngineError::from)?;
        }
        builder = builder.register(BendingPotential::new(table));
    }

    if let Some(reactive) = &config.reactive {
        builder = builder.register(ReactiveBonds::new(
            geometry,
            ReactiveBondConfig {
                max_connectivity: reactive.max_connectivity,
            },
        ));
    }

    Ok(builder.build()?)
}

/// Lays the configured chains out on the lattice: each chain runs along
/// x with the (2,0,0) bond, chains occupy a y-z grid at spacing 2.
fn build_initial_graph(config: &FileConfig, geometry: &PeriodicBox) -> Result<MonomerGraph> {
    let chains = config.system.chains;
    let length = config.system.chain_length;

    if 2 * length as i64 > geometry.size_x() as i64 {
        return Err(CliError::Config(format!(
            "a chain of {length} monomers needs {} lattice sites along x, box has {}",
            2 * length,
            geometry.size_x()
        )));
    }
    let slots_y = (geometry.size_y() / 2) as u32;
    let slots_z = (geometry.size_z() / 2) as u32;
    if chains > slots_y * slots_z {
        return Err(CliError::Config(format!(
            "{chains} chains do not fit the {slots_y}x{slots_z} grid of chain slots"
        )));
    }

    let attributes = Attributes {
        monomer_type: config.system.monomer_type,
        reactive: config.system.reactive,
        label: None,
        spring_group: None,
    };

    let mut graph = MonomerGraph::new();
    for chain in 0..chains {
        let y = (chain % slots_y) as i32 * 2;
        let z = (chain / slots_y) as i32 * 2;
        let mut previous = None;
        for monomer in 0..length {
            let position = Vector3::new(monomer as i32 * 2, y, z);
            let index = graph.add_monomer(Monomer::with_attributes(position, attributes));
            if let Some(previous) = previous {
                graph.connect(previous, index, 0).map_err(EngineError::from)?;
            }
            previous = Some(index);
        }
    }
    Ok(graph)
}
