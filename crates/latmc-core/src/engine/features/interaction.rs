use crate::core::lattice::{FOOTPRINT, Lattice, PeriodicBox};
use crate::core::models::MonomerGraph;
use crate::core::potentials::InteractionEnergies;
use crate::engine::error::EngineError;
use crate::engine::feature::{Feature, FeatureConstraints};
use crate::engine::moves::{Move, MoveKind};
use itertools::iproduct;
use nalgebra::Vector3;
use std::any::Any;

/// Nearest-neighbor pairwise contact energies between tagged monomers.
///
/// Owns a typed lattice holding each monomer's species tag on its
/// footprint cells, and a symmetric energy table by species pair. A
/// local move is weighted by `exp(-(E_new - E_old))`, where each `E` is
/// the sum of contact energies the moving monomer collects over the
/// fixed shell of cells surrounding its footprint. The feature reads
/// only its own typed lattice, never the primary occupancy lattice, and
/// must be ordered after the excluded-volume feature.
pub struct NearestNeighborInteraction {
    lattice: Lattice<u8>,
    energies: InteractionEnergies,
    shell: Vec<Vector3<i32>>,
    synchronized: bool,
}

impl NearestNeighborInteraction {
    pub const NAME: &'static str = "nn-interaction";

    pub fn new(geometry: PeriodicBox, energies: InteractionEnergies) -> Self {
        Self {
            lattice: Lattice::new(geometry),
            energies,
            shell: contact_shell(),
            synchronized: false,
        }
    }

    /// Read-only species lattice access for analyzers.
    pub fn lattice(&self) -> &Lattice<u8> {
        &self.lattice
    }

    pub fn energies(&self) -> &InteractionEnergies {
        &self.energies
    }

    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    fn require_synchronized(&self) -> Result<(), EngineError> {
        if self.synchronized {
            Ok(())
        } else {
            Err(EngineError::NotSynchronized { feature: Self::NAME })
        }
    }

    /// Contact energy the given species collects over the shell around
    /// `position`, skipping cells inside the monomer's own current
    /// footprint (they still carry its tag on the lattice).
    fn shell_energy(
        &self,
        species: u8,
        position: Vector3<i32>,
        own_footprint: &[Vector3<i32>; 8],
    ) -> f64 {
        let geometry = *self.lattice.periodic_box();
        self.shell
            .iter()
            .map(|offset| position + offset)
            .filter(|&cell| {
                let folded = geometry.fold(cell);
                !own_footprint.iter().any(|&own| own == folded)
            })
            .map(|cell| self.energies.energy(species, self.lattice.get(cell)))
            .sum()
    }

    fn footprint_cells(geometry: &PeriodicBox, position: Vector3<i32>) -> [Vector3<i32>; 8] {
        let mut cells = [Vector3::zeros(); 8];
        for (slot, offset) in FOOTPRINT.into_iter().enumerate() {
            cells[slot] = geometry.fold(position + Vector3::from(offset));
        }
        cells
    }
}

/// The fixed symmetric shell of cells surrounding a monomer footprint:
/// the `4³` block centered on the footprint minus the footprint itself.
fn contact_shell() -> Vec<Vector3<i32>> {
    iproduct!(-1..=2, -1..=2, -1..=2)
        .filter(|&(x, y, z)| {
            !((0..=1).contains(&x) && (0..=1).contains(&y) && (0..=1).contains(&z))
        })
        .map(|(x, y, z)| Vector3::new(x, y, z))
        .collect()
}

impl Feature for NearestNeighborInteraction {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn constraints(&self) -> FeatureConstraints {
        FeatureConstraints {
            before: &[],
            after: &[super::excluded_volume::ExcludedVolume::NAME],
        }
    }

    fn check_move(&self, graph: &MonomerGraph, mv: &mut Move) -> Result<bool, EngineError> {
        match *mv.kind() {
            MoveKind::Local { index, direction } => {
                let species = graph.monomer(index)?.attributes.monomer_type;
                if species == 0 {
                    return Ok(true);
                }
                self.require_synchronized()?;

                let old_position = graph.monomer(index)?.position;
                let new_position = old_position + direction;
                let own = Self::footprint_cells(self.lattice.periodic_box(), old_position);

                let energy_old = self.shell_energy(species, old_position, &own);
                let energy_new = self.shell_energy(species, new_position, &own);
                mv.scale_probability((-(energy_new - energy_old)).exp());
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    fn apply_move(&mut self, graph: &MonomerGraph, mv: &Move) -> Result<(), EngineError> {
        match *mv.kind() {
            MoveKind::Local { index, direction } => {
                let species = graph.monomer(index)?.attributes.monomer_type;
                if species == 0 {
                    return Ok(());
                }
                let old_position = graph.monomer(index)?.position;
                for offset in FOOTPRINT {
                    self.lattice.set(old_position + Vector3::from(offset), 0);
                }
                for offset in FOOTPRINT {
                    self.lattice
                        .set(old_position + direction + Vector3::from(offset), species);
                }
                Ok(())
            }
            MoveKind::Insertion {
                position,
                attributes,
            } => {
                if attributes.monomer_type != 0 {
                    for offset in FOOTPRINT {
                        self.lattice
                            .set(position + Vector3::from(offset), attributes.monomer_type);
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn synchronize(&mut self, graph: &MonomerGraph) -> Result<(), EngineError> {
        self.synchronized = false;
        self.lattice.clear();
        for (_, monomer) in graph.iter() {
            let species = monomer.attributes.monomer_type;
            if species == 0 {
                continue;
            }
            for offset in FOOTPRINT {
                let cell = monomer.position + Vector3::from(offset);
                if !self.lattice.is_vacant(cell) {
                    let folded = self.lattice.periodic_box().fold(cell);
                    return Err(EngineError::MultipleOccupation {
                        x: folded.x,
                        y: folded.y,
                        z: folded.z,
                    });
                }
                self.lattice.set(cell, species);
            }
        }
        self.synchronized = true;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
