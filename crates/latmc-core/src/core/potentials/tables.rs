use super::bond_vectors::bond_vector_index;
use nalgebra::Vector3;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU8;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Species tag 0 is reserved for vacant cells and cannot carry an energy")]
    ReservedSpecies,
    #[error("Bond vector ({x}, {y}, {z}) is outside the encodable domain")]
    UnencodableBondVector { x: i32, y: i32, z: i32 },
}

/// One `type_a,type_b,energy` row of a pair-energy table file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PairEnergy {
    pub type_a: u8,
    pub type_b: u8,
    pub energy: f64,
}

/// Dense symmetric lookup of contact energies by species pair.
///
/// Energies are in units of `k_B T`. Species tag 0 denotes a vacant
/// lattice cell; any contact involving it contributes zero. The table
/// is symmetric by construction: `set_energy(a, b, e)` stores both
/// orientations.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionEnergies {
    table: Vec<f64>,
}

impl Default for InteractionEnergies {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionEnergies {
    /// Creates a table with every pair at zero energy.
    pub fn new() -> Self {
        Self {
            table: vec![0.0; 256 * 256],
        }
    }

    /// Sets the contact energy for a species pair, symmetrically.
    pub fn set_energy(&mut self, a: NonZeroU8, b: NonZeroU8, energy: f64) {
        let (a, b) = (a.get() as usize, b.get() as usize);
        self.table[a * 256 + b] = energy;
        self.table[b * 256 + a] = energy;
    }

    /// Returns the contact energy between two cell values. Either side
    /// being vacant (tag 0) yields zero.
    #[inline]
    pub fn energy(&self, a: u8, b: u8) -> f64 {
        if a == 0 || b == 0 {
            return 0.0;
        }
        self.table[a as usize * 256 + b as usize]
    }

    /// Returns `true` if no pair carries a nonzero energy.
    pub fn is_trivial(&self) -> bool {
        self.table.iter().all(|&e| e == 0.0)
    }

    /// Builds a table from explicit pair rows. Rows naming species 0 are
    /// rejected.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ParamLoadError>
    where
        I: IntoIterator<Item = PairEnergy>,
    {
        let mut energies = Self::new();
        for pair in pairs {
            let a = NonZeroU8::new(pair.type_a).ok_or(ParamLoadError::ReservedSpecies)?;
            let b = NonZeroU8::new(pair.type_b).ok_or(ParamLoadError::ReservedSpecies)?;
            energies.set_energy(a, b, pair.energy);
        }
        Ok(energies)
    }

    /// Loads a table from a CSV file with a `type_a,type_b,energy` header.
    pub fn load_csv(path: &Path) -> Result<Self, ParamLoadError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ParamLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut rows = Vec::new();
        for result in reader.deserialize::<PairEnergy>() {
            let record = result.map_err(|e| ParamLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            rows.push(record);
        }
        Self::from_pairs(rows)
    }

    /// Loads a table from a TOML file of the form
    /// `pairs = [{ type_a = 1, type_b = 2, energy = 0.8 }, ...]`.
    pub fn load_toml(path: &Path) -> Result<Self, ParamLoadError> {
        #[derive(Deserialize)]
        struct File {
            pairs: Vec<PairEnergy>,
        }

        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: File = toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_pairs(file.pairs)
    }
}

/// Sparse lookup of acceptance-probability factors keyed by a pair of
/// encoded bond vectors.
///
/// The table answers "what factor does the angle formed by these two
/// bond vectors contribute"; pairs with no entry contribute the identity
/// factor 1.0. Keys are normalized to `(min, max)` so the lookup is
/// order-independent, matching the physical symmetry of an angle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BendingTable {
    factors: HashMap<(u16, u16), f64>,
}

impl BendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the probability factor for the angle formed by two bond
    /// vectors. Fails if either vector is outside the encodable domain.
    pub fn set_factor(
        &mut self,
        first: Vector3<i32>,
        second: Vector3<i32>,
        factor: f64,
    ) -> Result<(), ParamLoadError> {
        let i = bond_vector_index(first).ok_or(ParamLoadError::UnencodableBondVector {
            x: first.x,
            y: first.y,
            z: first.z,
        })?;
        let j = bond_vector_index(second).ok_or(ParamLoadError::UnencodableBondVector {
            x: second.x,
            y: second.y,
            z: second.z,
        })?;
        self.factors.insert(Self::key(i, j), factor);
        Ok(())
    }

    /// Returns the factor for an angle, 1.0 when no entry exists or a
    /// vector is outside the domain.
    #[inline]
    pub fn factor(&self, first: Vector3<i32>, second: Vector3<i32>) -> f64 {
        match (bond_vector_index(first), bond_vector_index(second)) {
            (Some(i), Some(j)) => *self.factors.get(&Self::key(i, j)).unwrap_or(&1.0),
            _ => 1.0,
        }
    }

    /// Returns `true` if no angle carries a non-identity factor.
    pub fn is_trivial(&self) -> bool {
        self.factors.is_empty()
    }

    fn key(i: u16, j: u16) -> (u16, u16) {
        if i < j { (i, j) } else { (j, i) }
    }
}
