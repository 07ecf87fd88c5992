use nalgebra::Vector3;

/// Optional per-monomer payload carried alongside the lattice position.
///
/// Attributes are plain data; the stores never interpret them. Features
/// that care about a field (interaction type, reactivity, labels) read
/// it during their check phase and keep their own derived bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Interaction species tag. `0` means untagged; untagged monomers do
    /// not participate in pairwise contact energies.
    pub monomer_type: u8,
    /// Whether this monomer may form new bonds through connect moves.
    pub reactive: bool,
    /// Identifier of the label currently sitting on this monomer, if any.
    pub label: Option<u32>,
    /// Spring-group tag used by external setup updaters to mark monomers
    /// belonging to the same elastic grouping.
    pub spring_group: Option<u32>,
}

/// One simulated particle: a lattice position, its bonded neighbors, and
/// an optional attribute payload.
///
/// Positions are unwrapped signed coordinates; periodic folding happens
/// only at the lattice layer. The neighbor list is managed exclusively by
/// [`MonomerGraph`](super::graph::MonomerGraph) so that it always agrees
/// with the bond map.
#[derive(Debug, Clone, PartialEq)]
pub struct Monomer {
    /// Unwrapped lattice position of the lower corner of the footprint.
    pub position: Vector3<i32>,
    /// Attribute payload.
    pub attributes: Attributes,
    pub(crate) neighbors: Vec<usize>,
}

impl Default for Monomer {
    fn default() -> Self {
        Self::new(Vector3::zeros())
    }
}

impl Monomer {
    /// Creates a monomer at the given position with default attributes.
    pub fn new(position: Vector3<i32>) -> Self {
        Self {
            position,
            attributes: Attributes::default(),
            neighbors: Vec::new(),
        }
    }

    /// Creates a monomer at the given position carrying the given attributes.
    pub fn with_attributes(position: Vector3<i32>, attributes: Attributes) -> Self {
        Self {
            position,
            attributes,
            neighbors: Vec::new(),
        }
    }

    /// Returns the indices of all bonded neighbors.
    pub fn links(&self) -> &[usize] {
        &self.neighbors
    }

    /// Returns the number of bonds attached to this monomer.
    pub fn num_links(&self) -> usize {
        self.neighbors.len()
    }
}
