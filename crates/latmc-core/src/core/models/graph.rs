use super::monomer::Monomer;
use nalgebra::Vector3;
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GraphError {
    #[error("Monomer index {index} is out of range (graph size {size})")]
    OutOfRange { index: usize, size: usize },

    #[error("No bond exists between monomers {first} and {second}")]
    BondNotFound { first: usize, second: usize },

    #[error("Monomer {index} has no bond slot {slot} ({num_links} links)")]
    LinkSlotOutOfRange {
        index: usize,
        slot: usize,
        num_links: usize,
    },
}

/// The shared monomer graph: the single source of truth for positions and
/// connectivity.
///
/// Monomers are identified by stable `usize` indices into the vertex
/// vector. Indices are never recycled implicitly; [`resize`](Self::resize)
/// is the only operation that changes the index space. Bonds are stored
/// once per unordered pair in a map keyed by `(min(a, b), max(a, b))`;
/// existence in that map is the single source of truth for connectivity,
/// and the per-monomer adjacency lists are kept in agreement with it by
/// every mutating operation.
///
/// The graph enforces no maximum degree. Callers that promise a bounded
/// connectivity (the reactive-bond feature does) must reject a connect
/// move before it reaches [`connect`](Self::connect).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonomerGraph {
    monomers: Vec<Monomer>,
    bonds: BTreeMap<(usize, usize), i32>,
    age: u64,
}

fn bond_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

impl MonomerGraph {
    /// Creates a new, empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of monomers.
    pub fn len(&self) -> usize {
        self.monomers.len()
    }

    /// Returns `true` if the graph holds no monomers.
    pub fn is_empty(&self) -> bool {
        self.monomers.is_empty()
    }

    /// Appends a monomer and returns its index.
    pub fn add_monomer(&mut self, monomer: Monomer) -> usize {
        self.monomers.push(monomer);
        self.monomers.len() - 1
    }

    /// Resizes the vertex vector to `new_len`.
    ///
    /// Growing appends default monomers at the origin. Shrinking removes
    /// the tail monomers together with every bond touching a removed
    /// index, so the adjacency lists and the bond map stay in agreement.
    /// This is the only operation after which indices may be reused.
    pub fn resize(&mut self, new_len: usize) {
        if new_len < self.monomers.len() {
            self.bonds.retain(|&(a, b), _| a < new_len && b < new_len);
            for monomer in self.monomers.iter_mut().take(new_len) {
                monomer.neighbors.retain(|&n| n < new_len);
            }
        }
        self.monomers
            .resize_with(new_len, || Monomer::new(Vector3::zeros()));
    }

    /// Retrieves a monomer by index.
    pub fn monomer(&self, index: usize) -> Result<&Monomer, GraphError> {
        self.monomers.get(index).ok_or(GraphError::OutOfRange {
            index,
            size: self.monomers.len(),
        })
    }

    /// Retrieves a monomer mutably by index.
    ///
    /// Exposed for setup updaters and the move-commit step; bond
    /// structure is not reachable through the returned reference.
    pub fn monomer_mut(&mut self, index: usize) -> Result<&mut Monomer, GraphError> {
        let size = self.monomers.len();
        self.monomers
            .get_mut(index)
            .ok_or(GraphError::OutOfRange { index, size })
    }

    /// Returns an iterator over `(index, &Monomer)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Monomer)> {
        self.monomers.iter().enumerate()
    }

    /// Creates a bond between `a` and `b` carrying the given payload.
    ///
    /// A self-bond (`a == b`) is tolerated as a silent no-op; see the
    /// crate documentation for why this surprising contract is kept.
    /// If either index is out of range the graph is left exactly as it
    /// was. Re-connecting an already bonded pair only overwrites the
    /// payload.
    pub fn connect(&mut self, a: usize, b: usize, payload: i32) -> Result<(), GraphError> {
        if a == b {
            // Documented no-op: callers occasionally emit self-bonds when
            // walking ring structures.
            debug!(index = a, "ignoring self-bond connect request");
            return Ok(());
        }
        let size = self.monomers.len();
        if a >= size {
            return Err(GraphError::OutOfRange { index: a, size });
        }
        if b >= size {
            return Err(GraphError::OutOfRange { index: b, size });
        }

        let key = bond_key(a, b);
        if self.bonds.insert(key, payload).is_none() {
            self.monomers[a].neighbors.push(b);
            self.monomers[b].neighbors.push(a);
        }
        Ok(())
    }

    /// Removes the bond between `a` and `b`.
    ///
    /// Both adjacency entries and the bond-map entry are removed
    /// together; the graph never holds a half-removed bond.
    pub fn disconnect(&mut self, a: usize, b: usize) -> Result<(), GraphError> {
        let key = bond_key(a, b);
        if self.bonds.remove(&key).is_none() {
            return Err(GraphError::BondNotFound {
                first: key.0,
                second: key.1,
            });
        }
        self.monomers[a].neighbors.retain(|&n| n != b);
        self.monomers[b].neighbors.retain(|&n| n != a);
        Ok(())
    }

    /// Returns the index of the `slot`-th bonded neighbor of `index`.
    pub fn neighbor(&self, index: usize, slot: usize) -> Result<usize, GraphError> {
        let monomer = self.monomer(index)?;
        monomer
            .neighbors
            .get(slot)
            .copied()
            .ok_or(GraphError::LinkSlotOutOfRange {
                index,
                slot,
                num_links: monomer.neighbors.len(),
            })
    }

    /// Returns the number of bonds attached to `index`.
    pub fn num_links(&self, index: usize) -> Result<usize, GraphError> {
        Ok(self.monomer(index)?.neighbors.len())
    }

    /// Returns the payload stored on the bond between `a` and `b`.
    pub fn edge_payload(&self, a: usize, b: usize) -> Result<i32, GraphError> {
        let key = bond_key(a, b);
        self.bonds
            .get(&key)
            .copied()
            .ok_or(GraphError::BondNotFound {
                first: key.0,
                second: key.1,
            })
    }

    /// Returns `true` if a bond exists between `a` and `b`.
    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        self.bonds.contains_key(&bond_key(a, b))
    }

    /// Returns an iterator over all bonds as `((a, b), payload)` with `a < b`.
    pub fn bonds(&self) -> impl Iterator<Item = ((usize, usize), i32)> + '_ {
        self.bonds.iter().map(|(&k, &v)| (k, v))
    }

    /// Returns the simulation age (Monte Carlo step counter).
    ///
    /// The composition engine never advances this; the owning run loop
    /// sets it once per step.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Sets the simulation age.
    pub fn set_age(&mut self, age: u64) {
        self.age = age;
    }
}

impl Index<usize> for MonomerGraph {
    type Output = Monomer;

    fn index(&self, index: usize) -> &Self::Output {
        &self.monomers[index]
    }
}

impl IndexMut<usize> for MonomerGraph {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.monomers[index]
    }
}
