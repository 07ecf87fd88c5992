use crate::core::models::Attributes;
use nalgebra::Vector3;

/// The tagged union of elementary mutations a caller may propose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveKind {
    /// Translate one monomer by a single lattice step.
    Local {
        index: usize,
        direction: Vector3<i32>,
    },
    /// Insert a new monomer at an absolute position.
    Insertion {
        position: Vector3<i32>,
        attributes: Attributes,
    },
    /// Create a bond between two existing monomers.
    Connect {
        index: usize,
        partner: usize,
        payload: i32,
    },
    /// Remove the bond between two monomers.
    Break { index: usize, partner: usize },
    /// Slide a label from a monomer to its chain-consecutive neighbor
    /// (`direction` is `+1` or `-1` along the index sequence).
    Slide { index: usize, direction: i8 },
}

/// One proposed elementary mutation awaiting accept/reject.
///
/// A move is ephemeral: constructed, dispatched through the feature
/// chain exactly once, then discarded. It carries a running
/// multiplicative acceptance probability that features scale during
/// their check phase; the engine turns the final value into the global
/// accept/reject decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    kind: MoveKind,
    probability: f64,
}

impl Move {
    /// Proposes a single-step translation of `index` along `direction`.
    pub fn local(index: usize, direction: Vector3<i32>) -> Self {
        Self {
            kind: MoveKind::Local { index, direction },
            probability: 1.0,
        }
    }

    /// Proposes inserting a monomer with the given attributes.
    pub fn insertion(position: Vector3<i32>, attributes: Attributes) -> Self {
        Self {
            kind: MoveKind::Insertion {
                position,
                attributes,
            },
            probability: 1.0,
        }
    }

    /// Proposes bonding `index` to `partner` with payload 0.
    pub fn connect(index: usize, partner: usize) -> Self {
        Self::connect_with_payload(index, partner, 0)
    }

    /// Proposes bonding `index` to `partner` with an explicit payload.
    pub fn connect_with_payload(index: usize, partner: usize, payload: i32) -> Self {
        Self {
            kind: MoveKind::Connect {
                index,
                partner,
                payload,
            },
            probability: 1.0,
        }
    }

    /// Proposes breaking the bond between `index` and `partner`.
    pub fn break_bond(index: usize, partner: usize) -> Self {
        Self {
            kind: MoveKind::Break { index, partner },
            probability: 1.0,
        }
    }

    /// Proposes sliding the label on `index` one chain position over.
    pub fn slide(index: usize, direction: i8) -> Self {
        Self {
            kind: MoveKind::Slide { index, direction },
            probability: 1.0,
        }
    }

    pub fn kind(&self) -> &MoveKind {
        &self.kind
    }

    /// The accumulated acceptance probability factor.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Multiplies the running probability by a non-negative factor.
    pub fn scale_probability(&mut self, factor: f64) {
        debug_assert!(factor >= 0.0, "probability factors must be non-negative");
        self.probability *= factor;
    }

    /// Resets the running probability to the identity.
    pub fn reset_probability(&mut self) {
        self.probability = 1.0;
    }

    /// Overwrites the target monomer index, where the move kind carries
    /// one. Used by random-move generators recycling a move object.
    pub fn set_index(&mut self, new_index: usize) {
        match &mut self.kind {
            MoveKind::Local { index, .. }
            | MoveKind::Connect { index, .. }
            | MoveKind::Break { index, .. }
            | MoveKind::Slide { index, .. } => *index = new_index,
            MoveKind::Insertion { .. } => {}
        }
    }

    /// Overwrites the absolute position of an insertion move.
    pub fn set_position(&mut self, new_position: Vector3<i32>) {
        if let MoveKind::Insertion { position, .. } = &mut self.kind {
            *position = new_position;
        }
    }

    /// Overwrites the step direction of a local move.
    pub fn set_direction(&mut self, new_direction: Vector3<i32>) {
        if let MoveKind::Local { direction, .. } = &mut self.kind {
            *direction = new_direction;
        }
    }

    /// Overwrites the partner index of a connect or break move.
    pub fn set_partner(&mut self, new_partner: usize) {
        match &mut self.kind {
            MoveKind::Connect { partner, .. } | MoveKind::Break { partner, .. } => {
                *partner = new_partner;
            }
            _ => {}
        }
    }

    /// Overwrites the species tag of an insertion move.
    pub fn set_tag(&mut self, tag: u8) {
        if let MoveKind::Insertion { attributes, .. } = &mut self.kind {
            attributes.monomer_type = tag;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_starts_at_identity_and_composes_multiplicatively() {
        let mut mv = Move::local(0, Vector3::new(1, 0, 0));
        assert_eq!(mv.probability(), 1.0);

        mv.scale_probability(0.5);
        mv.scale_probability(0.25);
        assert_eq!(mv.probability(), 0.125);

        mv.reset_probability();
        assert_eq!(mv.probability(), 1.0);
    }

    #[test]
    fn setters_touch_only_the_matching_kind() {
        let mut local = Move::local(3, Vector3::new(0, 1, 0));
        local.set_index(5);
        local.set_direction(Vector3::new(0, 0, -1));
        local.set_partner(9);
        assert_eq!(
            *local.kind(),
            MoveKind::Local {
                index: 5,
                direction: Vector3::new(0, 0, -1)
            }
        );

        let mut connect = Move::connect(1, 2);
        connect.set_partner(4);
        connect.set_direction(Vector3::new(1, 0, 0));
        assert_eq!(
            *connect.kind(),
            MoveKind::Connect {
                index: 1,
                partner: 4,
                payload: 0
            }
        );
    }

    #[test]
    fn insertion_carries_position_and_tag() {
        let mut mv = Move::insertion(Vector3::new(4, 4, 4), Attributes::default());
        mv.set_tag(2);
        mv.set_position(Vector3::new(6, 4, 4));
        match mv.kind() {
            MoveKind::Insertion {
                position,
                attributes,
            } => {
                assert_eq!(*position, Vector3::new(6, 4, 4));
                assert_eq!(attributes.monomer_type, 2);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
