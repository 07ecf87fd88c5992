use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LatticeError {
    #[error("Box dimension {size} is invalid; every axis must be positive")]
    InvalidBoxDimension { size: i32 },
}

/// Periodic folding for one lattice axis.
///
/// Folding maps any signed coordinate into `[0, size)`. When the axis
/// length is a power of two the modulo degenerates to a bitmask AND,
/// which is bit-identical to `rem_euclid` for every input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisFold {
    size: i32,
    mask: Option<i32>,
}

impl AxisFold {
    fn new(size: i32) -> Result<Self, LatticeError> {
        if size <= 0 {
            return Err(LatticeError::InvalidBoxDimension { size });
        }
        let mask = if size.count_ones() == 1 {
            Some(size - 1)
        } else {
            None
        };
        Ok(Self { size, mask })
    }

    #[inline]
    fn fold(&self, coordinate: i32) -> i32 {
        match self.mask {
            Some(mask) => coordinate & mask,
            None => coordinate.rem_euclid(self.size),
        }
    }

    /// Folding ignoring the power-of-two fast path. Kept for the
    /// equivalence test between the two folding strategies.
    #[inline]
    fn fold_general(&self, coordinate: i32) -> i32 {
        coordinate.rem_euclid(self.size)
    }
}

/// The periodic simulation box: per-axis folding plus minimum-image
/// arithmetic, reused by every lattice and every distance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicBox {
    x: AxisFold,
    y: AxisFold,
    z: AxisFold,
}

impl PeriodicBox {
    /// Creates a box with the given axis lengths.
    ///
    /// Axes that are powers of two fold with a bitmask; the result is
    /// numerically identical to the general modulo for any input.
    pub fn new(size_x: i32, size_y: i32, size_z: i32) -> Result<Self, LatticeError> {
        Ok(Self {
            x: AxisFold::new(size_x)?,
            y: AxisFold::new(size_y)?,
            z: AxisFold::new(size_z)?,
        })
    }

    pub fn size_x(&self) -> i32 {
        self.x.size
    }

    pub fn size_y(&self) -> i32 {
        self.y.size
    }

    pub fn size_z(&self) -> i32 {
        self.z.size
    }

    /// Total number of lattice cells in the box.
    pub fn volume(&self) -> usize {
        self.x.size as usize * self.y.size as usize * self.z.size as usize
    }

    /// Folds a position into the canonical box `[0, size)³`.
    #[inline]
    pub fn fold(&self, p: Vector3<i32>) -> Vector3<i32> {
        Vector3::new(self.x.fold(p.x), self.y.fold(p.y), self.z.fold(p.z))
    }

    /// Returns the minimum-image representative of a signed separation
    /// vector: each component lands in `[-size/2, size/2)`.
    #[inline]
    pub fn minimum_image(&self, delta: Vector3<i32>) -> Vector3<i32> {
        Vector3::new(
            Self::axis_minimum_image(self.x.fold(delta.x), self.x.size),
            Self::axis_minimum_image(self.y.fold(delta.y), self.y.size),
            Self::axis_minimum_image(self.z.fold(delta.z), self.z.size),
        )
    }

    #[inline]
    fn axis_minimum_image(folded: i32, size: i32) -> i32 {
        if folded >= size - size / 2 {
            folded - size
        } else {
            folded
        }
    }

    /// Linear index of a (folded) position, x fastest.
    #[inline]
    pub(crate) fn linear_index(&self, p: Vector3<i32>) -> usize {
        let f = self.fold(p);
        (f.z as usize * self.y.size as usize + f.y as usize) * self.x.size as usize + f.x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn zero_or_negative_dimension_is_rejected() {
        assert_eq!(
            PeriodicBox::new(0, 8, 8).err(),
            Some(LatticeError::InvalidBoxDimension { size: 0 })
        );
        assert_eq!(
            PeriodicBox::new(8, -4, 8).err(),
            Some(LatticeError::InvalidBoxDimension { size: -4 })
        );
    }

    #[test]
    fn folding_is_idempotent_and_translation_invariant() {
        for size in [7, 8, 12, 64] {
            let axis = AxisFold::new(size).unwrap();
            for x in -3 * size..3 * size {
                let folded = axis.fold(x);
                assert!((0..size).contains(&folded));
                assert_eq!(axis.fold(folded), folded, "idempotence at x={x}, B={size}");
                assert_eq!(
                    axis.fold(x + size),
                    folded,
                    "translation by B at x={x}, B={size}"
                );
                assert_eq!(axis.fold(x - 2 * size), folded);
            }
        }
    }

    #[test]
    fn power_of_two_mask_matches_general_fold_on_random_samples() {
        let mut rng = StdRng::seed_from_u64(0x1a77);
        for size in [2, 8, 64, 128] {
            let axis = AxisFold::new(size).unwrap();
            assert!(axis.mask.is_some());
            for _ in 0..10_000 {
                let x = rng.gen_range(-10 * size..=10 * size);
                assert_eq!(
                    axis.fold(x),
                    axis.fold_general(x),
                    "mask fold diverged at x={x}, B={size}"
                );
            }
        }
    }

    #[test]
    fn non_power_of_two_axes_use_the_general_fold() {
        let axis = AxisFold::new(12).unwrap();
        assert!(axis.mask.is_none());
        assert_eq!(axis.fold(-1), 11);
        assert_eq!(axis.fold(12), 0);
    }

    #[test]
    fn minimum_image_maps_into_half_open_centered_interval() {
        let pbox = PeriodicBox::new(8, 8, 8).unwrap();
        assert_eq!(
            pbox.minimum_image(Vector3::new(7, -7, 4)),
            Vector3::new(-1, 1, -4)
        );
        assert_eq!(
            pbox.minimum_image(Vector3::new(3, -3, 0)),
            Vector3::new(3, -3, 0)
        );
    }

    #[test]
    fn linear_index_folds_before_indexing() {
        let pbox = PeriodicBox::new(4, 4, 4).unwrap();
        assert_eq!(
            pbox.linear_index(Vector3::new(5, 0, 0)),
            pbox.linear_index(Vector3::new(1, 0, 0))
        );
        assert_eq!(pbox.linear_index(Vector3::new(1, 2, 3)), 3 * 16 + 2 * 4 + 1);
    }
}
