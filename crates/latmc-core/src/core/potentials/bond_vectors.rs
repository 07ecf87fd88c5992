use nalgebra::Vector3;

/// Largest absolute component a bond vector may carry and still be
/// representable in the small-integer encoding.
pub const MAX_COMPONENT: i32 = 4;

const SPAN: i32 = 2 * MAX_COMPONENT + 1;

/// Number of distinct encodable bond vectors (`9³`).
pub const INDEX_SPAN: usize = (SPAN * SPAN * SPAN) as usize;

/// Encodes a bond vector into a small integer.
///
/// The encoding is injective over the domain `[-4, 4]³`, which covers
/// every vector the bond-fluctuation model can produce. Vectors outside
/// the domain yield `None`; probability tables treat them as unknown.
#[inline]
pub fn bond_vector_index(v: Vector3<i32>) -> Option<u16> {
    if v.x.abs() > MAX_COMPONENT || v.y.abs() > MAX_COMPONENT || v.z.abs() > MAX_COMPONENT {
        return None;
    }
    let x = v.x + MAX_COMPONENT;
    let y = v.y + MAX_COMPONENT;
    let z = v.z + MAX_COMPONENT;
    Some((x + SPAN * y + SPAN * SPAN * z) as u16)
}

/// Decodes an index produced by [`bond_vector_index`].
#[inline]
pub fn bond_vector_from_index(index: u16) -> Option<Vector3<i32>> {
    if index as usize >= INDEX_SPAN {
        return None;
    }
    let i = index as i32;
    Some(Vector3::new(
        i % SPAN - MAX_COMPONENT,
        (i / SPAN) % SPAN - MAX_COMPONENT,
        i / (SPAN * SPAN) - MAX_COMPONENT,
    ))
}

/// The classic simple-cubic bond-fluctuation vector set: all signed
/// permutations of (2,0,0), (2,1,0), (2,1,1), (2,2,1), (3,0,0) and
/// (3,1,0), 108 vectors in total.
///
/// Squared lengths range from 4 to 10, which together with the unit-cube
/// excluded volume guarantees bonds can never cross.
pub fn classic_bfm_vectors() -> Vec<Vector3<i32>> {
    const BASE: [[i32; 3]; 6] = [
        [2, 0, 0],
        [2, 1, 0],
        [2, 1, 1],
        [2, 2, 1],
        [3, 0, 0],
        [3, 1, 0],
    ];

    let mut vectors = Vec::with_capacity(108);
    for base in BASE {
        for perm in permutations(base) {
            for signed in sign_variants(perm) {
                let v = Vector3::new(signed[0], signed[1], signed[2]);
                if !vectors.contains(&v) {
                    vectors.push(v);
                }
            }
        }
    }
    vectors
}

fn permutations(v: [i32; 3]) -> Vec<[i32; 3]> {
    let [a, b, c] = v;
    let mut perms = vec![
        [a, b, c],
        [a, c, b],
        [b, a, c],
        [b, c, a],
        [c, a, b],
        [c, b, a],
    ];
    perms.sort_unstable();
    perms.dedup();
    perms
}

fn sign_variants(v: [i32; 3]) -> Vec<[i32; 3]> {
    let mut variants = Vec::with_capacity(8);
    for sx in [1, -1] {
        for sy in [1, -1] {
            for sz in [1, -1] {
                let candidate = [v[0] * sx, v[1] * sy, v[2] * sz];
                if !variants.contains(&candidate) {
                    variants.push(candidate);
                }
            }
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn encoding_is_injective_over_the_domain() {
        let mut seen = HashSet::new();
        for x in -MAX_COMPONENT..=MAX_COMPONENT {
            for y in -MAX_COMPONENT..=MAX_COMPONENT {
                for z in -MAX_COMPONENT..=MAX_COMPONENT {
                    let v = Vector3::new(x, y, z);
                    let index = bond_vector_index(v).expect("in-domain vector must encode");
                    assert!(seen.insert(index), "index collision for {v:?}");
                    assert_eq!(bond_vector_from_index(index), Some(v));
                }
            }
        }
        assert_eq!(seen.len(), INDEX_SPAN);
    }

    #[test]
    fn out_of_domain_vectors_do_not_encode() {
        assert_eq!(bond_vector_index(Vector3::new(5, 0, 0)), None);
        assert_eq!(bond_vector_index(Vector3::new(0, -5, 0)), None);
        assert_eq!(bond_vector_from_index(INDEX_SPAN as u16), None);
    }

    #[test]
    fn classic_set_has_108_vectors_with_expected_lengths() {
        let vectors = classic_bfm_vectors();
        assert_eq!(vectors.len(), 108);
        for v in &vectors {
            let length_sq = v.dot(v);
            assert!(
                (4..=10).contains(&length_sq),
                "unexpected squared length {length_sq} for {v:?}"
            );
            assert!(bond_vector_index(*v).is_some());
        }
    }

    #[test]
    fn classic_set_is_symmetric_under_negation() {
        let vectors: HashSet<_> = classic_bfm_vectors()
            .into_iter()
            .map(|v| (v.x, v.y, v.z))
            .collect();
        for &(x, y, z) in &vectors {
            assert!(vectors.contains(&(-x, -y, -z)));
        }
    }
}
