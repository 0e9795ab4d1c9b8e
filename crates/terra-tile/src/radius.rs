//! Grid positions within a circular footprint.

use glam::DVec3;
use terra_noise::GridPosition;

/// Grid positions whose offset from the anchor's tile satisfies `dx² + dz² < radius²`.
///
/// The anchor's tile is found by flooring `world.x / length` and `world.z / length`.
/// Offsets are enumerated z-major, x-minor, so the order is stable for a given input.
/// The boundary is strict: offsets at exactly `radius` are excluded, and radius 0 yields
/// nothing. Offsets that would leave the `i32` grid are skipped.
pub fn positions_in_radius(radius: u32, world: DVec3, length: f64) -> Vec<GridPosition> {
    let center = GridPosition::from_world(world.x, world.z, length);
    let r = radius as i64;
    let r_sq = r * r;
    let mut result = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);

    for dz in -r..=r {
        for dx in -r..=r {
            if dx * dx + dz * dz >= r_sq {
                continue;
            }
            if let Some(position) = center.checked_offset(dx as i32, dz as i32) {
                result.push(position);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_one_is_only_the_center() {
        let positions = positions_in_radius(1, DVec3::ZERO, 1.0);
        assert_eq!(positions, vec![GridPosition::ZERO]);
    }

    #[test]
    fn test_radius_zero_is_empty() {
        assert!(positions_in_radius(0, DVec3::new(5.0, 0.0, 5.0), 1.0).is_empty());
    }

    #[test]
    fn test_exact_radius_offsets_are_excluded() {
        let positions = positions_in_radius(2, DVec3::ZERO, 1.0);
        assert_eq!(positions.len(), 9);
        for excluded in [(2, 0), (0, 2), (-2, 0), (0, -2)] {
            assert!(!positions.contains(&GridPosition::new(excluded.0, excluded.1)));
        }
        // (1, 1) has d² = 2 < 4.
        assert!(positions.contains(&GridPosition::new(1, 1)));
        assert!(positions.contains(&GridPosition::new(-1, -1)));
    }

    #[test]
    fn test_footprint_count_for_radius_three() {
        // The 5×5 block; every offset with a component of 3 has d² >= 9.
        assert_eq!(positions_in_radius(3, DVec3::ZERO, 1.0).len(), 25);
    }

    #[test]
    fn test_anchor_is_floored_into_grid() {
        let positions = positions_in_radius(1, DVec3::new(-0.5, 100.0, 250.0), 100.0);
        assert_eq!(positions, vec![GridPosition::new(-1, 2)]);
    }

    #[test]
    fn test_enumeration_is_z_major() {
        let positions = positions_in_radius(2, DVec3::ZERO, 1.0);
        assert_eq!(positions[0], GridPosition::new(-1, -1));
        assert_eq!(positions[1], GridPosition::new(0, -1));
        assert_eq!(positions[3], GridPosition::new(-1, 0));
        assert_eq!(positions, positions_in_radius(2, DVec3::ZERO, 1.0));
    }

    #[test]
    fn test_far_anchors_clip_at_the_grid_edge() {
        let positions = positions_in_radius(2, DVec3::new(1e12, 0.0, 0.0), 1.0);
        // Column x = i32::MAX + 1 does not exist, leaving two of the three columns.
        assert_eq!(positions.len(), 6);
        assert!(positions.iter().all(|p| p.x >= i32::MAX - 1));
        assert!(positions.contains(&GridPosition::new(i32::MAX, 0)));

        let unique: rustc_hash::FxHashSet<_> = positions.iter().collect();
        assert_eq!(unique.len(), positions.len());

        let corner = positions_in_radius(2, DVec3::new(-1e15, 0.0, -1e15), 1.0);
        assert_eq!(corner.len(), 4);
        assert_eq!(corner[0], GridPosition::new(i32::MIN, i32::MIN));
    }
}
