//! Compute launch geometry.

/// Work-group edge length; kernels declare `@workgroup_size(16, 16, 1)`.
pub const BLOCK_SIZE: u32 = 16;

/// Global and local work sizes for one dispatch over a surface.
///
/// The global size is rounded up to whole blocks, so kernels see threads past
/// the surface edge and must discard them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaunchGeometry {
    pub global: (u32, u32),
    pub local: (u32, u32),
}

impl LaunchGeometry {
    pub fn for_surface(width: u32, height: u32) -> Self {
        Self {
            global: (round_up_to_block(width), round_up_to_block(height)),
            local: (BLOCK_SIZE, BLOCK_SIZE),
        }
    }

    /// Number of work groups per axis, as passed to `dispatch_workgroups`.
    pub fn workgroups(&self) -> (u32, u32) {
        (self.global.0 / self.local.0, self.global.1 / self.local.1)
    }
}

/// Smallest multiple of [`BLOCK_SIZE`] that is >= `dimension`.
pub fn round_up_to_block(dimension: u32) -> u32 {
    dimension.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_next_block() {
        assert_eq!(round_up_to_block(100), 112);
        assert_eq!(round_up_to_block(1), 16);
        assert_eq!(round_up_to_block(17), 32);
    }

    #[test]
    fn exact_multiples_are_not_padded() {
        assert_eq!(round_up_to_block(96), 96);
        assert_eq!(round_up_to_block(800), 800);
    }

    #[test]
    fn global_size_is_smallest_covering_multiple() {
        for dim in 1..=1000 {
            let g = round_up_to_block(dim);
            assert_eq!(g % BLOCK_SIZE, 0);
            assert!(g >= dim);
            assert!(g - dim < BLOCK_SIZE);
        }
    }

    #[test]
    fn geometry_for_800_by_600() {
        let geometry = LaunchGeometry::for_surface(800, 600);
        assert_eq!(geometry.global, (800, 608));
        assert_eq!(geometry.local, (16, 16));
        assert_eq!(geometry.workgroups(), (50, 38));
    }
}
