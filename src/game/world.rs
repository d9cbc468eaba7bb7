//! World Geometry
//!
//! The shared playfield is a torus: anything crossing an edge reappears on
//! the opposite side. Every position-bearing entity (ship, asteroid, bullet)
//! is wrapped once per simulation step.

use serde::{Deserialize, Serialize};

/// Default world extent on both axes.
pub const DEFAULT_WORLD_EXTENT: f64 = 32.0;

/// Rectangular world with toroidal topology.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Extent of the x axis.
    pub width: f64,
    /// Extent of the y axis.
    pub height: f64,
}

impl Default for World {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_EXTENT,
            height: DEFAULT_WORLD_EXTENT,
        }
    }
}

impl World {
    /// Create a world with the given extents.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Wrap a position onto the torus, applied independently per axis:
    /// a coordinate below zero is set to the axis extent, a coordinate
    /// above the extent is set to zero.
    pub fn wrap(&self, x: &mut f64, y: &mut f64) {
        if *x < 0.0 {
            *x = self.width;
        }
        if *x > self.width {
            *x = 0.0;
        }
        if *y < 0.0 {
            *y = self.height;
        }
        if *y > self.height {
            *y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_below_zero_maps_to_extent() {
        let world = World::default();
        let (mut x, mut y) = (-0.1, 5.0);
        world.wrap(&mut x, &mut y);
        assert_eq!(x, 32.0);
        assert_eq!(y, 5.0);
    }

    #[test]
    fn test_wrap_above_extent_maps_to_zero() {
        let world = World::default();
        let (mut x, mut y) = (32.1, 16.0);
        world.wrap(&mut x, &mut y);
        assert_eq!(x, 0.0);
        assert_eq!(y, 16.0);
    }

    #[test]
    fn test_wrap_both_axes_independent() {
        let world = World::new(32.0, 24.0);
        let (mut x, mut y) = (-1.0, 24.5);
        world.wrap(&mut x, &mut y);
        assert_eq!(x, 32.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn test_wrap_inside_untouched() {
        let world = World::default();
        let (mut x, mut y) = (10.0, 20.0);
        world.wrap(&mut x, &mut y);
        assert_eq!((x, y), (10.0, 20.0));
    }
}
