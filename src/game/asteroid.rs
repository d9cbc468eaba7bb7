//! Asteroid Field
//!
//! The asteroid list is collectively owned by whichever peer currently holds
//! authority: that peer's copy is canonical and broadcast every frame, every
//! other peer holds a read-only mirror replaced wholesale on receipt.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::world::World;

// =============================================================================
// SPAWN PARAMETERS
// =============================================================================

/// Random envelope an asteroid is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnEnvelope {
    /// Maximum speed per axis.
    pub speed: f64,
    /// Minimum radius.
    pub size: f64,
    /// Radius variation added on top of the minimum.
    pub delta: f64,
}

/// Envelope for the big asteroids the field starts with.
pub const BIG_ASTEROID: SpawnEnvelope = SpawnEnvelope {
    speed: 0.1,
    size: 1.5,
    delta: 0.8,
};

/// Envelope for the small, faster fragments of a destroyed big asteroid.
pub const SMALL_ASTEROID: SpawnEnvelope = SpawnEnvelope {
    speed: 0.2,
    size: 0.5,
    delta: 0.5,
};

/// Radius above which a destroyed asteroid splits into two fragments.
pub const SPLIT_THRESHOLD: f64 = 0.9;

/// Number of big asteroids a fresh (or refilled) field contains.
pub const INITIAL_FIELD_SIZE: usize = 4;

/// Fragments spawned when a big asteroid is destroyed.
const SPLIT_COUNT: usize = 2;

// =============================================================================
// ASTEROID
// =============================================================================

/// One asteroid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Velocity x component.
    pub vx: f64,
    /// Velocity y component.
    pub vy: f64,
    /// Collision radius.
    pub r: f64,
}

impl Asteroid {
    /// Draw an asteroid from an envelope at a random world position.
    pub fn build(env: &SpawnEnvelope, world: &World, rng: &mut impl Rng) -> Self {
        Self {
            x: rng.gen::<f64>() * world.width,
            y: rng.gen::<f64>() * world.height,
            vx: (0.5 - rng.gen::<f64>()) * env.speed,
            vy: (0.5 - rng.gen::<f64>()) * env.speed,
            r: env.size + rng.gen::<f64>() * env.delta,
        }
    }

    /// Whether destroying this asteroid spawns fragments.
    pub fn is_big(&self) -> bool {
        self.r > SPLIT_THRESHOLD
    }
}

// =============================================================================
// ASTEROID FIELD
// =============================================================================

/// The asteroid list, canonical on the authority peer and mirrored elsewhere.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AsteroidField {
    /// Current asteroids. Index positions are the identity used by hit
    /// notices, so removal order matters to remote peers only within the
    /// single frame before the next full broadcast overwrites them.
    pub list: Vec<Asteroid>,
}

impl AsteroidField {
    /// Empty field; filled on the authority's first simulation step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of asteroids.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the field is empty.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Replace the whole field with a received snapshot (mirror update).
    pub fn replace(&mut self, list: Vec<Asteroid>) {
        self.list = list;
    }

    /// Refill an empty field with fresh big asteroids.
    ///
    /// Run by the authority before each movement step so the game never
    /// stalls with nothing left to shoot.
    pub fn refill_if_empty(&mut self, world: &World, rng: &mut impl Rng) {
        if !self.list.is_empty() {
            return;
        }
        self.list = (0..INITIAL_FIELD_SIZE)
            .map(|_| Asteroid::build(&BIG_ASTEROID, world, rng))
            .collect();
    }

    /// Advance every asteroid one step and wrap onto the torus.
    pub fn step(&mut self, world: &World) {
        for a in &mut self.list {
            a.x += a.vx;
            a.y += a.vy;
            world.wrap(&mut a.x, &mut a.y);
        }
    }

    /// Resolve a confirmed hit on the asteroid at `index`.
    ///
    /// Removes the asteroid; a big one additionally spawns two small
    /// fragments at its position. An out-of-range index (stale notice from a
    /// peer one snapshot behind) is ignored. Returns whether anything was
    /// removed.
    pub fn resolve_hit(&mut self, index: usize, world: &World, rng: &mut impl Rng) -> bool {
        if index >= self.list.len() {
            return false;
        }
        let destroyed = self.list.remove(index);
        if destroyed.is_big() {
            for _ in 0..SPLIT_COUNT {
                let mut fragment = Asteroid::build(&SMALL_ASTEROID, world, rng);
                fragment.x = destroyed.x;
                fragment.y = destroyed.y;
                self.list.push(fragment);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_build_within_envelope() {
        let world = World::default();
        let mut rng = rng();

        for _ in 0..100 {
            let a = Asteroid::build(&BIG_ASTEROID, &world, &mut rng);
            assert!(a.x >= 0.0 && a.x <= world.width);
            assert!(a.y >= 0.0 && a.y <= world.height);
            assert!(a.vx.abs() <= BIG_ASTEROID.speed * 0.5);
            assert!(a.vy.abs() <= BIG_ASTEROID.speed * 0.5);
            assert!(a.r >= BIG_ASTEROID.size);
            assert!(a.r <= BIG_ASTEROID.size + BIG_ASTEROID.delta);
        }
    }

    #[test]
    fn test_refill_only_when_empty() {
        let world = World::default();
        let mut rng = rng();
        let mut field = AsteroidField::new();

        field.refill_if_empty(&world, &mut rng);
        assert_eq!(field.len(), INITIAL_FIELD_SIZE);

        let before = field.list.clone();
        field.refill_if_empty(&world, &mut rng);
        assert_eq!(field.list, before);
    }

    #[test]
    fn test_step_moves_and_wraps() {
        let world = World::default();
        let mut field = AsteroidField::new();
        field.replace(vec![Asteroid {
            x: 0.05,
            y: 10.0,
            vx: -0.1,
            vy: 0.2,
            r: 1.0,
        }]);

        field.step(&world);

        let a = field.list[0];
        assert_eq!(a.x, world.width); // crossed the left edge
        assert!((a.y - 10.2).abs() < 1e-12);
    }

    #[test]
    fn test_resolve_hit_splits_big() {
        let world = World::default();
        let mut rng = rng();
        let mut field = AsteroidField::new();
        field.replace(vec![Asteroid {
            x: 4.0,
            y: 6.0,
            vx: 0.0,
            vy: 0.0,
            r: 2.0,
        }]);

        assert!(field.resolve_hit(0, &world, &mut rng));
        assert_eq!(field.len(), SPLIT_COUNT);
        for fragment in &field.list {
            assert_eq!((fragment.x, fragment.y), (4.0, 6.0));
            assert!(fragment.r >= SMALL_ASTEROID.size);
            assert!(fragment.r <= SMALL_ASTEROID.size + SMALL_ASTEROID.delta);
        }
    }

    #[test]
    fn test_resolve_hit_small_just_removes() {
        let world = World::default();
        let mut rng = rng();
        let mut field = AsteroidField::new();
        field.replace(vec![Asteroid {
            x: 1.0,
            y: 1.0,
            vx: 0.0,
            vy: 0.0,
            r: 0.5,
        }]);

        assert!(field.resolve_hit(0, &world, &mut rng));
        assert!(field.is_empty());
    }

    #[test]
    fn test_resolve_hit_stale_index_ignored() {
        let world = World::default();
        let mut rng = rng();
        let mut field = AsteroidField::new();

        assert!(!field.resolve_hit(3, &world, &mut rng));
        assert!(field.is_empty());
    }
}
