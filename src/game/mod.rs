//! Game Logic Module
//!
//! Local simulation state and physics. Everything here is transport-free:
//! the network layer feeds it remote snapshots and broadcasts what it
//! produces.
//!
//! ## Module Structure
//!
//! - `world`: playfield extent and toroidal wraparound
//! - `player`: peer identity, ship, bullets, customization
//! - `physics`: per-frame ship and bullet integration
//! - `asteroid`: the shared asteroid field (canonical or mirrored)
//! - `collision`: bullet-vs-asteroid sweep

pub mod asteroid;
pub mod collision;
pub mod physics;
pub mod player;
pub mod world;

// Re-export key types
pub use asteroid::{Asteroid, AsteroidField};
pub use collision::{circles_overlap, sweep_bullet_hits, BulletHit};
pub use player::{Bullet, Customization, PeerId, PlayerState, Ship, ShipInput};
pub use world::World;
